//! Lowering of type annotations and declarations into the type arena

use super::binder::{DeclNode, Space, SymbolId, SymbolKind};
use super::infer::InferEnv;
use super::types::{
    IndexInfo, Intrinsic, MappedType, Modifier, ObjectShape, Parameter, Property, Signature,
    TypeData, TypeId, TypeParameter,
};
use super::{Checker, FileId, TypeMap, TypeScope};
use crate::js_doc::DocComment;
use crate::utils::swc::{expr_key_name, format_number, prop_name_str, str_value};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;
use std::rc::Rc;

impl<'p> Checker<'p> {
    /// Source text behind a node, used to name types the checker cannot model
    fn source_text(&self, file: FileId, node: &impl Spanned) -> String {
        self.program
            .file(file)
            .parsed
            .text_for_span(node.span())
            .to_string()
    }

    pub(crate) fn lower_type(&mut self, ty: &'p swc_ast::TsType, scope: &TypeScope) -> TypeId {
        use swc_ast::TsType;

        match ty {
            TsType::TsKeywordType(keyword) => self.keyword_type(keyword.kind),
            TsType::TsThisType(_) => scope.this_type.unwrap_or_else(|| self.any()),
            TsType::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsFnType(f)) => {
                let signature = self.ts_fn_signature(
                    &f.params,
                    f.type_params.as_deref(),
                    Some(&f.type_ann),
                    scope,
                    &DocComment::default(),
                );
                self.arena.object(ObjectShape {
                    call: vec![signature],
                    ..Default::default()
                })
            }
            TsType::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsConstructorType(
                c,
            )) => {
                let signature = self.ts_fn_signature(
                    &c.params,
                    c.type_params.as_deref(),
                    Some(&c.type_ann),
                    scope,
                    &DocComment::default(),
                );
                self.arena.object(ObjectShape {
                    construct: vec![signature],
                    ..Default::default()
                })
            }
            TsType::TsTypeRef(reference) => self.lower_type_ref(
                &reference.type_name,
                reference.type_params.as_deref(),
                scope,
            ),
            TsType::TsTypeQuery(query) => match &query.expr_name {
                swc_ast::TsTypeQueryExpr::TsEntityName(entity) => {
                    match self.resolve_entity(entity, scope, Space::Value) {
                        Some(sym) => self.type_of_symbol(sym),
                        None => self.any(),
                    }
                }
                swc_ast::TsTypeQueryExpr::Import(_) => self.any(),
            },
            TsType::TsTypeLit(literal) => {
                let shape = self.lower_members(&literal.members, scope);
                self.arena.object(shape)
            }
            TsType::TsArrayType(array) => {
                let element = self.lower_type(&array.elem_type, scope);
                self.array_of(element)
            }
            TsType::TsTupleType(tuple) => {
                let elements = tuple
                    .elem_types
                    .iter()
                    .map(|e| self.lower_type(&e.ty, scope))
                    .collect();
                self.arena.tuple(elements)
            }
            TsType::TsOptionalType(optional) => self.lower_type(&optional.type_ann, scope),
            TsType::TsRestType(rest) => self.lower_type(&rest.type_ann, scope),
            TsType::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsUnionType(
                union,
            )) => {
                let members: Vec<TypeId> =
                    union.types.iter().map(|t| self.lower_type(t, scope)).collect();
                self.arena.union(members)
            }
            TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsIntersectionType(intersection),
            ) => {
                let members: Vec<TypeId> = intersection
                    .types
                    .iter()
                    .map(|t| self.lower_type(t, scope))
                    .collect();
                self.arena.intersection(members)
            }
            TsType::TsConditionalType(_) | TsType::TsInferType(_) | TsType::TsImportType(_) => {
                let text = self.source_text(scope.file, ty);
                self.unresolved(text, Vec::new())
            }
            TsType::TsParenthesizedType(paren) => self.lower_type(&paren.type_ann, scope),
            TsType::TsTypeOperator(operator) => {
                let inner = self.lower_type(&operator.type_ann, scope);
                match operator.op {
                    swc_ast::TsTypeOperatorOp::KeyOf => {
                        let keys = self.arena.alloc(TypeData::KeyOf(inner));
                        self.evaluate(keys)
                    }
                    swc_ast::TsTypeOperatorOp::Unique | swc_ast::TsTypeOperatorOp::ReadOnly => {
                        inner
                    }
                }
            }
            TsType::TsIndexedAccessType(indexed) => {
                let object = self.lower_type(&indexed.obj_type, scope);
                let index = self.lower_type(&indexed.index_type, scope);
                let access = self.arena.alloc(TypeData::IndexedAccess { object, index });
                self.evaluate(access)
            }
            TsType::TsMappedType(mapped) => self.lower_mapped(mapped, scope),
            TsType::TsLitType(literal) => match &literal.lit {
                swc_ast::TsLit::Str(s) => self.arena.string_literal(str_value(s)),
                swc_ast::TsLit::Number(n) => self.arena.number_literal(format_number(n.value)),
                swc_ast::TsLit::Bool(b) => self.arena.boolean_literal(b.value),
                swc_ast::TsLit::BigInt(_) => self.intrinsic(Intrinsic::BigInt),
                swc_ast::TsLit::Tpl(tpl) if tpl.types.is_empty() => {
                    let text: String = tpl.quasis.iter().map(|q| q.raw.to_string()).collect();
                    self.arena.string_literal(text)
                }
                swc_ast::TsLit::Tpl(_) => self.intrinsic(Intrinsic::String),
            },
            TsType::TsTypePredicate(_) => self.arena.boolean(),
        }
    }

    fn keyword_type(&self, kind: swc_ast::TsKeywordTypeKind) -> TypeId {
        use swc_ast::TsKeywordTypeKind as K;

        match kind {
            K::TsBooleanKeyword => self.arena.boolean(),
            kind => self.intrinsic(match kind {
                K::TsStringKeyword => Intrinsic::String,
                K::TsNumberKeyword => Intrinsic::Number,
                K::TsBigIntKeyword => Intrinsic::BigInt,
                K::TsSymbolKeyword => Intrinsic::Symbol,
                K::TsVoidKeyword => Intrinsic::Void,
                K::TsUndefinedKeyword => Intrinsic::Undefined,
                K::TsNullKeyword => Intrinsic::Null,
                K::TsNeverKeyword => Intrinsic::Never,
                K::TsUnknownKeyword => Intrinsic::Unknown,
                K::TsObjectKeyword => Intrinsic::Object,
                _ => Intrinsic::Any,
            }),
        }
    }

    fn lower_mapped(&mut self, mapped: &'p swc_ast::TsMappedType, scope: &TypeScope) -> TypeId {
        let name = mapped.type_param.name.sym.to_string();
        let param = self.arena.alloc(TypeData::TypeParameter(TypeParameter {
            name: name.clone(),
            constraint: None,
            default: None,
        }));
        let constraint = match mapped.type_param.constraint.as_deref() {
            Some(constraint) => self.lower_type(constraint, scope),
            None => self.any(),
        };
        let inner = scope.with_params([(name, param)]);
        let template = match mapped.type_ann.as_deref() {
            Some(template) => self.lower_type(template, &inner),
            None => self.any(),
        };
        let modifier = |m: Option<swc_ast::TruePlusMinus>| {
            m.map(|m| match m {
                swc_ast::TruePlusMinus::Minus => Modifier::Remove,
                swc_ast::TruePlusMinus::True | swc_ast::TruePlusMinus::Plus => Modifier::Add,
            })
        };
        let ty = self.arena.alloc(TypeData::Mapped(Rc::new(MappedType {
            param,
            constraint,
            template,
            optional: modifier(mapped.optional),
            readonly: modifier(mapped.readonly),
        })));
        self.evaluate(ty)
    }

    fn lower_type_ref(
        &mut self,
        entity: &'p swc_ast::TsEntityName,
        args: Option<&'p swc_ast::TsTypeParamInstantiation>,
        scope: &TypeScope,
    ) -> TypeId {
        let args: Vec<TypeId> = args
            .map(|a| a.params.iter().map(|p| self.lower_type(p, scope)).collect())
            .unwrap_or_default();

        if let swc_ast::TsEntityName::Ident(ident) = entity {
            if let Some(param) = scope.param(&ident.sym) {
                return param;
            }
        }
        match self.resolve_entity(entity, scope, Space::Type) {
            Some(sym) => self.type_reference(sym, args),
            None => self.unresolved(entity_text(entity), args),
        }
    }

    /// Symbol a (possibly qualified) type name refers to
    pub(crate) fn resolve_entity(
        &mut self,
        entity: &swc_ast::TsEntityName,
        scope: &TypeScope,
        space: Space,
    ) -> Option<SymbolId> {
        match entity {
            swc_ast::TsEntityName::Ident(ident) => {
                self.bindings
                    .lookup(scope.file, scope.namespace, space, &ident.sym)
            }
            swc_ast::TsEntityName::TsQualifiedName(qualified) => {
                let left = self
                    .resolve_entity(&qualified.left, scope, Space::Value)
                    .or_else(|| self.resolve_entity(&qualified.left, scope, Space::Type))?;
                self.bindings.member(left, space, &qualified.right.sym)
            }
        }
    }

    /// Symbol an expression in `extends` or `implements` position names
    pub(crate) fn resolve_expr_entity(
        &mut self,
        expr: &swc_ast::Expr,
        scope: &TypeScope,
        space: Space,
    ) -> Option<SymbolId> {
        match expr {
            swc_ast::Expr::Ident(ident) => {
                self.bindings
                    .lookup(scope.file, scope.namespace, space, &ident.sym)
            }
            swc_ast::Expr::Member(member) => {
                let swc_ast::MemberProp::Ident(prop) = &member.prop else {
                    return None;
                };
                let left = self
                    .resolve_expr_entity(&member.obj, scope, Space::Value)
                    .or_else(|| self.resolve_expr_entity(&member.obj, scope, Space::Type))?;
                self.bindings.member(left, space, &prop.sym)
            }
            swc_ast::Expr::Paren(paren) => self.resolve_expr_entity(&paren.expr, scope, space),
            _ => None,
        }
    }

    /// Type a reference to `sym` with `args` denotes
    pub(crate) fn type_reference(&mut self, sym: SymbolId, args: Vec<TypeId>) -> TypeId {
        let target = match self.symbol(sym).kind {
            SymbolKind::Alias => self.bindings.resolve_alias(sym, Space::Type),
            _ => Some(sym),
        };
        let Some(target) = target else {
            let name = self.symbol(sym).name.clone();
            return self.unresolved(name, args);
        };

        match self.symbol(target).kind {
            SymbolKind::TypeAlias => self.alias_instance(target, args),
            SymbolKind::Interface | SymbolKind::Class => {
                let params = self.symbol_type_parameters(target);
                if params.is_empty() {
                    return self.declared_type(target);
                }
                let args = self.fill_type_args(&params, args);
                self.arena.reference(target, args)
            }
            SymbolKind::External if !args.is_empty() => {
                let name = self.display_name(target);
                self.arena.alloc(TypeData::Opaque {
                    name,
                    args,
                    symbol: Some(target),
                })
            }
            SymbolKind::Enum
            | SymbolKind::Namespace
            | SymbolKind::External
            | SymbolKind::ModuleNamespace => self.declared_type(target),
            _ => {
                let name = self.symbol(target).name.clone();
                self.unresolved(name, args)
            }
        }
    }

    /// `Alias<args>`: the alias body instantiated, carrying the alias
    pub(crate) fn alias_instance(&mut self, sym: SymbolId, args: Vec<TypeId>) -> TypeId {
        let declared = self.declared_type(sym);
        let params = self.symbol_type_parameters(sym);
        if params.is_empty() {
            return declared;
        }
        let args = self.fill_type_args(&params, args);
        if self.declaring.contains(&sym) {
            return self.deferred_alias_instance(sym, args);
        }
        let map: TypeMap = params.iter().copied().zip(args.iter().copied()).collect();
        let instance = self.instantiate(declared, &map);
        if self.arena.alias(declared).is_none() {
            return instance;
        }
        let data = self.arena.data(instance).clone();
        self.arena.alloc_info(super::TypeInfo {
            data,
            alias: Some(super::AliasRef { symbol: sym, args }),
        })
    }

    /// Pad type arguments with defaults, or `any` where there is none
    fn fill_type_args(&mut self, params: &[TypeId], mut args: Vec<TypeId>) -> Vec<TypeId> {
        args.truncate(params.len());
        while args.len() < params.len() {
            let param = params[args.len()];
            let default = match self.arena.data(param) {
                TypeData::TypeParameter(p) => p.default,
                _ => None,
            };
            let filled = match default {
                Some(default) => {
                    let map: TypeMap = params.iter().copied().zip(args.iter().copied()).collect();
                    self.instantiate(default, &map)
                }
                None => self.any(),
            };
            args.push(filled);
        }
        args
    }

    /// Allocate type parameters, then lower their constraints and defaults
    ///
    /// `declared` runs before any constraint is lowered so constraints can
    /// refer back to the declaring symbol.
    pub(crate) fn declare_type_params(
        &mut self,
        decl: &'p swc_ast::TsTypeParamDecl,
        scope: &TypeScope,
        declared: impl FnOnce(&mut Self, &[TypeId]),
    ) -> Vec<TypeId> {
        let ids: Vec<TypeId> = decl
            .params
            .iter()
            .map(|p| {
                self.arena.alloc(TypeData::TypeParameter(TypeParameter {
                    name: p.name.sym.to_string(),
                    constraint: None,
                    default: None,
                }))
            })
            .collect();
        declared(self, &ids);

        let inner = scope.with_params(
            decl.params
                .iter()
                .map(|p| p.name.sym.to_string())
                .zip(ids.iter().copied()),
        );
        for (param, id) in decl.params.iter().zip(&ids) {
            let constraint = param
                .constraint
                .as_deref()
                .map(|c| self.lower_type(c, &inner));
            let default = param.default.as_deref().map(|d| self.lower_type(d, &inner));
            self.arena.set_data(
                *id,
                TypeData::TypeParameter(TypeParameter {
                    name: param.name.sym.to_string(),
                    constraint,
                    default,
                }),
            );
        }
        ids
    }

    /// Type parameters of a signature, and the scope its body sees
    pub(crate) fn lower_type_params(
        &mut self,
        decl: Option<&'p swc_ast::TsTypeParamDecl>,
        scope: &TypeScope,
    ) -> (Vec<TypeId>, TypeScope) {
        let Some(decl) = decl else {
            return (Vec::new(), scope.clone());
        };
        let ids = self.declare_type_params(decl, scope, |_, _| {});
        let inner = scope.with_params(
            decl.params
                .iter()
                .map(|p| p.name.sym.to_string())
                .zip(ids.iter().copied()),
        );
        (ids, inner)
    }

    /// Members of a type literal or interface body
    pub(crate) fn lower_members(
        &mut self,
        members: &'p [swc_ast::TsTypeElement],
        scope: &TypeScope,
    ) -> ObjectShape {
        use swc_ast::TsTypeElement as E;

        let mut shape = ObjectShape::default();
        for member in members {
            let doc = self.doc_at(scope.file, member.span_lo());
            match member {
                E::TsPropertySignature(prop) => {
                    let Some(name) = expr_key_name(&prop.key) else {
                        continue;
                    };
                    let ty = match prop.type_ann.as_deref() {
                        Some(ann) => self.lower_type(&ann.type_ann, scope),
                        None => self.any(),
                    };
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: prop.optional,
                        readonly: prop.readonly,
                        documentation: doc.text(),
                    });
                }
                E::TsMethodSignature(method) => {
                    let Some(name) = expr_key_name(&method.key) else {
                        continue;
                    };
                    if shape.property(&name).is_some() {
                        continue;
                    }
                    let signature = self.ts_fn_signature(
                        &method.params,
                        method.type_params.as_deref(),
                        method.type_ann.as_deref(),
                        scope,
                        &doc,
                    );
                    let ty = self.arena.object(ObjectShape {
                        call: vec![signature],
                        ..Default::default()
                    });
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: method.optional,
                        readonly: false,
                        documentation: doc.text(),
                    });
                }
                E::TsGetterSignature(getter) => {
                    let Some(name) = expr_key_name(&getter.key) else {
                        continue;
                    };
                    let ty = match getter.type_ann.as_deref() {
                        Some(ann) => self.lower_type(&ann.type_ann, scope),
                        None => self.any(),
                    };
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: false,
                        readonly: false,
                        documentation: doc.text(),
                    });
                }
                E::TsSetterSignature(setter) => {
                    let Some(name) = expr_key_name(&setter.key) else {
                        continue;
                    };
                    let ty = self
                        .lower_fn_param(&setter.param, 0, scope, &doc)
                        .map(|p| p.ty)
                        .unwrap_or_else(|| self.any());
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: false,
                        readonly: false,
                        documentation: doc.text(),
                    });
                }
                E::TsCallSignatureDecl(call) => {
                    let signature = self.ts_fn_signature(
                        &call.params,
                        call.type_params.as_deref(),
                        call.type_ann.as_deref(),
                        scope,
                        &doc,
                    );
                    shape.call.push(signature);
                }
                E::TsConstructSignatureDecl(construct) => {
                    let signature = self.ts_fn_signature(
                        &construct.params,
                        construct.type_params.as_deref(),
                        construct.type_ann.as_deref(),
                        scope,
                        &doc,
                    );
                    shape.construct.push(signature);
                }
                E::TsIndexSignature(index) => {
                    if let Some((key, info)) = self.lower_index_signature(index, scope) {
                        match key {
                            Intrinsic::Number => shape.number_index = Some(info),
                            _ => shape.string_index = Some(info),
                        }
                    }
                }
            }
        }
        shape
    }

    fn lower_index_signature(
        &mut self,
        index: &'p swc_ast::TsIndexSignature,
        scope: &TypeScope,
    ) -> Option<(Intrinsic, IndexInfo)> {
        let swc_ast::TsFnParam::Ident(key) = index.params.first()? else {
            return None;
        };
        let key_type = key
            .type_ann
            .as_deref()
            .map(|ann| self.lower_type(&ann.type_ann, scope))
            .unwrap_or_else(|| self.intrinsic(Intrinsic::String));
        let kind = match self.arena.data(key_type) {
            TypeData::Intrinsic(Intrinsic::Number) => Intrinsic::Number,
            _ => Intrinsic::String,
        };
        let ty = match index.type_ann.as_deref() {
            Some(ann) => self.lower_type(&ann.type_ann, scope),
            None => self.any(),
        };
        Some((
            kind,
            IndexInfo {
                key_name: key.id.sym.to_string(),
                ty,
            },
        ))
    }

    /// Signature of a function type, method signature or call signature
    pub(crate) fn ts_fn_signature(
        &mut self,
        params: &'p [swc_ast::TsFnParam],
        type_params: Option<&'p swc_ast::TsTypeParamDecl>,
        ret: Option<&'p swc_ast::TsTypeAnn>,
        scope: &TypeScope,
        doc: &DocComment,
    ) -> Signature {
        let (type_params, scope) = self.lower_type_params(type_params, scope);
        let params = params
            .iter()
            .enumerate()
            .filter_map(|(i, p)| self.lower_fn_param(p, i, &scope, doc))
            .collect();
        let ret = match ret {
            Some(ann) => self.lower_type(&ann.type_ann, &scope),
            None => self.any(),
        };
        Signature {
            type_params,
            params,
            ret,
            documentation: doc.text(),
        }
    }

    /// Signature of a function declaration, expression or method
    pub(crate) fn function_signature(
        &mut self,
        function: &'p swc_ast::Function,
        env: &InferEnv,
        doc: &DocComment,
    ) -> Signature {
        let (type_params, scope) = self.lower_type_params(function.type_params.as_deref(), &env.scope);
        let mut body_env = env.with_scope(scope.clone());

        let mut params = Vec::new();
        for (i, param) in function.params.iter().enumerate() {
            if let Some(lowered) = self.lower_pat_param(&param.pat, i, &body_env, doc) {
                self.bind_pattern(&mut body_env, &param.pat, lowered.ty);
                params.push(lowered);
            }
        }

        let ret = match (&function.return_type, &function.body) {
            (Some(ann), _) => self.lower_type(&ann.type_ann, &scope),
            (None, Some(body)) => self.infer_block_return(
                body,
                body_env,
                function.is_async,
                function.is_generator,
            ),
            (None, None) => self.any(),
        };
        Signature {
            type_params,
            params,
            ret,
            documentation: doc.text(),
        }
    }

    /// Signature of an arrow function, which sees the locals around it
    pub(crate) fn arrow_signature(
        &mut self,
        arrow: &'p swc_ast::ArrowExpr,
        env: &InferEnv,
        doc: &DocComment,
    ) -> Signature {
        let (type_params, scope) = self.lower_type_params(arrow.type_params.as_deref(), &env.scope);
        let mut body_env = env.with_scope(scope.clone());

        let mut params = Vec::new();
        for (i, pat) in arrow.params.iter().enumerate() {
            if let Some(lowered) = self.lower_pat_param(pat, i, &body_env, doc) {
                self.bind_pattern(&mut body_env, pat, lowered.ty);
                params.push(lowered);
            }
        }

        let ret = match (&arrow.return_type, &*arrow.body) {
            (Some(ann), _) => self.lower_type(&ann.type_ann, &scope),
            (None, swc_ast::BlockStmtOrExpr::BlockStmt(body)) => {
                self.infer_block_return(body, body_env, arrow.is_async, arrow.is_generator)
            }
            (None, swc_ast::BlockStmtOrExpr::Expr(expr)) => {
                let ty = self.infer_expr(expr, &body_env);
                let ty = self.arena.widen(ty);
                if arrow.is_async {
                    let awaited = self.awaited(ty);
                    self.promise_of(awaited)
                } else {
                    ty
                }
            }
        };
        Signature {
            type_params,
            params,
            ret,
            documentation: doc.text(),
        }
    }

    fn lower_fn_param(
        &mut self,
        param: &'p swc_ast::TsFnParam,
        index: usize,
        scope: &TypeScope,
        doc: &DocComment,
    ) -> Option<Parameter> {
        let env = InferEnv::new(scope.clone());
        match param {
            swc_ast::TsFnParam::Ident(binding) => self.binding_param(binding, None, scope, doc),
            swc_ast::TsFnParam::Array(array) => Some(self.array_pattern_param(array, index, scope)),
            swc_ast::TsFnParam::Object(object) => {
                Some(self.object_pattern_param(object, index, &env))
            }
            swc_ast::TsFnParam::Rest(rest) => Some(self.rest_param(rest, index, scope, doc)),
        }
    }

    /// Parameter of a function whose body may be inferred
    pub(crate) fn lower_pat_param(
        &mut self,
        pat: &'p swc_ast::Pat,
        index: usize,
        env: &InferEnv,
        doc: &DocComment,
    ) -> Option<Parameter> {
        let scope = &env.scope;
        match pat {
            swc_ast::Pat::Ident(binding) => self.binding_param(binding, None, scope, doc),
            swc_ast::Pat::Assign(assign) => {
                let default_type = self.infer_expr(&assign.right, env);
                let default_type = self.arena.widen(default_type);
                let mut param = match &*assign.left {
                    swc_ast::Pat::Ident(binding) => {
                        self.binding_param(binding, Some(default_type), scope, doc)?
                    }
                    swc_ast::Pat::Object(object) => self.object_pattern_param(object, index, env),
                    swc_ast::Pat::Array(array) => self.array_pattern_param(array, index, scope),
                    _ => return None,
                };
                param.optional = true;
                param.default_value = Some(self.source_text(scope.file, &*assign.right));
                Some(param)
            }
            swc_ast::Pat::Rest(rest) => Some(self.rest_param(rest, index, scope, doc)),
            swc_ast::Pat::Object(object) => Some(self.object_pattern_param(object, index, env)),
            swc_ast::Pat::Array(array) => Some(self.array_pattern_param(array, index, scope)),
            _ => None,
        }
    }

    fn binding_param(
        &mut self,
        binding: &'p swc_ast::BindingIdent,
        fallback: Option<TypeId>,
        scope: &TypeScope,
        doc: &DocComment,
    ) -> Option<Parameter> {
        let name = binding.id.sym.to_string();
        if name == "this" {
            return None;
        }
        let ty = match binding.type_ann.as_deref() {
            Some(ann) => self.lower_type(&ann.type_ann, scope),
            None => fallback.unwrap_or_else(|| self.any()),
        };
        Some(Parameter {
            documentation: doc.param(&name).unwrap_or_default().to_string(),
            name,
            ty,
            optional: binding.id.optional,
            rest: false,
            default_value: None,
        })
    }

    /// `{a, b = 1}: T` is named after its position, like `__0`
    fn object_pattern_param(
        &mut self,
        object: &'p swc_ast::ObjectPat,
        index: usize,
        env: &InferEnv,
    ) -> Parameter {
        let ty = match object.type_ann.as_deref() {
            Some(ann) => self.lower_type(&ann.type_ann, &env.scope),
            None => self.object_pattern_type(object, env),
        };
        Parameter {
            name: format!("__{}", index),
            ty,
            optional: object.optional,
            rest: false,
            default_value: None,
            documentation: String::new(),
        }
    }

    /// Object type implied by an unannotated destructuring pattern
    fn object_pattern_type(&mut self, object: &'p swc_ast::ObjectPat, env: &InferEnv) -> TypeId {
        let mut shape = ObjectShape::default();
        for prop in &object.props {
            let (name, ty, optional) = match prop {
                swc_ast::ObjectPatProp::Assign(assign) => {
                    let name = assign.key.id.sym.to_string();
                    match assign.value.as_deref() {
                        Some(value) => {
                            let ty = self.infer_expr(value, env);
                            (name, self.arena.widen(ty), true)
                        }
                        None => (name, self.any(), false),
                    }
                }
                swc_ast::ObjectPatProp::KeyValue(kv) => {
                    let Some(name) = prop_name_str(&kv.key) else {
                        continue;
                    };
                    match &*kv.value {
                        swc_ast::Pat::Assign(assign) => {
                            let ty = self.infer_expr(&assign.right, env);
                            (name, self.arena.widen(ty), true)
                        }
                        swc_ast::Pat::Object(inner) => {
                            (name, self.object_pattern_type(inner, env), false)
                        }
                        _ => (name, self.any(), false),
                    }
                }
                swc_ast::ObjectPatProp::Rest(_) => continue,
            };
            shape.add_property(Property {
                name,
                ty,
                optional,
                readonly: false,
                documentation: String::new(),
            });
        }
        self.arena.object(shape)
    }

    fn array_pattern_param(
        &mut self,
        array: &'p swc_ast::ArrayPat,
        index: usize,
        scope: &TypeScope,
    ) -> Parameter {
        let ty = match array.type_ann.as_deref() {
            Some(ann) => self.lower_type(&ann.type_ann, scope),
            None => {
                let elements = array.elems.iter().map(|_| self.any()).collect();
                self.arena.tuple(elements)
            }
        };
        Parameter {
            name: format!("__{}", index),
            ty,
            optional: array.optional,
            rest: false,
            default_value: None,
            documentation: String::new(),
        }
    }

    fn rest_param(
        &mut self,
        rest: &'p swc_ast::RestPat,
        index: usize,
        scope: &TypeScope,
        doc: &DocComment,
    ) -> Parameter {
        let (name, annotation) = match &*rest.arg {
            swc_ast::Pat::Ident(binding) => (
                binding.id.sym.to_string(),
                rest.type_ann.as_deref().or(binding.type_ann.as_deref()),
            ),
            _ => (format!("__{}", index), rest.type_ann.as_deref()),
        };
        let ty = match annotation {
            Some(ann) => self.lower_type(&ann.type_ann, scope),
            None => {
                let any = self.any();
                self.array_of(any)
            }
        };
        Parameter {
            documentation: doc.param(&name).unwrap_or_default().to_string(),
            name,
            ty,
            optional: false,
            rest: true,
            default_value: None,
        }
    }

    /// Members of an interface: every declaration merged, then its bases
    pub(crate) fn interface_structure(&mut self, sym: SymbolId) -> ObjectShape {
        let params = self.symbol_type_parameters(sym);
        let this = self.declared_type(sym);
        let parent = self.symbol(sym).parent;
        let decls: Vec<_> = self
            .symbol(sym)
            .decls
            .iter()
            .filter_map(|d| match d.node {
                DeclNode::Interface(iface) => Some((d.file, iface)),
                _ => None,
            })
            .collect();

        let scopes: Vec<TypeScope> = decls
            .iter()
            .map(|(file, iface)| {
                let names = iface
                    .type_params
                    .as_deref()
                    .map(|p| p.params.iter().map(|p| p.name.sym.to_string()).collect())
                    .unwrap_or_else(Vec::new);
                TypeScope::new(*file, parent)
                    .with_params(names.into_iter().zip(params.iter().copied()))
                    .with_this(this)
            })
            .collect();

        let mut shape = ObjectShape::default();
        for ((_, iface), scope) in decls.iter().zip(&scopes) {
            let own = self.lower_members(&iface.body.body, scope);
            let merging_calls = !shape.call.is_empty();
            shape.inherit(&own);
            if merging_calls {
                shape.call.extend(own.call.iter().cloned());
            }
        }
        for ((_, iface), scope) in decls.iter().zip(&scopes) {
            for heritage in &iface.extends {
                let base = self.lower_heritage(heritage, scope);
                let base_shape = self.shape(base);
                shape.inherit(&base_shape);
            }
        }
        shape
    }

    fn lower_heritage(
        &mut self,
        heritage: &'p swc_ast::TsExprWithTypeArgs,
        scope: &TypeScope,
    ) -> TypeId {
        let args: Vec<TypeId> = heritage
            .type_args
            .as_deref()
            .map(|a| a.params.iter().map(|p| self.lower_type(p, scope)).collect())
            .unwrap_or_default();
        match self.resolve_expr_entity(&heritage.expr, scope, Space::Type) {
            Some(sym) => self.type_reference(sym, args),
            None => {
                let text = self.source_text(scope.file, &*heritage.expr);
                self.unresolved(text, args)
            }
        }
    }

    fn class_decl(&self, sym: SymbolId) -> Option<(FileId, &'p swc_ast::Class)> {
        self.symbol(sym).decls.iter().find_map(|d| match d.node {
            DeclNode::Class(class) => Some((d.file, class)),
            _ => None,
        })
    }

    fn class_scope(&mut self, sym: SymbolId, file: FileId, class: &'p swc_ast::Class) -> TypeScope {
        let params = self.symbol_type_parameters(sym);
        let this = self.declared_type(sym);
        let names = class
            .type_params
            .as_deref()
            .map(|p| p.params.iter().map(|p| p.name.sym.to_string()).collect())
            .unwrap_or_else(Vec::new);
        TypeScope::new(file, self.symbol(sym).parent)
            .with_params(names.into_iter().zip(params))
            .with_this(this)
    }

    /// Instance members of a class, own members first
    ///
    /// `private` members are kept; `#name` members are not.
    pub(crate) fn class_structure(&mut self, sym: SymbolId) -> ObjectShape {
        let Some((file, class)) = self.class_decl(sym) else {
            return ObjectShape::default();
        };
        let scope = self.class_scope(sym, file, class);
        let env = InferEnv::new(scope.clone());

        let mut shape = ObjectShape::default();
        for member in &class.body {
            let doc = self.doc_at(file, member.span_lo());
            match member {
                swc_ast::ClassMember::ClassProp(prop) if !prop.is_static => {
                    let Some(name) = prop_name_str(&prop.key) else {
                        continue;
                    };
                    let ty = match (prop.type_ann.as_deref(), prop.value.as_deref()) {
                        (Some(ann), _) => self.lower_type(&ann.type_ann, &scope),
                        (None, Some(value)) => {
                            let ty = self.infer_expr(value, &env);
                            self.arena.widen(ty)
                        }
                        (None, None) => self.any(),
                    };
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: prop.is_optional,
                        readonly: prop.readonly,
                        documentation: doc.text(),
                    });
                }
                swc_ast::ClassMember::Method(method) if !method.is_static => {
                    let Some(name) = prop_name_str(&method.key) else {
                        continue;
                    };
                    if shape.property(&name).is_some() {
                        continue;
                    }
                    let signature = self.function_signature(&method.function, &env, &doc);
                    let (ty, readonly) = match method.kind {
                        swc_ast::MethodKind::Method => (
                            self.arena.object(ObjectShape {
                                call: vec![signature],
                                ..Default::default()
                            }),
                            false,
                        ),
                        swc_ast::MethodKind::Getter => (signature.ret, false),
                        swc_ast::MethodKind::Setter => (
                            signature
                                .params
                                .first()
                                .map(|p| p.ty)
                                .unwrap_or_else(|| self.any()),
                            false,
                        ),
                    };
                    shape.add_property(Property {
                        name,
                        ty,
                        optional: method.is_optional,
                        readonly,
                        documentation: doc.text(),
                    });
                }
                swc_ast::ClassMember::Constructor(ctor) => {
                    for param in &ctor.params {
                        let swc_ast::ParamOrTsParamProp::TsParamProp(prop) = param else {
                            continue;
                        };
                        if let Some(lowered) = self.param_prop(prop, &env, &doc) {
                            shape.add_property(Property {
                                name: lowered.name,
                                ty: lowered.ty,
                                optional: lowered.optional && lowered.default_value.is_none(),
                                readonly: prop.readonly,
                                documentation: lowered.documentation,
                            });
                        }
                    }
                }
                swc_ast::ClassMember::TsIndexSignature(index) if !index.is_static => {
                    if let Some((key, info)) = self.lower_index_signature(index, &scope) {
                        match key {
                            Intrinsic::Number => shape.number_index = Some(info),
                            _ => shape.string_index = Some(info),
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(base) = self.class_base_instance(class, &scope) {
            let base_shape = self.shape(base);
            for property in &base_shape.properties {
                shape.add_property(property.clone());
            }
            if shape.string_index.is_none() {
                shape.string_index = base_shape.string_index.clone();
            }
        }
        shape
    }

    fn param_prop(
        &mut self,
        prop: &'p swc_ast::TsParamProp,
        env: &InferEnv,
        doc: &DocComment,
    ) -> Option<Parameter> {
        match &prop.param {
            swc_ast::TsParamPropParam::Ident(binding) => {
                self.binding_param(binding, None, &env.scope, doc)
            }
            swc_ast::TsParamPropParam::Assign(assign) => {
                let swc_ast::Pat::Ident(binding) = &*assign.left else {
                    return None;
                };
                let default_type = self.infer_expr(&assign.right, env);
                let default_type = self.arena.widen(default_type);
                let mut param = self.binding_param(binding, Some(default_type), &env.scope, doc)?;
                param.optional = true;
                param.default_value = Some(self.source_text(env.scope.file, &*assign.right));
                Some(param)
            }
        }
    }

    /// Instance type of the class a class extends
    fn class_base_instance(
        &mut self,
        class: &'p swc_ast::Class,
        scope: &TypeScope,
    ) -> Option<TypeId> {
        let expr = class.super_class.as_deref()?;
        let args: Vec<TypeId> = class
            .super_type_params
            .as_deref()
            .map(|a| a.params.iter().map(|p| self.lower_type(p, scope)).collect())
            .unwrap_or_default();
        let sym = self.resolve_expr_entity(expr, scope, Space::Value)?;
        let target = self.bindings.resolve_alias(sym, Space::Value)?;
        if self.symbol(target).kind == SymbolKind::Class {
            return Some(self.type_reference(target, args));
        }
        let constructor = self.type_of_symbol(target);
        let signature = self.construct_signatures(constructor).into_iter().next()?;
        let map: TypeMap = signature
            .type_params
            .iter()
            .copied()
            .zip(args)
            .collect();
        Some(self.instantiate(signature.ret, &map))
    }

    /// Construct signatures of a class, inherited from its base if it has
    /// no constructor of its own
    pub(crate) fn class_construct_signatures(&mut self, sym: SymbolId) -> Vec<Signature> {
        let Some((file, class)) = self.class_decl(sym) else {
            return Vec::new();
        };
        let scope = self.class_scope(sym, file, class);
        let env = InferEnv::new(scope.clone());
        let params = self.symbol_type_parameters(sym);
        let this = self.declared_type(sym);

        let ctors: Vec<&'p swc_ast::Constructor> = class
            .body
            .iter()
            .filter_map(|m| match m {
                swc_ast::ClassMember::Constructor(c) => Some(c),
                _ => None,
            })
            .collect();
        let has_body = ctors.iter().any(|c| c.body.is_some());
        let has_overloads = ctors.iter().any(|c| c.body.is_none());

        let own: Vec<Signature> = ctors
            .into_iter()
            .filter(|c| !(has_body && has_overloads) || c.body.is_none())
            .map(|ctor| {
                let doc = self.doc_at(file, ctor.span.lo);
                let parameters = ctor
                    .params
                    .iter()
                    .enumerate()
                    .filter_map(|(i, param)| match param {
                        swc_ast::ParamOrTsParamProp::Param(p) => {
                            self.lower_pat_param(&p.pat, i, &env, &doc)
                        }
                        swc_ast::ParamOrTsParamProp::TsParamProp(prop) => {
                            self.param_prop(prop, &env, &doc)
                        }
                    })
                    .collect();
                Signature {
                    type_params: params.clone(),
                    params: parameters,
                    ret: this,
                    documentation: doc.text(),
                }
            })
            .collect();
        if !own.is_empty() {
            return own;
        }

        if let Some(inherited) = self.inherited_construct_signatures(class, &scope) {
            return inherited
                .into_iter()
                .map(|signature| Signature {
                    type_params: params.clone(),
                    ret: this,
                    ..signature
                })
                .collect();
        }

        vec![Signature {
            type_params: params,
            params: Vec::new(),
            ret: this,
            documentation: String::new(),
        }]
    }

    fn inherited_construct_signatures(
        &mut self,
        class: &'p swc_ast::Class,
        scope: &TypeScope,
    ) -> Option<Vec<Signature>> {
        let expr = class.super_class.as_deref()?;
        let args: Vec<TypeId> = class
            .super_type_params
            .as_deref()
            .map(|a| a.params.iter().map(|p| self.lower_type(p, scope)).collect())
            .unwrap_or_default();
        let sym = self.resolve_expr_entity(expr, scope, Space::Value)?;
        let constructor = self.type_of_symbol(sym);
        let signatures = self.construct_signatures(constructor);
        if signatures.is_empty() {
            return None;
        }
        Some(
            signatures
                .iter()
                .map(|signature| {
                    let args = self.fill_type_args(&signature.type_params, args.clone());
                    let map: TypeMap = signature
                        .type_params
                        .iter()
                        .copied()
                        .zip(args)
                        .collect();
                    self.instantiate_signature(signature, &map)
                })
                .collect(),
        )
    }
}

/// Dotted text of an entity name
fn entity_text(entity: &swc_ast::TsEntityName) -> String {
    match entity {
        swc_ast::TsEntityName::Ident(ident) => ident.sym.to_string(),
        swc_ast::TsEntityName::TsQualifiedName(qualified) => {
            format!("{}.{}", entity_text(&qualified.left), qualified.right.sym)
        }
    }
}
