//! Types of expressions and of unannotated function returns

use super::types::{Intrinsic, ObjectShape, Property, Signature, TypeData, TypeId};
use super::{Checker, Space, TypeMap, TypeScope};
use crate::js_doc::DocComment;
use crate::utils::swc::{format_number, prop_name_str, str_value};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;

const MAX_INFERENCE_DEPTH: usize = 8;

/// Scope of an expression: where types resolve, plus the locals in reach
#[derive(Debug, Clone)]
pub(crate) struct InferEnv {
    pub scope: TypeScope,
    locals: Vec<(String, TypeId)>,
}

impl InferEnv {
    pub fn new(scope: TypeScope) -> Self {
        Self {
            scope,
            locals: Vec::new(),
        }
    }

    /// Same locals, different type scope
    pub fn with_scope(&self, scope: TypeScope) -> Self {
        Self {
            scope,
            locals: self.locals.clone(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, ty: TypeId) {
        self.locals.push((name.into(), ty));
    }

    pub fn local(&self, name: &str) -> Option<TypeId> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| *ty)
    }
}

impl<'p> Checker<'p> {
    pub(crate) fn infer_expr(&mut self, expr: &'p swc_ast::Expr, env: &InferEnv) -> TypeId {
        use swc_ast::Expr;

        match expr {
            Expr::Lit(literal) => self.literal_type(literal),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
                let text: String = tpl.quasis.iter().map(|q| q.raw.to_string()).collect();
                self.arena.string_literal(text)
            }
            Expr::Tpl(_) => self.intrinsic(Intrinsic::String),
            Expr::Ident(ident) => self.identifier_type(&ident.sym, env),
            Expr::This(_) => env.scope.this_type.unwrap_or_else(|| self.any()),
            Expr::Array(array) => {
                let mut elements = Vec::new();
                for element in array.elems.iter().flatten() {
                    let ty = self.infer_expr(&element.expr, env);
                    let ty = if element.spread.is_some() {
                        self.element_type(ty)
                    } else {
                        ty
                    };
                    elements.push(self.arena.widen(ty));
                }
                let element = if elements.is_empty() {
                    self.any()
                } else {
                    self.arena.union(elements)
                };
                self.array_of(element)
            }
            Expr::Object(object) => self.object_literal_type(object, env),
            Expr::Fn(function) => {
                let signature =
                    self.function_signature(&function.function, env, &DocComment::default());
                self.callable(signature)
            }
            Expr::Arrow(arrow) => {
                let signature = self.arrow_signature(arrow, env, &DocComment::default());
                self.callable(signature)
            }
            Expr::JSXElement(_) | Expr::JSXFragment(_) => {
                self.jsx_element_type().unwrap_or_else(|| self.any())
            }
            Expr::Paren(paren) => self.infer_expr(&paren.expr, env),
            Expr::TsAs(cast) => self.lower_type(&cast.type_ann, &env.scope),
            Expr::TsTypeAssertion(cast) => self.lower_type(&cast.type_ann, &env.scope),
            Expr::TsConstAssertion(cast) => self.infer_expr(&cast.expr, env),
            Expr::TsNonNull(non_null) => self.infer_expr(&non_null.expr, env),
            Expr::TsSatisfies(satisfies) => self.infer_expr(&satisfies.expr, env),
            Expr::TsInstantiation(inst) => self.infer_expr(&inst.expr, env),
            Expr::Await(await_expr) => {
                let ty = self.infer_expr(&await_expr.arg, env);
                self.awaited(ty)
            }
            Expr::Unary(unary) => self.unary_type(unary, env),
            Expr::Update(_) => self.intrinsic(Intrinsic::Number),
            Expr::Bin(binary) => self.binary_type(binary, env),
            Expr::Cond(cond) => {
                let cons = self.infer_expr(&cond.cons, env);
                let alt = self.infer_expr(&cond.alt, env);
                self.arena.union([cons, alt])
            }
            Expr::Assign(assign) => self.infer_expr(&assign.right, env),
            Expr::Seq(seq) => match seq.exprs.last() {
                Some(last) => self.infer_expr(last, env),
                None => self.any(),
            },
            Expr::Member(member) => self.member_type(member, env),
            Expr::Call(call) => match &call.callee {
                swc_ast::Callee::Expr(callee) => {
                    self.call_type(callee, &call.args, call.type_args.as_deref(), env)
                }
                _ => self.any(),
            },
            Expr::New(new) => {
                let constructor = self.infer_expr(&new.callee, env);
                let Some(signature) = self.construct_signatures(constructor).into_iter().next()
                else {
                    return self.any();
                };
                let args = new.args.as_deref().unwrap_or_default();
                self.apply_signature(&signature, args, new.type_args.as_deref(), env)
            }
            Expr::OptChain(chain) => match &*chain.base {
                swc_ast::OptChainBase::Member(member) => self.member_type(member, env),
                swc_ast::OptChainBase::Call(call) => {
                    self.call_type(&call.callee, &call.args, call.type_args.as_deref(), env)
                }
            },
            _ => self.any(),
        }
    }

    fn callable(&mut self, signature: Signature) -> TypeId {
        self.arena.object(ObjectShape {
            call: vec![signature],
            ..Default::default()
        })
    }

    fn literal_type(&mut self, literal: &swc_ast::Lit) -> TypeId {
        match literal {
            swc_ast::Lit::Str(s) => self.arena.string_literal(str_value(s)),
            swc_ast::Lit::Bool(b) => self.arena.boolean_literal(b.value),
            swc_ast::Lit::Null(_) => self.intrinsic(Intrinsic::Null),
            swc_ast::Lit::Num(n) => self.arena.number_literal(format_number(n.value)),
            swc_ast::Lit::BigInt(_) => self.intrinsic(Intrinsic::BigInt),
            swc_ast::Lit::Regex(_) => self.global_type("RegExp"),
            swc_ast::Lit::JSXText(_) => self.intrinsic(Intrinsic::String),
        }
    }

    fn global_type(&mut self, name: &str) -> TypeId {
        match self.bindings.global(Space::Type, name) {
            Some(sym) => self.declared_type(sym),
            None => self.any(),
        }
    }

    fn identifier_type(&mut self, name: &str, env: &InferEnv) -> TypeId {
        if let Some(local) = env.local(name) {
            return local;
        }
        if name == "undefined" {
            return self.intrinsic(Intrinsic::Undefined);
        }
        match self
            .bindings
            .lookup(env.scope.file, env.scope.namespace, Space::Value, name)
        {
            Some(sym) => self.type_of_symbol(sym),
            None => self.any(),
        }
    }

    /// Element type of an array, tuple or array-like
    fn element_type(&mut self, ty: TypeId) -> TypeId {
        match self.arena.data(ty).clone() {
            TypeData::Tuple(elements) => self.arena.union(elements),
            _ => self.number_index_type(ty),
        }
    }

    fn unary_type(&mut self, unary: &'p swc_ast::UnaryExpr, env: &InferEnv) -> TypeId {
        match unary.op {
            swc_ast::UnaryOp::Bang | swc_ast::UnaryOp::Delete => self.arena.boolean(),
            swc_ast::UnaryOp::TypeOf => self.intrinsic(Intrinsic::String),
            swc_ast::UnaryOp::Void => self.intrinsic(Intrinsic::Undefined),
            swc_ast::UnaryOp::Minus => {
                let operand = self.infer_expr(&unary.arg, env);
                match self.arena.data(operand).clone() {
                    TypeData::NumberLiteral(text) => match text.strip_prefix('-') {
                        Some(positive) => self.arena.number_literal(positive),
                        None => self.arena.number_literal(format!("-{}", text)),
                    },
                    _ => self.intrinsic(Intrinsic::Number),
                }
            }
            swc_ast::UnaryOp::Plus | swc_ast::UnaryOp::Tilde => self.intrinsic(Intrinsic::Number),
        }
    }

    fn binary_type(&mut self, binary: &'p swc_ast::BinExpr, env: &InferEnv) -> TypeId {
        use swc_ast::BinaryOp::*;

        match binary.op {
            EqEq | NotEq | EqEqEq | NotEqEq | Lt | LtEq | Gt | GtEq | In | InstanceOf => {
                self.arena.boolean()
            }
            LogicalAnd => self.infer_expr(&binary.right, env),
            LogicalOr | NullishCoalescing => {
                let left = self.infer_expr(&binary.left, env);
                let right = self.infer_expr(&binary.right, env);
                self.arena.union([left, right])
            }
            Add => {
                let left = self.infer_expr(&binary.left, env);
                let left = self.arena.widen(left);
                let right = self.infer_expr(&binary.right, env);
                let right = self.arena.widen(right);
                let string = self.intrinsic(Intrinsic::String);
                let any = self.any();
                if left == string || right == string {
                    string
                } else if left == any || right == any {
                    any
                } else {
                    self.intrinsic(Intrinsic::Number)
                }
            }
            _ => self.intrinsic(Intrinsic::Number),
        }
    }

    fn object_literal_type(&mut self, object: &'p swc_ast::ObjectLit, env: &InferEnv) -> TypeId {
        let mut shape = ObjectShape::default();
        let set = |shape: &mut ObjectShape, property: Property| {
            shape.properties.retain(|p| p.name != property.name);
            shape.properties.push(property);
        };

        for prop in &object.props {
            let prop = match prop {
                swc_ast::PropOrSpread::Spread(spread) => {
                    let spread = self.infer_expr(&spread.expr, env);
                    for property in self.properties(spread) {
                        set(&mut shape, property);
                    }
                    continue;
                }
                swc_ast::PropOrSpread::Prop(prop) => &**prop,
            };
            let doc = self.doc_at(env.scope.file, prop.span_lo());
            let (name, ty) = match prop {
                swc_ast::Prop::Shorthand(ident) => {
                    let ty = self.identifier_type(&ident.sym, env);
                    (ident.sym.to_string(), self.arena.widen(ty))
                }
                swc_ast::Prop::KeyValue(kv) => {
                    let Some(name) = prop_name_str(&kv.key) else {
                        continue;
                    };
                    let ty = self.infer_expr(&kv.value, env);
                    (name, self.arena.widen(ty))
                }
                swc_ast::Prop::Assign(assign) => {
                    let ty = self.infer_expr(&assign.value, env);
                    (assign.key.sym.to_string(), self.arena.widen(ty))
                }
                swc_ast::Prop::Getter(getter) => {
                    let Some(name) = prop_name_str(&getter.key) else {
                        continue;
                    };
                    let ty = match (getter.type_ann.as_deref(), getter.body.as_ref()) {
                        (Some(ann), _) => self.lower_type(&ann.type_ann, &env.scope),
                        (None, Some(body)) => {
                            self.infer_block_return(body, env.clone(), false, false)
                        }
                        (None, None) => self.any(),
                    };
                    (name, ty)
                }
                swc_ast::Prop::Setter(setter) => {
                    let Some(name) = prop_name_str(&setter.key) else {
                        continue;
                    };
                    if shape.property(&name).is_some() {
                        continue;
                    }
                    (name, self.any())
                }
                swc_ast::Prop::Method(method) => {
                    let Some(name) = prop_name_str(&method.key) else {
                        continue;
                    };
                    let signature = self.function_signature(&method.function, env, &doc);
                    (name, self.callable(signature))
                }
            };
            set(
                &mut shape,
                Property {
                    name,
                    ty,
                    optional: false,
                    readonly: false,
                    documentation: doc.text(),
                },
            );
        }
        self.arena.object(shape)
    }

    fn member_type(&mut self, member: &'p swc_ast::MemberExpr, env: &InferEnv) -> TypeId {
        let object = self.infer_expr(&member.obj, env);
        match &member.prop {
            swc_ast::MemberProp::Ident(name) => self.member_of(object, &name.sym),
            swc_ast::MemberProp::Computed(computed) => match &*computed.expr {
                swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) => self.member_of(object, &str_value(s)),
                swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => {
                    match self.arena.data(object).clone() {
                        TypeData::Tuple(elements) => elements
                            .get(n.value as usize)
                            .copied()
                            .unwrap_or_else(|| self.any()),
                        _ => self.number_index_type(object),
                    }
                }
                index => {
                    let index = self.infer_expr(index, env);
                    let index = self.arena.widen(index);
                    if index == self.intrinsic(Intrinsic::Number) {
                        self.element_type(object)
                    } else {
                        self.string_index(object)
                            .map(|i| i.ty)
                            .unwrap_or_else(|| self.any())
                    }
                }
            },
            swc_ast::MemberProp::PrivateName(_) => self.any(),
        }
    }

    fn member_of(&mut self, object: TypeId, name: &str) -> TypeId {
        match self.property(object, name) {
            Some(property) => property.ty,
            None => self
                .string_index(object)
                .map(|i| i.ty)
                .unwrap_or_else(|| self.any()),
        }
    }

    fn call_type(
        &mut self,
        callee: &'p swc_ast::Expr,
        args: &'p [swc_ast::ExprOrSpread],
        type_args: Option<&'p swc_ast::TsTypeParamInstantiation>,
        env: &InferEnv,
    ) -> TypeId {
        let callee = self.infer_expr(callee, env);
        match self.call_signatures(callee).into_iter().next() {
            Some(signature) => self.apply_signature(&signature, args, type_args, env),
            None => self.any(),
        }
    }

    /// Return type of a call, with type arguments inferred from the
    /// arguments where they are not given
    fn apply_signature(
        &mut self,
        signature: &Signature,
        args: &'p [swc_ast::ExprOrSpread],
        type_args: Option<&'p swc_ast::TsTypeParamInstantiation>,
        env: &InferEnv,
    ) -> TypeId {
        if signature.type_params.is_empty() {
            return signature.ret;
        }
        let mut map = TypeMap::new();
        match type_args {
            Some(type_args) => {
                for (param, arg) in signature.type_params.iter().zip(&type_args.params) {
                    let arg = self.lower_type(arg, &env.scope);
                    map.insert(*param, arg);
                }
            }
            None => {
                for (param, arg) in signature.params.iter().zip(args) {
                    let arg = self.infer_expr(&arg.expr, env);
                    self.infer_from(param.ty, arg, &signature.type_params, &mut map, 0);
                }
            }
        }
        let unknown = self.intrinsic(Intrinsic::Unknown);
        for param in &signature.type_params {
            map.entry(*param).or_insert(unknown);
        }
        self.instantiate(signature.ret, &map)
    }

    /// Collect inferences for `params` by matching `source` against `target`
    fn infer_from(
        &mut self,
        target: TypeId,
        source: TypeId,
        params: &[TypeId],
        map: &mut TypeMap,
        depth: usize,
    ) {
        if depth > MAX_INFERENCE_DEPTH {
            return;
        }
        if params.contains(&target) {
            if !map.contains_key(&target) {
                let widened = self.arena.widen(source);
                map.insert(target, widened);
            }
            return;
        }
        match (
            self.arena.data(target).clone(),
            self.arena.data(source).clone(),
        ) {
            (
                TypeData::Reference {
                    symbol: target_symbol,
                    args: target_args,
                },
                TypeData::Reference {
                    symbol: source_symbol,
                    args: source_args,
                },
            ) if target_symbol == source_symbol => {
                for (t, s) in target_args.into_iter().zip(source_args) {
                    self.infer_from(t, s, params, map, depth + 1);
                }
            }
            (TypeData::Union(members), _) => {
                for member in members.into_iter().filter(|m| params.contains(m)) {
                    self.infer_from(member, source, params, map, depth + 1);
                }
            }
            (TypeData::Object(target_shape), _) => {
                if let (Some(t), Some(s)) = (
                    target_shape.call.first(),
                    self.call_signatures(source).into_iter().next(),
                ) {
                    for (tp, sp) in t.params.iter().zip(&s.params) {
                        self.infer_from(tp.ty, sp.ty, params, map, depth + 1);
                    }
                    self.infer_from(t.ret, s.ret, params, map, depth + 1);
                }
                for property in &target_shape.properties {
                    if let Some(source_property) = self.property(source, &property.name) {
                        self.infer_from(property.ty, source_property.ty, params, map, depth + 1);
                    }
                }
            }
            _ => {}
        }
    }

    /// `T` of `Promise<T>`, or the type itself
    pub(crate) fn awaited(&mut self, ty: TypeId) -> TypeId {
        let promise = self.bindings.global(Space::Type, "Promise");
        let mut current = ty;
        for _ in 0..MAX_INFERENCE_DEPTH {
            match self.arena.data(current) {
                TypeData::Reference { symbol, args } if Some(*symbol) == promise => {
                    match args.first() {
                        Some(inner) => current = *inner,
                        None => break,
                    }
                }
                _ => break,
            }
        }
        current
    }

    /// Return type of a function body without an annotation
    pub(crate) fn infer_block_return(
        &mut self,
        body: &'p swc_ast::BlockStmt,
        mut env: InferEnv,
        is_async: bool,
        is_generator: bool,
    ) -> TypeId {
        if is_generator {
            return self.unresolved("Generator", Vec::new());
        }
        let mut returns = Vec::new();
        self.collect_returns(&body.stmts, &mut env, &mut returns);

        let undefined = self.intrinsic(Intrinsic::Undefined);
        let ret = match self.arena.union(returns) {
            ty if ty == undefined || ty == self.intrinsic(Intrinsic::Never) => {
                self.intrinsic(Intrinsic::Void)
            }
            ty => ty,
        };
        if is_async {
            let awaited = self.awaited(ret);
            self.promise_of(awaited)
        } else {
            ret
        }
    }

    fn collect_returns(
        &mut self,
        stmts: &'p [swc_ast::Stmt],
        env: &mut InferEnv,
        out: &mut Vec<TypeId>,
    ) {
        for stmt in stmts {
            self.collect_stmt_returns(stmt, env, out);
        }
    }

    fn collect_stmt_returns(
        &mut self,
        stmt: &'p swc_ast::Stmt,
        env: &mut InferEnv,
        out: &mut Vec<TypeId>,
    ) {
        use swc_ast::Stmt;

        match stmt {
            Stmt::Return(ret) => {
                let ty = match ret.arg.as_deref() {
                    Some(arg) => {
                        let ty = self.infer_expr(arg, env);
                        self.arena.widen(ty)
                    }
                    None => self.intrinsic(Intrinsic::Undefined),
                };
                out.push(ty);
            }
            Stmt::Block(block) => self.collect_returns(&block.stmts, env, out),
            Stmt::If(if_stmt) => {
                self.collect_stmt_returns(&if_stmt.cons, env, out);
                if let Some(alt) = if_stmt.alt.as_deref() {
                    self.collect_stmt_returns(alt, env, out);
                }
            }
            Stmt::For(for_stmt) => self.collect_stmt_returns(&for_stmt.body, env, out),
            Stmt::ForIn(for_in) => self.collect_stmt_returns(&for_in.body, env, out),
            Stmt::ForOf(for_of) => self.collect_stmt_returns(&for_of.body, env, out),
            Stmt::While(while_stmt) => self.collect_stmt_returns(&while_stmt.body, env, out),
            Stmt::DoWhile(do_while) => self.collect_stmt_returns(&do_while.body, env, out),
            Stmt::Labeled(labeled) => self.collect_stmt_returns(&labeled.body, env, out),
            Stmt::Try(try_stmt) => {
                self.collect_returns(&try_stmt.block.stmts, env, out);
                if let Some(handler) = &try_stmt.handler {
                    self.collect_returns(&handler.body.stmts, env, out);
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    self.collect_returns(&finalizer.stmts, env, out);
                }
            }
            Stmt::Switch(switch) => {
                for case in &switch.cases {
                    self.collect_returns(&case.cons, env, out);
                }
            }
            Stmt::Decl(swc_ast::Decl::Var(var)) => self.bind_var_decl(var, env),
            Stmt::Decl(swc_ast::Decl::Fn(function)) => {
                let signature =
                    self.function_signature(&function.function, env, &DocComment::default());
                let ty = self.callable(signature);
                env.bind(function.ident.sym.to_string(), ty);
            }
            _ => {}
        }
    }

    fn bind_var_decl(&mut self, var: &'p swc_ast::VarDecl, env: &mut InferEnv) {
        for declarator in &var.decls {
            let annotation = match &declarator.name {
                swc_ast::Pat::Ident(binding) => binding.type_ann.as_deref(),
                _ => None,
            };
            let ty = match (annotation, declarator.init.as_deref()) {
                (Some(ann), _) => self.lower_type(&ann.type_ann, &env.scope),
                (None, Some(init)) => {
                    let ty = self.infer_expr(init, env);
                    if var.kind == swc_ast::VarDeclKind::Const {
                        ty
                    } else {
                        self.arena.widen(ty)
                    }
                }
                (None, None) => self.any(),
            };
            self.bind_pattern(env, &declarator.name, ty);
        }
    }

    /// Bind the names a pattern introduces, typed from `ty`
    pub(crate) fn bind_pattern(&mut self, env: &mut InferEnv, pat: &swc_ast::Pat, ty: TypeId) {
        match pat {
            swc_ast::Pat::Ident(binding) => env.bind(binding.id.sym.to_string(), ty),
            swc_ast::Pat::Assign(assign) => self.bind_pattern(env, &assign.left, ty),
            swc_ast::Pat::Rest(rest) => self.bind_pattern(env, &rest.arg, ty),
            swc_ast::Pat::Array(array) => {
                let tuple = match self.arena.data(ty) {
                    TypeData::Tuple(elements) => Some(elements.clone()),
                    _ => None,
                };
                for (i, element) in array.elems.iter().enumerate() {
                    let Some(element) = element else {
                        continue;
                    };
                    let element_ty = match &tuple {
                        Some(elements) => elements.get(i).copied().unwrap_or_else(|| self.any()),
                        None => self.element_type(ty),
                    };
                    self.bind_pattern(env, element, element_ty);
                }
            }
            swc_ast::Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        swc_ast::ObjectPatProp::Assign(assign) => {
                            let name = assign.key.id.sym.to_string();
                            let property = self.member_of(ty, &name);
                            env.bind(name, property);
                        }
                        swc_ast::ObjectPatProp::KeyValue(kv) => {
                            let property = match prop_name_str(&kv.key) {
                                Some(name) => self.member_of(ty, &name),
                                None => self.any(),
                            };
                            self.bind_pattern(env, &kv.value, property);
                        }
                        swc_ast::ObjectPatProp::Rest(rest) => {
                            let any = self.any();
                            self.bind_pattern(env, &rest.arg, any);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::checker::{Checker, Program, Space, TypeData, TypeId};
    use crate::utils::parse_typescript_source;

    fn infer(source: &str, name: &str, test: impl FnOnce(&mut Checker, TypeId)) {
        let program = Program::new(vec![
            parse_typescript_source("/virtual/src/a.tsx", source).unwrap()
        ]);
        let file = program.file_by_path("/virtual/src/a.tsx").unwrap();
        let mut checker = Checker::new(&program);
        let sym = checker.lookup(file, Space::Value, name).unwrap();
        let ty = checker.type_of_symbol(sym);
        test(&mut checker, ty);
    }

    fn return_name(checker: &mut Checker, ty: TypeId) -> String {
        let signature = checker.call_signatures(ty).remove(0);
        checker.type_name(signature.ret)
    }

    #[test]
    fn test_object_literal_widens_properties() {
        infer("export const config = { port: 8080, host: 'localhost', debug: true }", "config", |checker, ty| {
            let names: Vec<String> = checker
                .properties(ty)
                .into_iter()
                .map(|p| format!("{}: {}", p.name, checker.type_name(p.ty)))
                .collect();
            assert_eq!(names, vec!["port: number", "host: string", "debug: boolean"]);
        });
    }

    #[test]
    fn test_array_literal_is_array_of_union() {
        infer("export const xs = [1, 'a']", "xs", |checker, ty| {
            assert_eq!(checker.type_name(ty), "Array");
            let TypeData::Reference { args, .. } = checker.data(ty).clone() else {
                panic!("expected a reference");
            };
            assert_eq!(checker.type_name(args[0]), "string | number");
        });
    }

    #[test]
    fn test_return_union_from_branches() {
        let source = "export function pick(flag: boolean) {\n  if (flag) { return 1 }\n  const fallback = 'none'\n  return fallback\n}";
        infer(source, "pick", |checker, ty| {
            assert_eq!(return_name(checker, ty), "string | number");
        });
    }

    #[test]
    fn test_no_return_is_void_and_async_is_promise() {
        infer("export function noop() {}", "noop", |checker, ty| {
            assert_eq!(return_name(checker, ty), "void");
        });
        infer("export async function load() { return 1 }", "load", |checker, ty| {
            assert_eq!(return_name(checker, ty), "Promise");
        });
    }

    #[test]
    fn test_new_expression_uses_construct_signature() {
        let source = "class Point { constructor(public x: number) {} }\nexport const origin = new Point(0)";
        infer(source, "origin", |checker, ty| {
            assert_eq!(checker.type_name(ty), "Point");
        });
    }

    #[test]
    fn test_member_access_on_locals() {
        let source = "const settings = { retries: 3 }\nexport const retries = settings.retries";
        infer(source, "retries", |checker, ty| {
            assert_eq!(checker.type_name(ty), "number");
        });
    }

    #[test]
    fn test_negative_literal() {
        infer("export const LOW = -5", "LOW", |checker, ty| {
            assert_eq!(checker.type_name(ty), "-5");
        });
    }
}
