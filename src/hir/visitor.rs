//! A generic recursive traversal over the HIR, parametric in a result type.
//!
//! This replaces the original's CRTP visitor (a base class template taking
//! the concrete visitor as its own type parameter) with an ordinary Rust
//! trait: default methods walk each node's children in the same order the
//! original chose, and an override short-circuits that walk for exactly the
//! node kinds it cares about. `R` accumulates rather than short-circuits —
//! passes that can fail collect a `Vec` of problems instead of bailing out of
//! the traversal, which is why every `R` must implement `Default` (the
//! "nothing found here" value for a leaf the override doesn't touch) and
//! `Extend<R>` isn't required: composing sub-results is each method's own job.

use super::*;

/// Visits a HIR tree, producing one `R` per call. Override the methods for
/// the node kinds a pass cares about; everything else falls through to the
/// default traversal, which visits every child in source order and discards
/// their results (callers that need to combine child results override the
/// parent method directly instead of relying on the default).
pub trait AstVisitor<R = ()>
where
    R: Default,
{
    fn visit_module(&mut self, module: &Module) -> R {
        for item in &module.items {
            self.visit_item(item);
        }
        R::default()
    }

    fn visit_item(&mut self, item: &Item) -> R {
        match &item.kind {
            ItemKind::Function(f) => self.visit_function_item(item, f),
            ItemKind::Struct(s) => self.visit_struct_item(item, s),
            ItemKind::Enum(e) => self.visit_enum_item(item, e),
            ItemKind::Const(c) => self.visit_const_item(item, c),
            ItemKind::Trait(t) => self.visit_trait_item(item, t),
            ItemKind::TraitImpl(i) => self.visit_trait_impl_item(item, i),
            ItemKind::InherentImpl(i) => self.visit_inherent_impl_item(item, i),
        }
    }

    /// Order: each parameter's pattern then its type annotation, left to
    /// right, then the return type, then the body.
    fn visit_function_item(&mut self, _item: &Item, f: &FunctionItem) -> R {
        for (pattern, ty) in &f.params {
            self.visit_pattern(pattern);
            self.visit_type_expr(ty);
        }
        self.visit_type_expr(&f.return_type);
        self.visit_block_expr(&f.body);
        R::default()
    }

    fn visit_struct_item(&mut self, _item: &Item, s: &StructItem) -> R {
        for field in &s.fields {
            self.visit_type_expr(&field.ty);
        }
        R::default()
    }

    fn visit_enum_item(&mut self, _item: &Item, _e: &EnumItem) -> R {
        R::default()
    }

    fn visit_const_item(&mut self, _item: &Item, c: &ConstItem) -> R {
        self.visit_type_expr(&c.ty);
        self.visit_expr(&c.value);
        R::default()
    }

    fn visit_trait_item(&mut self, _item: &Item, t: &TraitItem) -> R {
        for inner in &t.items {
            self.visit_item(inner);
        }
        R::default()
    }

    fn visit_trait_impl_item(&mut self, _item: &Item, i: &ImplItem) -> R {
        self.visit_type_expr(&i.for_type);
        for inner in &i.items {
            self.visit_item(inner);
        }
        R::default()
    }

    fn visit_inherent_impl_item(&mut self, _item: &Item, i: &ImplItem) -> R {
        self.visit_type_expr(&i.for_type);
        for inner in &i.items {
            self.visit_item(inner);
        }
        R::default()
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> R {
        match &stmt.kind {
            StmtKind::Let(let_stmt) => self.visit_let_stmt(stmt, let_stmt),
            StmtKind::Expr(expr) => self.visit_expr(expr),
            StmtKind::Item(item) => self.visit_item(item),
            StmtKind::Empty => R::default(),
        }
    }

    /// Order: pattern, then the type annotation if present, then the
    /// initializer if present.
    fn visit_let_stmt(&mut self, _stmt: &Stmt, let_stmt: &LetStmt) -> R {
        self.visit_pattern(&let_stmt.pattern);
        if let Some(ty) = &let_stmt.type_annotation {
            self.visit_type_expr(ty);
        }
        if let Some(init) = &let_stmt.initializer {
            self.visit_expr(init);
        }
        R::default()
    }

    fn visit_block_expr(&mut self, block: &BlockExpr) -> R {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        if let Some(trailing) = &block.trailing_expr {
            self.visit_expr(trailing);
        }
        R::default()
    }

    fn visit_expr(&mut self, expr: &Expr) -> R {
        match &expr.kind {
            ExprKind::IntLiteral(_) => self.visit_int_literal(expr),
            ExprKind::BoolLiteral(_) => self.visit_bool_literal(expr),
            ExprKind::StringLiteral(_) => self.visit_string_literal(expr),
            ExprKind::Identifier(_) => self.visit_identifier_expr(expr),
            ExprKind::Binary { left, right, .. } => self.visit_binary_expr(expr, left, right),
            ExprKind::Assign { left, right } => self.visit_assign_expr(expr, left, right),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.visit_if_expr(expr, condition, then_branch, else_branch.as_deref()),
            ExprKind::While { condition, body } => self.visit_while_expr(expr, condition, body),
            ExprKind::Call { callee, args } => self.visit_call_expr(expr, callee, args),
            ExprKind::ArrayInit(elements) => self.visit_array_init_expr(expr, elements),
            ExprKind::ArrayRepeat { value, count } => {
                self.visit_array_repeat_expr(expr, value, count)
            }
            ExprKind::Block(block) => self.visit_block_expr(block),
            ExprKind::Return(value) => self.visit_return_expr(expr, value.as_deref()),
        }
    }

    fn visit_int_literal(&mut self, _expr: &Expr) -> R {
        R::default()
    }

    fn visit_bool_literal(&mut self, _expr: &Expr) -> R {
        R::default()
    }

    fn visit_string_literal(&mut self, _expr: &Expr) -> R {
        R::default()
    }

    fn visit_identifier_expr(&mut self, _expr: &Expr) -> R {
        R::default()
    }

    /// Order: left operand, then right.
    fn visit_binary_expr(&mut self, _expr: &Expr, left: &Expr, right: &Expr) -> R {
        self.visit_expr(left);
        self.visit_expr(right);
        R::default()
    }

    fn visit_assign_expr(&mut self, _expr: &Expr, left: &Expr, right: &Expr) -> R {
        self.visit_expr(left);
        self.visit_expr(right);
        R::default()
    }

    /// Order: condition, then-branch, else-branch (if present).
    fn visit_if_expr(
        &mut self,
        _expr: &Expr,
        condition: &Expr,
        then_branch: &BlockExpr,
        else_branch: Option<&Expr>,
    ) -> R {
        self.visit_expr(condition);
        self.visit_block_expr(then_branch);
        if let Some(else_branch) = else_branch {
            self.visit_expr(else_branch);
        }
        R::default()
    }

    fn visit_while_expr(&mut self, _expr: &Expr, condition: &Expr, body: &BlockExpr) -> R {
        self.visit_expr(condition);
        self.visit_block_expr(body);
        R::default()
    }

    /// Order: callee, then arguments left to right.
    fn visit_call_expr(&mut self, _expr: &Expr, callee: &Expr, args: &[Expr]) -> R {
        self.visit_expr(callee);
        for arg in args {
            self.visit_expr(arg);
        }
        R::default()
    }

    fn visit_array_init_expr(&mut self, _expr: &Expr, elements: &[Expr]) -> R {
        for element in elements {
            self.visit_expr(element);
        }
        R::default()
    }

    fn visit_array_repeat_expr(&mut self, _expr: &Expr, value: &Expr, count: &Expr) -> R {
        self.visit_expr(value);
        self.visit_expr(count);
        R::default()
    }

    fn visit_return_expr(&mut self, _expr: &Expr, value: Option<&Expr>) -> R {
        if let Some(value) = value {
            self.visit_expr(value);
        }
        R::default()
    }

    fn visit_pattern(&mut self, _pattern: &Pattern) -> R {
        R::default()
    }

    fn visit_type_expr(&mut self, type_expr: &TypeExpr) -> R {
        match &type_expr.kind {
            TypeExprKind::Reference { inner, .. } => self.visit_type_expr(inner),
            TypeExprKind::Array { element, .. } => self.visit_type_expr(element),
            TypeExprKind::Named(_) | TypeExprKind::Unit | TypeExprKind::Underscore => {
                R::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    struct CountIdents {
        count: usize,
    }

    impl AstVisitor<()> for CountIdents {
        fn visit_identifier_expr(&mut self, _expr: &Expr) {
            self.count += 1;
        }
    }

    fn ident(id: u32, name: &str) -> Expr {
        Expr {
            id: HirNodeId(id),
            span: Span::dummy(),
            kind: ExprKind::Identifier(name.to_string()),
        }
    }

    #[test]
    fn default_traversal_visits_both_binary_operands() {
        let mut counter = CountIdents { count: 0 };
        let expr = Expr {
            id: HirNodeId(2),
            span: Span::dummy(),
            kind: ExprKind::Binary {
                op: BinOp::Add,
                left: Box::new(ident(0, "a")),
                right: Box::new(ident(1, "b")),
            },
        };
        counter.visit_expr(&expr);
        assert_eq!(counter.count, 2);
    }

    #[test]
    fn if_expr_skips_absent_else_branch() {
        let mut counter = CountIdents { count: 0 };
        let expr = Expr {
            id: HirNodeId(3),
            span: Span::dummy(),
            kind: ExprKind::If {
                condition: Box::new(ident(0, "cond")),
                then_branch: Box::new(BlockExpr {
                    id: HirNodeId(4),
                    span: Span::dummy(),
                    stmts: vec![],
                    trailing_expr: Some(Box::new(ident(1, "x"))),
                }),
                else_branch: None,
            },
        };
        counter.visit_expr(&expr);
        assert_eq!(counter.count, 2);
    }

    #[test]
    fn call_expr_visits_callee_then_args_in_order() {
        struct Collector {
            names: Vec<String>,
        }
        impl AstVisitor<()> for Collector {
            fn visit_identifier_expr(&mut self, expr: &Expr) {
                if let ExprKind::Identifier(name) = &expr.kind {
                    self.names.push(name.clone());
                }
            }
        }
        let mut collector = Collector { names: vec![] };
        let expr = Expr {
            id: HirNodeId(5),
            span: Span::dummy(),
            kind: ExprKind::Call {
                callee: Box::new(ident(0, "f")),
                args: vec![ident(1, "a"), ident(2, "b")],
            },
        };
        collector.visit_expr(&expr);
        assert_eq!(collector.names, vec!["f", "a", "b"]);
    }
}
