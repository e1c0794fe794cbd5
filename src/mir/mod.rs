//! Mid-level IR: a formatting container, not a semantic IR.
//!
//! `Program`/`Function`/`Block` hold already-rendered line strings rather
//! than structured instructions — lowering from HIR is a trivial
//! textualization, and the hard well-formedness invariants (terminator
//! discipline, SSA freshness, block structure) live entirely in
//! [`crate::emit`], which a real compile pipeline drives straight from HIR.
//! This layer exists so `--emit mir` has something legible to print.

use crate::hir::{BinOp, EnumItem, Expr, ExprKind, FunctionItem, Item, ItemKind, Module, Stmt, StmtKind, StructItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub label_line: String,
    pub stmt_lines: Vec<String>,
}

impl Block {
    pub fn render(&self) -> String {
        let mut out = format!("{}:\n", self.label_line);
        for line in &self.stmt_lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub header_line: String,
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn render(&self) -> String {
        let mut out = format!("{} {{\n", self.header_line);
        for block in &self.blocks {
            out.push_str(&block.render());
        }
        out.push_str("}\n");
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub independent_lines: Vec<String>,
    pub functions: Vec<Function>,
}

impl Program {
    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if !self.independent_lines.is_empty() {
            sections.push(self.independent_lines.join("\n"));
        }
        for function in &self.functions {
            sections.push(function.render());
        }
        sections.join("\n")
    }
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Eq => "==",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
    }
}

fn render_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::IntLiteral(v) => v.to_string(),
        ExprKind::BoolLiteral(v) => v.to_string(),
        ExprKind::StringLiteral(s) => format!("{s:?}"),
        ExprKind::Identifier(name) => name.clone(),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", render_expr(left), binop_symbol(*op), render_expr(right))
        }
        ExprKind::Assign { left, right } => {
            format!("{} = {}", render_expr(left), render_expr(right))
        }
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut s = format!("if {} {{ ... }}", render_expr(condition));
            let _ = &then_branch.stmts;
            if else_branch.is_some() {
                s.push_str(" else { ... }");
            }
            s
        }
        ExprKind::While { condition, .. } => format!("while {} {{ ... }}", render_expr(condition)),
        ExprKind::Call { callee, args } => {
            let rendered_args: Vec<String> = args.iter().map(render_expr).collect();
            format!("{}({})", render_expr(callee), rendered_args.join(", "))
        }
        ExprKind::ArrayInit(elements) => {
            let rendered: Vec<String> = elements.iter().map(render_expr).collect();
            format!("[{}]", rendered.join(", "))
        }
        ExprKind::ArrayRepeat { value, count } => {
            format!("[{}; {}]", render_expr(value), render_expr(count))
        }
        ExprKind::Block(_) => "{ ... }".to_string(),
        ExprKind::Return(value) => match value {
            Some(v) => format!("return {};", render_expr(v)),
            None => "return;".to_string(),
        },
    }
}

fn render_stmt(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Let(let_stmt) => {
            let init = let_stmt
                .initializer
                .as_ref()
                .map(|e| format!(" = {}", render_expr(e)))
                .unwrap_or_default();
            format!("let _{init};")
        }
        StmtKind::Expr(expr) => format!("{};", render_expr(expr)),
        StmtKind::Item(_) => "<nested item>".to_string(),
        StmtKind::Empty => ";".to_string(),
    }
}

fn lower_function(f: &FunctionItem) -> Function {
    let params: Vec<String> = f
        .params
        .iter()
        .enumerate()
        .map(|(i, _)| format!("p{i}"))
        .collect();
    let header_line = format!("fn {}({})", f.name, params.join(", "));

    let mut stmt_lines: Vec<String> = f.body.stmts.iter().map(render_stmt).collect();
    if let Some(trailing) = &f.body.trailing_expr {
        stmt_lines.push(render_expr(trailing));
    }

    Function {
        header_line,
        blocks: vec![Block {
            label_line: "entry".to_string(),
            stmt_lines,
        }],
    }
}

fn render_item_header(item: &Item) -> Option<String> {
    match &item.kind {
        ItemKind::Struct(StructItem { name, fields }) => Some(format!(
            "struct {} {{ {} }}",
            name,
            fields
                .iter()
                .map(|f| f.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        )),
        ItemKind::Enum(EnumItem { name, variants }) => {
            Some(format!("enum {} {{ {} }}", name, variants.join(", ")))
        }
        ItemKind::Const(_) | ItemKind::Trait(_) | ItemKind::TraitImpl(_) | ItemKind::InherentImpl(_) => {
            None
        }
        ItemKind::Function(_) => None,
    }
}

/// Trivially textualizes a module's items into MIR lines: functions get a
/// rendered `Function`, everything else that has a legible one-line shape
/// becomes an independent line.
pub fn lower_module(module: &Module) -> Program {
    let mut program = Program::default();
    for item in &module.items {
        match &item.kind {
            ItemKind::Function(f) => program.functions.push(lower_function(f)),
            _ => {
                if let Some(line) = render_item_header(item) {
                    program.independent_lines.push(line);
                }
            }
        }
    }
    program
}
