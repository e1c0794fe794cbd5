//! The AST/HIR data model: sum-typed trees for items, statements, expressions,
//! patterns, and type annotations.
//!
//! The parser (`crate::parser`) builds these nodes directly — there is no
//! separate untyped-AST stage to lower from, since that lowering pass is out
//! of scope for this crate (see SPEC_FULL.md §1). Every node carries a
//! [`HirNodeId`], a dense `u32` minted from the arena counter each node's
//! owning pass runs off of; these ids are what [`crate::types::TypeContext`]
//! back-references point at instead of raw pointers.

pub mod visitor;

use crate::span::Span;

/// Stable identifier for a HIR node. Plain `Copy` integers rather than raw
/// pointers, so back-references from the type context never outlive their
/// target by construction (see DESIGN.md for the tradeoff against the
/// arena-pointer design this was generalized from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HirNodeId(pub u32);

/// Mints fresh, sequential [`HirNodeId`]s for one compilation.
#[derive(Default)]
pub struct HirNodeIdGen(u32);

impl HirNodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> HirNodeId {
        let id = HirNodeId(self.0);
        self.0 += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Gt,
}

// ============================================================
// Type annotations (surface syntax, not yet interned)
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub id: HirNodeId,
    pub span: Span,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExprKind {
    /// A primitive or nominal name as written by the user; resolved to a
    /// `TypeId` by the semantic passes.
    Named(String),
    Reference { inner: Box<TypeExpr>, mutable: bool },
    Array { element: Box<TypeExpr>, length: usize },
    Unit,
    /// `_`, the type-inference placeholder.
    Underscore,
}

// ============================================================
// Patterns
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub id: HirNodeId,
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    Identifier(String),
    Wildcard,
}

// ============================================================
// Expressions
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: HirNodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    Identifier(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<BlockExpr>,
        else_branch: Option<Box<Expr>>,
    },
    While {
        condition: Box<Expr>,
        body: Box<BlockExpr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    ArrayInit(Vec<Expr>),
    ArrayRepeat {
        value: Box<Expr>,
        count: Box<Expr>,
    },
    Block(Box<BlockExpr>),
    Return(Option<Box<Expr>>),
}

// ============================================================
// Blocks and statements
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BlockExpr {
    pub id: HirNodeId,
    pub span: Span,
    pub stmts: Vec<Stmt>,
    pub trailing_expr: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: HirNodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let(LetStmt),
    Expr(Box<Expr>),
    Item(Box<Item>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub pattern: Box<Pattern>,
    pub type_annotation: Option<Box<TypeExpr>>,
    pub initializer: Option<Box<Expr>>,
}

// ============================================================
// Items
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: HirNodeId,
    pub span: Span,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Function(FunctionItem),
    Struct(StructItem),
    Enum(EnumItem),
    Const(ConstItem),
    Trait(TraitItem),
    TraitImpl(ImplItem),
    InherentImpl(ImplItem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionItem {
    pub name: String,
    pub params: Vec<(Pattern, TypeExpr)>,
    pub return_type: Box<TypeExpr>,
    pub body: Box<BlockExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructItem {
    pub name: String,
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub name: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstItem {
    pub ty: Box<TypeExpr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitItem {
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplItem {
    pub for_type: Box<TypeExpr>,
    pub items: Vec<Item>,
}

/// A whole compilation unit: the top-level items the parser produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub items: Vec<Item>,
}
