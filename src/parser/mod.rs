//! A hand-rolled recursive-descent parser over a tiny expression-and-function
//! subset of the source language: integer/bool literals, identifiers, binary
//! `+ - * / == < >`, `if`/`else`, `let`, `fn`, `struct`, `return`.
//!
//! No parser-combinator or grammar-generator dependency, matching the
//! teacher's own hand-rolled tokenizer/parser split. This exists to feed
//! real ASTs to the rest of the pipeline from the CLI and integration
//! tests — it is not part of the core's property suite.

mod lexer;

use crate::hir::{
    BinOp, BlockExpr, EnumItem, Expr, ExprKind, FunctionItem, HirNodeIdGen, Item, ItemKind,
    LetStmt, Module, Pattern, PatternKind, Stmt, StmtKind, StructField, StructItem, TypeExpr,
    TypeExprKind,
};
use crate::span::{FileId, Span};
use lexer::{lex, Token, TokenSpan};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{message} at byte {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: u32,
}

pub struct Parser {
    tokens: Vec<TokenSpan>,
    pos: usize,
    file: FileId,
    ids: HirNodeIdGen,
}

impl Parser {
    pub fn new(source: &str, file: FileId) -> Self {
        Self {
            tokens: lex(source, file),
            pos: 0,
            file,
            ids: HirNodeIdGen::new(),
        }
    }

    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut items = Vec::new();
        while !self.at_eof() {
            items.push(self.parse_item()?);
        }
        Ok(Module { items })
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> TokenSpan {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            offset: self.peek_span().start,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<TokenSpan, ParseError> {
        if self.peek() == expected {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {expected:?}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek().clone() {
            Token::Ident(name) => {
                let tok = self.bump();
                Ok((name, tok.span))
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.peek() {
            Token::Fn => self.parse_function_item(),
            Token::Struct => self.parse_struct_item(),
            Token::Enum => self.parse_enum_item(),
            other => Err(self.error(format!("expected item, found {other:?}"))),
        }
    }

    fn parse_function_item(&mut self) -> Result<Item, ParseError> {
        let start = self.expect(&Token::Fn)?.span;
        let (name, _) = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while self.peek() != &Token::RParen {
            let (param_name, param_span) = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            let ty = self.parse_type_expr()?;
            let pattern = Pattern {
                id: self.ids.next(),
                span: param_span,
                kind: PatternKind::Identifier(param_name),
            };
            params.push((pattern, ty));
            if self.peek() == &Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        let return_type = if self.peek() == &Token::Arrow {
            self.bump();
            self.parse_type_expr()?
        } else {
            TypeExpr {
                id: self.ids.next(),
                span: Span::dummy(),
                kind: TypeExprKind::Unit,
            }
        };
        let body = self.parse_block()?;
        let end = body.span;
        Ok(Item {
            id: self.ids.next(),
            span: start.merge(end),
            kind: ItemKind::Function(FunctionItem {
                name,
                params,
                return_type: Box::new(return_type),
                body: Box::new(body),
            }),
        })
    }

    fn parse_struct_item(&mut self) -> Result<Item, ParseError> {
        let start = self.expect(&Token::Struct)?.span;
        let (name, _) = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while self.peek() != &Token::RBrace {
            let (field_name, _) = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            let ty = self.parse_type_expr()?;
            fields.push(StructField {
                name: field_name,
                ty,
            });
            if self.peek() == &Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.expect(&Token::RBrace)?.span;
        Ok(Item {
            id: self.ids.next(),
            span: start.merge(end),
            kind: ItemKind::Struct(StructItem { name, fields }),
        })
    }

    fn parse_enum_item(&mut self) -> Result<Item, ParseError> {
        let start = self.expect(&Token::Enum)?.span;
        let (name, _) = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        let mut variants = Vec::new();
        while self.peek() != &Token::RBrace {
            let (variant_name, _) = self.expect_ident()?;
            variants.push(variant_name);
            if self.peek() == &Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        let end = self.expect(&Token::RBrace)?.span;
        Ok(Item {
            id: self.ids.next(),
            span: start.merge(end),
            kind: ItemKind::Enum(EnumItem { name, variants }),
        })
    }

    fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        let span = self.peek_span();
        match self.peek().clone() {
            Token::Underscore => {
                self.bump();
                Ok(TypeExpr {
                    id: self.ids.next(),
                    span,
                    kind: TypeExprKind::Underscore,
                })
            }
            Token::Ident(name) => {
                self.bump();
                Ok(TypeExpr {
                    id: self.ids.next(),
                    span,
                    kind: TypeExprKind::Named(name),
                })
            }
            other => Err(self.error(format!("expected type, found {other:?}"))),
        }
    }

    fn parse_block(&mut self) -> Result<BlockExpr, ParseError> {
        let start = self.expect(&Token::LBrace)?.span;
        let mut stmts = Vec::new();
        let mut trailing_expr = None;
        while self.peek() != &Token::RBrace {
            if self.peek() == &Token::Let {
                stmts.push(self.parse_let_stmt()?);
                continue;
            }
            if self.peek() == &Token::Return {
                stmts.push(self.parse_return_stmt()?);
                continue;
            }
            let expr = self.parse_expr()?;
            if self.peek() == &Token::Semi {
                self.bump();
                stmts.push(Stmt {
                    id: self.ids.next(),
                    span: expr.span,
                    kind: StmtKind::Expr(Box::new(expr)),
                });
            } else {
                trailing_expr = Some(Box::new(expr));
                break;
            }
        }
        let end = self.expect(&Token::RBrace)?.span;
        Ok(BlockExpr {
            id: self.ids.next(),
            span: start.merge(end),
            stmts,
            trailing_expr,
        })
    }

    fn parse_let_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(&Token::Let)?.span;
        let (name, name_span) = self.expect_ident()?;
        let type_annotation = if self.peek() == &Token::Colon {
            self.bump();
            Some(Box::new(self.parse_type_expr()?))
        } else {
            None
        };
        let initializer = if self.peek() == &Token::Eq {
            self.bump();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let end = self.expect(&Token::Semi)?.span;
        Ok(Stmt {
            id: self.ids.next(),
            span: start.merge(end),
            kind: StmtKind::Let(LetStmt {
                pattern: Box::new(Pattern {
                    id: self.ids.next(),
                    span: name_span,
                    kind: PatternKind::Identifier(name),
                }),
                type_annotation,
                initializer,
            }),
        })
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(&Token::Return)?.span;
        let value = if self.peek() == &Token::Semi {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let end = self.expect(&Token::Semi)?.span;
        Ok(Stmt {
            id: self.ids.next(),
            span: start.merge(end),
            kind: StmtKind::Expr(Box::new(Expr {
                id: self.ids.next(),
                span: start.merge(end),
                kind: ExprKind::Return(value),
            })),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinOp::Eq,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                _ => break,
            };
            self.bump();
            let right = self.parse_additive()?;
            let span = left.span.merge(right.span);
            left = Expr {
                id: self.ids.next(),
                span,
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.parse_multiplicative()?;
            let span = left.span.merge(right.span);
            left = Expr {
                id: self.ids.next(),
                span,
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_call()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.bump();
            let right = self.parse_call()?;
            let span = left.span.merge(right.span);
            left = Expr {
                id: self.ids.next(),
                span,
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.peek() == &Token::LParen {
            self.bump();
            let mut args = Vec::new();
            while self.peek() != &Token::RParen {
                args.push(self.parse_expr()?);
                if self.peek() == &Token::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
            let end = self.expect(&Token::RParen)?.span;
            let span = expr.span.merge(end);
            expr = Expr {
                id: self.ids.next(),
                span,
                kind: ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        match self.peek().clone() {
            Token::Int(value) => {
                self.bump();
                Ok(Expr {
                    id: self.ids.next(),
                    span,
                    kind: ExprKind::IntLiteral(value),
                })
            }
            Token::True => {
                self.bump();
                Ok(Expr {
                    id: self.ids.next(),
                    span,
                    kind: ExprKind::BoolLiteral(true),
                })
            }
            Token::False => {
                self.bump();
                Ok(Expr {
                    id: self.ids.next(),
                    span,
                    kind: ExprKind::BoolLiteral(false),
                })
            }
            Token::Ident(name) => {
                self.bump();
                Ok(Expr {
                    id: self.ids.next(),
                    span,
                    kind: ExprKind::Identifier(name),
                })
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::If => self.parse_if_expr(),
            other => Err(self.error(format!("expected expression, found {other:?}"))),
        }
    }

    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&Token::If)?.span;
        let condition = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let (else_branch, end) = if self.peek() == &Token::Else {
            self.bump();
            if self.peek() == &Token::If {
                let nested = self.parse_if_expr()?;
                let end = nested.span;
                (Some(Box::new(nested)), end)
            } else {
                let block = self.parse_block()?;
                let end = block.span;
                (
                    Some(Box::new(Expr {
                        id: self.ids.next(),
                        span: end,
                        kind: ExprKind::Block(Box::new(block)),
                    })),
                    end,
                )
            }
        } else {
            let end = then_branch.span;
            (None, end)
        };
        Ok(Expr {
            id: self.ids.next(),
            span: start.merge(end),
            kind: ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
        })
    }
}

/// Parses one file's worth of source text into a [`Module`].
pub fn parse_str(source: &str, file: FileId) -> Result<Module, ParseError> {
    Parser::new(source, file).parse_module()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_function() {
        let module = parse_str("fn add(lhs: i32, rhs: i32) -> i32 { lhs + rhs }", FileId(0)).unwrap();
        assert_eq!(module.items.len(), 1);
        match &module.items[0].kind {
            ItemKind::Function(f) => {
                assert_eq!(f.name, "add");
                assert_eq!(f.params.len(), 2);
                assert!(f.body.trailing_expr.is_some());
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_let_and_return_statements() {
        let module = parse_str(
            "fn f() -> i32 { let x: i32 = 1; return x; }",
            FileId(0),
        )
        .unwrap();
        match &module.items[0].kind {
            ItemKind::Function(f) => {
                assert_eq!(f.body.stmts.len(), 2);
                assert!(matches!(f.body.stmts[0].kind, StmtKind::Let(_)));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_struct_with_fields() {
        let module = parse_str("struct Point { x: i32, y: i32 }", FileId(0)).unwrap();
        match &module.items[0].kind {
            ItemKind::Struct(s) => {
                assert_eq!(s.name, "Point");
                assert_eq!(s.fields.len(), 2);
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn binary_operator_precedence_groups_multiplicative_tighter() {
        let module = parse_str("fn f() -> i32 { 1 + 2 * 3 }", FileId(0)).unwrap();
        let ItemKind::Function(f) = &module.items[0].kind else {
            panic!("expected function");
        };
        let trailing = f.body.trailing_expr.as_ref().unwrap();
        match &trailing.kind {
            ExprKind::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected top-level Add, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_else_as_expression() {
        let module = parse_str(
            "fn f() -> i32 { if x { 1 } else { 2 } }",
            FileId(0),
        )
        .unwrap();
        let ItemKind::Function(f) = &module.items[0].kind else {
            panic!("expected function");
        };
        let trailing = f.body.trailing_expr.as_ref().unwrap();
        assert!(matches!(trailing.kind, ExprKind::If { .. }));
    }

    #[test]
    fn rejects_malformed_input() {
        let err = parse_str("fn (", FileId(0)).unwrap_err();
        assert!(err.message.contains("identifier"));
    }
}
