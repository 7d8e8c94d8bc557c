//! Recursive-descent parser for the guest language.
//!
//! Statement separators (`;`) are optional between statements; a statement
//! also ends naturally where the next token cannot extend the current
//! expression. `if` and `while` require parenthesized conditions and braced
//! bodies.

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::lexer::Token;

/// Maximum statement/expression nesting accepted before parsing fails.
/// Keeps pathologically nested programs from exhausting the host stack.
const MAX_NESTING_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses a whole program.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, String> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            if self.eat(&Token::Semicolon) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<(), String> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(format!(
                "expected {expected:?} {context}, found {:?}",
                self.peek()
            ))
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(format!(
                "nesting exceeds the maximum depth of {MAX_NESTING_DEPTH}"
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_stmt(&mut self) -> Result<Stmt, String> {
        self.enter()?;
        let result = self.parse_stmt_inner();
        self.depth -= 1;
        result
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, String> {
        match self.peek() {
            Some(Token::Let) => {
                self.advance();
                let name = match self.advance() {
                    Some(Token::Ident(name)) => name,
                    other => return Err(format!("expected identifier after 'let', found {other:?}")),
                };
                self.expect(Token::Assign, "after 'let' binding name")?;
                let value = self.parse_expr()?;
                Ok(Stmt::Let(name, value))
            }
            Some(Token::If) => self.parse_if(),
            Some(Token::While) => {
                self.advance();
                self.expect(Token::LParen, "after 'while'")?;
                let cond = self.parse_expr()?;
                self.expect(Token::RParen, "after while condition")?;
                let body = self.parse_block()?;
                Ok(Stmt::While { cond, body })
            }
            Some(Token::Ident(_)) if self.peek_at(1) == Some(&Token::Assign) => {
                let name = match self.advance() {
                    Some(Token::Ident(name)) => name,
                    _ => unreachable!(),
                };
                self.advance(); // '='
                let value = self.parse_expr()?;
                Ok(Stmt::Assign(name, value))
            }
            Some(_) => Ok(Stmt::Expr(self.parse_expr()?)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, String> {
        self.advance(); // 'if'
        self.expect(Token::LParen, "after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen, "after if condition")?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat(&Token::Else) {
            if self.peek() == Some(&Token::If) {
                Some(vec![self.parse_stmt()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, String> {
        self.expect(Token::LBrace, "to open a block")?;
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    return Ok(stmts);
                }
                Some(Token::Semicolon) => {
                    self.advance();
                }
                Some(_) => stmts.push(self.parse_stmt()?),
                None => return Err("unclosed block".to_string()),
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.enter()?;
        let result = self.parse_or();
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::OrOr) {
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_equality()?;
        while self.eat(&Token::AndAnd) {
            let right = self.parse_equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::BangEq) => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::LtEq) => BinaryOp::LtEq,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::GtEq) => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // Self-recursive without passing through parse_expr, so it carries its
    // own depth guard.
    fn parse_unary(&mut self) -> Result<Expr, String> {
        self.enter()?;
        let result = match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.parse_unary()
                    .map(|operand| Expr::Unary(UnaryOp::Neg, Box::new(operand)))
            }
            Some(Token::Bang) => {
                self.advance();
                self.parse_unary()
                    .map(|operand| Expr::Unary(UnaryOp::Not, Box::new(operand)))
            }
            _ => self.parse_postfix(),
        };
        self.depth -= 1;
        result
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::LParen) => {
                    let Expr::Ident(name) = &mut expr else {
                        return Err("only named builtin functions can be called".to_string());
                    };
                    let name = std::mem::take(name);
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.eat(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RParen, "to close argument list")?;
                    expr = Expr::Call(name, args);
                }
                Some(Token::LBracket) => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket, "to close index")?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Null) => Ok(Expr::Null),
            Some(Token::Ident(name)) => Ok(Expr::Ident(name)),
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(Token::RParen, "to close grouping")?;
                Ok(expr)
            }
            Some(Token::LBracket) => {
                let mut items = Vec::new();
                if self.peek() != Some(&Token::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBracket, "to close array literal")?;
                Ok(Expr::Array(items))
            }
            Some(Token::LBrace) => {
                let mut entries = Vec::new();
                if self.peek() != Some(&Token::RBrace) {
                    loop {
                        let key = match self.advance() {
                            Some(Token::Ident(name)) => name,
                            Some(Token::Str(s)) => s,
                            other => {
                                return Err(format!("expected object key, found {other:?}"));
                            }
                        };
                        self.expect(Token::Colon, "after object key")?;
                        let value = self.parse_expr()?;
                        entries.push((key, value));
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBrace, "to close object literal")?;
                Ok(Expr::Object(entries))
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}
