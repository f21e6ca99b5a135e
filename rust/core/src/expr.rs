// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Expression language over named variables
//!
//! Arithmetic expressions used as constraint targets:
//!
//! ```text
//! expr   = add
//! add    = mul  (('+'|'-') mul)*
//! mul    = pow  (('*'|'/') pow)*
//! pow    = prim ('^' pow)?
//! prim   = NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! `^` is right-associative. Tokenization is built with [nom](https://docs.rs/nom);
//! numeric literals are parsed with [lexical-core](https://docs.rs/lexical-core).
//!
//! The public API never fails hard: any lex, parse, or runtime problem folds
//! into the unresolved sentinel (`None`), so partially specified documents
//! stay solvable until their missing pieces are provided.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{map, map_res, recognize, value},
    sequence::pair,
    IResult,
};

use crate::entity::VariableMap;
use crate::error::{Error, Result};

/// Expression token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal: 3.14
    Number(f64),
    /// Variable reference: radius_1
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Variable(String),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parse numeric literal: 42, 3.14, .5
/// Uses lexical-core for fast parsing
fn number(input: &str) -> IResult<&str, Token> {
    map_res(
        take_while1(|c: char| c.is_ascii_digit() || c == '.'),
        |s: &str| {
            lexical_core::parse::<f64>(s.as_bytes())
                .map(Token::Number)
                .map_err(|_| "invalid number")
        },
    )(input)
}

/// Parse identifier: [A-Za-z_][A-Za-z0-9_]*
fn ident(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |s: &str| Token::Ident(s.to_string()),
    )(input)
}

/// Parse a single operator or parenthesis
fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Star, char('*')),
        value(Token::Slash, char('/')),
        value(Token::Caret, char('^')),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((ident, number, operator))(input)
}

/// Tokenize an expression, skipping whitespace
pub fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut rest = expr;
    let mut tokens = Vec::new();

    loop {
        rest = rest.trim_start();

        if rest.is_empty() {
            break;
        }

        let position = expr.len() - rest.len();
        match token(rest) {
            Ok((after, tok)) => {
                tokens.push(tok);
                rest = after;
            }
            Err(_) => {
                // A run of digits and dots that survived `number` is a
                // malformed literal, anything else is an unknown character.
                let starts_numeric = rest
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.');
                return Err(if starts_numeric {
                    Error::InvalidNumber(position)
                } else {
                    Error::UnexpectedChar(position)
                });
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over the token vector
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Result<Expr> {
        self.add()
    }

    fn add(&mut self) -> Result<Expr> {
        let mut lhs = self.mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.mul()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn mul(&mut self) -> Result<Expr> {
        let mut lhs = self.pow()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.pow()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Right-associative: 2^3^2 parses as 2^(3^2)
    fn pow(&mut self) -> Result<Expr> {
        let base = self.prim()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.pow()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn prim(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(Expr::Variable(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(Error::unexpected(self.pos, "')'")),
                }
            }
            Some(_) => Err(Error::unexpected(self.pos, "a number, variable or '('")),
            None => Err(Error::UnexpectedEnd),
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Parse an expression to EOF
fn parse(expr: &str) -> Result<Expr> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser::new(&tokens);
    let ast = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(Error::unexpected(parser.pos, "end of expression"));
    }
    Ok(ast)
}

fn eval(expr: &Expr, vars: &VariableMap) -> Result<f64> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(name) => vars
            .get(name)
            .and_then(|v| v.value)
            .ok_or_else(|| Error::UnresolvedVariable(name.clone())),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, vars)?;
            let r = eval(rhs, vars)?;
            match op {
                BinOp::Add => Ok(l + r),
                BinOp::Sub => Ok(l - r),
                BinOp::Mul => Ok(l * r),
                BinOp::Div => {
                    if r == 0.0 {
                        Err(Error::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                }
                BinOp::Pow => Ok(l.powf(r)),
            }
        }
    }
}

/// Check whether a string parses to EOF as an expression
pub fn validate_expression(expr: &str) -> bool {
    parse(expr).is_ok()
}

/// Evaluate an expression against the variable store
///
/// Returns `None` (unresolved) when a referenced variable is absent or has
/// no value, on division by zero, when the result is not finite, or when the
/// expression does not lex or parse. Plain numeric literals, including a
/// leading sign, short-circuit before the parser runs.
pub fn evaluate_expression(expr: &str, vars: &VariableMap) -> Option<f64> {
    if let Ok(n) = lexical_core::parse::<f64>(expr.trim().as_bytes()) {
        if n.is_finite() {
            return Some(n);
        }
    }

    let ast = parse(expr).ok()?;
    eval(&ast, vars).ok().filter(|v| v.is_finite())
}

/// Variable names referenced by an expression, in lexical order with
/// duplicates preserved; empty when the expression does not tokenize
pub fn extract_variable_names(expr: &str) -> Vec<String> {
    tokenize(expr)
        .map(|tokens| {
            tokens
                .into_iter()
                .filter_map(|t| match t {
                    Token::Ident(name) => Some(name),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
