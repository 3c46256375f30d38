//! Arithmetic evaluation for bracket content.
//!
//! Only numeric literals, `+ - * /` and parentheses are understood, so a
//! bracket can never do anything beyond arithmetic. Anything else is an
//! [`ExprError`], which the templating layer treats as "leave the text as
//! written".

use crate::guard::format_float;
use std::fmt;
use thiserror::Error;

/// Error type for arithmetic parsing and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow")]
    Overflow,
    #[error("Expression nested too deeply")]
    TooDeep,
}

/// Parentheses deeper than this are rejected rather than recursed into.
const MAX_DEPTH: usize = 64;

/// Result of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    /// Render with an explicit sign: `+3`, `-2`, `+0`, `+3.5`.
    pub fn signed(self) -> String {
        match self {
            Number::Int(value) => format!("{value:+}"),
            Number::Float(value) if value.is_sign_positive() => format!("+{}", format_float(value)),
            Number::Float(value) => format_float(value),
        }
    }

    fn checked_add(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_add(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() + b.as_f64())),
        }
    }

    fn checked_sub(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_sub(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() - b.as_f64())),
        }
    }

    fn checked_mul(self, rhs: Number) -> Result<Number, ExprError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_mul(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// Exact integer quotients stay integers; everything else is a float.
    fn checked_div(self, rhs: Number) -> Result<Number, ExprError> {
        if rhs.as_f64() == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) if a.checked_rem(b) == Some(0) => {
                a.checked_div(b).map(Number::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Number::Float(a.as_f64() / b.as_f64())),
        }
    }

    fn checked_neg(self) -> Result<Number, ExprError> {
        match self {
            Number::Int(value) => value.checked_neg().map(Number::Int).ok_or(ExprError::Overflow),
            Number::Float(value) => Ok(Number::Float(-value)),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Number, ExprError> {
    let mut parser = Parser::new(input)?;
    let value = parser.parse_sum()?;
    match parser.advance() {
        None => Ok(value),
        Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(Number),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Op(op) => write!(f, "{op}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.peek().copied() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch.is_ascii_digit() || ch == '.' {
            let mut literal = String::new();
            while let Some(next) = chars.peek().copied() {
                if !next.is_ascii_digit() && next != '.' {
                    break;
                }
                literal.push(next);
                chars.next();
            }
            tokens.push(Token::Number(parse_number(&literal)?));
            continue;
        }
        match ch {
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '+' | '-' | '*' | '/' => tokens.push(Token::Op(ch)),
            _ => return Err(ExprError::UnexpectedChar(ch)),
        }
        chars.next();
    }
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, ExprError> {
    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(ExprError::InvalidNumber(literal.to_string()));
        }
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ExprError::InvalidNumber(literal.to_string()))
    } else {
        literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| ExprError::InvalidNumber(literal.to_string()))
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, ExprError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            depth: 0,
        })
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn match_op(&mut self, op: char) -> bool {
        if self.peek() == Some(Token::Op(op)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_sum(&mut self) -> Result<Number, ExprError> {
        let mut value = self.parse_product()?;
        loop {
            if self.match_op('+') {
                value = value.checked_add(self.parse_product()?)?;
            } else if self.match_op('-') {
                value = value.checked_sub(self.parse_product()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_product(&mut self) -> Result<Number, ExprError> {
        let mut value = self.parse_unary()?;
        loop {
            if self.match_op('*') {
                value = value.checked_mul(self.parse_unary()?)?;
            } else if self.match_op('/') {
                value = value.checked_div(self.parse_unary()?)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Number, ExprError> {
        let mut negate = false;
        loop {
            if self.match_op('-') {
                negate = !negate;
            } else if !self.match_op('+') {
                break;
            }
        }
        let value = self.parse_primary()?;
        if negate {
            value.checked_neg()
        } else {
            Ok(value)
        }
    }

    fn parse_primary(&mut self) -> Result<Number, ExprError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                if self.depth >= MAX_DEPTH {
                    return Err(ExprError::TooDeep);
                }
                self.depth += 1;
                let value = self.parse_sum()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
