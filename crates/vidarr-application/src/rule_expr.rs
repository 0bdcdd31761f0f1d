// SPDX-License-Identifier: GPL-3.0-or-later

//! Boolean filter expressions over rule names. `!` binds tighter than `&`,
//! which binds tighter than `|`; parentheses group. Atoms are alphanumeric
//! rule names resolved against the catalog at evaluation time.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected closing parenthesis")]
    UnclosedParen,
    #[error("trailing input after expression: {0:?}")]
    TrailingInput(String),
    #[error("empty expression")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    Atom(String),
    Not(Box<RuleExpr>),
    And(Box<RuleExpr>, Box<RuleExpr>),
    Or(Box<RuleExpr>, Box<RuleExpr>),
}

impl RuleExpr {
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            let rest: Vec<String> = parser.tokens[parser.pos..]
                .iter()
                .map(Token::to_string)
                .collect();
            return Err(ExprError::TrailingInput(rest.join(" ")));
        }
        Ok(expr)
    }

    /// Evaluate against a predicate that decides whether a named rule matches.
    pub fn evaluate<F>(&self, matches: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            RuleExpr::Atom(name) => matches(name),
            RuleExpr::Not(inner) => !inner.evaluate(matches),
            RuleExpr::And(lhs, rhs) => lhs.evaluate(matches) && rhs.evaluate(matches),
            RuleExpr::Or(lhs, rhs) => lhs.evaluate(matches) || rhs.evaluate(matches),
        }
    }

    /// Every atom referenced by the expression, in syntactic order.
    pub fn atoms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RuleExpr::Atom(name) => out.push(name),
            RuleExpr::Not(inner) => inner.collect_atoms(out),
            RuleExpr::And(lhs, rhs) | RuleExpr::Or(lhs, rhs) => {
                lhs.collect_atoms(out);
                rhs.collect_atoms(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Atom(String),
    Not,
    And,
    Or,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Atom(name) => f.write_str(name),
            Token::Not => f.write_str("!"),
            Token::And => f.write_str("&"),
            Token::Or => f.write_str("|"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '&' => {
                chars.next();
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Or);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut atom = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        atom.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Atom(atom));
            }
            other => return Err(ExprError::UnexpectedChar(other, offset)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<RuleExpr, ExprError> {
        let mut expr = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            expr = RuleExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<RuleExpr, ExprError> {
        let mut expr = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.parse_unary()?;
            expr = RuleExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<RuleExpr, ExprError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(RuleExpr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<RuleExpr, ExprError> {
        match self.advance() {
            Some(Token::Atom(name)) => Ok(RuleExpr::Atom(name)),
            Some(Token::Open) => {
                let expr = self.parse_or()?;
                match self.advance() {
                    Some(Token::Close) => Ok(expr),
                    Some(_) | None => Err(ExprError::UnclosedParen),
                }
            }
            Some(token) => Err(ExprError::TrailingInput(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
