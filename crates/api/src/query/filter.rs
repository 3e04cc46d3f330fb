//! `$filter` expressions: parsing and evaluation against JSON rows.
//!
//! Supported: `eq ne gt ge lt le`, `and or not`, parentheses, and the string
//! functions `contains`, `startswith`, `endswith` (case-insensitive).

use std::cmp::Ordering;

use serde_json::Value;

use super::{QueryError, compare_values, lookup};

/// Deepest allowed nesting of parentheses and `not`.
pub const MAX_DEPTH: usize = 32;
/// Most `and`/`or` operators allowed in one expression.
pub const MAX_OPERATORS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(String),
    Literal(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFunction {
    Contains,
    StartsWith,
    EndsWith,
}

/// A parsed boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Operand, Comparison, Operand),
    Function(StringFunction, Operand, Operand),
    /// A bare operand, true when it evaluates to JSON `true`.
    Truthy(Operand),
}

impl Expr {
    /// Parse a `$filter` value.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Filter` describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
            operators: 0,
        };
        let expr = parser.or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(QueryError::Filter(format!("unexpected {token}"))),
        }
    }

    /// Evaluate against one row.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::And(a, b) => a.matches(row) && b.matches(row),
            Self::Or(a, b) => a.matches(row) || b.matches(row),
            Self::Not(inner) => !inner.matches(row),
            Self::Compare(left, op, right) => compare(&resolve(left, row), *op, &resolve(right, row)),
            Self::Function(function, haystack, needle) => {
                let (Value::String(haystack), Value::String(needle)) =
                    (resolve(haystack, row), resolve(needle, row))
                else {
                    return false;
                };
                let haystack = haystack.to_lowercase();
                let needle = needle.to_lowercase();
                match function {
                    StringFunction::Contains => haystack.contains(&needle),
                    StringFunction::StartsWith => haystack.starts_with(&needle),
                    StringFunction::EndsWith => haystack.ends_with(&needle),
                }
            }
            Self::Truthy(operand) => resolve(operand, row) == Value::Bool(true),
        }
    }
}

fn resolve(operand: &Operand, row: &Value) -> Value {
    match operand {
        Operand::Literal(value) => value.clone(),
        Operand::Field(path) => lookup(row, path).cloned().unwrap_or(Value::Null),
    }
}

fn compare(left: &Value, op: Comparison, right: &Value) -> bool {
    match op {
        Comparison::Eq => values_equal(left, right),
        Comparison::Ne => !values_equal(left, right),
        Comparison::Gt | Comparison::Ge | Comparison::Lt | Comparison::Le => {
            if !comparable(left, right) {
                return false;
            }
            let ordering = compare_values(left, right);
            match op {
                Comparison::Gt => ordering == Ordering::Greater,
                Comparison::Ge => ordering != Ordering::Less,
                Comparison::Lt => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Ordering comparisons only make sense between values of the same kind.
const fn comparable(left: &Value, right: &Value) -> bool {
    matches!(
        (left, right),
        (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_))
    )
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Str(String),
    Num(serde_json::Number),
    Word(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
            Self::Str(s) => write!(f, "string '{s}'"),
            Self::Num(n) => write!(f, "number {n}"),
            Self::Word(w) => write!(f, "'{w}'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => {
                            if matches!(chars.peek(), Some((_, '\''))) {
                                chars.next();
                                text.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => text.push(ch),
                        None => {
                            return Err(QueryError::Filter("unterminated string literal".to_string()));
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' || (i == start && ch == '-') {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[start..end];
                let number = text
                    .parse::<i64>()
                    .ok()
                    .map(serde_json::Number::from)
                    .or_else(|| text.parse::<f64>().ok().and_then(serde_json::Number::from_f64))
                    .ok_or_else(|| QueryError::Filter(format!("invalid number '{text}'")))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '/' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(input[start..end].to_string()));
            }
            other => {
                return Err(QueryError::Filter(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

// =============================================================================
// Parser
// =============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    operators: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn expect(&mut self, expected: &Token) -> Result<(), QueryError> {
        match self.next() {
            Some(token) if &token == expected => Ok(()),
            Some(token) => Err(QueryError::Filter(format!("expected {expected}, found {token}"))),
            None => Err(QueryError::Filter(format!("expected {expected}, found end of input"))),
        }
    }

    fn enter(&mut self) -> Result<(), QueryError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(QueryError::Filter("expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn count_operator(&mut self) -> Result<(), QueryError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(QueryError::Filter("expression has too many conditions".to_string()));
        }
        Ok(())
    }

    fn or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            self.count_operator()?;
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.unary()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            self.count_operator()?;
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, QueryError> {
        if self.peek_keyword("not") {
            self.pos += 1;
            self.enter()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            self.enter()?;
            let inner = self.or()?;
            self.expect(&Token::RParen)?;
            self.depth -= 1;
            return Ok(inner);
        }

        if let Some(function) = self.peek_function() {
            self.pos += 2;
            let haystack = self.operand()?;
            self.expect(&Token::Comma)?;
            let needle = self.operand()?;
            self.expect(&Token::RParen)?;
            return Ok(Expr::Function(function, haystack, needle));
        }

        let left = self.operand()?;
        let Some(op) = self.peek_comparison() else {
            return Ok(Expr::Truthy(left));
        };
        self.pos += 1;
        let right = self.operand()?;
        Ok(Expr::Compare(left, op, right))
    }

    fn peek_function(&self) -> Option<StringFunction> {
        let Some(Token::Word(word)) = self.peek() else {
            return None;
        };
        if self.tokens.get(self.pos + 1) != Some(&Token::LParen) {
            return None;
        }
        match word.to_ascii_lowercase().as_str() {
            "contains" | "substringof" => Some(StringFunction::Contains),
            "startswith" => Some(StringFunction::StartsWith),
            "endswith" => Some(StringFunction::EndsWith),
            _ => None,
        }
    }

    fn peek_comparison(&self) -> Option<Comparison> {
        let Some(Token::Word(word)) = self.peek() else {
            return None;
        };
        match word.to_ascii_lowercase().as_str() {
            "eq" => Some(Comparison::Eq),
            "ne" => Some(Comparison::Ne),
            "gt" => Some(Comparison::Gt),
            "ge" => Some(Comparison::Ge),
            "lt" => Some(Comparison::Lt),
            "le" => Some(Comparison::Le),
            _ => None,
        }
    }

    fn operand(&mut self) -> Result<Operand, QueryError> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Operand::Literal(Value::String(s))),
            Some(Token::Num(n)) => Ok(Operand::Literal(Value::Number(n))),
            Some(Token::Word(word)) => Ok(match word.to_ascii_lowercase().as_str() {
                "true" => Operand::Literal(Value::Bool(true)),
                "false" => Operand::Literal(Value::Bool(false)),
                "null" => Operand::Literal(Value::Null),
                "and" | "or" | "not" | "eq" | "ne" | "gt" | "ge" | "lt" | "le" => {
                    return Err(QueryError::Filter(format!("unexpected keyword '{word}'")));
                }
                _ => Operand::Field(word),
            }),
            Some(token) => Err(QueryError::Filter(format!("unexpected {token}"))),
            None => Err(QueryError::Filter("unexpected end of input".to_string())),
        }
    }
}
