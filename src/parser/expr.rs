//! Integer constant expressions, as found in enum initializers.
//!
//! Handles literals (decimal, hex, octal, binary, char), references to
//! already-known constants, parentheses, unary `- + ~ !` and the binary
//! arithmetic, shift and bitwise operators. Anything else yields `None`.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(i64),
    Ident(String),
    Op(&'static str),
    Open,
    Close,
}

/// Two-character operators first so `<<` is not read as `<`.
const OPERATORS: [&str; 12] = ["<<", ">>", "+", "-", "*", "/", "%", "|", "&", "^", "~", "!"];

/// Evaluate `expr`, resolving identifiers through `known`.
pub fn eval(expr: &str, known: &HashMap<String, i64>) -> Option<i64> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        known,
    };
    let value = parser.expr(0)?;
    (parser.pos == tokens.len()).then_some(value)
}

/// Parse a C integer literal, ignoring `u`/`l` suffixes.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).ok();
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return i64::from_str_radix(&digits[1..], 8).ok();
    }
    digits.parse().ok()
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = expr.trim();
    while !rest.is_empty() {
        let c = rest.chars().next()?;
        if c.is_whitespace() {
            rest = rest.trim_start();
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..len];
            tokens.push(if c.is_ascii_digit() {
                Token::Num(parse_int_literal(word)?)
            } else {
                Token::Ident(word.to_string())
            });
            rest = &rest[len..];
            continue;
        }
        if c == '\'' {
            let (value, len) = char_literal(rest)?;
            tokens.push(Token::Num(value));
            rest = &rest[len..];
            continue;
        }
        if c == '(' || c == ')' {
            tokens.push(if c == '(' { Token::Open } else { Token::Close });
            rest = &rest[1..];
            continue;
        }
        let op = OPERATORS.iter().find(|op| rest.starts_with(**op))?;
        tokens.push(Token::Op(*op));
        rest = &rest[op.len()..];
    }
    Some(tokens)
}

/// Value and byte length of a char literal at the start of `text`.
fn char_literal(text: &str) -> Option<(i64, usize)> {
    let inner = &text[1..];
    let close = inner.find('\'')?;
    let (body, close) = if inner.starts_with("\\'") {
        ("\\'", 2)
    } else {
        (&inner[..close], close)
    };
    let value = match body {
        "\\n" => 10,
        "\\t" => 9,
        "\\r" => 13,
        "\\0" => 0,
        "\\\\" => 92,
        "\\'" => 39,
        _ => {
            let mut chars = body.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            i64::from(u32::from(ch))
        }
    };
    Some((value, close + 2))
}

fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "|" => Some(1),
        "^" => Some(2),
        "&" => Some(3),
        "<<" | ">>" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

fn apply(op: &str, lhs: i64, rhs: i64) -> Option<i64> {
    match op {
        "|" => Some(lhs | rhs),
        "^" => Some(lhs ^ rhs),
        "&" => Some(lhs & rhs),
        "<<" => lhs.checked_shl(u32::try_from(rhs).ok()?),
        ">>" => lhs.checked_shr(u32::try_from(rhs).ok()?),
        "+" => lhs.checked_add(rhs),
        "-" => lhs.checked_sub(rhs),
        "*" => lhs.checked_mul(rhs),
        "/" => lhs.checked_div(rhs),
        "%" => lhs.checked_rem(rhs),
        _ => None,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    known: &'a HashMap<String, i64>,
}

impl Parser<'_> {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    /// Precedence climbing over the binary operators.
    fn expr(&mut self, min_prec: u8) -> Option<i64> {
        let tokens = self.tokens;
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op)) = tokens.get(self.pos) {
            let Some(prec) = binary_precedence(op) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.expr(prec + 1)?;
            lhs = apply(op, lhs, rhs)?;
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<i64> {
        match self.next()? {
            Token::Num(n) => Some(n),
            Token::Ident(name) => self.known.get(&name).copied(),
            Token::Op("-") => self.unary()?.checked_neg(),
            Token::Op("+") => self.unary(),
            Token::Op("~") => Some(!self.unary()?),
            Token::Op("!") => Some(i64::from(self.unary()? == 0)),
            Token::Open => {
                let value = self.expr(0)?;
                (self.next()? == Token::Close).then_some(value)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(expr: &str) -> Option<i64> {
        eval(expr, &HashMap::new())
    }

    #[test]
    fn literals() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0x1Fu"), Some(31));
        assert_eq!(parse_int_literal("010"), Some(8));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("12UL"), Some(12));
        assert_eq!(parse_int_literal("1.5"), None);
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(eval_str("1 + 2 * 3"), Some(7));
        assert_eq!(eval_str("(1 + 2) * 3"), Some(9));
        assert_eq!(eval_str("1 << 4 | 1"), Some(17));
        assert_eq!(eval_str("-5"), Some(-5));
        assert_eq!(eval_str("~0"), Some(-1));
    }

    #[test]
    fn char_literals() {
        assert_eq!(eval_str("'A'"), Some(65));
        assert_eq!(eval_str("'\\n'"), Some(10));
        assert_eq!(eval_str("'\\''"), Some(39));
    }

    #[test]
    fn known_constants() {
        let known = HashMap::from([("FLAG_A".to_string(), 1), ("FLAG_B".to_string(), 2)]);
        assert_eq!(eval("FLAG_A | FLAG_B", &known), Some(3));
        assert_eq!(eval("FLAG_C", &known), None);
    }

    #[test]
    fn rejects_unsupported() {
        assert_eq!(eval_str("sizeof(int)"), None);
        assert_eq!(eval_str("1 +"), None);
        assert_eq!(eval_str("(1"), None);
        assert_eq!(eval_str("1 / 0"), None);
        assert_eq!(eval_str("a ? 1 : 2"), None);
    }
}
