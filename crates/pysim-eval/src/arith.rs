//! Sandboxed arithmetic for `print(<expr>)` fallbacks.
//!
//! Only numeric literals, parentheses and the operators `+ - * / **` are
//! understood; anything else is an [`ArithError`]. Parsing is recursive
//! descent over a small token list:
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := ('+' | '-') unary | power
//! power := atom ('**' unary)?
//! atom  := number | '(' expr ')'
//! ```

use std::fmt;

/// Deepest nesting of parentheses and unary operators accepted.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum ArithError {
    UnexpectedChar(char),
    UnexpectedToken(String),
    UnexpectedEnd,
    BadNumber(String),
    TooDeep,
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithError::UnexpectedChar(c) => write!(f, "unexpected character '{}'", c),
            ArithError::UnexpectedToken(t) => write!(f, "unexpected token '{}'", t),
            ArithError::UnexpectedEnd => write!(f, "unexpected end of expression"),
            ArithError::BadNumber(s) => write!(f, "invalid number '{}'", s),
            ArithError::TooDeep => write!(f, "expression nested deeper than {}", MAX_DEPTH),
        }
    }
}

impl std::error::Error for ArithError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Pow => f.write_str("**"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(source: &str) -> Result<f64, ArithError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(tok) => Err(ArithError::UnexpectedToken(tok.to_string())),
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ArithError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    tokens.push(Token::Pow);
                } else {
                    tokens.push(Token::Star);
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                let mut prev = '\0';
                while let Some(&(i, d)) = chars.peek() {
                    let exponent_sign = (d == '+' || d == '-') && (prev == 'e' || prev == 'E');
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                        end = i + d.len_utf8();
                        prev = d;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                let n = text
                    .parse::<f64>()
                    .map_err(|_| ArithError::BadNumber(text.to_string()))?;
                tokens.push(Token::Num(n));
            }
            other => return Err(ArithError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn enter(&mut self) -> Result<(), ArithError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ArithError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, ArithError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs -= self.term()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<f64, ArithError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs /= self.unary()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, ArithError> {
        match self.peek() {
            Some(Token::Plus) | Some(Token::Minus) => {
                let negate = matches!(self.peek(), Some(Token::Minus));
                self.pos += 1;
                self.enter()?;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(if negate { -operand } else { operand })
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, ArithError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some(Token::Pow)) {
            self.pos += 1;
            self.enter()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, ArithError> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                self.enter()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(tok) => Err(ArithError::UnexpectedToken(tok.to_string())),
                    None => Err(ArithError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(ArithError::UnexpectedToken(tok.to_string())),
            None => Err(ArithError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(3.0));
        assert_eq!(evaluate("7 / 2"), Ok(3.5));
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_unary() {
        assert_eq!(evaluate("2 ** 10"), Ok(1024.0));
        assert_eq!(evaluate("2 ** 3 ** 2"), Ok(512.0));
        assert_eq!(evaluate("-2 ** 2"), Ok(-4.0));
        assert_eq!(evaluate("2 ** -1"), Ok(0.5));
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(evaluate("1.5e2"), Ok(150.0));
        assert_eq!(evaluate(".25 * 4"), Ok(1.0));
        assert_eq!(evaluate("5e-1+1"), Ok(1.5));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(evaluate("1 / 0"), Ok(f64::INFINITY));
        assert!(evaluate("0 / 0").unwrap().is_nan());
    }

    #[test]
    fn test_rejects_non_arithmetic() {
        assert_eq!(evaluate("2+"), Err(ArithError::UnexpectedEnd));
        assert_eq!(evaluate("x + 1"), Err(ArithError::UnexpectedChar('x')));
        assert_eq!(evaluate(""), Err(ArithError::UnexpectedEnd));
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("1..2").is_err());
        assert!(evaluate("\"a\" + 1").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&deep), Err(ArithError::TooDeep));

        let negations = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&negations), Err(ArithError::TooDeep));

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&ok), Ok(1.0));
    }
}
