//! Recursive descent parser for guard expressions.
//!
//! Grammar (whitespace is insignificant):
//!
//! ```text
//! or    := and ('||' and)*
//! and   := unary ('&&' unary)*
//! unary := '!' unary | atom
//! atom  := 'true' | 'false' | IDENT | '(' or ')'
//! IDENT := [A-Za-z_][A-Za-z0-9_.]*
//! ```

use super::error::ParseError;
use super::FExpr;

/// Maximum nesting of parentheses and negations.
pub const MAX_DEPTH: usize = 256;

/// Parse a guard expression.
///
/// # Example
///
/// ```rust
/// use ftsmind::fexpr::{parse, FExpr};
///
/// let expr = parse("(!mapping && lidar)").unwrap();
/// assert_eq!(
///     expr,
///     FExpr::feature("mapping").negate().and(FExpr::feature("lidar"))
/// );
/// assert_eq!(expr.to_string(), "(!mapping && lidar)");
/// ```
pub fn parse(text: &str) -> Result<FExpr, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut p = Parser::new(text);
    let expr = p.parse_or()?;
    p.skip_ws();
    if !p.eof() {
        return Err(ParseError::TrailingInput {
            rest: text[p.pos..].to_string(),
            offset: p.pos,
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    s: &'a str,
    b: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            s,
            b: s.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.b.len()
    }

    fn peek(&self) -> Option<u8> {
        self.b.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.b.get(self.pos + ahead).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Consume a two-byte operator such as `&&`.
    /// A lone first byte is reported as an unexpected character.
    fn eat_double(&mut self, op: u8) -> Result<bool, ParseError> {
        self.skip_ws();
        if self.peek() != Some(op) {
            return Ok(false);
        }
        if self.peek_at(1) != Some(op) {
            return Err(ParseError::UnexpectedChar {
                found: op as char,
                offset: self.pos,
            });
        }
        self.pos += 2;
        Ok(true)
    }

    fn parse_or(&mut self) -> Result<FExpr, ParseError> {
        let mut terms = vec![self.parse_and()?];
        while self.eat_double(b'|')? {
            terms.push(self.parse_and()?);
        }

        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(FExpr::Or(terms))
        }
    }

    fn parse_and(&mut self) -> Result<FExpr, ParseError> {
        let mut factors = vec![self.parse_unary()?];
        while self.eat_double(b'&')? {
            factors.push(self.parse_unary()?);
        }

        if factors.len() == 1 {
            Ok(factors.remove(0))
        } else {
            Ok(FExpr::And(factors))
        }
    }

    fn parse_unary(&mut self) -> Result<FExpr, ParseError> {
        self.skip_ws();
        if self.peek() == Some(b'!') {
            self.pos += 1;
            self.enter()?;
            let inner = self.parse_unary()?;
            self.leave();
            return Ok(FExpr::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<FExpr, ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd {
                expected: "a feature, a constant or '('",
            }),
            Some(b'(') => {
                self.pos += 1;
                self.enter()?;
                let inner = self.parse_or()?;
                self.leave();
                self.skip_ws();
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    Some(_) => Err(self.unexpected_token("')'")),
                    None => Err(ParseError::UnexpectedEnd { expected: "')'" }),
                }
            }
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
                {
                    self.pos += 1;
                }
                let word = &self.s[start..self.pos];
                Ok(match word {
                    "true" => FExpr::Const(true),
                    "false" => FExpr::Const(false),
                    name => FExpr::Feature(name.to_string()),
                })
            }
            Some(c) if matches!(c, b')' | b'&' | b'|') => {
                Err(self.unexpected_token("a feature, a constant or '('"))
            }
            Some(_) => {
                let found = self.s[self.pos..].chars().next().unwrap_or('?');
                Err(ParseError::UnexpectedChar {
                    found,
                    offset: self.pos,
                })
            }
        }
    }

    fn unexpected_token(&self, expected: &'static str) -> ParseError {
        let found: String = self.s[self.pos..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(16)
            .collect();
        ParseError::UnexpectedToken {
            expected,
            found,
            offset: self.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(name: &str) -> FExpr {
        FExpr::feature(name)
    }

    #[test]
    fn parses_single_feature() {
        assert_eq!(parse("mapping").unwrap(), f("mapping"));
        assert_eq!(parse("  lidar ").unwrap(), f("lidar"));
    }

    #[test]
    fn parses_constants() {
        assert_eq!(parse("true").unwrap(), FExpr::Const(true));
        assert_eq!(parse("false").unwrap(), FExpr::Const(false));
        // Keywords only match whole words.
        assert_eq!(parse("trueish").unwrap(), f("trueish"));
    }

    #[test]
    fn negation_binds_tighter_than_conjunction() {
        let expr = parse("!mapping && lidar").unwrap();
        assert_eq!(
            expr,
            FExpr::And(vec![FExpr::Not(Box::new(f("mapping"))), f("lidar")])
        );
    }

    #[test]
    fn conjunction_binds_tighter_than_disjunction() {
        let expr = parse("a || b && c").unwrap();
        assert_eq!(
            expr,
            FExpr::Or(vec![f("a"), FExpr::And(vec![f("b"), f("c")])])
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse("!(a || b)").unwrap();
        assert_eq!(
            expr,
            FExpr::Not(Box::new(FExpr::Or(vec![f("a"), f("b")])))
        );
    }

    #[test]
    fn chained_operators_are_flat() {
        let expr = parse("a && b && c").unwrap();
        assert_eq!(expr, FExpr::And(vec![f("a"), f("b"), f("c")]));
    }

    #[test]
    fn double_negation_is_kept() {
        let expr = parse("!!a").unwrap();
        assert_eq!(
            expr,
            FExpr::Not(Box::new(FExpr::Not(Box::new(f("a")))))
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_single_ampersand() {
        assert_eq!(
            parse("a & b"),
            Err(ParseError::UnexpectedChar {
                found: '&',
                offset: 2
            })
        );
    }

    #[test]
    fn rejects_missing_operand() {
        assert!(matches!(
            parse("a &&"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            parse("&& a"),
            Err(ParseError::UnexpectedToken { offset: 0, .. })
        ));
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert_eq!(
            parse("(a && b"),
            Err(ParseError::UnexpectedEnd { expected: "')'" })
        );
        assert!(matches!(
            parse("a)"),
            Err(ParseError::TrailingInput { offset: 1, .. })
        ));
    }

    #[test]
    fn rejects_juxtaposed_features() {
        assert!(matches!(
            parse("mapping lidar"),
            Err(ParseError::TrailingInput { offset: 8, .. })
        ));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(
            parse("+a"),
            Err(ParseError::UnexpectedChar {
                found: '+',
                offset: 0
            })
        );
        assert!(matches!(
            parse("a + b"),
            Err(ParseError::TrailingInput { offset: 2, .. })
        ));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let text = format!("{}a", "!".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&text), Err(ParseError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn parses_fixture_guards() {
        for guard in [
            "mapping",
            "(!mapping && lidar)",
            "(!mapping && camera)",
            "!mapping",
            "(mapping && lidar)",
            "(mapping && camera)",
            "true",
        ] {
            let expr = parse(guard).unwrap();
            assert_eq!(expr.to_string(), guard);
        }
    }
}
