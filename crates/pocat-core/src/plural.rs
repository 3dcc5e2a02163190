//! Plural-form selection rules.
//!
//! A catalog declares its rule in the header:
//! `Plural-Forms: nplurals=2; plural=(n > 1);` — the `plural` part is a C
//! integer expression over the count `n`, evaluated at lookup time to pick
//! an index into the entry's `msgstr[N]` forms.
//!
//! The evaluator is total: division or modulo by zero selects form 0
//! instead of faulting, and the returned index is always below `nplurals`.

use std::fmt;

/// Errors from parsing a `Plural-Forms` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluralError {
    /// The declaration is missing the `nplurals=` part.
    MissingNplurals,
    /// The declaration is missing the `plural=` part.
    MissingExpression,
    /// `nplurals` is not a positive integer.
    BadNplurals(String),
    /// An unrecognized character in the expression.
    UnexpectedChar { pos: usize, ch: char },
    /// A token out of place in the expression.
    UnexpectedToken { pos: usize },
    /// The expression ended mid-construct.
    UnexpectedEnd,
    /// Tokens left over after a complete expression.
    TrailingInput { pos: usize },
}

impl fmt::Display for PluralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNplurals => write!(f, "missing 'nplurals=' in Plural-Forms"),
            Self::MissingExpression => write!(f, "missing 'plural=' in Plural-Forms"),
            Self::BadNplurals(v) => write!(f, "invalid nplurals value '{v}'"),
            Self::UnexpectedChar { pos, ch } => {
                write!(f, "unexpected character '{ch}' at offset {pos}")
            }
            Self::UnexpectedToken { pos } => write!(f, "unexpected token at offset {pos}"),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::TrailingInput { pos } => write!(f, "trailing input at offset {pos}"),
        }
    }
}

impl std::error::Error for PluralError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    N,
    Number(u64),
    Question,
    Colon,
    OrOr,
    AndAnd,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    N,
    Lit(u64),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Expr {
    /// Evaluate over `n`. `None` means division or modulo by zero.
    fn eval(&self, n: u64) -> Option<u64> {
        match self {
            Self::N => Some(n),
            Self::Lit(v) => Some(*v),
            Self::Not(inner) => Some(u64::from(inner.eval(n)? == 0)),
            Self::Binary(op, lhs, rhs) => {
                // C-style short circuit for the logical operators.
                match op {
                    BinOp::Or => {
                        return if lhs.eval(n)? != 0 {
                            Some(1)
                        } else {
                            Some(u64::from(rhs.eval(n)? != 0))
                        };
                    }
                    BinOp::And => {
                        return if lhs.eval(n)? == 0 {
                            Some(0)
                        } else {
                            Some(u64::from(rhs.eval(n)? != 0))
                        };
                    }
                    _ => {}
                }
                let l = lhs.eval(n)?;
                let r = rhs.eval(n)?;
                match op {
                    BinOp::Eq => Some(u64::from(l == r)),
                    BinOp::Ne => Some(u64::from(l != r)),
                    BinOp::Lt => Some(u64::from(l < r)),
                    BinOp::Gt => Some(u64::from(l > r)),
                    BinOp::Le => Some(u64::from(l <= r)),
                    BinOp::Ge => Some(u64::from(l >= r)),
                    BinOp::Add => Some(l.wrapping_add(r)),
                    BinOp::Sub => Some(l.wrapping_sub(r)),
                    BinOp::Mul => Some(l.wrapping_mul(r)),
                    BinOp::Div => l.checked_div(r),
                    BinOp::Mod => l.checked_rem(r),
                    BinOp::Or | BinOp::And => unreachable!("handled above"),
                }
            }
            Self::Ternary(cond, then, alt) => {
                if cond.eval(n)? != 0 {
                    then.eval(n)
                } else {
                    alt.eval(n)
                }
            }
        }
    }
}

/// A compiled plural rule: form count plus selection expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
    nplurals: usize,
    expr: Expr,
}

impl Default for PluralRule {
    fn default() -> Self {
        Self::germanic()
    }
}

impl PluralRule {
    /// The two-form Germanic rule (`nplurals=2; plural=n != 1;`), the
    /// fallback when a catalog declares no usable `Plural-Forms`.
    #[must_use]
    pub fn germanic() -> Self {
        Self {
            nplurals: 2,
            expr: Expr::Binary(BinOp::Ne, Box::new(Expr::N), Box::new(Expr::Lit(1))),
        }
    }

    /// Parse a `Plural-Forms` header value.
    ///
    /// # Errors
    ///
    /// Returns a [`PluralError`] when either part is missing or the
    /// expression is malformed.
    pub fn parse(declaration: &str) -> Result<Self, PluralError> {
        let mut nplurals: Option<&str> = None;
        let mut plural: Option<&str> = None;
        for part in declaration.split(';') {
            let part = part.trim();
            if let Some(v) = part.strip_prefix("nplurals") {
                nplurals = Some(v.trim_start().strip_prefix('=').unwrap_or(v).trim());
            } else if let Some(v) = part.strip_prefix("plural") {
                plural = Some(v.trim_start().strip_prefix('=').unwrap_or(v).trim());
            }
        }
        let nplurals = nplurals.ok_or(PluralError::MissingNplurals)?;
        let plural = plural.ok_or(PluralError::MissingExpression)?;
        let nplurals: usize = nplurals
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| PluralError::BadNplurals(nplurals.to_string()))?;

        let tokens = tokenize(plural)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.ternary()?;
        if parser.pos < parser.tokens.len() {
            return Err(PluralError::TrailingInput {
                pos: parser.tokens[parser.pos].1,
            });
        }
        Ok(Self { nplurals, expr })
    }

    /// Number of plural forms this rule selects among.
    #[must_use]
    pub fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// Select the form index for a count. Always `< nplurals()`.
    #[must_use]
    pub fn index(&self, n: u64) -> usize {
        let raw = self.expr.eval(n).unwrap_or(0);
        let idx = usize::try_from(raw).unwrap_or(usize::MAX);
        idx.min(self.nplurals - 1)
    }
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, PluralError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        let token = match b {
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            b'n' => {
                i += 1;
                Token::N
            }
            b'0'..=b'9' => {
                let mut value: u64 = 0;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    value = value
                        .wrapping_mul(10)
                        .wrapping_add(u64::from(bytes[i] - b'0'));
                    i += 1;
                }
                tokens.push((Token::Number(value), start));
                continue;
            }
            b'?' => {
                i += 1;
                Token::Question
            }
            b':' => {
                i += 1;
                Token::Colon
            }
            b'(' => {
                i += 1;
                Token::LParen
            }
            b')' => {
                i += 1;
                Token::RParen
            }
            b'+' => {
                i += 1;
                Token::Plus
            }
            b'-' => {
                i += 1;
                Token::Minus
            }
            b'*' => {
                i += 1;
                Token::Star
            }
            b'/' => {
                i += 1;
                Token::Slash
            }
            b'%' => {
                i += 1;
                Token::Percent
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                i += 2;
                Token::OrOr
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                i += 2;
                Token::AndAnd
            }
            b'=' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                Token::Eq
            }
            b'!' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                Token::Ne
            }
            b'!' => {
                i += 1;
                Token::Not
            }
            b'<' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                Token::Le
            }
            b'>' if bytes.get(i + 1) == Some(&b'=') => {
                i += 2;
                Token::Ge
            }
            b'<' => {
                i += 1;
                Token::Lt
            }
            b'>' => {
                i += 1;
                Token::Gt
            }
            _ => {
                return Err(PluralError::UnexpectedChar {
                    pos: start,
                    ch: src[start..].chars().next().unwrap_or('?'),
                });
            }
        };
        tokens.push((token, start));
    }
    Ok(tokens)
}

/// Recursive-descent parser over the token stream, C precedence.
struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    fn expect(&mut self, token: Token) -> Result<(), PluralError> {
        match self.tokens.get(self.pos) {
            Some(&(t, _)) if t == token => {
                self.pos += 1;
                Ok(())
            }
            Some(&(_, pos)) => Err(PluralError::UnexpectedToken { pos }),
            None => Err(PluralError::UnexpectedEnd),
        }
    }

    fn ternary(&mut self) -> Result<Expr, PluralError> {
        let cond = self.logical_or()?;
        if self.peek() == Some(Token::Question) {
            self.pos += 1;
            let then = self.ternary()?;
            self.expect(Token::Colon)?;
            let alt = self.ternary()?;
            return Ok(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(alt)));
        }
        Ok(cond)
    }

    fn logical_or(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.logical_and()?;
        while self.peek() == Some(Token::OrOr) {
            self.pos += 1;
            let rhs = self.logical_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn logical_and(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.equality()?;
        while self.peek() == Some(Token::AndAnd) {
            self.pos += 1;
            let rhs = self.equality()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn relational(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, PluralError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, PluralError> {
        if self.peek() == Some(Token::Not) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, PluralError> {
        match self.bump() {
            Some(Token::N) => Ok(Expr::N),
            Some(Token::Number(v)) => Ok(Expr::Lit(v)),
            Some(Token::LParen) => {
                let inner = self.ternary()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(_) => Err(PluralError::UnexpectedToken {
                pos: self.tokens[self.pos - 1].1,
            }),
            None => Err(PluralError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_rule() {
        let rule = PluralRule::parse("nplurals=2; plural=(n > 1);").unwrap();
        assert_eq!(rule.nplurals(), 2);
        assert_eq!(rule.index(0), 0);
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(2), 1);
        assert_eq!(rule.index(100), 1);
    }

    #[test]
    fn germanic_rule() {
        let rule = PluralRule::parse("nplurals=2; plural=(n != 1);").unwrap();
        assert_eq!(rule.index(0), 1);
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(2), 1);
        assert_eq!(rule, PluralRule::germanic());
    }

    #[test]
    fn single_form_rule() {
        let rule = PluralRule::parse("nplurals=1; plural=0;").unwrap();
        assert_eq!(rule.index(0), 0);
        assert_eq!(rule.index(7), 0);
    }

    #[test]
    fn russian_rule() {
        let rule = PluralRule::parse(
            "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : \
             n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
        )
        .unwrap();
        assert_eq!(rule.nplurals(), 3);
        assert_eq!(rule.index(1), 0);
        assert_eq!(rule.index(21), 0);
        assert_eq!(rule.index(3), 1);
        assert_eq!(rule.index(22), 1);
        assert_eq!(rule.index(5), 2);
        assert_eq!(rule.index(11), 2);
        assert_eq!(rule.index(112), 2);
    }

    #[test]
    fn arabic_rule() {
        let rule = PluralRule::parse(
            "nplurals=6; plural=n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : \
             n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5;",
        )
        .unwrap();
        assert_eq!(rule.index(0), 0);
        assert_eq!(rule.index(1), 1);
        assert_eq!(rule.index(2), 2);
        assert_eq!(rule.index(3), 3);
        assert_eq!(rule.index(11), 4);
        assert_eq!(rule.index(100), 5);
    }

    #[test]
    fn index_clamped_to_nplurals() {
        // A buggy declaration whose expression can exceed its own count.
        let rule = PluralRule::parse("nplurals=2; plural=n;").unwrap();
        assert_eq!(rule.index(9), 1);
    }

    #[test]
    fn division_by_zero_selects_form_zero() {
        let rule = PluralRule::parse("nplurals=2; plural=n / 0;").unwrap();
        assert_eq!(rule.index(5), 0);
        let rule = PluralRule::parse("nplurals=2; plural=n % 0;").unwrap();
        assert_eq!(rule.index(5), 0);
    }

    #[test]
    fn not_operator() {
        let rule = PluralRule::parse("nplurals=2; plural=!n;").unwrap();
        assert_eq!(rule.index(0), 1);
        assert_eq!(rule.index(3), 0);
    }

    #[test]
    fn missing_parts_rejected() {
        assert_eq!(
            PluralRule::parse("plural=(n > 1);").unwrap_err(),
            PluralError::MissingNplurals
        );
        assert_eq!(
            PluralRule::parse("nplurals=2;").unwrap_err(),
            PluralError::MissingExpression
        );
    }

    #[test]
    fn bad_nplurals_rejected() {
        assert!(matches!(
            PluralRule::parse("nplurals=0; plural=0;").unwrap_err(),
            PluralError::BadNplurals(_)
        ));
        assert!(matches!(
            PluralRule::parse("nplurals=x; plural=0;").unwrap_err(),
            PluralError::BadNplurals(_)
        ));
    }

    #[test]
    fn malformed_expression_rejected() {
        assert!(PluralRule::parse("nplurals=2; plural=n >;").is_err());
        assert!(PluralRule::parse("nplurals=2; plural=(n > 1;").is_err());
        assert!(PluralRule::parse("nplurals=2; plural=n ? 1;").is_err());
        assert!(PluralRule::parse("nplurals=2; plural=n $ 1;").is_err());
        assert!(PluralRule::parse("nplurals=2; plural=n 1;").is_err());
    }

    #[test]
    fn default_is_germanic() {
        assert_eq!(PluralRule::default(), PluralRule::germanic());
    }
}
