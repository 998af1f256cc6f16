//! Restricted formula grammars.
//!
//! Two grammars are accepted, nothing else:
//!
//! ```text
//! arithmetic    := sum
//! sum           := product (("+" | "-") product)*
//! product       := factor (("*" | "/") factor)*
//! factor        := ("+" | "-") factor | "(" sum ")" | NUMBER
//!
//! concatenation := STRING ("+" STRING)*
//! ```
//!
//! Arithmetic text is limited to digits, whitespace and `+ - * / ( ) .`.
//! Text containing a quote is read as a concatenation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("character `{0}` is outside the formula grammar")]
    UnsupportedCharacter(char),
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("only string literals joined by `+` may be concatenated")]
    NotConcatenation,
    #[error("formula nesting exceeds maximum depth of {0}")]
    TooDeep(usize),
    #[error("formula exceeds maximum length of {0} bytes")]
    TooLong(usize),
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn eval(&self) -> Result<Literal, FormulaError> {
        match self {
            Expr::Literal(literal) => Ok(literal.clone()),
            Expr::BinaryOp { op, lhs, rhs } => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                match (op, lhs, rhs) {
                    (BinaryOp::Add, Literal::Text(a), Literal::Text(b)) => Ok(Literal::Text(a + &b)),
                    (op, Literal::Number(a), Literal::Number(b)) => arithmetic(*op, a, b).map(Literal::Number),
                    _ => Err(FormulaError::NotConcatenation),
                }
            }
        }
    }
}

fn arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<f64, FormulaError> {
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div if b == 0.0 => Err(FormulaError::DivisionByZero),
        BinaryOp::Div => Ok(a / b),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Text(s) => format!("\"{s}\""),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

/// Parse substituted formula text into an expression tree.
pub fn parse(text: &str, max_depth: usize) -> Result<Expr, FormulaError> {
    if text.contains('"') {
        parse_concatenation(text)
    } else {
        parse_arithmetic(text, max_depth)
    }
}

fn parse_arithmetic(text: &str, max_depth: usize) -> Result<Expr, FormulaError> {
    if let Some(c) = text
        .chars()
        .find(|c| !(c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(*c)))
    {
        return Err(FormulaError::UnsupportedCharacter(c));
    }

    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let expr = parser.sum()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(FormulaError::UnexpectedToken(token.describe())),
    }
}

fn parse_concatenation(text: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(text)?;
    let mut iter = tokens.into_iter();

    let mut expr = match iter.next() {
        Some(Token::Text(s)) => Expr::Literal(Literal::Text(s)),
        Some(_) => return Err(FormulaError::NotConcatenation),
        None => return Err(FormulaError::UnexpectedEnd),
    };

    while let Some(token) = iter.next() {
        if token != Token::Plus {
            return Err(FormulaError::NotConcatenation);
        }
        match iter.next() {
            Some(Token::Text(s)) => {
                expr = Expr::binary(BinaryOp::Add, expr, Expr::Literal(Literal::Text(s)));
            }
            Some(_) => return Err(FormulaError::NotConcatenation),
            None => return Err(FormulaError::UnexpectedEnd),
        }
    }

    Ok(expr)
}

fn tokenize(text: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '"' => {
                let mut literal = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                literal.push(escaped);
                            }
                        }
                        other => literal.push(other),
                    }
                }
                if !closed {
                    return Err(FormulaError::UnterminatedString);
                }
                Token::Text(literal)
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let raw = &text[start..end];
                let n = raw
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(raw.to_string()))?;
                Token::Number(n)
            }
            other => return Err(FormulaError::UnsupportedCharacter(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    fn sum(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(expr),
            };
            self.pos += 1;
            let rhs = self.product()?;
            expr = Expr::binary(op, expr, rhs);
        }
    }

    fn product(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(expr),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            expr = Expr::binary(op, expr, rhs);
        }
    }

    fn factor(&mut self) -> Result<Expr, FormulaError> {
        self.descend()?;
        let expr = match self.advance() {
            Some(Token::Number(n)) => Expr::Literal(Literal::Number(*n)),
            // Unary minus is `0 - x`
            Some(Token::Minus) => {
                let operand = self.factor()?;
                Expr::binary(BinaryOp::Sub, Expr::Literal(Literal::Number(0.0)), operand)
            }
            Some(Token::Plus) => self.factor()?,
            Some(Token::LParen) => {
                let inner = self.sum()?;
                match self.advance() {
                    Some(Token::RParen) => inner,
                    Some(other) => return Err(FormulaError::UnexpectedToken(other.describe())),
                    None => return Err(FormulaError::UnexpectedEnd),
                }
            }
            Some(other) => return Err(FormulaError::UnexpectedToken(other.describe())),
            None => return Err(FormulaError::UnexpectedEnd),
        };
        self.depth -= 1;
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> Result<Literal, FormulaError> {
        parse(text, 64)?.eval()
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(eval("2 * (3 + 1)"), Ok(Literal::Number(8.0)));
        assert_eq!(eval("2 * 3 + 1"), Ok(Literal::Number(7.0)));
        assert_eq!(eval("10 - 4 - 3"), Ok(Literal::Number(3.0)));
        assert_eq!(eval("8 / 4 / 2"), Ok(Literal::Number(1.0)));
        assert_eq!(eval("-(2 + 3) * 2"), Ok(Literal::Number(-10.0)));
        assert_eq!(eval("1.5 + .5"), Ok(Literal::Number(2.0)));
    }

    #[test]
    fn division_by_zero_is_an_error_value() {
        assert_eq!(eval("1 / 0"), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("1 / (2 - 2)"), Err(FormulaError::DivisionByZero));
    }

    #[test]
    fn malformed_arithmetic() {
        assert_eq!(eval("2 +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval("(2 + 3"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval("2 3"), Err(FormulaError::UnexpectedToken("3".into())));
        assert_eq!(eval("1.2.3"), Err(FormulaError::InvalidNumber("1.2.3".into())));
        assert_eq!(eval("foo(bar)"), Err(FormulaError::UnsupportedCharacter('f')));
        assert_eq!(eval(""), Err(FormulaError::UnexpectedEnd));
    }

    #[test]
    fn concatenation() {
        assert_eq!(
            eval(r#""Note: " + "Alpha""#),
            Ok(Literal::Text("Note: Alpha".into()))
        );
        assert_eq!(eval(r#""solo""#), Ok(Literal::Text("solo".into())));
        assert_eq!(eval(r#""a" - "b""#), Err(FormulaError::NotConcatenation));
        assert_eq!(eval(r#""a" + 1"#), Err(FormulaError::NotConcatenation));
        assert_eq!(eval(r#""a" +"#), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval(r#""open"#), Err(FormulaError::UnterminatedString));
    }

    #[test]
    fn depth_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&deep, 64), Err(FormulaError::TooDeep(64)));
        assert!(parse(&deep, 200).is_ok());
    }

    #[test]
    fn builds_small_ast() {
        let expr = parse("1 + 2", 8).unwrap();
        assert_eq!(
            expr,
            Expr::BinaryOp {
                op: BinaryOp::Add,
                lhs: Box::new(Expr::Literal(Literal::Number(1.0))),
                rhs: Box::new(Expr::Literal(Literal::Number(2.0))),
            }
        );
    }
}
