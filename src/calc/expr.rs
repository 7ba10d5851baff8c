//! Arithmetic expressions over frame columns.
//!
//! ## Grammar
//!
//! ```text
//! <expr>    ::= <term> { ("+" | "-") <term> }
//! <term>    ::= <unary> { ("*" | "/") <unary> }
//! <unary>   ::= ("-" | "+") <unary> | <power>
//! <power>   ::= <primary> [ "^" <unary> ]
//! <primary> ::= <number>
//!             | <ident> "(" <expr> { "," <expr> } ")"
//!             | <ident>
//!             | "{" <any text except "}"> "}"
//!             | "(" <expr> ")"
//! ```
//!
//! A bare identifier is a column reference unless it is `pi` or `e`. Column
//! names that are not identifiers (`O-H`, `angle 1`) are written in braces.
//! `^` is right-associative and binds tighter than unary minus, so `-2^2`
//! is `-4`.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unterminated '{{' starting at position {pos}")]
    UnterminatedBrace { pos: usize },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("expression nests deeper than {MAX_DEPTH} levels at position {pos}")]
    TooDeep { pos: usize },

    #[error("function '{func}' takes {expected} argument(s), got {got}")]
    ArgumentCount {
        func: Function,
        expected: usize,
        got: usize,
    },
}

type ParseResult<T> = Result<T, ParseError>;

/// Nesting limit for unary operators, exponents, parentheses and calls.
const MAX_DEPTH: usize = 64;

/// Functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Deg,
    Rad,
    Min,
    Max,
    Pow,
}

impl Function {
    const ALL: [Function; 16] = [
        Function::Abs,
        Function::Sqrt,
        Function::Exp,
        Function::Ln,
        Function::Log10,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Asin,
        Function::Acos,
        Function::Atan,
        Function::Deg,
        Function::Rad,
        Function::Min,
        Function::Max,
        Function::Pow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log10 => "log10",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Deg => "deg",
            Function::Rad => "rad",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Min | Function::Max | Function::Pow => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let x = args[0];
        match self {
            Function::Abs => x.abs(),
            Function::Sqrt => x.sqrt(),
            Function::Exp => x.exp(),
            Function::Ln => x.ln(),
            Function::Log10 => x.log10(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
            Function::Deg => x.to_degrees(),
            Function::Rad => x.to_radians(),
            Function::Min => x.min(args[1]),
            Function::Max => x.max(args[1]),
            Function::Pow => x.powf(args[1]),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
            BinOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Column(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Evaluates the tree. `column` returns the numeric value of a column
    /// for the current row, or `None` if it has none.
    pub fn eval<F>(&self, column: &F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Expr::Number(v) => Some(*v),
            Expr::Column(name) => column(name),
            Expr::Neg(inner) => inner.eval(column).map(|v| -v),
            Expr::Binary { op, lhs, rhs } => Some(op.apply(lhs.eval(column)?, rhs.eval(column)?)),
            Expr::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|a| a.eval(column))
                    .collect::<Option<Vec<_>>>()?;
                Some(func.apply(&values))
            }
        }
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Neg(inner) => inner.collect_columns(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_columns(out);
                rhs.collect_columns(out);
            }
            Expr::Call { args, .. } => args.iter().for_each(|a| a.collect_columns(out)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Braced(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "number {}", v),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Braced(s) => write!(f, "column '{{{}}}'", s),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Caret => f.write_str("'^'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
        }
    }
}

fn tokenize(src: &str) -> ParseResult<Vec<(Token, usize)>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '{' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '}')
                    .ok_or(ParseError::UnterminatedBrace { pos: start })?;
                let name: String = chars[i + 1..i + 1 + close].iter().collect();
                i += close + 2;
                tokens.push((Token::Braced(name.trim().to_string()), start));
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::UnexpectedToken {
                        found: format!("number '{}'", text),
                        pos: start,
                    })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push((Token::Ident(text), start));
                continue;
            }
            ch => return Err(ParseError::UnexpectedChar { ch, pos: start }),
        };
        tokens.push((token, start));
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.position) {
            Some((token, pos)) => ParseError::UnexpectedToken {
                found: token.to_string(),
                pos: *pos,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> ParseResult<()> {
        if self.peek() == Some(&expected) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.position += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.position += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.depth >= MAX_DEPTH {
            let pos = self.tokens.get(self.position).map_or(0, |(_, pos)| *pos);
            return Err(ParseError::TooDeep { pos });
        }
        self.depth += 1;
        let expr = self.parse_unary_inner();
        self.depth -= 1;
        expr
    }

    fn parse_unary_inner(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(Token::Plus) => {
                self.position += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.position += 1;
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("a number, column or '('"));
        };
        match token {
            Token::Number(v) => {
                self.position += 1;
                Ok(Expr::Number(v))
            }
            Token::Braced(name) => {
                self.position += 1;
                Ok(Expr::Column(name))
            }
            Token::LParen => {
                self.position += 1;
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.position += 1;
                if self.peek() == Some(&Token::LParen) {
                    return self.parse_call(name);
                }
                Ok(match name.as_str() {
                    "pi" => Expr::Number(std::f64::consts::PI),
                    "e" => Expr::Number(std::f64::consts::E),
                    _ => Expr::Column(name),
                })
            }
            _ => Err(self.unexpected("a number, column or '('")),
        }
    }

    fn parse_call(&mut self, name: String) -> ParseResult<Expr> {
        let func = Function::lookup(&name).ok_or(ParseError::UnknownFunction(name))?;
        self.expect(Token::LParen, "'('")?;

        let mut args = vec![self.parse_expr()?];
        while self.peek() == Some(&Token::Comma) {
            self.position += 1;
            args.push(self.parse_expr()?);
        }
        self.expect(Token::RParen, "')'")?;

        if args.len() != func.arity() {
            return Err(ParseError::ArgumentCount {
                func,
                expected: func.arity(),
                got: args.len(),
            });
        }
        Ok(Expr::Call { func, args })
    }
}

/// A parsed expression together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parser = Parser {
            tokens,
            position: 0,
            depth: 0,
        };
        let root = parser.parse_expr()?;
        if parser.peek().is_some() {
            return Err(parser.unexpected("end of expression"));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Distinct column names referenced, in order of first appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_columns(&mut out);
        out
    }

    pub fn eval<F>(&self, column: F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        self.root.eval(&column)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> f64 {
        Expression::parse(src).unwrap().eval(|_| None).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("8 / 4 / 2"), 1.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
        assert_eq!(eval("2 * -3"), -6.0);
        assert_eq!(eval("+5"), 5.0);
    }

    #[test]
    fn number_forms() {
        assert_eq!(eval("1.5e3"), 1500.0);
        assert_eq!(eval("2E-1"), 0.2);
        assert_eq!(eval(".5"), 0.5);
    }

    #[test]
    fn constants_and_functions() {
        assert!(close(eval("pi"), std::f64::consts::PI));
        assert!(close(eval("ln(e)"), 1.0));
        assert!(close(eval("deg(pi / 2)"), 90.0));
        assert!(close(eval("cos(rad(60))"), 0.5));
        assert_eq!(eval("max(3, min(10, 7))"), 7.0);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert_eq!(eval("abs(-3) + sqrt(16)"), 7.0);
        assert!(close(eval("log10(1000)"), 3.0));
    }

    #[test]
    fn column_references() {
        let expr = Expression::parse("2 * energy + {O-H} - energy").unwrap();
        assert_eq!(expr.columns(), vec!["energy", "O-H"]);

        let value = expr.eval(|name| match name {
            "energy" => Some(-1.5),
            "O-H" => Some(0.96),
            _ => None,
        });
        assert!(close(value.unwrap(), -1.5 + 0.96));
    }

    #[test]
    fn missing_operand_propagates() {
        let expr = Expression::parse("sqrt(a) + 1").unwrap();
        assert_eq!(expr.eval(|_| None), None);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(Expression::parse("   "), Err(ParseError::Empty));
        assert_eq!(
            Expression::parse("1 + $"),
            Err(ParseError::UnexpectedChar { ch: '$', pos: 4 })
        );
        assert!(matches!(
            Expression::parse("1 +"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Expression::parse("(1 + 2"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Expression::parse("1 2"),
            Err(ParseError::UnexpectedToken { pos: 2, .. })
        ));
        assert_eq!(
            Expression::parse("{O-H"),
            Err(ParseError::UnterminatedBrace { pos: 0 })
        );
    }

    #[test]
    fn function_checks() {
        assert_eq!(
            Expression::parse("__import__(1)"),
            Err(ParseError::UnknownFunction("__import__".into()))
        );
        assert_eq!(
            Expression::parse("sin(1, 2)"),
            Err(ParseError::ArgumentCount {
                func: Function::Sin,
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let minuses = format!("{}1", "-".repeat(10_000));
        assert!(matches!(
            Expression::parse(&minuses),
            Err(ParseError::TooDeep { .. })
        ));

        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            Expression::parse(&parens),
            Err(ParseError::TooDeep { .. })
        ));

        let powers = vec!["2"; 10_000].join("^");
        assert!(matches!(
            Expression::parse(&powers),
            Err(ParseError::TooDeep { .. })
        ));

        let nested = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(Expression::parse(&nested).unwrap().eval(|_| None), Some(1.0));
    }
}
