//! Parsing and evaluation of single-variable formulas.
//!
//! A formula is `y = <expr>` or just `<expr>`, where `<expr>` uses the variable
//! `x`, free parameters `a, b, c, ...`, real literals, `+ - * / ^`, unary minus,
//! parentheses and a fixed set of functions. Parsing builds an immutable
//! [`Expression`] tree; [`CompiledExpression`] resolves names to parameter
//! indices once so that evaluation is a pure traversal.

use crate::model::{parameter_letter, MAX_PARAMS};
use ndarray::ArrayView1;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{map, opt, recognize, verify},
    multi::many0,
    number::complete::double,
    sequence::{pair, preceded},
    IResult, Parser,
};
use std::f64::consts::PI;
use thiserror::Error;

/// Error that can occur while parsing or compiling a formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("{name}() takes {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("Formula references no parameters; should be y = function(x, a, b, ...)")]
    NoParameters,

    #[error("Parameters must be contiguous from 'a'; '{missing}' is not used")]
    NonContiguousParameters { missing: char },
}

/// Result type for expression handling
type ExprResult<T> = Result<T, ExpressionError>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Variable reference
    Variable(String),

    /// Unary operations
    Unary(UnaryOp, Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    /// Addition (+)
    Add,

    /// Subtraction (-)
    Sub,

    /// Multiplication (*)
    Mul,

    /// Division (/)
    Div,

    /// Power (^)
    Pow,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// The functions a formula may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    /// Natural logarithm, spelled `log` or `ln`
    Log,
    Sqrt,
    Abs,
    Atan,
    Pow,
    Atan2,
    Min,
    Max,
}

impl Function {
    /// Resolve a (case-sensitive) function name.
    pub fn from_name(name: &str) -> Option<Self> {
        let func = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "exp" => Function::Exp,
            "log" | "ln" => Function::Log,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "atan" => Function::Atan,
            "pow" => Function::Pow,
            "atan2" => Function::Atan2,
            "min" => Function::Min,
            "max" => Function::Max,
            _ => return None,
        };
        Some(func)
    }

    fn check_arity(self, name: &str, got: usize) -> ExprResult<()> {
        let (ok, expected) = match self {
            Function::Pow | Function::Atan2 => (got == 2, "2"),
            Function::Min | Function::Max => (got >= 2, "at least 2"),
            _ => (got == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(ExpressionError::WrongArity {
                name: name.to_string(),
                expected,
                got,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Function::Sin => args[0].sin(),
            Function::Cos => args[0].cos(),
            Function::Tan => args[0].tan(),
            Function::Exp => args[0].exp(),
            Function::Log => args[0].ln(),
            Function::Sqrt => args[0].sqrt(),
            Function::Abs => args[0].abs(),
            Function::Atan => args[0].atan(),
            Function::Pow => args[0].powf(args[1]),
            Function::Atan2 => args[0].atan2(args[1]),
            Function::Min => args.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            Function::Max => args.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        }
    }
}

impl Expression {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> ExprResult<Self> {
        finish(expr_parser(input.trim()))
    }

    /// Parse an equation `y = <expr>`; a bare `<expr>` is accepted too.
    pub fn parse_equation(input: &str) -> ExprResult<Self> {
        finish(equation(input.trim()))
    }

    /// Find all variable names used in the expression
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    /// Recursively collect all variable names used in the expression
    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}

            Self::Variable(name) => {
                vars.push(name.clone());
            }

            Self::Unary(_, expr) => {
                expr.collect_variables(vars);
            }

            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }

            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }
}

/// Tree with every name resolved, produced once by [`CompiledExpression::compile`].
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    X,
    Param(usize),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    fn eval(&self, params: &ArrayView1<f64>, x: f64) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::X => x,
            Node::Param(i) => params.get(*i).copied().unwrap_or(f64::NAN),
            Node::Neg(inner) => -inner.eval(params, x),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(params, x), rhs.eval(params, x)),
            Node::Call(func, args) => {
                let values = args.iter().map(|a| a.eval(params, x)).collect::<Vec<f64>>();
                func.apply(&values)
            }
        }
    }
}

/// A formula of `x` and parameters `a, b, ...`, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    root: Node,
    n_params: usize,
}

impl CompiledExpression {
    /// Parse and compile an equation in one step.
    pub fn parse(input: &str) -> ExprResult<Self> {
        Self::compile(&Expression::parse_equation(input)?)
    }

    /// Resolve names and check function arity.
    ///
    /// # Errors
    ///
    /// * `UnknownVariable` for any identifier other than `x`, `pi` or a parameter letter
    /// * `UnknownFunction` / `WrongArity` for bad calls
    /// * `NoParameters` when no parameter letter is used
    /// * `NonContiguousParameters` when a letter below the highest one is unused
    pub fn compile(expr: &Expression) -> ExprResult<Self> {
        let mut used = [false; MAX_PARAMS];
        let root = resolve(expr, &mut used)?;

        let n_params = match used.iter().rposition(|&u| u) {
            Some(last) => last + 1,
            None => return Err(ExpressionError::NoParameters),
        };
        if let Some(gap) = used[..n_params].iter().position(|&u| !u) {
            return Err(ExpressionError::NonContiguousParameters {
                missing: parameter_letter(gap),
            });
        }

        Ok(Self { root, n_params })
    }

    /// Number of parameters, `a` through the highest letter used.
    pub fn parameter_count(&self) -> usize {
        self.n_params
    }

    /// Evaluate at `x`. Missing parameters evaluate as NaN.
    pub fn eval(&self, params: ArrayView1<f64>, x: f64) -> f64 {
        self.root.eval(&params, x)
    }
}

fn resolve(expr: &Expression, used: &mut [bool; MAX_PARAMS]) -> ExprResult<Node> {
    let node = match expr {
        Expression::Number(v) => Node::Const(*v),
        Expression::Variable(name) => resolve_name(name, used)?,
        Expression::Unary(UnaryOp::Neg, inner) => Node::Neg(Box::new(resolve(inner, used)?)),
        Expression::Binary(op, lhs, rhs) => Node::Binary(
            *op,
            Box::new(resolve(lhs, used)?),
            Box::new(resolve(rhs, used)?),
        ),
        Expression::Function(name, args) => {
            let func = Function::from_name(name).ok_or_else(|| ExpressionError::UnknownFunction {
                name: name.clone(),
            })?;
            func.check_arity(name, args.len())?;
            let args = args
                .iter()
                .map(|a| resolve(a, used))
                .collect::<ExprResult<Vec<Node>>>()?;
            Node::Call(func, args)
        }
    };
    Ok(node)
}

fn resolve_name(name: &str, used: &mut [bool; MAX_PARAMS]) -> ExprResult<Node> {
    match name {
        "x" => return Ok(Node::X),
        "pi" => return Ok(Node::Const(PI)),
        _ => {}
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            let index = (c as u8 - b'a') as usize;
            if index < MAX_PARAMS {
                used[index] = true;
                return Ok(Node::Param(index));
            }
        }
    }

    Err(ExpressionError::UnknownVariable {
        name: name.to_string(),
    })
}

/// Turn a parser result into an expression, rejecting unconsumed input.
fn finish(result: IResult<&str, Expression>) -> ExprResult<Expression> {
    match result {
        Ok((remainder, expr)) => {
            // Make sure the entire input was consumed
            if remainder.trim().is_empty() {
                Ok(expr)
            } else {
                Err(ExpressionError::ParseError {
                    message: format!("Unexpected trailing characters: '{}'", remainder),
                })
            }
        }
        Err(e) => Err(ExpressionError::ParseError {
            message: format!("{:?}", e),
        }),
    }
}

// Parser functions using nom

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

/// Match a single character after optional whitespace
fn symbol(input: &str, c: char) -> IResult<&str, char> {
    preceded(multispace0, char(c)).parse(input)
}

/// Match one of the characters in `set` after optional whitespace
fn operator<'a>(input: &'a str, set: &str) -> IResult<&'a str, char> {
    preceded(multispace0, one_of(set)).parse(input)
}

/// Parse an identifier (variable or function name)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Parse the optional `y =` prefix followed by an expression
fn equation(input: &str) -> IResult<&str, Expression> {
    let (input, _) = opt(pair(preceded(multispace0, char('y')), preceded(multispace0, char('='))))
        .parse(input)?;
    expr_parser(input)
}

/// Parse a comma-separated list of expressions (for function arguments)
fn args_list(input: &str) -> IResult<&str, Vec<Expression>> {
    let (mut remainder, first) = expr_parser(input)?;
    let mut res = vec![first];

    while let Ok((after_comma, _)) = symbol(remainder, ',') {
        let (after_expr, expr) = expr_parser(after_comma)?;
        res.push(expr);
        remainder = after_expr;
    }

    Ok((remainder, res))
}

/// Parse a function call
fn function_call(input: &str) -> IResult<&str, Expression> {
    let (input, name) = identifier(input)?;
    let (input, _) = symbol(input, '(')?;

    // Handle empty arguments case
    if let Ok((input, _)) = symbol(input, ')') {
        return Ok((input, Expression::Function(name.to_string(), vec![])));
    }

    let (input, args) = args_list(input)?;
    let (input, _) = symbol(input, ')')?;

    Ok((input, Expression::Function(name.to_string(), args)))
}

/// Parse a finite real literal. `inf` and `nan` fall through to identifiers.
fn number(input: &str) -> IResult<&str, Expression> {
    map(verify(double, |v: &f64| v.is_finite()), Expression::Number).parse(input)
}

/// Parse a variable reference
fn variable(input: &str) -> IResult<&str, Expression> {
    let (input, var_name) = identifier(input)?;
    Ok((input, Expression::Variable(var_name.to_string())))
}

/// Parse a parenthesized expression
fn parens(input: &str) -> IResult<&str, Expression> {
    let (input, _) = symbol(input, '(')?;
    let (input, expr) = expr_parser(input)?;
    let (input, _) = symbol(input, ')')?;
    Ok((input, expr))
}

/// Parse a primary expression (number, function call, variable, or parenthesized expression)
fn primary(input: &str) -> IResult<&str, Expression> {
    let (input, _) = ws(input)?;

    if let Ok(result) = number(input) {
        return Ok(result);
    }

    if let Ok(result) = function_call(input) {
        return Ok(result);
    }

    if let Ok(result) = variable(input) {
        return Ok(result);
    }

    parens(input)
}

/// Parse a power expression, right associative: `a ^ b ^ c = a ^ (b ^ c)`
fn power(input: &str) -> IResult<&str, Expression> {
    let (input, base) = primary(input)?;

    match symbol(input, '^') {
        Ok((after_op, _)) => {
            // The exponent may carry its own sign: 2^-x
            let (remaining, exponent) = unary(after_op)?;
            Ok((
                remaining,
                Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
            ))
        }
        Err(_) => Ok((input, base)),
    }
}

/// Parse a signed expression; the sign binds looser than `^`, so `-x^2 = -(x^2)`
fn unary(input: &str) -> IResult<&str, Expression> {
    match operator(input, "+-") {
        Ok((remaining, '-')) => {
            let (remaining, expr) = unary(remaining)?;
            Ok((remaining, Expression::Unary(UnaryOp::Neg, Box::new(expr))))
        }
        Ok((remaining, _)) => unary(remaining),
        Err(_) => power(input),
    }
}

/// Parse a multiplicative expression, left associative
fn term(input: &str) -> IResult<&str, Expression> {
    let (mut input, mut acc) = unary(input)?;

    while let Ok((after_op, op)) = operator(input, "*/") {
        let (remaining, rhs) = unary(after_op)?;
        let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = remaining;
    }

    Ok((input, acc))
}

/// Parse an additive expression, left associative
fn expr_parser(input: &str) -> IResult<&str, Expression> {
    let (mut input, mut acc) = term(input)?;

    while let Ok((after_op, op)) = operator(input, "+-") {
        let (remaining, rhs) = term(after_op)?;
        let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = remaining;
    }

    Ok((input, acc))
}
