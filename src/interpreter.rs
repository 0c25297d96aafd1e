//! Tree-walking evaluator for Quill.
//!
//! The interpreter owns the persistent global [`Environment`] for its whole
//! lifetime, so top-level declarations survive across repeated
//! [`Interpreter::interpret`] calls (the REPL relies on this).  Block
//! execution swaps a fresh child environment into the `environment` register
//! and restores the previous one on **every** exit path, including the
//! runtime-error path, keeping the scope chain in strict stack discipline.
//!
//! A runtime error aborts the remainder of the current `interpret` call;
//! earlier side effects (printed output, variable mutations) are not rolled
//! back.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{QuillError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

pub struct Interpreter {
    /// The "current environment" register.  Starts as (and outside any block
    /// is) the global scope.
    environment: Rc<RefCell<Environment>>,

    /// Sink for `print` output.  Stdout for the host binary; tests inject a
    /// buffer.
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to standard output.
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter printing to an arbitrary sink.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            out,
        }
    }

    /// Execute a list of statements (a "program") strictly in order.
    /// The first runtime error aborts the whole call.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Execute a single statement.  Statements never produce a value.
    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Evaluating expression statement");

                let _ = self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                debug!("Evaluating print statement");

                let value: Value = self.evaluate(expr)?;

                writeln!(self.out, "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                debug!("Declaring variable '{}'", name.lexeme);

                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                // Declaration always writes the current scope only, which is
                // what makes shadowing of an outer binding work.
                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());

                self.execute_block(statements)
            }
        }
    }

    /// Run a block's statements against a fresh child environment, restoring
    /// the previous environment whether execution succeeds or fails.
    fn execute_block(&mut self, statements: &[Stmt]) -> Result<()> {
        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);

        self.environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &previous,
        ))));

        let result: Result<()> = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;

        debug!("Exited block");

        result
    }

    /// Evaluate an expression to a [`Value`].
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(Self::literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Variable(name) => self.environment.borrow().get(name),

            Expr::Assign { name, value } => {
                let value: Value = self.evaluate(value)?;

                self.environment.borrow_mut().assign(name, value.clone())?;

                // Assignment is an expression: it yields the assigned value.
                Ok(value)
            }
        }
    }

    fn literal_value(literal: &LiteralValue) -> Value {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => Value::Str(s.clone()),
            LiteralValue::True => Value::Bool(true),
            LiteralValue::False => Value::Bool(false),
            LiteralValue::Nil => Value::Nil,
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        debug!("Evaluating unary operation: {}", operator.lexeme);

        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => {
                let n: f64 = Self::check_number_operand(operator, &right_val)?;

                Ok(Value::Number(-n))
            }

            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),

            // The grammar only produces '!' and '-' unaries.
            _ => Err(QuillError::runtime(
                operator,
                format!("Invalid unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        debug!("Evaluating binary operation: {}", operator.lexeme);

        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            // '+' is overloaded: numeric sum or string concatenation, with no
            // coercion between the two.
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                _ => Err(QuillError::runtime(
                    operator,
                    "Operands for '+' must be two numbers or two strings.",
                )),
            },

            // Strict equality: no coercion, different kinds never equal.
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::MINUS => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                if b == 0.0 {
                    return Err(QuillError::runtime(operator, "Division by zero."));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = Self::check_number_operands(operator, &left_val, &right_val)?;

                Ok(Value::Bool(a <= b))
            }

            _ => Err(QuillError::runtime(
                operator,
                format!("Invalid binary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn check_number_operand(operator: &Token, operand: &Value) -> Result<f64> {
        if let Value::Number(n) = operand {
            Ok(*n)
        } else {
            Err(QuillError::runtime(
                operator,
                format!("Operand for '{}' must be a number.", operator.lexeme),
            ))
        }
    }

    fn check_number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
        if let (Value::Number(a), Value::Number(b)) = (left, right) {
            Ok((*a, *b))
        } else {
            Err(QuillError::runtime(
                operator,
                format!("Operands for '{}' must be numbers.", operator.lexeme),
            ))
        }
    }
}
