//! The evaluation engine.
//!
//! An [`Engine`] is one isolated execution context. All hook state (the step
//! hook, the registered builtins, the variable table) is owned by the
//! instance itself; there are no process-wide globals, so any number of
//! engines can run concurrently without observing each other.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::error::{EngineError, HookAbort, HostFault};
use crate::lexer::lex;
use crate::parser::Parser;
use crate::value::Value;

/// Callback invoked on every unit of evaluation work. Returning an error
/// aborts the run; the engine surfaces it as [`EngineError::HookAbort`].
pub type StepHook = Box<dyn FnMut() -> Result<(), HookAbort>>;

/// A host function exposed to the guest program.
pub type BuiltinFn = Box<dyn FnMut(Vec<Value>) -> Result<Value, HostFault>>;

/// Maximum evaluation nesting before a run is aborted with a runtime error.
/// Long operator chains evaluate recursively along their left spine, so this
/// bounds the host stack a guest program can consume.
const MAX_EVAL_DEPTH: usize = 512;

/// One isolated interpreter instance.
#[derive(Default)]
pub struct Engine {
    vars: HashMap<String, Value>,
    builtins: HashMap<String, BuiltinFn>,
    step_hook: Option<StepHook>,
    depth: usize,
}

impl Engine {
    /// Creates a fresh context with no variables, builtins or hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the per-step hook. Only one hook is active at a time;
    /// installing replaces any previous hook.
    pub fn set_step_hook(&mut self, hook: StepHook) {
        self.step_hook = Some(hook);
    }

    /// Exposes a host function to the guest under `name`.
    pub fn register_builtin(&mut self, name: &str, f: BuiltinFn) {
        self.builtins.insert(name.to_string(), f);
    }

    /// Parses and runs `source`, returning the value of the last evaluated
    /// statement. Parsing is not metered; the step hook fires once per
    /// evaluated statement or expression node.
    pub fn run(&mut self, source: &str) -> Result<Value, EngineError> {
        let tokens = lex(source).map_err(EngineError::Syntax)?;
        let program = Parser::new(tokens)
            .parse_program()
            .map_err(EngineError::Syntax)?;
        self.depth = 0;
        self.exec_block(&program)
    }

    fn tick(&mut self) -> Result<(), EngineError> {
        if let Some(hook) = self.step_hook.as_mut() {
            hook().map_err(|_| EngineError::HookAbort)?;
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), EngineError> {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(EngineError::Runtime(format!(
                "evaluation nesting exceeds the maximum depth of {MAX_EVAL_DEPTH}"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Value, EngineError> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = self.exec_stmt(stmt)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Value, EngineError> {
        self.tick()?;
        self.enter()?;
        let result = self.exec_stmt_inner(stmt);
        self.depth -= 1;
        result
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> Result<Value, EngineError> {
        match stmt {
            Stmt::Let(name, expr) => {
                let value = self.eval_expr(expr)?;
                self.vars.insert(name.clone(), value);
                Ok(Value::Null)
            }
            Stmt::Assign(name, expr) => {
                let value = self.eval_expr(expr)?;
                self.vars.insert(name.clone(), value.clone());
                Ok(value)
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.exec_block(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)?;
                }
                Ok(Value::Null)
            }
            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.is_truthy() {
                    self.exec_block(body)?;
                }
                Ok(Value::Null)
            }
            Stmt::Expr(expr) => self.eval_expr(expr),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EngineError> {
        self.tick()?;
        self.enter()?;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value, EngineError> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Ident(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::Runtime(format!("'{name}' is not defined"))),
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::Array(values))
            }
            Expr::Object(entries) => {
                let mut object = std::collections::BTreeMap::new();
                for (key, value_expr) in entries {
                    let value = self.eval_expr(value_expr)?;
                    object.insert(key.clone(), value);
                }
                Ok(Value::Object(object))
            }
            Expr::Unary(op, operand) => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(EngineError::Runtime(format!(
                            "cannot negate a {}",
                            other.type_name()
                        ))),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            Expr::Binary(op, left, right) => self.eval_binary(*op, left, right),
            Expr::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                let f = self
                    .builtins
                    .get_mut(name)
                    .ok_or_else(|| EngineError::Runtime(format!("'{name}' is not a function")))?;
                f(values).map_err(EngineError::from)
            }
            Expr::Index(base, index) => {
                let base = self.eval_expr(base)?;
                let index = self.eval_expr(index)?;
                match (&base, &index) {
                    (Value::Array(items), Value::Number(n)) => {
                        let i = *n as usize;
                        if n.fract() == 0.0 && *n >= 0.0 && i < items.len() {
                            Ok(items[i].clone())
                        } else {
                            Ok(Value::Null)
                        }
                    }
                    (Value::Str(s), Value::Number(n)) => {
                        let i = *n as usize;
                        if n.fract() == 0.0 && *n >= 0.0 {
                            Ok(s.chars()
                                .nth(i)
                                .map(|c| Value::Str(c.to_string()))
                                .unwrap_or(Value::Null))
                        } else {
                            Ok(Value::Null)
                        }
                    }
                    (Value::Object(entries), Value::Str(key)) => {
                        Ok(entries.get(key).cloned().unwrap_or(Value::Null))
                    }
                    _ => Err(EngineError::Runtime(format!(
                        "cannot index a {} with a {}",
                        base.type_name(),
                        index.type_name()
                    ))),
                }
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, EngineError> {
        // Logical operators short-circuit and yield an operand, not a bool.
        if op == BinaryOp::And {
            let left = self.eval_expr(left)?;
            return if left.is_truthy() {
                self.eval_expr(right)
            } else {
                Ok(left)
            };
        }
        if op == BinaryOp::Or {
            let left = self.eval_expr(left)?;
            return if left.is_truthy() {
                Ok(left)
            } else {
                self.eval_expr(right)
            };
        }

        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        match op {
            BinaryOp::Add => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{left}{right}")))
                }
                _ => Err(EngineError::Runtime(format!(
                    "cannot add a {} and a {}",
                    left.type_name(),
                    right.type_name()
                ))),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                    return Err(EngineError::Runtime(format!(
                        "arithmetic requires numbers, got {} and {}",
                        left.type_name(),
                        right.type_name()
                    )));
                };
                Ok(Value::Number(match op {
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Rem => a % b,
                    _ => unreachable!(),
                }))
            }
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::NotEq => Ok(Value::Bool(left != right)),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let ordering = match (&left, &right) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => {
                        return Err(EngineError::Runtime(format!(
                            "cannot compare a {} with a {}",
                            left.type_name(),
                            right.type_name()
                        )));
                    }
                };
                let Some(ordering) = ordering else {
                    // NaN comparisons are always false.
                    return Ok(Value::Bool(false));
                };
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::LtEq => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    BinaryOp::GtEq => ordering.is_ge(),
                    _ => unreachable!(),
                }))
            }
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn run(source: &str) -> Result<Value, EngineError> {
        Engine::new().run(source)
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(run("1 + 2 * 3").unwrap(), Value::Number(7.0));
        assert_eq!(run("(1 + 2) * 3").unwrap(), Value::Number(9.0));
        assert_eq!(run("10 % 3").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run("'a' + 'b'").unwrap(), Value::Str("ab".into()));
        assert_eq!(run("'n=' + 2").unwrap(), Value::Str("n=2".into()));
    }

    #[test]
    fn test_variables_and_assignment() {
        assert_eq!(run("let x = 2\nx = x + 1\nx").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_undefined_variable_is_runtime_error() {
        assert!(matches!(run("nope + 1"), Err(EngineError::Runtime(_))));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(run("let = 1"), Err(EngineError::Syntax(_))));
    }

    #[test]
    fn test_while_loop() {
        let source = "let i = 0\nlet sum = 0\nwhile (i < 5) { sum = sum + i; i = i + 1 }\nsum";
        assert_eq!(run(source).unwrap(), Value::Number(10.0));
    }

    #[test]
    fn test_if_else() {
        let source = "let x = 3\nlet r = ''\nif (x > 2) { r = 'big' } else { r = 'small' }\nr";
        assert_eq!(run(source).unwrap(), Value::Str("big".into()));
    }

    #[test]
    fn test_arrays_objects_and_indexing() {
        assert_eq!(run("[1, 2, 3][1]").unwrap(), Value::Number(2.0));
        assert_eq!(run("{ a: 5 }['a']").unwrap(), Value::Number(5.0));
        assert_eq!(run("[1][9]").unwrap(), Value::Null);
        assert_eq!(run("'abc'[1]").unwrap(), Value::Str("b".into()));
    }

    #[test]
    fn test_logical_operators_yield_operands() {
        assert_eq!(run("0 || 5").unwrap(), Value::Number(5.0));
        assert_eq!(run("1 && 5").unwrap(), Value::Number(5.0));
        assert_eq!(run("0 && 5").unwrap(), Value::Number(0.0));
    }

    #[test]
    fn test_completion_value_is_last_statement() {
        assert_eq!(run("1\n2\n3").unwrap(), Value::Number(3.0));
        assert_eq!(run("").unwrap(), Value::Null);
    }

    #[test]
    fn test_builtin_call_and_unknown_function() {
        let mut engine = Engine::new();
        engine.register_builtin("double", Box::new(|args| {
            let Some(Value::Number(n)) = args.first() else {
                return Err(HostFault::new("bad_argument", "expected a number"));
            };
            Ok(Value::Number(n * 2.0))
        }));
        assert_eq!(engine.run("double(21)").unwrap(), Value::Number(42.0));
        assert!(matches!(
            engine.run("triple(1)"),
            Err(EngineError::Runtime(_))
        ));
    }

    #[test]
    fn test_host_fault_propagates_kind() {
        let mut engine = Engine::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        engine.register_builtin("prompt", Box::new(move |_| {
            queue
                .pop_front()
                .map(Value::Str)
                .ok_or_else(|| HostFault::new("input_exhausted", "no inputs left"))
        }));
        match engine.run("prompt()") {
            Err(EngineError::Host { kind, .. }) => assert_eq!(kind, "input_exhausted"),
            other => panic!("expected host fault, got {other:?}"),
        }
    }

    #[test]
    fn test_step_hook_counts_and_aborts() {
        let counter = Arc::new(AtomicU64::new(0));
        let hook_counter = Arc::clone(&counter);
        let mut engine = Engine::new();
        engine.set_step_hook(Box::new(move || {
            if hook_counter.fetch_add(1, Ordering::Relaxed) >= 20 {
                Err(HookAbort)
            } else {
                Ok(())
            }
        }));
        let result = engine.run("let i = 0\nwhile (true) { i = i + 1 }");
        assert_eq!(result, Err(EngineError::HookAbort));
        assert!(counter.load(Ordering::Relaxed) >= 20);
    }

    #[test]
    fn test_long_operator_chains_evaluate() {
        let source = format!("0{}", " + 1".repeat(400));
        assert_eq!(run(&source).unwrap(), Value::Number(400.0));
    }

    #[test]
    fn test_excessive_operator_chain_is_a_runtime_error() {
        let source = format!("0{}", " + 1".repeat(100_000));
        assert!(matches!(run(&source), Err(EngineError::Runtime(_))));
    }

    #[test]
    fn test_evaluation_nesting_is_bounded() {
        let mut expr = Expr::Number(1.0);
        for _ in 0..3_000 {
            expr = Expr::Unary(UnaryOp::Neg, Box::new(expr));
        }
        let mut engine = Engine::new();
        assert!(matches!(
            engine.eval_expr(&expr),
            Err(EngineError::Runtime(_))
        ));
    }

    #[test]
    fn test_fresh_engines_share_nothing() {
        let mut a = Engine::new();
        let mut b = Engine::new();
        a.run("let x = 1").unwrap();
        assert!(matches!(b.run("x"), Err(EngineError::Runtime(_))));
    }
}
