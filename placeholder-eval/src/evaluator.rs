use crate::template::{self, Segment};
use crate::{EvalError, FunctionRegistry};
use placeholder_parser::ast::{BinaryOp, Expr, UnaryOp};
use placeholder_parser::lexer::Number;
use placeholder_parser::parse;
use placeholder_source::Source;
use placeholder_value::Value;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Tree-walking evaluator. Owns the registry that function calls dispatch to.
#[derive(Debug, Default)]
pub struct Evaluator {
    registry: FunctionRegistry,
}

impl Evaluator {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Evaluates a single AST node.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::NumberLit(Number::Int(val)) => Ok(Value::Int(*val)),
            Expr::NumberLit(Number::Float(val)) => Ok(Value::Float(*val)),
            Expr::StringLit(val) => Ok(Value::Str(val.clone())),
            // bare words are self-quoting, there are no variables
            Expr::Identifier(ident) => Ok(Value::Str(ident.clone())),
            Expr::FnCall { ident, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                trace!(%ident, argc = args.len(), "calling native function");
                self.registry.call(ident, &args)
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                binary(&lhs, *op, &rhs)
            }
            Expr::Unary {
                op: UnaryOp::Neg,
                arg,
            } => Ok(self.evaluate(arg)?.try_neg()?),
        }
    }

    /// Parses `text` as one expression and evaluates it.
    pub fn evaluate_expression(&self, text: &str) -> Result<Value, EvalError> {
        let expr = parse(&Source::new(text))?;
        self.evaluate(&expr)
    }

    /// Replaces every `{expression}` in `text` with its stringified value.
    /// The first failing span aborts the whole template.
    pub fn evaluate_template(&self, text: &str) -> Result<String, EvalError> {
        let mut result = String::with_capacity(text.len());
        for segment in template::segments(text) {
            match segment? {
                Segment::Text(literal) => result.push_str(literal),
                Segment::Expr { source, offset } => {
                    trace!(offset, source, "evaluating template span");
                    let value = self
                        .evaluate_expression(source)
                        .map_err(|err| err.offset(offset))?;
                    // `Null` displays as the empty string
                    result.push_str(&value.to_string());
                }
            }
        }
        Ok(result)
    }

    /// Evaluates a raw configuration value.
    ///
    /// Non-string values are returned unchanged. A string is first evaluated as a whole
    /// expression. If that is a syntax error, a string containing `{` is interpolated as a
    /// template and any other string is returned as is. Errors other than syntax errors,
    /// and expressions nested past the parser limit, are never recovered from.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn evaluate_value(&self, raw: &Value) -> Result<Value, EvalError> {
        let text = match raw {
            Value::Str(text) => text,
            other => return Ok(other.clone()),
        };

        match self.evaluate_expression(text) {
            Err(err) if err.is_recoverable() => {
                if text.contains('{') {
                    debug!(%err, "not an expression, interpolating as template");
                    self.evaluate_template(text).map(Value::Str)
                } else {
                    debug!(%err, "not an expression, keeping literal text");
                    Ok(raw.clone())
                }
            }
            result => result,
        }
    }

    /// Resolves an output name pattern.
    ///
    /// Every literal `{KEY}` naming one of `values` is replaced first, without evaluation,
    /// so separators like `-` survive. Whatever braces remain are interpolated as a template.
    pub fn resolve_output_name(
        &self,
        raw_name: &str,
        values: &[(String, Value)],
    ) -> Result<String, EvalError> {
        let name = template::substitute_placeholders(raw_name, values);
        if name.contains('{') {
            self.evaluate_template(&name)
        } else {
            Ok(name)
        }
    }
}

fn binary(lhs: &Value, op: BinaryOp, rhs: &Value) -> Result<Value, EvalError> {
    let ordering = |ok: fn(Ordering) -> bool| -> Result<Value, EvalError> {
        let ordering = lhs.try_cmp(rhs, op.symbol())?;
        Ok(Value::Bool(ordering.map_or(false, ok)))
    };

    let value = match op {
        BinaryOp::Add => lhs.try_add(rhs)?,
        BinaryOp::Sub => lhs.try_sub(rhs)?,
        BinaryOp::Mul => lhs.try_mul(rhs)?,
        BinaryOp::Div => lhs.try_div(rhs)?,
        BinaryOp::Rem => lhs.try_rem(rhs)?,
        BinaryOp::Eq => Value::Bool(lhs.equals(rhs)),
        BinaryOp::Ne => Value::Bool(!lhs.equals(rhs)),
        BinaryOp::Gt => return ordering(Ordering::is_gt),
        BinaryOp::Lt => return ordering(Ordering::is_lt),
        BinaryOp::Ge => return ordering(Ordering::is_ge),
        BinaryOp::Le => return ordering(Ordering::is_le),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arity;
    use placeholder_source::SyntaxErrorKind;
    use placeholder_value::ValueError;
    use pretty_assertions::assert_eq;

    fn evaluator() -> Evaluator {
        let mut registry = FunctionRegistry::new();
        registry.register("UPPER", Arity::Exact(1), |args| {
            Ok(Value::Str(args[0].to_string().to_uppercase()))
        });
        registry.register("NOTHING", Arity::Exact(0), |_| Ok(Value::Null));
        registry.register("FIRST", Arity::AtLeast(1), |args| Ok(args[0].clone()));
        Evaluator::new(registry)
    }

    fn eval(text: &str) -> Result<Value, EvalError> {
        evaluator().evaluate_expression(text)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("10 / 4"), Ok(Value::Float(2.5)));
        assert_eq!(eval("2 + 3 * 4 - 1"), Ok(Value::Int(13)));
        assert_eq!(eval("(2 + 3) * 4"), Ok(Value::Int(20)));
        assert_eq!(eval("7 % 3"), Ok(Value::Int(1)));
        assert_eq!(eval("-7 % 3"), Ok(Value::Int(2)));
        assert_eq!(eval("1.5 + 1"), Ok(Value::Float(2.5)));
        assert_eq!(eval("'ab' + 'cd'"), Ok(Value::from("abcd")));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("5 >= 5"), Ok(Value::Bool(true)));
        assert_eq!(eval("4 >= 5"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 == 1.0"), Ok(Value::Bool(true)));
        assert_eq!(eval("'a' != 'b'"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 == 'a'"), Ok(Value::Bool(false)));
        assert_eq!(eval("'abc' < 'abd'"), Ok(Value::Bool(true)));
        assert_eq!(
            eval("1 < 'a'"),
            Err(EvalError::Value(ValueError::UnsupportedOperands {
                op: "<",
                left: "int",
                right: "str"
            }))
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-5"), Ok(Value::Int(-5)));
        assert_eq!(eval("--5"), Ok(Value::Int(5)));
        assert_eq!(eval("-2.5"), Ok(Value::Float(-2.5)));
        assert!(eval("-'a'").is_err());
    }

    #[test]
    fn test_literals_round_trip() {
        assert_eq!(eval("42"), Ok(Value::Int(42)));
        assert_eq!(eval("3.25"), Ok(Value::Float(3.25)));
        assert_eq!(eval(r"'tab\there'"), Ok(Value::from("tab\there")));
    }

    // Bare words are auto-quoted rather than looked up. Keep this behavior unless
    // variables are ever introduced deliberately.
    #[test]
    fn test_identifier_is_its_own_name() {
        assert_eq!(eval("hello"), Ok(Value::from("hello")));
        assert_eq!(eval("UPPER(hello)"), Ok(Value::from("HELLO")));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(eval("UPPER('x' + 'y')"), Ok(Value::from("XY")));
        assert_eq!(eval("FIRST(1 + 1, 'b')"), Ok(Value::Int(2)));
        assert_eq!(
            eval("MISSING(1)"),
            Err(EvalError::UnknownFunction("MISSING".to_string()))
        );
        // arguments are evaluated before the lookup
        assert_eq!(
            eval("MISSING(1 / 0)"),
            Err(EvalError::Value(ValueError::DivisionByZero))
        );
    }

    #[test]
    fn test_reregistration_uses_newest() {
        let mut evaluator = evaluator();
        evaluator
            .registry_mut()
            .register("UPPER", Arity::Exact(1), |_| Ok(Value::from("replaced")));
        assert_eq!(
            evaluator.evaluate_expression("UPPER('a')"),
            Ok(Value::from("replaced"))
        );
    }

    #[test]
    fn test_expression_must_consume_input() {
        let err = eval("1 2").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.to_string(), "unexpected token 2 at position 2");
        assert!(eval("1 < 2 < 3").unwrap_err().is_syntax());
    }

    #[test]
    fn test_template() {
        let evaluator = evaluator();
        assert_eq!(
            evaluator.evaluate_template("{1 + 1} and {2 * 3}"),
            Ok("2 and 6".to_string())
        );
        assert_eq!(
            evaluator.evaluate_template("no spans at all"),
            Ok("no spans at all".to_string())
        );
        assert_eq!(
            evaluator.evaluate_template("[{NOTHING()}]"),
            Ok("[]".to_string())
        );
        assert_eq!(
            evaluator.evaluate_template("say {UPPER('}{')}!"),
            Ok("say }{!".to_string())
        );
    }

    #[test]
    fn test_template_errors() {
        let evaluator = evaluator();
        let err = evaluator.evaluate_template("{oops").unwrap_err();
        assert_eq!(err.to_string(), "unmatched '{' at position 0");

        // positions refer to the whole template
        match evaluator.evaluate_template("ab {1 +} cd") {
            Err(EvalError::Syntax(err)) => {
                assert_eq!(err.span.start, 7);
                assert!(matches!(err.kind, SyntaxErrorKind::UnexpectedToken(_)));
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }

        assert_eq!(
            evaluator.evaluate_template("{1} {NOPE()} {1 / 0}"),
            Err(EvalError::UnknownFunction("NOPE".to_string()))
        );
    }

    #[test]
    fn test_evaluate_value_fallback() {
        let evaluator = evaluator();
        let value = |raw: &str| evaluator.evaluate_value(&Value::from(raw));

        assert_eq!(value("2 + 2"), Ok(Value::Int(4)));
        assert_eq!(value("result is {3 * 3}"), Ok(Value::from("result is 9")));
        assert_eq!(value("just some text"), Ok(Value::from("just some text")));
        assert_eq!(value("it's"), Ok(Value::from("it's")));
        assert_eq!(value(""), Ok(Value::from("")));
        assert_eq!(
            evaluator.evaluate_value(&Value::Int(7)),
            Ok(Value::Int(7))
        );
        assert_eq!(evaluator.evaluate_value(&Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_evaluate_value_keeps_evaluation_errors() {
        let evaluator = evaluator();
        assert_eq!(
            evaluator.evaluate_value(&Value::from("1 / 0")),
            Err(EvalError::Value(ValueError::DivisionByZero))
        );
        assert_eq!(
            evaluator.evaluate_value(&Value::from("NOPE()")),
            Err(EvalError::UnknownFunction("NOPE".to_string()))
        );
        assert!(evaluator
            .evaluate_value(&Value::from("broken {oops"))
            .unwrap_err()
            .is_syntax());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let evaluator = evaluator();
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        fn too_deep<T>(result: Result<T, EvalError>) -> bool {
            matches!(result, Err(EvalError::Syntax(err)) if err.kind == SyntaxErrorKind::TooDeep)
        }

        assert!(too_deep(evaluator.evaluate_expression(&deep)));
        // not mistaken for plain text
        assert!(too_deep(evaluator.evaluate_value(&Value::from(deep.as_str()))));
        assert!(too_deep(evaluator.evaluate_template(&format!("x {{{}}}", deep))));
        assert!(too_deep(evaluator.evaluate_expression(&vec!["1"; 50_000].join(" + "))));

        let nested = format!("{}1{}", "FIRST(".repeat(200), ")".repeat(200));
        assert_eq!(evaluator.evaluate_value(&Value::from(nested.as_str())), Ok(Value::Int(1)));
    }

    #[test]
    fn test_resolve_output_name() {
        let evaluator = evaluator();
        let values = vec![
            ("NUM".to_string(), Value::Int(42)),
            ("EMPTY".to_string(), Value::Null),
        ];
        assert_eq!(
            evaluator.resolve_output_name("Invoice-{NUM}", &values),
            Ok("Invoice-42".to_string())
        );
        assert_eq!(
            evaluator.resolve_output_name("a{EMPTY}b", &values),
            Ok("ab".to_string())
        );
        assert_eq!(
            evaluator.resolve_output_name("report-{UPPER('draft')}", &[]),
            Ok("report-DRAFT".to_string())
        );
        assert_eq!(
            evaluator.resolve_output_name("{NUM}-{2 * 3}", &values),
            Ok("42-6".to_string())
        );
        assert_eq!(
            evaluator.resolve_output_name("plain-name", &values),
            Ok("plain-name".to_string())
        );
    }
}
