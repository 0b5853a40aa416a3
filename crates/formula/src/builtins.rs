//! Builtin arithmetic.

use rhizome_formula_expression::{Symbol, Value};

use crate::env::{FunctionDef, NAMESPACE};
use crate::eval::{EvalContext, EvalError};

/// A numeric value with its width normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Double(f),
        }
    }
}

/// Result of normalizing a value: a number, or the value unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalized<'a> {
    Number(Number),
    Other(&'a Value),
}

/// Collapses float widths to `f64`; integers are already one logical type.
pub fn normalize_number(value: &Value) -> Normalized<'_> {
    match value {
        Value::Int(i) => Normalized::Number(Number::Int(*i)),
        Value::Double(d) => Normalized::Number(Number::Float(*d)),
        Value::Float(f) => Normalized::Number(Number::Float(f64::from(*f))),
        other => Normalized::Other(other),
    }
}

fn number_arg(ctx: &EvalContext, function: &str, value: &Value) -> Result<Number, EvalError> {
    match normalize_number(value) {
        Normalized::Number(n) => Ok(n),
        Normalized::Other(other) => Err(ctx.invalid_argument(function, other)),
    }
}

/// Running sum of numeric arguments.
///
/// Integer partial sums that overflow `i64` spill into `spilled`, so a float
/// anywhere in the call still yields a float result.
#[derive(Debug, Default)]
struct Sum {
    int: i64,
    spilled: f64,
    overflowed: bool,
    float: f64,
    saw_float: bool,
}

impl Sum {
    fn of(ctx: &EvalContext, function: &str, args: &[Value]) -> Result<Sum, EvalError> {
        let mut sum = Sum::default();
        for arg in args {
            match number_arg(ctx, function, arg)? {
                Number::Int(i) => match sum.int.checked_add(i) {
                    Some(total) => sum.int = total,
                    None => {
                        sum.spilled += sum.int as f64;
                        sum.int = i;
                        sum.overflowed = true;
                    }
                },
                Number::Float(f) => {
                    sum.float += f;
                    sum.saw_float = true;
                }
            }
        }
        Ok(sum)
    }

    fn as_f64(&self) -> f64 {
        self.spilled + self.int as f64 + self.float
    }

    /// The exact integer total, if every argument was an integer and the
    /// total fits in `i64`.
    fn exact_int(&self) -> Option<i64> {
        (!self.saw_float && !self.overflowed).then_some(self.int)
    }
}

fn plus(ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let sum = Sum::of(ctx, "+", args)?;
    let result = if sum.saw_float {
        Number::Float(sum.as_f64())
    } else {
        Number::Int(sum.exact_int().ok_or_else(|| ctx.integer_overflow("+"))?)
    };
    Ok(result.into_value())
}

fn minus(ctx: &EvalContext, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::Int(0));
    };
    let first = number_arg(ctx, "-", first)?;
    if rest.is_empty() {
        return match first {
            Number::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| ctx.integer_overflow("-")),
            Number::Float(f) => Ok(Value::Double(-f)),
        };
    }
    let rest = Sum::of(ctx, "-", rest)?;
    let result = match first {
        Number::Float(a) => Number::Float(a - rest.as_f64()),
        Number::Int(a) if rest.saw_float => Number::Float(a as f64 - rest.as_f64()),
        Number::Int(a) => Number::Int(
            rest.exact_int()
                .and_then(|b| a.checked_sub(b))
                .ok_or_else(|| ctx.integer_overflow("-"))?,
        ),
    };
    Ok(result.into_value())
}

/// The builtin functions, in registration order.
pub fn builtin_functions() -> Vec<FunctionDef> {
    vec![
        FunctionDef::new(Symbol::new("+", NAMESPACE), plus),
        FunctionDef::new(Symbol::new("-", NAMESPACE), minus),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&EvalContext, &[Value]) -> Result<Value, EvalError>, args: &[Value]) -> Result<Value, EvalError> {
        f(&EvalContext::default(), args)
    }

    #[test]
    fn test_plus() {
        assert_eq!(call(plus, &[]).unwrap(), Value::Int(0));
        assert_eq!(
            call(plus, &[Value::Int(1), Value::Int(2), Value::Int(-4)]).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            call(plus, &[Value::Int(1), Value::Float(0.5), Value::Int(2)]).unwrap(),
            Value::Double(3.5)
        );
    }

    #[test]
    fn test_plus_rejects_non_numbers() {
        let err = call(plus, &[Value::Int(1), Value::String("x".into())]).unwrap_err();
        match err {
            EvalError::InvalidArgument {
                function,
                value_type,
                ..
            } => {
                assert_eq!(function, "+");
                assert_eq!(value_type, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_minus() {
        assert_eq!(call(minus, &[]).unwrap(), Value::Int(0));
        assert_eq!(call(minus, &[Value::Int(5)]).unwrap(), Value::Int(-5));
        assert_eq!(call(minus, &[Value::Double(2.5)]).unwrap(), Value::Double(-2.5));
        assert_eq!(
            call(minus, &[Value::Int(10), Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            call(minus, &[Value::Int(10), Value::Double(0.5)]).unwrap(),
            Value::Double(9.5)
        );
        assert_eq!(
            call(minus, &[Value::Float(1.5), Value::Int(1)]).unwrap(),
            Value::Double(0.5)
        );
    }

    #[test]
    fn test_minus_rejects_non_numeric_first() {
        assert!(matches!(
            call(minus, &[Value::Bool(true), Value::Int(1)]),
            Err(EvalError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            call(plus, &[Value::Int(i64::MAX), Value::Int(1)]),
            Err(EvalError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            call(minus, &[Value::Int(0), Value::Int(i64::MAX), Value::Int(i64::MAX)]),
            Err(EvalError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            call(minus, &[Value::Int(i64::MIN)]),
            Err(EvalError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_float_absorbs_integer_overflow() {
        let big = Value::Int(i64::MAX);
        let expected = i64::MAX as f64 + 1.5;
        assert_eq!(
            call(plus, &[Value::Double(0.5), big.clone(), Value::Int(1)]).unwrap(),
            Value::Double(expected)
        );
        assert_eq!(
            call(plus, &[big.clone(), Value::Int(1), Value::Double(0.5)]).unwrap(),
            Value::Double(expected)
        );
        assert_eq!(
            call(minus, &[Value::Double(0.5), big.clone(), Value::Int(1)]).unwrap(),
            Value::Double(0.5 - (i64::MAX as f64 + 1.0))
        );
        assert_eq!(
            call(minus, &[Value::Int(0), big.clone(), Value::Int(1), Value::Float(0.5)]).unwrap(),
            Value::Double(-expected)
        );
    }

    #[test]
    fn test_normalize_passes_other_values_through() {
        let value = Value::String("s".into());
        assert_eq!(normalize_number(&value), Normalized::Other(&value));
        assert_eq!(
            normalize_number(&Value::Float(0.25)),
            Normalized::Number(Number::Float(0.25))
        );
        assert_eq!(normalize_number(&Value::Int(3)), Normalized::Number(Number::Int(3)));
    }
}
