use std::cmp::Ordering;

use crate::{
    environment::prelude::Value,
    lexer::prelude::Token,
    utils::prelude::SrcSpan
};
use super::error::{runtime_error, EvalResult, RuntimeErrorType};

fn invalid_operands(operator: &Token, left: &Value, right: &Value, span: SrcSpan) -> EvalResult {
    runtime_error(RuntimeErrorType::InvalidOperands {
        operator: operator.as_literal(),
        left: left.type_name(),
        right: right.type_name()
    }, span)
}

fn overflow(operator: &Token, span: SrcSpan) -> EvalResult {
    runtime_error(RuntimeErrorType::IntegerOverflow { operator: operator.as_literal() }, span)
}

fn checked(operator: &Token, result: Option<i64>, span: SrcSpan) -> EvalResult {
    match result {
        Some(value) => Ok(Value::Integer { value }),
        None => overflow(operator, span)
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Integer { value } => Some(*value as f64),
        Value::Float { value } => Some(*value),
        _ => None
    }
}

/// Applies a non-short-circuiting binary operator.
pub fn binary(operator: &Token, left: Value, right: Value, span: SrcSpan) -> EvalResult {
    match operator {
        Token::Plus | Token::Minus | Token::Star | Token::Slash |
        Token::Percent | Token::StarStar => arithmetic(operator, &left, &right, span),
        Token::Ampersand | Token::Pipe | Token::Caret | Token::ShiftLeft |
        Token::ShiftRight | Token::UnsignedShiftRight => bitwise(operator, &left, &right, span),
        Token::LessThan | Token::LessThanOrEqual |
        Token::GreaterThan | Token::GreaterThanOrEqual => compare(operator, &left, &right, span),
        Token::Equal => Ok(Value::Boolean { value: left == right }),
        Token::NotEqual => Ok(Value::Boolean { value: left != right }),
        Token::StrictEqual => Ok(Value::Boolean { value: left.identical(&right) }),
        Token::StrictNotEqual => Ok(Value::Boolean { value: !left.identical(&right) }),
        Token::DotDot => Ok(Value::string(format!("{left}{right}"))),
        _ => invalid_operands(operator, &left, &right, span)
    }
}

fn arithmetic(operator: &Token, left: &Value, right: &Value, span: SrcSpan) -> EvalResult {
    if let (Value::Integer { value: a }, Value::Integer { value: b }) = (left, right) {
        let (a, b) = (*a, *b);

        return match operator {
            Token::Plus => checked(operator, a.checked_add(b), span),
            Token::Minus => checked(operator, a.checked_sub(b), span),
            Token::Star => checked(operator, a.checked_mul(b), span),
            Token::Slash | Token::Percent if b == 0 => Ok(Value::Undefined),
            Token::Slash => match a.checked_rem(b) {
                Some(0) => checked(operator, a.checked_div(b), span),
                Some(_) => Ok(Value::Float { value: a as f64 / b as f64 }),
                None => overflow(operator, span)
            },
            // `i64::MIN % -1` is 0, not an overflow
            Token::Percent => Ok(Value::Integer { value: a.wrapping_rem(b) }),
            Token::StarStar if b < 0 => Ok(Value::Float { value: (a as f64).powf(b as f64) }),
            Token::StarStar => match u32::try_from(b) {
                Ok(exponent) => checked(operator, a.checked_pow(exponent), span),
                Err(_) if a == 0 || a == 1 => Ok(Value::Integer { value: a }),
                Err(_) => overflow(operator, span)
            },
            _ => invalid_operands(operator, left, right, span)
        };
    }

    let (Some(a), Some(b)) = (as_float(left), as_float(right)) else {
        return invalid_operands(operator, left, right, span);
    };

    let value = match operator {
        Token::Plus => a + b,
        Token::Minus => a - b,
        Token::Star => a * b,
        Token::Slash | Token::Percent if b == 0.0 => return Ok(Value::Undefined),
        Token::Slash => a / b,
        Token::Percent => a % b,
        Token::StarStar => a.powf(b),
        _ => return invalid_operands(operator, left, right, span)
    };

    Ok(Value::Float { value })
}

fn bitwise(operator: &Token, left: &Value, right: &Value, span: SrcSpan) -> EvalResult {
    let (Value::Integer { value: a }, Value::Integer { value: b }) = (left, right) else {
        return invalid_operands(operator, left, right, span);
    };

    // shift amounts are taken modulo 64
    let shift = (*b & 63) as u32;

    let value = match operator {
        Token::Ampersand => a & b,
        Token::Pipe => a | b,
        Token::Caret => a ^ b,
        Token::ShiftLeft => a.wrapping_shl(shift),
        Token::ShiftRight => a.wrapping_shr(shift),
        Token::UnsignedShiftRight => ((*a as u64) >> shift) as i64,
        _ => return invalid_operands(operator, left, right, span)
    };

    Ok(Value::Integer { value })
}

fn compare(operator: &Token, left: &Value, right: &Value, span: SrcSpan) -> EvalResult {
    let ordering = match (left, right) {
        (Value::Integer { value: a }, Value::Integer { value: b }) => Some(a.cmp(b)),
        (Value::String { value: a }, Value::String { value: b }) => Some(a.cmp(b)),
        _ => match (as_float(left), as_float(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return invalid_operands(operator, left, right, span)
        }
    };

    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(Value::Boolean { value: false });
    };

    let value = match operator {
        Token::LessThan => ordering == Ordering::Less,
        Token::LessThanOrEqual => ordering != Ordering::Greater,
        Token::GreaterThan => ordering == Ordering::Greater,
        Token::GreaterThanOrEqual => ordering != Ordering::Less,
        _ => return invalid_operands(operator, left, right, span)
    };

    Ok(Value::Boolean { value })
}

/// Applies `!`, `-` or `~`.
pub fn unary(operator: &Token, operand: Value, span: SrcSpan) -> EvalResult {
    match (operator, &operand) {
        (Token::Bang, _) => Ok(Value::Boolean { value: !operand.is_truthy() }),
        (Token::Minus, Value::Integer { value }) => checked(operator, value.checked_neg(), span),
        (Token::Minus, Value::Float { value }) => Ok(Value::Float { value: -value }),
        (Token::Tilde, Value::Integer { value }) => Ok(Value::Integer { value: !value }),
        _ => runtime_error(RuntimeErrorType::InvalidOperand {
            operator: operator.as_literal(),
            operand: operand.type_name()
        }, span)
    }
}
