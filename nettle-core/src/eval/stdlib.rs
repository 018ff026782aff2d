use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::prelude::{Env, Value};
use super::interpreter::Interpreter;

type NativeResult = Result<Value, String>;

/// Registers the built-in natives on `interpreter`.
pub fn install(interpreter: &mut Interpreter) {
    interpreter.register_native("len", Some(1), len);
    interpreter.register_native("type", Some(1), |args, _| Ok(Value::string(args[0].type_name())));
    interpreter.register_native("str", Some(1), |args, _| Ok(Value::string(args[0].to_string())));
    interpreter.register_native("int", Some(1), int);
    interpreter.register_native("float", Some(1), float);
    interpreter.register_native("push", Some(2), push);
    interpreter.register_native("pop", Some(1), pop);
    interpreter.register_native("keys", Some(1), keys);
    interpreter.register_native("values", Some(1), values);
    interpreter.register_native("has", Some(2), has);
    interpreter.register_native("error", None, error);
    interpreter.register_native("clock", Some(0), clock);
    interpreter.register_native("abs", Some(1), abs);
    interpreter.register_native("min", None, |args, _| extremum(args, "min", |a, b| b < a));
    interpreter.register_native("max", None, |args, _| extremum(args, "max", |a, b| b > a));
}

fn expected(what: &str, got: &Value) -> String {
    format!("expected {what}, got `{}`", got.type_name())
}

fn len(args: &[Value], _: &Env) -> NativeResult {
    let len = match &args[0] {
        Value::String { value } => value.chars().count(),
        Value::Array { items } => items.borrow().len(),
        Value::Map { entries } => entries.borrow().len(),
        other => return Err(expected("a string, array or map", other))
    };

    Ok(Value::Integer { value: len as i64 })
}

fn int(args: &[Value], _: &Env) -> NativeResult {
    let value = match &args[0] {
        Value::Integer { value } => *value,
        Value::Float { value } if value.is_finite() => value.trunc() as i64,
        Value::Boolean { value } => i64::from(*value),
        Value::String { value } => {
            let trimmed = value.trim();

            match trimmed.parse::<i64>() {
                Ok(value) => value,
                Err(_) => match trimmed.parse::<f64>() {
                    Ok(value) if value.is_finite() => value.trunc() as i64,
                    _ => return Err(format!("cannot convert \"{value}\" to int"))
                }
            }
        },
        other => return Err(expected("a number, boolean or string", other))
    };

    Ok(Value::Integer { value })
}

fn float(args: &[Value], _: &Env) -> NativeResult {
    let value = match &args[0] {
        Value::Integer { value } => *value as f64,
        Value::Float { value } => *value,
        Value::Boolean { value } => f64::from(u8::from(*value)),
        Value::String { value } => value.trim().parse::<f64>()
            .map_err(|_| format!("cannot convert \"{value}\" to float"))?,
        other => return Err(expected("a number, boolean or string", other))
    };

    Ok(Value::Float { value })
}

fn push(args: &[Value], _: &Env) -> NativeResult {
    let Value::Array { items } = &args[0] else {
        return Err(expected("an array", &args[0]));
    };

    let mut items = items.try_borrow_mut().map_err(|_| "array is in use".to_string())?;
    items.push(args[1].clone());

    Ok(Value::Integer { value: items.len() as i64 })
}

fn pop(args: &[Value], _: &Env) -> NativeResult {
    let Value::Array { items } = &args[0] else {
        return Err(expected("an array", &args[0]));
    };

    let popped = items.borrow_mut().pop();

    Ok(popped.unwrap_or(Value::Undefined))
}

fn keys(args: &[Value], _: &Env) -> NativeResult {
    let Value::Map { entries } = &args[0] else {
        return Err(expected("a map", &args[0]));
    };

    let keys = entries.borrow().keys().map(Value::string).collect();

    Ok(Value::array(keys))
}

fn values(args: &[Value], _: &Env) -> NativeResult {
    let Value::Map { entries } = &args[0] else {
        return Err(expected("a map", &args[0]));
    };

    let values = entries.borrow().values().cloned().collect();

    Ok(Value::array(values))
}

fn has(args: &[Value], _: &Env) -> NativeResult {
    let value = match (&args[0], &args[1]) {
        (Value::Map { entries }, Value::String { value }) => entries.borrow().contains_key(value),
        (Value::Array { items }, needle) => items.borrow().contains(needle),
        (Value::String { value }, Value::String { value: needle }) => value.contains(needle.as_str()),
        (container, _) => return Err(expected("a map, array or string", container))
    };

    Ok(Value::Boolean { value })
}

fn error(args: &[Value], _: &Env) -> NativeResult {
    match args {
        [message] => Ok(Value::error(message.to_string(), None)),
        [message, data] => Ok(Value::error(message.to_string(), Some(data.clone()))),
        _ => Err(format!("expects 1 or 2 argument(s), got {}", args.len()))
    }
}

fn clock(_: &[Value], _: &Env) -> NativeResult {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| err.to_string())?;

    Ok(Value::Float { value: elapsed.as_secs_f64() })
}

fn abs(args: &[Value], _: &Env) -> NativeResult {
    match &args[0] {
        Value::Integer { value } => value.checked_abs()
            .map(|value| Value::Integer { value })
            .ok_or_else(|| "integer overflow".to_string()),
        Value::Float { value } => Ok(Value::Float { value: value.abs() }),
        other => Err(expected("a number", other))
    }
}

fn extremum(args: &[Value], name: &str, replaces: fn(f64, f64) -> bool) -> NativeResult {
    let mut best: Option<(&Value, f64)> = None;

    for arg in args {
        let number = match arg {
            Value::Integer { value } => *value as f64,
            Value::Float { value } => *value,
            other => return Err(expected("numbers", other))
        };

        best = match best {
            Some((_, current)) if replaces(current, number) => Some((arg, number)),
            None => Some((arg, number)),
            kept => kept
        };
    }

    match best {
        Some((value, _)) => Ok(value.clone()),
        None => Err(format!("`{name}` needs at least one argument"))
    }
}
