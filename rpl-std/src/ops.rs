use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load arithmetic, comparison, and boolean operations into the dictionary
pub fn ops(interp: &mut Interp) -> Result<()> {
    // `+` also concatenates when both operands are strings
    interp.add_opcode("+", |interp| {
        let b = interp.pop()?;
        let a = interp.pop()?;
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => interp.push(Value::Number(a + b)),
            (Value::Str(a), Value::Str(b)) => {
                interp.push(Value::from(format!("{}{}", a, b)));
            }
            (a @ Value::Number(_), b) | (a @ Value::Str(_), b) => {
                return Err(ErrorKind::AddTypeMismatch(a.type_name(), b.type_name()).into());
            }
            (a, _) => return Err(ErrorKind::AddTypeMismatchSingle(a.type_name()).into()),
        }
        Ok(())
    });

    interp.add_opcode("-", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Number(a - b));
        Ok(())
    });

    interp.add_opcode("*", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Number(a * b));
        Ok(())
    });

    // the divisor is checked before the dividend is popped, so a failed
    // division leaves the dividend in place
    interp.add_opcode("/", |interp| {
        let b = interp.pop_number()?;
        if b == 0.0 {
            return Err(ErrorKind::DivisionByZero.into());
        }
        let a = interp.pop_number()?;
        interp.push(Value::Number(a / b));
        Ok(())
    });

    interp.add_opcode("mod", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Number(a % b));
        Ok(())
    });

    // percentage of total, not modulo
    interp.add_opcode("%", |interp| {
        let total = interp.pop_number()?;
        if total == 0.0 {
            return Err(ErrorKind::DivisionByZero.into());
        }
        let value = interp.pop_number()?;
        interp.push(Value::Number(value / total * 100.0));
        Ok(())
    });

    interp.add_opcode("==", |interp| {
        let b = interp.pop()?;
        let a = interp.pop()?;
        interp.push(Value::Bool(same_value(&a, &b)));
        Ok(())
    });

    interp.add_opcode("!=", |interp| {
        let b = interp.pop()?;
        let a = interp.pop()?;
        interp.push(Value::Bool(!same_value(&a, &b)));
        Ok(())
    });

    interp.add_opcode(">", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Bool(a > b));
        Ok(())
    });

    interp.add_opcode("<", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Bool(a < b));
        Ok(())
    });

    interp.add_opcode(">=", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Bool(a >= b));
        Ok(())
    });

    interp.add_opcode("<=", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Bool(a <= b));
        Ok(())
    });

    interp.add_opcode("true", |interp| {
        interp.push(Value::Bool(true));
        Ok(())
    });

    interp.add_opcode("false", |interp| {
        interp.push(Value::Bool(false));
        Ok(())
    });

    interp.add_opcode("and", |interp| {
        let b = interp.pop_bool()?;
        let a = interp.pop_bool()?;
        interp.push(Value::Bool(a && b));
        Ok(())
    });

    interp.add_opcode("or", |interp| {
        let b = interp.pop_bool()?;
        let a = interp.pop_bool()?;
        interp.push(Value::Bool(a || b));
        Ok(())
    });

    interp.add_opcode("not", |interp| {
        let a = interp.pop_bool()?;
        interp.push(Value::Bool(!a));
        Ok(())
    });

    interp.add_opcode("xor", |interp| {
        let b = interp.pop_bool()?;
        let a = interp.pop_bool()?;
        interp.push(Value::Bool(a != b));
        Ok(())
    });

    Ok(())
}

// equality never errors: differing variants simply compare unequal
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}
