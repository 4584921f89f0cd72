use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load string words into the dictionary
///
/// `len` and `mid` work in bytes of the UTF-8 representation; `mid`
/// rejects ranges that leave `[0, len]` or cut a multi-byte character.
pub fn strings(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("len", |interp| {
        let s = interp.pop_string()?;
        interp.push(Value::Number(s.len() as f64));
        Ok(())
    });

    interp.add_opcode("mid", |interp| {
        let length = interp.pop_number()? as i64;
        let start = interp.pop_number()? as i64;
        let s = interp.pop_string()?;
        if start < 0 || length < 0 || start >= s.len() as i64 || start + length > s.len() as i64 {
            return Err(ErrorKind::StringBoundsOutOfRange.into());
        }
        let piece = s
            .get(start as usize..(start + length) as usize)
            .ok_or(ErrorKind::StringBoundsOutOfRange)?;
        interp.push(Value::from(piece));
        Ok(())
    });

    interp.add_opcode("upper", |interp| {
        let s = interp.pop_string()?;
        interp.push(Value::from(s.to_uppercase()));
        Ok(())
    });

    interp.add_opcode("lower", |interp| {
        let s = interp.pop_string()?;
        interp.push(Value::from(s.to_lowercase()));
        Ok(())
    });

    // boolean, then number, else the string unchanged
    interp.add_opcode("val", |interp| {
        let s = interp.pop_string()?;
        if s == "true" {
            interp.push(Value::Bool(true));
        } else if s == "false" {
            interp.push(Value::Bool(false));
        } else if let Ok(n) = s.parse::<f64>() {
            interp.push(Value::Number(n));
        } else {
            interp.push(Value::from(s));
        }
        Ok(())
    });

    interp.add_opcode("str", |interp| {
        let v = interp.pop()?;
        interp.push(Value::from(v.to_string()));
        Ok(())
    });

    interp.add_opcode("code", |interp| {
        let s = interp.pop_string()?;
        match s.chars().next() {
            Some(c) => {
                interp.push(Value::Number(c as u32 as f64));
                Ok(())
            }
            None => Err(ErrorKind::InvalidCharInput("empty string".to_string()).into()),
        }
    });

    interp.add_opcode("char", |interp| {
        let code = interp.pop_number()?;
        match char::from_u32(code as u32) {
            Some(c) => {
                interp.push(Value::from(c.to_string()));
                Ok(())
            }
            None => Err(ErrorKind::InvalidCharInput(code.to_string()).into()),
        }
    });

    interp.add_opcode("emit", |interp| {
        let code = interp.pop_number()?;
        match char::from_u32(code as u32) {
            Some(c) => {
                interp.out.push_char(c);
                Ok(())
            }
            None => Err(ErrorKind::InvalidCharInput(code.to_string()).into()),
        }
    });

    Ok(())
}
