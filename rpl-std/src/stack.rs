use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load stack manipulation words into the dictionary
pub fn stack(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("dup", |interp| {
        let a = interp.pop()?;
        interp.push(a.clone());
        interp.push(a);
        Ok(())
    });

    interp.add_opcode("drop", |interp| {
        interp.pop()?;
        Ok(())
    });

    interp.add_opcode("swap", |interp| {
        let b = interp.pop()?;
        let a = interp.pop()?;
        interp.push(b);
        interp.push(a);
        Ok(())
    });

    interp.add_opcode("rot", |interp| {
        if interp.depth() < 3 {
            return Err(ErrorKind::StackUnderflow.into());
        }
        let c = interp.pop()?;
        let b = interp.pop()?;
        let a = interp.pop()?;
        interp.push(b);
        interp.push(c);
        interp.push(a);
        Ok(())
    });

    interp.add_opcode("depth", |interp| {
        interp.push(Value::Number(interp.depth() as f64));
        Ok(())
    });

    interp.add_opcode("clear", |interp| {
        interp.clear_stack();
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::interp_with;

    #[test]
    fn dup_drop_is_neutral() {
        let mut interp = interp_with(&[stack]);
        interp.eval("\"bottom\" 42 dup drop").unwrap();
        assert_eq!(interp.depth(), 2);
        assert_eq!(interp.pop_number().unwrap(), 42.0);
        assert_eq!(interp.pop_string().unwrap(), "bottom");
    }

    #[test]
    fn swap_is_involutive() {
        let mut interp = interp_with(&[stack]);
        interp.eval("1 2 swap swap").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 2.0);
        assert_eq!(interp.pop_number().unwrap(), 1.0);
    }

    #[test]
    fn rot_cycles_three() {
        let mut interp = interp_with(&[stack]);
        interp.eval("1 2 3 rot").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 1.0);
        assert_eq!(interp.pop_number().unwrap(), 3.0);
        assert_eq!(interp.pop_number().unwrap(), 2.0);
    }

    #[test]
    fn depth_and_clear() {
        let mut interp = interp_with(&[stack]);
        interp.eval("1 2 3 depth").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 3.0);
        interp.eval("clear depth").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 0.0);
    }

    #[test]
    fn underflow_is_reported() {
        let mut interp = interp_with(&[stack]);
        assert_eq!(interp.eval("drop").unwrap_err().code(), 1);
        assert_eq!(interp.eval("1 swap").unwrap_err().code(), 1);
    }
}
