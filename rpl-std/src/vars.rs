use rpl_core::errors::*;
use rpl_core::Interp;

/// Load variable management words into the dictionary
///
/// Names beginning with `$` live in the innermost scope frame of the
/// current word call; everything else is global. The scoping and
/// internal-name rules are enforced by the interpreter's store/load
/// primitives.
pub fn vars(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("store", |interp| {
        let name = interp.pop_string()?;
        if name.contains(' ') {
            return Err(ErrorKind::SpaceInName(name).into());
        }
        let value = interp.pop()?;
        interp.store_value(name, value)?;
        Ok(())
    });

    interp.add_opcode("load", |interp| {
        let name = interp.pop_string()?;
        let value = interp.load_value(&name)?;
        interp.push(value);
        Ok(())
    });

    interp.add_opcode("set", |interp| {
        let name = interp.pop_string()?;
        interp.assign_bool(name, true)?;
        Ok(())
    });

    interp.add_opcode("unset", |interp| {
        let name = interp.pop_string()?;
        interp.assign_bool(name, false)?;
        Ok(())
    });

    interp.add_opcode("toggle", |interp| {
        let name = interp.pop_string()?;
        interp.toggle_bool(name)?;
        Ok(())
    });

    interp.add_opcode("free", |interp| {
        interp.free_variables();
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::ops;
    use crate::testkit::interp_with;
    use rpl_core::Value;

    fn fixture() -> Interp {
        interp_with(&[vars, ops])
    }

    #[test]
    fn store_and_load() {
        let mut interp = fixture();
        interp.eval("42 \"answer\" store").unwrap();
        interp.eval("\"answer\" load").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 42.0);
        // bare name pushes too
        interp.eval("answer").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 42.0);
    }

    #[test]
    fn store_rejects_opcode_names() {
        let mut interp = fixture();
        let err = interp.eval("1 \"store\" store").unwrap_err();
        assert_eq!(err.code(), 11);
        assert!(interp.variable("store").is_none());
        let err = interp.eval("1 \"two words\" store").unwrap_err();
        assert_eq!(err.code(), 55);
    }

    #[test]
    fn locals_need_a_scope() {
        let mut interp = fixture();
        assert_eq!(interp.eval("1 \"$x\" store").unwrap_err().code(), 56);
    }

    #[test]
    fn scope_isolation() {
        let mut interp = fixture();
        interp.eval("7 \"x\" store").unwrap();
        interp
            .eval(": inner 1 \"$x\" store \"$x\" load ;")
            .unwrap();
        interp
            .eval(": outer 2 \"$x\" store inner \"$x\" load ;")
            .unwrap();
        interp.eval("outer").unwrap();
        // inner saw its own $x, outer's survived, the global x is untouched
        assert_eq!(interp.pop_number().unwrap(), 2.0);
        assert_eq!(interp.pop_number().unwrap(), 1.0);
        interp.eval("x").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 7.0);
    }

    #[test]
    fn inner_scopes_can_read_outer_locals() {
        let mut interp = fixture();
        interp.eval(": reader \"$shared\" load ;").unwrap();
        interp
            .eval(": driver 5 \"$shared\" store reader ;")
            .unwrap();
        interp.eval("driver").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 5.0);
    }

    #[test]
    fn undefined_local_and_global() {
        let mut interp = fixture();
        assert_eq!(interp.eval("\"$ghost\" load").unwrap_err().code(), 15);
        assert_eq!(interp.eval("\"ghost\" load").unwrap_err().code(), 15);
    }

    #[test]
    fn set_unset_toggle() {
        let mut interp = fixture();
        interp.eval("\"flag\" set").unwrap();
        assert_eq!(interp.variable("flag"), Some(&Value::Bool(true)));
        interp.eval("\"flag\" unset").unwrap();
        assert_eq!(interp.variable("flag"), Some(&Value::Bool(false)));
        interp.eval("\"flag\" toggle").unwrap();
        assert_eq!(interp.variable("flag"), Some(&Value::Bool(true)));

        assert_eq!(interp.eval("\"ghost\" toggle").unwrap_err().code(), 15);
        interp.eval("1 \"n\" store").unwrap();
        assert_eq!(interp.eval("\"n\" toggle").unwrap_err().code(), 4);
        // _error is boolean but not user-mutable
        assert_eq!(interp.eval("\"_error\" toggle").unwrap_err().code(), 14);
        assert_eq!(interp.eval("\"_new_one\" set").unwrap_err().code(), 12);
        interp.eval("\"_degree_mode\" toggle").unwrap();
        assert!(interp.degree_mode());
    }

    #[test]
    fn free_keeps_internals() {
        let mut interp = fixture();
        interp.eval("1 \"a\" store 2 \"b\" store").unwrap();
        interp.eval("free").unwrap();
        assert!(interp.variable("a").is_none());
        assert!(interp.variable("b").is_none());
        assert!(interp.variable("_echo_mode").is_some());
    }
}
