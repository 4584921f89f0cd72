use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load control flow words into the dictionary
///
/// `break` and `continue` raise signals rather than errors; the loop
/// bodies below intercept them, everything else lets them pass through
/// untouched so they work from inside called words.
pub fn control(interp: &mut Interp) -> Result<()> {
    // cond {then} if   |   cond {then} {else} if
    // One block is popped, then the next item decides the arity: a block
    // means if/else, a boolean or number is the condition itself.
    interp.add_opcode("if", |interp| {
        let block1 = interp.pop_block()?;
        let next = interp.pop()?;
        match next {
            Value::Block(then_block) => {
                let condition = interp.pop_bool()?;
                if condition {
                    interp.execute(&then_block)
                } else {
                    interp.execute(&block1)
                }
            }
            Value::Bool(condition) => {
                if condition {
                    interp.execute(&block1)
                } else {
                    Ok(())
                }
            }
            Value::Number(n) => {
                if n != 0.0 {
                    interp.execute(&block1)
                } else {
                    Ok(())
                }
            }
            _ => Err(ErrorKind::InvalidIfArity.into()),
        }
    });

    interp.add_opcode("loop", |interp| {
        let block = interp.pop_block()?;
        let count = interp.pop_number()? as i64;
        for j in 0..count {
            interp.check_interrupt()?;
            interp.set_loop_index(j as f64);
            match interp.execute(&block) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => continue,
                Err(fault) => return Err(fault),
            }
            interp.cooperative_yield();
        }
        interp.set_loop_index(-1.0);
        Ok(())
    });

    // {cond} {body} while
    interp.add_opcode("while", |interp| {
        let body = interp.pop_block()?;
        let condition = interp.pop_block()?;
        loop {
            interp.check_interrupt()?;
            interp.execute(&condition)?;
            let keep_going = match interp.pop()? {
                Value::Bool(b) => b,
                Value::Number(n) => n != 0.0,
                other => return Err(ErrorKind::WhileConditionType(other.type_name()).into()),
            };
            if !keep_going {
                break;
            }
            match interp.execute(&body) {
                Ok(()) => {}
                Err(Signal::Break) => break,
                Err(Signal::Continue) => continue,
                Err(fault) => return Err(fault),
            }
            interp.cooperative_yield();
        }
        Ok(())
    });

    interp.add_opcode("break", |_| Err(Signal::Break));

    interp.add_opcode("continue", |_| Err(Signal::Continue));

    interp.add_opcode("index", |interp| {
        if interp.loop_index() == -1.0 {
            return Err(ErrorKind::IndexOutsideLoop.into());
        }
        interp.push(Value::Number(interp.loop_index()));
        Ok(())
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::io;
    use crate::ops::ops;
    use crate::stack::stack;
    use crate::testkit::interp_with;
    use std::thread;
    use std::time::{Duration, Instant};

    fn fixture() -> Interp {
        interp_with(&[control, ops, stack, io])
    }

    #[test]
    fn simple_if() {
        let mut interp = fixture();
        interp.eval("true { \"yes\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "yes");

        interp.eval("0 { \"t\" } if").unwrap();
        assert_eq!(interp.depth(), 0);

        interp.eval("1 { \"t\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "t");
    }

    #[test]
    fn if_else() {
        let mut interp = fixture();
        interp.eval("true { \"yes\" } { \"no\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "yes");
        interp.eval("false { \"yes\" } { \"no\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "no");
    }

    #[test]
    fn if_rejects_bad_condition() {
        let mut interp = fixture();
        assert_eq!(interp.eval("\"s\" { 1 } if").unwrap_err().code(), 9);
    }

    #[test]
    fn loop_counts_and_indexes() {
        let mut interp = fixture();
        interp.eval("5 { index . } loop").unwrap();
        assert_eq!(interp.take_output(), "01234");
        assert_eq!(interp.depth(), 0);
        assert_eq!(interp.eval("index").unwrap_err().code(), 10);
    }

    #[test]
    fn while_counts_up() {
        let mut interp = fixture();
        interp.eval("1 { dup 10 < } { dup 1 + } while").unwrap();
        // 1 2 ... 10 accumulate; the condition leaves the last value
        assert_eq!(interp.pop_number().unwrap(), 10.0);
        assert_eq!(interp.depth(), 9);
    }

    #[test]
    fn while_condition_type() {
        let mut interp = fixture();
        assert_eq!(
            interp.eval("{ \"s\" } { 1 } while").unwrap_err().code(),
            49
        );
    }

    #[test]
    fn break_and_continue() {
        let mut interp = fixture();
        interp.eval("10 { index 3 == { break } if index . } loop").unwrap();
        assert_eq!(interp.take_output(), "012");

        interp
            .eval("5 { index 2 == { continue } if index . } loop")
            .unwrap();
        assert_eq!(interp.take_output(), "0134");
    }

    #[test]
    fn break_escapes_through_words() {
        let mut interp = fixture();
        interp.eval(": bail break ;").unwrap();
        interp.eval("10 { index 2 == { bail } if index . } loop").unwrap();
        assert_eq!(interp.take_output(), "01");
    }

    #[test]
    fn stray_break_is_silent() {
        let mut interp = fixture();
        interp.eval("break").unwrap();
        assert!(!interp.boolean_flag("_error"));
    }

    #[test]
    fn interrupt_stops_a_loop() {
        let mut interp = fixture();
        let flag = interp.interrupt_flag();
        let ticker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.raise();
        });
        let started = Instant::now();
        let err = interp.eval("999999999 { } loop").unwrap_err();
        assert_eq!(err.code(), 51);
        assert!(started.elapsed() < Duration::from_secs(5));
        ticker.join().unwrap();
    }
}
