use rpl_core::errors::Result;
use rpl_core::Interp;

use crate::clock::clock;
use crate::control::control;
use crate::io::io;
use crate::math::math;
use crate::ops::ops;
use crate::stack::stack;
use crate::state::state;
use crate::strings::strings;
use crate::vars::vars;
use crate::words::words;

/// Load the whole standard vocabulary into the dictionary
pub fn stdlib(interp: &mut Interp) -> Result<()> {
    ops(interp)?;
    math(interp)?;
    stack(interp)?;
    strings(interp)?;
    control(interp)?;
    vars(interp)?;
    words(interp)?;
    clock(interp)?;
    io(interp)?;
    state(interp)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::interp_with;
    use rpl_core::Value;

    fn fixture() -> Interp {
        interp_with(&[stdlib])
    }

    #[test]
    fn addition() {
        let mut interp = fixture();
        interp.eval("2 3 +").unwrap();
        assert_eq!(interp.depth(), 1);
        assert_eq!(interp.pop_number().unwrap(), 5.0);
    }

    #[test]
    fn division_by_zero_effects() {
        let mut interp = fixture();
        let err = interp.eval("10 0 /").unwrap_err();
        assert_eq!(err.code(), 2);
        assert_eq!(interp.depth(), 1);
        assert_eq!(interp.variable("_last_x"), Some(&Value::Number(0.0)));
        assert!(interp.boolean_flag("_error"));
        assert_eq!(interp.variable("_last_error"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn square_word() {
        let mut interp = fixture();
        interp.eval(": square dup * ; 4 square").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 16.0);
        assert!(interp.dictionary.word("square").is_some());
    }

    #[test]
    fn loop_prints_indexes_in_order() {
        let mut interp = fixture();
        interp.eval("5 { index . } loop").unwrap();
        assert_eq!(interp.take_output(), "01234");
    }

    #[test]
    fn while_counts_to_ten() {
        let mut interp = fixture();
        interp.eval("1 { dup 10 < } { dup 1 + } while").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 10.0);
    }

    #[test]
    fn if_selects_branches() {
        let mut interp = fixture();
        interp.eval("true { \"yes\" } { \"no\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "yes");
        interp.eval("false { \"yes\" } { \"no\" } if").unwrap();
        assert_eq!(interp.pop_string().unwrap(), "no");
        interp.eval("0 { \"t\" } if").unwrap();
        assert_eq!(interp.depth(), 0);
    }

    #[test]
    fn defining_an_opcode_name_fails_without_side_effects() {
        let mut interp = fixture();
        let before = interp.depth();
        let err = interp.eval(": dup 1 ;").unwrap_err();
        assert_eq!(err.code(), 18);
        assert_eq!(interp.depth(), before);
        assert!(interp.dictionary.word("dup").is_none());

        let err = interp.eval("1 \"dup\" store").unwrap_err();
        assert_eq!(err.code(), 11);
        assert!(interp.variable("dup").is_none());
        interp.clear_stack();
    }

    #[test]
    fn comment_transparency_end_to_end() {
        let mut a = fixture();
        let mut b = fixture();
        a.eval(": sq dup * ; 3 sq 1 +").unwrap();
        b.eval(": sq ( n -- n*n ) dup * ; 3 ( the input ) sq 1 +")
            .unwrap();
        assert_eq!(a.stack, b.stack);
    }

    #[test]
    fn percentage_and_modulo_are_distinct() {
        let mut interp = fixture();
        interp.eval("25 100 %").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 25.0);
        interp.eval("25 100 mod").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 25.0);
        interp.eval("100 25 mod").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 0.0);
    }
}
