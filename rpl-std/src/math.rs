use rand::Rng;
use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load the math vocabulary into the dictionary
///
/// The trigonometric words honor `_degree_mode`: inputs convert from
/// degrees going in, inverse results convert to degrees coming out.
pub fn math(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("sqrt", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.sqrt()));
        Ok(())
    });

    interp.add_opcode("pow", |interp| {
        let b = interp.pop_number()?;
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.powf(b)));
        Ok(())
    });

    interp.add_opcode("nroot", |interp| {
        let n = interp.pop_number()?;
        let x = interp.pop_number()?;
        interp.push(Value::Number(x.powf(1.0 / n)));
        Ok(())
    });

    interp.add_opcode("sq", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a * a));
        Ok(())
    });

    interp.add_opcode("sin", |interp| {
        let a = interp.pop_number()?;
        let a = to_radians(interp, a);
        interp.push(Value::Number(a.sin()));
        Ok(())
    });

    interp.add_opcode("cos", |interp| {
        let a = interp.pop_number()?;
        let a = to_radians(interp, a);
        interp.push(Value::Number(a.cos()));
        Ok(())
    });

    interp.add_opcode("tan", |interp| {
        let a = interp.pop_number()?;
        let a = to_radians(interp, a);
        interp.push(Value::Number(a.tan()));
        Ok(())
    });

    interp.add_opcode("asin", |interp| {
        let a = interp.pop_number()?;
        let res = from_radians(interp, a.asin());
        interp.push(Value::Number(res));
        Ok(())
    });

    interp.add_opcode("acos", |interp| {
        let a = interp.pop_number()?;
        let res = from_radians(interp, a.acos());
        interp.push(Value::Number(res));
        Ok(())
    });

    interp.add_opcode("atan", |interp| {
        let a = interp.pop_number()?;
        let res = from_radians(interp, a.atan());
        interp.push(Value::Number(res));
        Ok(())
    });

    interp.add_opcode("atan2", |interp| {
        let y = interp.pop_number()?;
        let x = interp.pop_number()?;
        let res = from_radians(interp, y.atan2(x));
        interp.push(Value::Number(res));
        Ok(())
    });

    interp.add_opcode("log", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.log10()));
        Ok(())
    });

    interp.add_opcode("pow10", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(10f64.powf(a)));
        Ok(())
    });

    interp.add_opcode("exp", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.exp()));
        Ok(())
    });

    interp.add_opcode("ln", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.ln()));
        Ok(())
    });

    interp.add_opcode("factorial", |interp| {
        let a = interp.pop_number()?;
        if a < 0.0 || a.fract() != 0.0 {
            return Err(ErrorKind::FactorialDomain(a.to_string()).into());
        }
        let mut result = 1.0;
        let mut k = 1.0;
        while k <= a {
            result *= k;
            k += 1.0;
        }
        interp.push(Value::Number(result));
        Ok(())
    });

    interp.add_opcode("int", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a.trunc()));
        Ok(())
    });

    interp.add_opcode("frac", |interp| {
        let a = interp.pop_number()?;
        interp.push(Value::Number(a - a.trunc()));
        Ok(())
    });

    interp.add_opcode("inv", |interp| {
        let x = interp.pop_number()?;
        if x == 0.0 {
            return Err(ErrorKind::DivisionByZero.into());
        }
        interp.push(Value::Number(1.0 / x));
        Ok(())
    });

    interp.add_opcode("pi", |interp| {
        interp.push(Value::Number(std::f64::consts::PI));
        Ok(())
    });

    interp.add_opcode("e", |interp| {
        interp.push(Value::Number(std::f64::consts::E));
        Ok(())
    });

    interp.add_opcode("phi", |interp| {
        interp.push(Value::Number((1.0 + 5f64.sqrt()) / 2.0));
        Ok(())
    });

    interp.add_opcode("rand", |interp| {
        interp.push(Value::Number(rand::thread_rng().gen::<f64>()));
        Ok(())
    });

    Ok(())
}

fn to_radians(interp: &Interp, a: f64) -> f64 {
    if interp.degree_mode() {
        a.to_radians()
    } else {
        a
    }
}

fn from_radians(interp: &Interp, a: f64) -> f64 {
    if interp.degree_mode() {
        a.to_degrees()
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::interp_with;
    use crate::vars::vars;

    #[test]
    fn basics() {
        let mut interp = interp_with(&[math]);
        interp.eval("9 sqrt").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 3.0);
        interp.eval("2 10 pow").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 1024.0);
        interp.eval("27 3 nroot").unwrap();
        assert!((interp.pop_number().unwrap() - 3.0).abs() < 1e-12);
        interp.eval("4 sq").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 16.0);
        interp.eval("5 factorial").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 120.0);
        interp.eval("3.75 int").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 3.0);
        interp.eval("3.75 frac").unwrap();
        assert!((interp.pop_number().unwrap() - 0.75).abs() < 1e-12);
        interp.eval("4 inv").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 0.25);
        interp.eval("1000 log").unwrap();
        assert!((interp.pop_number().unwrap() - 3.0).abs() < 1e-12);
        interp.eval("3 pow10").unwrap();
        assert!((interp.pop_number().unwrap() - 1000.0).abs() < 1e-9);
        interp.eval("1 exp ln").unwrap();
        assert!((interp.pop_number().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn factorial_domain() {
        let mut interp = interp_with(&[math]);
        assert_eq!(interp.eval("-1 factorial").unwrap_err().code(), 52);
        interp.clear_stack();
        assert_eq!(interp.eval("1.5 factorial").unwrap_err().code(), 52);
    }

    #[test]
    fn degree_mode_affects_trig() {
        let mut interp = interp_with(&[math, vars]);
        interp.eval("pi 2 / sin").unwrap();
        assert!((interp.pop_number().unwrap() - 1.0).abs() < 1e-12);

        interp.eval("\"_degree_mode\" set").unwrap();
        interp.eval("90 sin").unwrap();
        assert!((interp.pop_number().unwrap() - 1.0).abs() < 1e-12);
        interp.eval("1 asin").unwrap();
        assert!((interp.pop_number().unwrap() - 90.0).abs() < 1e-9);
        interp.eval("1 1 atan2").unwrap();
        assert!((interp.pop_number().unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn constants_and_rand() {
        let mut interp = interp_with(&[math]);
        interp.eval("pi").unwrap();
        assert!((interp.pop_number().unwrap() - std::f64::consts::PI).abs() < 1e-15);
        interp.eval("phi").unwrap();
        assert!((interp.pop_number().unwrap() - 1.618_033_988_749_895).abs() < 1e-12);
        interp.eval("rand").unwrap();
        let r = interp.pop_number().unwrap();
        assert!((0.0..1.0).contains(&r));
    }
}
