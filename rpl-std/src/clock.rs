use chrono::{Datelike, Local, Timelike};
use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load time and date words into the dictionary
pub fn clock(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("time", |interp| {
        interp.push(Value::from(Local::now().format("%H:%M:%S").to_string()));
        Ok(())
    });

    interp.add_opcode("date", |interp| {
        interp.push(Value::from(Local::now().format("%Y-%m-%d").to_string()));
        Ok(())
    });

    interp.add_opcode("year", |interp| {
        interp.push(Value::Number(f64::from(Local::now().year())));
        Ok(())
    });

    interp.add_opcode("month", |interp| {
        interp.push(Value::Number(f64::from(Local::now().month())));
        Ok(())
    });

    interp.add_opcode("day", |interp| {
        interp.push(Value::Number(f64::from(Local::now().day())));
        Ok(())
    });

    interp.add_opcode("hour", |interp| {
        interp.push(Value::Number(f64::from(Local::now().hour())));
        Ok(())
    });

    interp.add_opcode("minute", |interp| {
        interp.push(Value::Number(f64::from(Local::now().minute())));
        Ok(())
    });

    interp.add_opcode("second", |interp| {
        interp.push(Value::Number(f64::from(Local::now().second())));
        Ok(())
    });

    Ok(())
}
