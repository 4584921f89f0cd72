use rpl_core::errors::*;
use rpl_core::Interp;

/// Load output and input words into the dictionary
pub fn io(interp: &mut Interp) -> Result<()> {
    interp.add_opcode(".", |interp| {
        let value = interp.pop()?;
        let text = value.to_string();
        interp.out.push_str(&text);
        Ok(())
    });

    // alias of `.`
    interp.add_opcode("print", |interp| {
        let value = interp.pop()?;
        let text = value.to_string();
        interp.out.push_str(&text);
        Ok(())
    });

    interp.add_opcode("cr", |interp| {
        interp.out.newline();
        Ok(())
    });

    interp.add_opcode("cls", |interp| {
        interp.out.clear();
        Ok(())
    });

    // blocks on the rendezvous until the front end answers
    interp.add_opcode("prompt", |interp| {
        let message = interp.pop_string()?;
        let line = interp.prompt_request(message)?;
        interp.push(line.into());
        Ok(())
    });

    Ok(())
}
