use rpl_core::errors::*;
use rpl_core::{Interp, Value};

/// Load snapshot words into the dictionary
pub fn state(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("save", |interp| {
        let filename = interp.pop_string()?;
        interp.save_state(&filename)?;
        Ok(())
    });

    interp.add_opcode("restore", |interp| {
        let filename = interp.pop_string()?;
        interp.load_state(&filename)?;
        Ok(())
    });

    Ok(())
}

/// Startup protocol: restore `default.json` when it exists, then run an
/// `init` variable holding a block, then an `init` word. Failures are
/// reported but never fatal.
pub fn startup(interp: &mut Interp) {
    let path = match interp.data_dir() {
        Ok(dir) => dir.join("default.json"),
        Err(e) => {
            tracing::warn!(error = %e, "no data directory at startup");
            return;
        }
    };
    if !path.exists() {
        return;
    }
    if let Err(e) = interp.load_state("default.json") {
        tracing::warn!(error = %e, "failed to restore default snapshot");
        return;
    }
    tracing::debug!(path = %path.display(), "default snapshot restored");

    if let Some(Value::Block(block)) = interp.variable("init").cloned() {
        if let Err(signal) = interp.call_scoped(&block) {
            tracing::warn!(?signal, "init variable failed");
        }
    }
    if interp.dictionary.word("init").is_some() {
        if let Err(signal) = interp.call_word_by_name("init") {
            tracing::warn!(?signal, "init word failed");
        }
    }
}
