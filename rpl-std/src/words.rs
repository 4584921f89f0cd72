use std::fs::{self, OpenOptions};
use std::io::Write;

use chrono::Local;
use rpl_core::errors::*;
use rpl_core::{format_word, tokenize, Interp};

/// Load word management and word-file tooling into the dictionary
pub fn words(interp: &mut Interp) -> Result<()> {
    interp.add_opcode("forget", |interp| {
        interp.dictionary.clear_words();
        Ok(())
    });

    interp.add_opcode("words", |interp| {
        let mut names: Vec<String> = interp
            .dictionary
            .opcode_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        names.extend(interp.dictionary.word_names().into_iter().map(str::to_string));
        names.extend(interp.variables().keys().cloned());
        names.sort();
        let line = names.join(" ");
        interp.out.push_str(&line);
        interp.out.newline();
        Ok(())
    });

    // word filename export: appends a timestamped header and the
    // pretty-printed definition to <filename>.rpn in the data directory
    interp.add_opcode("export", |interp| {
        let filename = interp.pop_string()?;
        let word_name = interp.pop_string()?;

        let definition = interp
            .dictionary
            .word(&word_name)
            .cloned()
            .ok_or_else(|| ErrorKind::UndefinedWord(word_name.clone()))?;
        if word_name.starts_with('_') {
            return Err(ErrorKind::WordNameReserved(word_name).into());
        }

        let path = interp.data_dir()?.join(with_rpn_ext(&filename));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ErrorKind::OpenExportFile(path.display().to_string(), e.to_string()))?;

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "( {} - {} )", word_name, stamp)
            .and_then(|_| writeln!(file, "{}", format_word(&word_name, &definition)))
            .and_then(|_| writeln!(file))
            .map_err(|e| ErrorKind::OpenExportFile(path.display().to_string(), e.to_string()))?;
        tracing::debug!(word = %word_name, path = %path.display(), "word exported");
        Ok(())
    });

    // filename import: evaluates the file, then runs `main` if the file
    // defined one
    interp.add_opcode("import", |interp| {
        let filename = with_rpn_ext(&interp.pop_string()?);
        let path = interp.data_dir()?.join(&filename);
        let content = fs::read_to_string(&path)
            .map_err(|e| ErrorKind::ReadWordFile(path.display().to_string(), e.to_string()))?;

        let runs_main = defines_main(&content);
        let tokens = tokenize(&content)?;
        interp.execute(&tokens)?;
        if runs_main {
            interp.call_word_by_name("main")?;
        }
        Ok(())
    });

    interp.add_opcode("list", |interp| {
        let dir = interp.data_dir()?;
        let entries = fs::read_dir(&dir)
            .map_err(|e| ErrorKind::ReadDataDir(dir.display().to_string(), e.to_string()))?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".rpn"))
            .collect();
        names.sort();

        let header = format!("RPN files in {}:", dir.display());
        interp.out.push_str(&header);
        interp.out.newline();
        if names.is_empty() {
            interp.out.push_str("  (No .rpn files found)");
            interp.out.newline();
        } else {
            for name in names {
                interp.out.push_str("  - ");
                interp.out.push_str(&name);
                interp.out.newline();
            }
        }
        Ok(())
    });

    Ok(())
}

fn with_rpn_ext(filename: &str) -> String {
    if filename.ends_with(".rpn") {
        filename.to_string()
    } else {
        format!("{}.rpn", filename)
    }
}

// true when the text contains a `: main … ;` definition
fn defines_main(content: &str) -> bool {
    match tokenize(content) {
        Ok(tokens) => tokens
            .windows(2)
            .any(|pair| pair[0] == ":" && pair[1] == "main"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::ops;
    use crate::testkit::{interp_with, scratch_dir};

    fn fixture() -> Interp {
        let mut interp = interp_with(&[words, ops]);
        interp.set_data_dir(scratch_dir());
        interp
    }

    #[test]
    fn forget_clears_all_words() {
        let mut interp = fixture();
        interp.eval(": a 1 ; : b 2 ;").unwrap();
        assert_eq!(interp.dictionary.word_names().len(), 2);
        interp.eval("forget").unwrap();
        assert!(interp.dictionary.word_names().is_empty());
    }

    #[test]
    fn words_lists_every_namespace() {
        let mut interp = fixture();
        interp.eval(": mine 1 ;").unwrap();
        interp.eval("words").unwrap();
        let listing = interp.take_output();
        assert!(listing.contains("mine"));
        assert!(listing.contains("export"));
        assert!(listing.contains("_echo_mode"));
    }

    #[test]
    fn export_appends_and_import_reloads() {
        let mut interp = fixture();
        let dir = interp.data_dir().unwrap();
        interp.eval(": double 2 * ;").unwrap();
        interp.eval("\"double\" \"lib\" export").unwrap();

        let text = fs::read_to_string(dir.join("lib.rpn")).unwrap();
        assert!(text.starts_with("( double - "));
        assert!(text.contains(": double\n  2 *\n;"));

        interp.eval("forget").unwrap();
        interp.eval("\"lib\" import").unwrap();
        interp.eval("21 double").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 42.0);
    }

    #[test]
    fn import_runs_a_main_definition() {
        let mut interp = fixture();
        let dir = interp.data_dir().unwrap();
        fs::write(dir.join("prog.rpn"), ": main 1 2 + ;\n").unwrap();
        interp.eval("\"prog\" import").unwrap();
        assert_eq!(interp.pop_number().unwrap(), 3.0);
    }

    #[test]
    fn export_requires_an_existing_word() {
        let mut interp = fixture();
        let err = interp.eval("\"ghost\" \"lib\" export").unwrap_err();
        assert_eq!(err.code(), 30);
    }

    #[test]
    fn missing_import_is_a_read_error() {
        let mut interp = fixture();
        assert_eq!(interp.eval("\"absent\" import").unwrap_err().code(), 46);
    }

    #[test]
    fn list_shows_rpn_files() {
        let mut interp = fixture();
        let dir = interp.data_dir().unwrap();
        interp.eval("list").unwrap();
        assert!(interp.take_output().contains("(No .rpn files found)"));

        fs::write(dir.join("tools.rpn"), "").unwrap();
        interp.eval("list").unwrap();
        assert!(interp.take_output().contains("  - tools.rpn"));
    }
}
