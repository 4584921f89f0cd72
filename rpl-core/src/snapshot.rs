use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::interp::Interp;
use crate::value::Value;

/// Persistent image of the interpreter: the stack, the variables, and the
/// user words, all carried as their natural JSON types.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub stack: Vec<Value>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub words: BTreeMap<String, Vec<String>>,
}

impl Interp {
    /// Per-user data directory holding snapshots and exported word files.
    /// Created on first use.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let base = match &self.data_dir_override {
            Some(path) => path.clone(),
            None => ProjectDirs::from("", "", "rpl")
                .ok_or_else(|| ErrorKind::HomeDirectory("no home directory available".to_string()))?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&base).map_err(|e| ErrorKind::DataDirectory(e.to_string()))?;
        Ok(base)
    }

    pub fn capture(&self) -> Snapshot {
        Snapshot {
            stack: self.stack.clone(),
            variables: self
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            words: self
                .dictionary
                .words()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn save_state(&mut self, filename: &str) -> Result<()> {
        let path = self.data_dir()?.join(with_json_ext(filename));
        let data = serde_json::to_string_pretty(&self.capture())
            .map_err(|e| ErrorKind::MarshalState(e.to_string()))?;
        fs::write(&path, data)
            .map_err(|e| ErrorKind::WriteState(path.display().to_string(), e.to_string()))?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    pub fn load_state(&mut self, filename: &str) -> Result<()> {
        let path = self.data_dir()?.join(with_json_ext(filename));
        let data = fs::read_to_string(&path)
            .map_err(|e| ErrorKind::ReadState(path.display().to_string(), e.to_string()))?;
        let snapshot: Snapshot =
            serde_json::from_str(&data).map_err(|e| ErrorKind::UnmarshalState(e.to_string()))?;
        self.apply_snapshot(snapshot);
        tracing::debug!(path = %path.display(), "state restored");
        Ok(())
    }

    /// Stack and words replace the current contents; variables merge so
    /// the running process keeps its internal (`_`-prefixed) values.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.stack = snapshot.stack;
        for (name, value) in snapshot.variables {
            if !name.starts_with('_') {
                self.variables.insert(name, value);
            }
        }
        self.dictionary
            .set_words(snapshot.words.into_iter().collect());
    }
}

fn with_json_ext(filename: &str) -> String {
    if filename.ends_with(".json") {
        filename.to_string()
    } else {
        format!("{}.json", filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_interp() -> Interp {
        let dir = std::env::temp_dir().join(format!(
            "rpl-core-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let mut interp = Interp::new();
        interp.set_cooperative(false);
        interp.set_data_dir(dir);
        interp
    }

    #[test]
    fn save_restore_round_trip() {
        let mut interp = scratch_interp();
        let dir = interp.data_dir().unwrap();
        interp.eval("1 \"two\" { 3 } true").unwrap();
        interp.eval(": tw 2 * ;").unwrap();
        interp
            .store_value("greeting".to_string(), Value::from("hi"))
            .unwrap();
        interp.save_state("snap").unwrap();
        assert!(dir.join("snap.json").exists());

        let mut other = scratch_interp();
        other.set_data_dir(dir);
        other.eval("99").unwrap();
        other.load_state("snap").unwrap();

        assert_eq!(other.depth(), 4);
        assert_eq!(other.variable("greeting"), Some(&Value::from("hi")));
        assert_eq!(
            other.dictionary.word("tw").map(|d| d.join(" ")),
            Some("2 *".to_string())
        );
        assert_eq!(other.pop_bool().unwrap(), true);
        let block = other.pop_block().unwrap();
        assert_eq!(&**block, &["3"]);
        assert_eq!(other.pop_string().unwrap(), "two");
        assert_eq!(other.pop_number().unwrap(), 1.0);
    }

    #[test]
    fn restore_preserves_internal_variables() {
        let mut interp = scratch_interp();
        let dir = interp.data_dir().unwrap();
        interp
            .store_value("_degree_mode".to_string(), Value::Bool(true))
            .unwrap();
        interp.save_state("modes").unwrap();

        let mut other = scratch_interp();
        other.set_data_dir(dir);
        assert!(!other.degree_mode());
        other.load_state("modes").unwrap();
        // the snapshot's _degree_mode=true must not leak into the process
        assert!(!other.degree_mode());
    }

    #[test]
    fn missing_snapshot_is_a_read_error() {
        let mut interp = scratch_interp();
        let err = interp.load_state("absent").unwrap_err();
        assert_eq!(err.code(), 44);
    }

    #[test]
    fn corrupt_snapshot_is_an_unmarshal_error() {
        let mut interp = scratch_interp();
        let dir = interp.data_dir().unwrap();
        fs::write(dir.join("bad.json"), "not json").unwrap();
        assert_eq!(interp.load_state("bad").unwrap_err().code(), 45);
    }
}
