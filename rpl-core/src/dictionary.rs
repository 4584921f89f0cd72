use std::collections::HashMap;

use crate::errors::Outcome;
use crate::interp::Interp;

/// A built-in primitive.
pub type Opcode = fn(&mut Interp) -> Outcome;

/// Syntactic keywords the evaluator handles inline. They occupy opcode
/// slots with no function so name-conflict checks see them, matching the
/// lookup precedence of real opcodes.
const RESERVED: &[&str] = &[
    ":", ";", "delete", "edit", "editfile", "see", "(", ")", "{", "}", "\"",
];

/// Opcode table and user word store. Opcodes are fixed after the standard
/// vocabulary is installed; words change via `: … ;`, `delete` and
/// `forget`.
#[derive(Debug, Default)]
pub struct Dictionary {
    opcodes: HashMap<String, Option<Opcode>>,
    words: HashMap<String, Vec<String>>,
}

impl Dictionary {
    pub fn new() -> Self {
        let mut dict = Dictionary {
            opcodes: HashMap::new(),
            words: HashMap::new(),
        };
        for name in RESERVED {
            dict.opcodes.insert(name.to_string(), None);
        }
        dict
    }

    pub fn add_opcode(&mut self, name: &str, op: Opcode) {
        self.opcodes.insert(name.to_string(), Some(op));
    }

    pub fn opcode(&self, name: &str) -> Option<&Option<Opcode>> {
        self.opcodes.get(name)
    }

    pub fn is_opcode(&self, name: &str) -> bool {
        self.opcodes.contains_key(name)
    }

    pub fn opcode_names(&self) -> Vec<&str> {
        self.opcodes.keys().map(String::as_str).collect()
    }

    pub fn define_word(&mut self, name: String, definition: Vec<String>) {
        self.words.insert(name, definition);
    }

    pub fn word(&self, name: &str) -> Option<&Vec<String>> {
        self.words.get(name)
    }

    pub fn delete_word(&mut self, name: &str) -> bool {
        self.words.remove(name).is_some()
    }

    pub fn word_names(&self) -> Vec<&str> {
        self.words.keys().map(String::as_str).collect()
    }

    pub fn words(&self) -> &HashMap<String, Vec<String>> {
        &self.words
    }

    pub fn set_words(&mut self, words: HashMap<String, Vec<String>>) {
        self.words = words;
    }

    pub fn clear_words(&mut self) {
        self.words.clear();
    }
}
