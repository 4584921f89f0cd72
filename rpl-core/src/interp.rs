use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use crate::dictionary::{Dictionary, Opcode};
use crate::errors::*;
use crate::interrupt::InterruptFlag;
use crate::output::OutputBuffer;
use crate::parsing::{parse_block, tokenize};
use crate::prompt::{prompt_channel, PromptHandle, PromptPort};
use crate::value::Value;

/// Internal variables user code may assign, and only to booleans.
const MUTABLE_INTERNALS: &[&str] = &[
    "_echo_mode",
    "_degree_mode",
    "_vars_value",
    "_stack_type",
    "_hidden_vars",
    "_exit_save",
];

const BUILD_VERSION: &str = match option_env!("RPL_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// The interpreter: value stack, dictionaries, scope stack, loop state,
/// output buffer, and the interruption/prompt endpoints. Owned by a
/// single worker thread; only `InterruptFlag` and `PromptHandle` cross
/// thread boundaries.
#[derive(Debug)]
pub struct Interp {
    pub stack: Vec<Value>,
    pub dictionary: Dictionary,
    pub out: OutputBuffer,
    pub(crate) variables: HashMap<String, Value>,
    scopes: Vec<HashMap<String, Value>>,
    loop_index: f64,
    interrupt: InterruptFlag,
    prompt: PromptPort,
    prompt_handle: PromptHandle,
    pending_edit: Option<String>,
    pending_edit_file: Option<PathBuf>,
    pub(crate) data_dir_override: Option<PathBuf>,
    cooperative: bool,
}

impl Interp {
    pub fn new() -> Self {
        let (prompt, prompt_handle) = prompt_channel();
        let mut interp = Interp {
            stack: Vec::new(),
            dictionary: Dictionary::new(),
            out: OutputBuffer::new(),
            variables: HashMap::new(),
            scopes: Vec::new(),
            loop_index: -1.0,
            interrupt: InterruptFlag::new(),
            prompt,
            prompt_handle,
            pending_edit: None,
            pending_edit_file: None,
            data_dir_override: None,
            cooperative: true,
        };
        interp.install_internals();
        interp
    }

    fn install_internals(&mut self) {
        self.set_internal("_echo_mode", Value::Bool(true));
        self.set_internal("_degree_mode", Value::Bool(false));
        self.set_internal("_vars_value", Value::Bool(true));
        self.set_internal("_stack_type", Value::Bool(false));
        self.set_internal("_hidden_vars", Value::Bool(false));
        self.set_internal("_exit_save", Value::Bool(false));
        self.set_internal("_last_error", Value::Number(0.0));
        self.set_internal("_error", Value::Bool(false));
        self.set_internal("_last_x", Value::Nil);
        self.set_internal("_version", Value::Number(parse_version(BUILD_VERSION)));
    }

    /// Engine-side write that bypasses the internal-variable protections.
    pub(crate) fn set_internal(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn add_opcode(&mut self, name: &str, op: Opcode) {
        self.dictionary.add_opcode(name, op);
    }

    // ----- stack -----

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Every successful pop records the popped value in `_last_x`.
    pub fn pop(&mut self) -> Result<Value> {
        let value = self.stack.pop().ok_or(ErrorKind::StackUnderflow)?;
        self.variables.insert("_last_x".to_string(), value.clone());
        Ok(value)
    }

    pub fn pop_number(&mut self) -> Result<f64> {
        match self.pop()? {
            Value::Number(n) => Ok(n),
            Value::Bool(true) => Ok(1.0),
            Value::Bool(false) => Ok(0.0),
            other => Err(ErrorKind::ExpectedNumber(other.type_name()).into()),
        }
    }

    pub fn pop_bool(&mut self) -> Result<bool> {
        match self.pop()? {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n != 0.0),
            other => Err(ErrorKind::ExpectedBoolean(other.type_name()).into()),
        }
    }

    pub fn pop_string(&mut self) -> Result<String> {
        match self.pop()? {
            Value::Str(s) => Ok((*s).clone()),
            other => Err(ErrorKind::ExpectedString(other.type_name()).into()),
        }
    }

    pub fn pop_block(&mut self) -> Result<Rc<Vec<String>>> {
        match self.pop()? {
            Value::Block(tokens) => Ok(tokens),
            other => Err(ErrorKind::ExpectedBlock(other.type_name()).into()),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    // ----- variables -----

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// True when `name` holds boolean true.
    pub fn boolean_flag(&self, name: &str) -> bool {
        matches!(self.variables.get(name), Some(Value::Bool(true)))
    }

    pub fn degree_mode(&self) -> bool {
        self.boolean_flag("_degree_mode")
    }

    /// Assign `value` to `name`, enforcing the scoping and protection
    /// rules: `$`-names go to the innermost scope frame, opcode names are
    /// rejected, and internal names accept only booleans from the
    /// mutable set.
    pub fn store_value(&mut self, name: String, value: Value) -> Result<()> {
        if name.contains(' ') {
            return Err(ErrorKind::SpaceInName(name).into());
        }
        if name.starts_with('$') {
            return match self.scopes.last_mut() {
                Some(scope) => {
                    scope.insert(name, value);
                    Ok(())
                }
                None => Err(ErrorKind::LocalInGlobalScope(name).into()),
            };
        }
        if self.dictionary.is_opcode(&name) {
            return Err(ErrorKind::NameConflictsOpcode(name).into());
        }
        if name.starts_with('_') {
            if !self.variables.contains_key(&name) {
                return Err(ErrorKind::ReservedInternalName(name).into());
            }
            if !MUTABLE_INTERNALS.contains(&name.as_str()) {
                return Err(ErrorKind::InternalImmutable(name).into());
            }
            if !matches!(value, Value::Bool(_)) {
                return Err(ErrorKind::InternalNotBoolean(name).into());
            }
        }
        self.variables.insert(name, value);
        Ok(())
    }

    /// `set` / `unset`: assign a boolean under the same protection rules.
    pub fn assign_bool(&mut self, name: String, value: bool) -> Result<()> {
        if self.dictionary.is_opcode(&name) {
            return Err(ErrorKind::NameConflictsOpcode(name).into());
        }
        if name.starts_with('_') {
            if !self.variables.contains_key(&name) {
                return Err(ErrorKind::ReservedInternalName(name).into());
            }
            if !MUTABLE_INTERNALS.contains(&name.as_str()) {
                return Err(ErrorKind::InternalImmutable(name).into());
            }
        }
        self.variables.insert(name, Value::Bool(value));
        Ok(())
    }

    pub fn toggle_bool(&mut self, name: String) -> Result<()> {
        if self.dictionary.is_opcode(&name) {
            return Err(ErrorKind::NameConflictsOpcode(name).into());
        }
        let current = match self.variables.get(&name) {
            Some(Value::Bool(b)) => *b,
            Some(other) => return Err(ErrorKind::ExpectedBoolean(other.type_name()).into()),
            None => return Err(ErrorKind::UndefinedVariable(name).into()),
        };
        if name.starts_with('_') && !MUTABLE_INTERNALS.contains(&name.as_str()) {
            return Err(ErrorKind::InternalImmutable(name).into());
        }
        self.variables.insert(name, Value::Bool(!current));
        Ok(())
    }

    /// `$`-names search the scope stack innermost-first; anything else
    /// reads globals.
    pub fn load_value(&self, name: &str) -> Result<Value> {
        if name.starts_with('$') {
            for scope in self.scopes.iter().rev() {
                if let Some(value) = scope.get(name) {
                    return Ok(value.clone());
                }
            }
            return Err(ErrorKind::UndefinedVariable(name.to_string()).into());
        }
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::UndefinedVariable(name.to_string()).into())
    }

    /// Delete every non-internal global variable.
    pub fn free_variables(&mut self) {
        self.variables.retain(|name, _| name.starts_with('_'));
    }

    // ----- loop state -----

    pub fn loop_index(&self) -> f64 {
        self.loop_index
    }

    pub fn set_loop_index(&mut self, index: f64) {
        self.loop_index = index;
    }

    // ----- interruption, prompt, host plumbing -----

    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    pub fn check_interrupt(&mut self) -> Outcome {
        if self.interrupt.take() {
            return Err(ErrorKind::Interrupted.into());
        }
        Ok(())
    }

    /// Brief sleep after each token and loop iteration so a worker thread
    /// stays a cooperative citizen. Hosts running untimed batch work can
    /// switch it off.
    pub fn cooperative_yield(&self) {
        if self.cooperative {
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn set_cooperative(&mut self, on: bool) {
        self.cooperative = on;
    }

    pub fn prompt_handle(&self) -> PromptHandle {
        self.prompt_handle.clone()
    }

    pub fn prompt_request(&mut self, message: String) -> Result<String> {
        self.prompt.request(message)
    }

    pub fn print(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn take_output(&mut self) -> String {
        self.out.take()
    }

    /// Line prepared by `edit` for the host input field.
    pub fn take_pending_edit(&mut self) -> Option<String> {
        self.pending_edit.take()
    }

    /// File selected by `editfile` for the host editor.
    pub fn take_pending_edit_file(&mut self) -> Option<PathBuf> {
        self.pending_edit_file.take()
    }

    pub fn set_data_dir(&mut self, path: PathBuf) {
        self.data_dir_override = Some(path);
    }

    // ----- evaluation -----

    /// Tokenize and execute one command. Drains a stale interrupt first;
    /// on a fault, `_error` and `_last_error` are updated before the
    /// error is handed to the caller. A stray break/continue ends the
    /// command silently.
    pub fn eval(&mut self, line: &str) -> Result<()> {
        self.interrupt.drain();
        self.set_internal("_error", Value::Bool(false));
        let result = tokenize(line)
            .map_err(Signal::from)
            .and_then(|tokens| self.execute(&tokens));
        match result {
            Ok(()) | Err(Signal::Break) | Err(Signal::Continue) => Ok(()),
            Err(Signal::Fault(e)) => {
                self.set_internal("_error", Value::Bool(true));
                self.set_internal("_last_error", Value::Number(f64::from(e.code())));
                Err(e)
            }
        }
    }

    /// Drive the cursor over a token sequence. Blocks run through here in
    /// the caller's scope; words and auto-quoted variables push a scope
    /// frame first via `call_scoped`.
    pub fn execute(&mut self, tokens: &[String]) -> Outcome {
        let mut comment_depth = 0usize;
        let mut j = 0;
        while j < tokens.len() {
            self.check_interrupt()?;
            let token = tokens[j].as_str();

            if comment_depth > 0 {
                match token {
                    "(" => comment_depth += 1,
                    ")" => comment_depth -= 1,
                    _ => {}
                }
                j += 1;
                continue;
            }
            if token == "(" {
                comment_depth += 1;
                j += 1;
                continue;
            }

            if token.len() > 1 && token.starts_with('"') && token.ends_with('"') {
                self.push(Value::from(&token[1..token.len() - 1]));
                j += 1;
                self.cooperative_yield();
                continue;
            }

            match token {
                ":" => j = self.handle_define(tokens, j)?,
                ";" => return Err(ErrorKind::SemicolonOutOfContext.into()),
                "{" => {
                    let (inner, end) = parse_block(tokens, j)?;
                    self.push(Value::from(inner));
                    j = end + 1;
                }
                "delete" => j = self.handle_delete(tokens, j)?,
                "see" => j = self.handle_see(tokens, j)?,
                "edit" => j = self.handle_edit(tokens, j)?,
                "editfile" => return self.handle_editfile(tokens, j),
                _ => {
                    self.dispatch(token)?;
                    j += 1;
                }
            }
            self.cooperative_yield();
        }
        if comment_depth > 0 {
            return Err(ErrorKind::UnmatchedOpenParen.into());
        }
        Ok(())
    }

    fn dispatch(&mut self, token: &str) -> Outcome {
        if let Some(entry) = self.dictionary.opcode(token).copied() {
            return match entry {
                Some(op) => op(self),
                None => match token {
                    ")" => Err(ErrorKind::UnmatchedParen.into()),
                    "}" => Err(ErrorKind::UnmatchedBrace.into()),
                    _ => Err(ErrorKind::UnrecognizedToken(token.to_string()).into()),
                },
            };
        }
        if let Some(name) = token.strip_prefix("word:") {
            return match self.dictionary.word(name).cloned() {
                Some(definition) => self.call_scoped(&definition),
                None => Err(ErrorKind::UndefinedWord(name.to_string()).into()),
            };
        }
        if let Some(name) = token.strip_prefix("var:") {
            return match self.variables.get(name).cloned() {
                Some(Value::Block(block)) => self.call_scoped(&block),
                Some(value) => {
                    self.push(value);
                    Ok(())
                }
                None => Err(ErrorKind::UndefinedVariable(name.to_string()).into()),
            };
        }
        if let Some(definition) = self.dictionary.word(token).cloned() {
            return self.call_scoped(&definition);
        }
        if let Some(value) = self.variables.get(token).cloned() {
            return match value {
                Value::Block(block) => self.call_scoped(&block),
                value => {
                    self.push(value);
                    Ok(())
                }
            };
        }
        match token {
            "true" => {
                self.push(Value::Bool(true));
                Ok(())
            }
            "false" => {
                self.push(Value::Bool(false));
                Ok(())
            }
            _ => match token.parse::<f64>() {
                Ok(n) => {
                    self.push(Value::Number(n));
                    Ok(())
                }
                Err(_) => Err(ErrorKind::UnrecognizedToken(token.to_string()).into()),
            },
        }
    }

    /// Execute `tokens` inside a fresh scope frame. The frame is popped
    /// whether the body succeeds, faults, or signals.
    pub fn call_scoped(&mut self, tokens: &[String]) -> Outcome {
        self.scopes.push(HashMap::new());
        let result = self.execute(tokens);
        self.scopes.pop();
        result
    }

    pub fn call_word_by_name(&mut self, name: &str) -> Outcome {
        match self.dictionary.word(name).cloned() {
            Some(definition) => self.call_scoped(&definition),
            None => Err(ErrorKind::UndefinedWord(name.to_string()).into()),
        }
    }

    // ----- syntactic handlers -----

    fn handle_define(&mut self, tokens: &[String], j: usize) -> Result<usize> {
        if tokens.len() < j + 3 {
            return Err(ErrorKind::InvalidDefinition.into());
        }
        let name = tokens[j + 1].clone();
        if name.starts_with('_') {
            return Err(ErrorKind::WordNameReserved(name).into());
        }
        if self.dictionary.is_opcode(&name) {
            return Err(ErrorKind::WordNameConflictsOpcode(name).into());
        }
        let mut k = j + 2;
        let mut definition = Vec::new();
        while k < tokens.len() && tokens[k] != ";" {
            definition.push(tokens[k].clone());
            k += 1;
        }
        self.dictionary.define_word(name, definition);
        Ok(k + 1)
    }

    fn handle_delete(&mut self, tokens: &[String], j: usize) -> Result<usize> {
        let operand = tokens.get(j + 1).ok_or(ErrorKind::DeleteMissingName)?;
        let (target, name) = split_qualified(operand);
        if name.starts_with('_') {
            return Err(ErrorKind::DeleteInternal(name.to_string()).into());
        }
        if self.dictionary.is_opcode(name) && target != Target::Variable {
            return Err(ErrorKind::CoreDefined(name.to_string()).into());
        }

        let mut deleted = false;
        if matches!(target, Target::Word | Target::Any) {
            deleted = self.dictionary.delete_word(name);
        }
        if !deleted && matches!(target, Target::Variable | Target::Any) {
            deleted = self.variables.remove(name).is_some();
        }
        if !deleted {
            return Err(match target {
                Target::Any => ErrorKind::UndefinedNameAny(operand.clone()).into(),
                Target::Word => ErrorKind::UndefinedName("word", name.to_string()).into(),
                Target::Variable => ErrorKind::UndefinedName("variable", name.to_string()).into(),
            });
        }
        Ok(j + 2)
    }

    fn handle_see(&mut self, tokens: &[String], j: usize) -> Result<usize> {
        let operand = tokens.get(j + 1).ok_or(ErrorKind::SeeMissingName)?;
        let (target, name) = split_qualified(operand);
        if self.dictionary.is_opcode(name) && target != Target::Variable {
            return Err(ErrorKind::CoreDefined(name.to_string()).into());
        }

        let mut found = false;
        if matches!(target, Target::Word | Target::Any) {
            if let Some(definition) = self.dictionary.word(name) {
                let text = format_word(name, definition);
                self.out.push_str(&text);
                self.out.newline();
                found = true;
            }
        }
        if !found && matches!(target, Target::Variable | Target::Any) {
            if let Some(value) = self.variables.get(name) {
                let text = value.to_string();
                self.out.push_str(&text);
                self.out.newline();
                found = true;
            }
        }
        if !found {
            return Err(match target {
                Target::Any => ErrorKind::UndefinedNameAny(operand.clone()).into(),
                Target::Word => ErrorKind::UndefinedName("word", name.to_string()).into(),
                Target::Variable => ErrorKind::UndefinedName("variable", name.to_string()).into(),
            });
        }
        Ok(j + 2)
    }

    fn handle_edit(&mut self, tokens: &[String], j: usize) -> Result<usize> {
        let operand = tokens.get(j + 1).ok_or(ErrorKind::EditMissingName)?;
        let name = unquote(operand);
        if self.dictionary.is_opcode(&name) {
            return Err(ErrorKind::CoreDefined(name).into());
        }

        let (target, name) = if let Some(stripped) = name.strip_prefix("var:") {
            (Target::Variable, stripped.to_string())
        } else if let Some(stripped) = name.strip_prefix("word:") {
            (Target::Word, stripped.to_string())
        } else if self.dictionary.word(&name).is_some() {
            (Target::Word, name)
        } else if self.variables.contains_key(&name) {
            (Target::Variable, name)
        } else {
            return Err(ErrorKind::EditUndefined(name).into());
        };

        let edit_line = match target {
            Target::Word => match self.dictionary.word(&name) {
                Some(definition) => format!(": {} {} ;", name, definition.join(" ")),
                None => return Err(ErrorKind::EditWordNotFound(name).into()),
            },
            _ => match self.variables.get(&name) {
                Some(Value::Block(block)) => {
                    format!("{{ {} }} \"{}\" store", block.join(" "), name)
                }
                Some(_) => return Err(ErrorKind::EditNotABlock(name).into()),
                None => return Err(ErrorKind::EditVariableNotFound(name).into()),
            },
        };
        self.pending_edit = Some(edit_line);
        Ok(j + 2)
    }

    // editfile ends the line: the host switches into its editor before
    // any further tokens would make sense.
    fn handle_editfile(&mut self, tokens: &[String], j: usize) -> Outcome {
        let operand = tokens.get(j + 1).ok_or(ErrorKind::EditfileMissingName)?;
        let mut filename = unquote(operand);
        if PathBuf::from(&filename).extension().is_none() {
            filename.push_str(".rpn");
        }
        let path = self.data_dir()?.join(&filename);
        if !path.exists() {
            return Err(ErrorKind::EditfileNotFound(path.display().to_string()).into());
        }
        self.pending_edit_file = Some(path);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Target {
    Word,
    Variable,
    Any,
}

fn split_qualified(operand: &str) -> (Target, &str) {
    if let Some(name) = operand.strip_prefix("word:") {
        (Target::Word, name)
    } else if let Some(name) = operand.strip_prefix("var:") {
        (Target::Variable, name)
    } else {
        (Target::Any, operand)
    }
}

fn unquote(token: &str) -> String {
    if token.len() > 1 && token.starts_with('"') && token.ends_with('"') {
        token[1..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Pretty-print a word definition: runs of plain tokens share an indented
/// line, braces step the indent, the closing `;` sits at column zero.
pub fn format_word(name: &str, definition: &[String]) -> String {
    let indent_unit = "  ";
    let mut out = format!(": {}", name);
    let mut indent = 1usize;
    let mut i = 0;
    while i < definition.len() {
        let start = i;
        while i < definition.len() && definition[i] != "{" && definition[i] != "}" {
            i += 1;
        }
        if i > start {
            out.push('\n');
            out.push_str(&indent_unit.repeat(indent));
            out.push_str(&definition[start..i].join(" "));
        }
        if i < definition.len() {
            if definition[i] == "{" {
                out.push('\n');
                out.push_str(&indent_unit.repeat(indent));
                out.push('{');
                indent += 1;
            } else {
                indent = if indent > 1 { indent - 1 } else { 1 };
                out.push('\n');
                out.push_str(&indent_unit.repeat(indent));
                out.push('}');
            }
            i += 1;
        }
    }
    out.push_str("\n;");
    out
}

/// Parse a build version of the shape `MAJOR.COMMITS-HASH` into
/// `major + commits/100`.
pub fn parse_version(version: &str) -> f64 {
    let mut parts = version.splitn(2, '.');
    let major: f64 = match parts.next().and_then(|p| p.parse().ok()) {
        Some(m) => m,
        None => return 0.0,
    };
    match parts.next() {
        Some(rest) => match rest.split('-').next().and_then(|c| c.parse::<f64>().ok()) {
            Some(commits) => major + commits / 100.0,
            None => major,
        },
        None => major,
    }
}
