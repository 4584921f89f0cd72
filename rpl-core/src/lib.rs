//! Core of the RPL language: value and stack model, tokenizer, block
//! parser, dictionaries, the evaluator, snapshots, and the cooperative
//! interruption/prompt protocol. The standard vocabulary lives in
//! `rpl-std`; front ends build on both.
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

mod dictionary;
mod interp;
mod interrupt;
mod output;
mod parsing;
mod prompt;
mod snapshot;
mod value;

pub mod errors;

pub use dictionary::{Dictionary, Opcode};
pub use errors::{Error, ErrorKind, Outcome, Result, Signal};
pub use interp::{format_word, parse_version, Interp};
pub use interrupt::InterruptFlag;
pub use output::OutputBuffer;
pub use parsing::{parse_block, tokenize};
pub use prompt::{prompt_channel, PromptHandle, PromptPort};
pub use snapshot::Snapshot;
pub use value::Value;
