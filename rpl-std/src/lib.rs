//! Standard vocabulary of the RPL language: arithmetic, math, stack
//! words, strings, control flow, variables, word tooling, clock, output,
//! and snapshots. Each module is a registration function; `stdlib`
//! installs everything.

mod clock;
mod control;
mod io;
mod math;
mod ops;
mod stack;
mod state;
mod stdlib;
mod strings;
mod vars;
mod words;

pub use clock::clock;
pub use control::control;
pub use io::io;
pub use math::math;
pub use ops::ops;
pub use stack::stack;
pub use state::{startup, state};
pub use stdlib::stdlib;
pub use strings::strings;
pub use vars::vars;
pub use words::words;
