//! Data types shared by the geometry engine, the history and the state machine.

mod cell;
mod selection;
mod style;
mod token;

pub use cell::*;
pub use selection::*;
pub use style::*;
pub use token::*;
