//! An interactive calculator for a fixed set of named 4x4 matrices.
//!
//! Instructions are one per line, e.g. `add_mat MAT_A, MAT_B, MAT_C` or
//! `read_mat MAT_A, 1, 2, 3`. Each line is parsed into an [`Instruction`] by a
//! small state machine, or rejected with exactly one [`ParseError`], and only a
//! fully valid instruction is executed against the [`Registry`].
//!
//! The main entry point is [`Interpreter`], which owns the registry and runs
//! sessions over any [`io_adapters::LineSource`]. The [`matrix`] module holds the
//! numeric kernels, including the in-place variants used when an instruction
//! writes into one of its own operands.

pub mod banner;
pub mod command;
pub mod io_adapters;
mod interpreter;
mod lexer;
pub mod matrix;
pub mod parser;
pub mod registry;

pub use command::CommandKind;
pub use interpreter::{DEFAULT_PROMPT, Flow, Interpreter, SessionEnd, SessionOptions};
pub use matrix::Matrix;
pub use parser::{Instruction, ParseError, parse_instruction};
pub use registry::{Registry, RegistryError, Slot};
