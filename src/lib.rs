//! Library half of `hapr`: readers, writers and transforms behind the
//! subcommands in `src/cmd_hapr`.

pub mod libs;

pub use crate::libs::io::*;
