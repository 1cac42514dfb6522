//! Subcommand modules for the `hapr` binary.

pub mod collapse;
pub mod expand;
pub mod expand_matrix;
pub mod outgroups;
pub mod rename;
pub mod traits;
