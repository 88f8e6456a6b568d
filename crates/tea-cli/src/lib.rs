//! Library side of the `tea` command line tool.

pub mod commands;
pub mod logging;
