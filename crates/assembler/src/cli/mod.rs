//! # CLI Layer
//!
//! This module is **one possible UI client** for the assembler. It is the only place
//! that knows about stdout, stderr and exit codes.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: clap derive types in [`setup`]
//! 2. **Context Setup**: config, logging, scene loading and the API facade
//! 3. **Dispatch**: one `handle_*` function per subcommand in [`commands`]
//! 4. **Output Formatting**: [`print`] renders `CmdResult` data for the terminal
//!
//! Business logic stays in `assemblerapp::commands`; the handlers here only translate
//! arguments into API calls.

mod commands;
mod print;
mod setup;

pub use commands::run;
