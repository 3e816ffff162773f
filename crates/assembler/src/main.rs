//! # Assembler CLI
//!
//! A thin command-line client over `assemblerapp`. This file only calls `cli::run()`
//! and turns an error into a message and exit status; everything else lives in
//! `src/cli/`.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal output via `colored` (print.rs)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (assemblerapp::api)                              │
//! │  - AssemblerApi over a MemoryScene loaded from JSON         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scene is read from a JSON scene description (see
//! `assemblerapp::host::memory::SceneDescription`), so the CLI runs headless, without a
//! live 3D application.
//!
//! ## Output Streams
//!
//! Documents and listings go to stdout. Warnings and `tracing` diagnostics go to
//! stderr, so `assembler export scene.json > out.json` always produces clean JSON.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
