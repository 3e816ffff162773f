//! # Assembler Architecture
//!
//! Assembler builds JSON documents out of a 3D scene: pick nodes and attributes, arrange
//! them in an outliner tree, preview the assembled text and save it. This crate is the
//! UI-agnostic core; the `assembler` CLI and any in-app panel are clients of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (CLI, app panel)                                    │
//! │  - Parses input, renders CmdResult, owns stdout/stderr      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - AssemblerApi<H: SceneHost>: host + tabs + config         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One run() per user operation, returns CmdResult          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core                                                       │
//! │  - entries/extract: host values → Entry                     │
//! │  - store: EntryStore tree (no cycles, dense positions)      │
//! │  - preprocess + encode: EntryStore → document → text        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host Layer (host/)                                         │
//! │  - SceneHost accessor trait, MemoryScene (tests, CLI)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! Everything from `api.rs` inward takes Rust arguments and returns Rust types. Nothing
//! writes to stdout or stderr; diagnostics go through `tracing` and the client decides
//! where they end up. The only file the core writes is the exported document.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per user operation
//! - [`config`]: Configuration management
//! - [`encode`]: Document text encoding
//! - [`entries`]: Entries bound to host nodes and attributes
//! - [`error`]: Error types
//! - [`extract`]: Attribute value extraction
//! - [`filter`]: Explorer attribute filters
//! - [`host`]: Scene host contract and the in-memory host
//! - [`model`]: Core data types (`Entry`, `Value`, `Mapping`)
//! - [`preprocess`]: Flat entries to nested document
//! - [`store`]: The entry tree and outliner moves
//! - [`workspace`]: Document tabs

pub mod api;
pub mod commands;
pub mod config;
pub mod encode;
pub mod entries;
pub mod error;
pub mod extract;
pub mod filter;
pub mod host;
pub mod model;
pub mod preprocess;
pub mod store;
pub mod workspace;
