//! # Appdeck Architecture
//!
//! Appdeck is a **UI-agnostic catalog library** for AI applications kept in a remote
//! table store. It is a library that happens to ship a CLI client, not the other way
//! around, and everything from the API facade inward is written that way.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints cards, opens URLs               │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Keeps the active filter and the last listing             │
//! │  - Resolves positions (1, 2, ...) into entry references     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per operation, returns CmdResult              │
//! │  - Builds on aggregate, arrange, form and subscription      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Async EntryStore trait                                   │
//! │  - HttpStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Collections
//!
//! Entries live in three tables: general, creative and tools. The split is storage
//! partitioning only. The listing merges all three, and every entry remembers the table
//! it came from so that updates go back to the same place (see [`model::EntryRef`]).
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<CmdResult>`)
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! The network is the only I/O, and it sits behind [`store::EntryStore`].
//!
//! ## Testing Strategy
//!
//! 1. **Core logic** (`arrange`, `subscription`, `form`, `render`): plain unit tests.
//! 2. **Commands**: driven by `InMemoryStore`, which can fail single collections.
//! 3. **API**: dispatch, filter persistence and selector resolution.
//! 4. **HTTP**: `tests/http_store.rs` runs `HttpStore` against an in-process fake.
//! 5. **CLI**: `tests/cli.rs` runs the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Storage abstraction and implementations
//! - [`aggregate`]: Parallel load of the three collections, with fallback
//! - [`arrange`]: Filtering and the catalog ordering (tier, favorite, name)
//! - [`model`]: Core data types (`CatalogEntry`, `EntryDraft`, `EntryPatch`)
//! - [`wire`]: Lenient serde helpers for the table API's JSON
//! - [`subscription`]: Billing date and price arithmetic
//! - [`render`]: Presentation-ready views (cards, subscription details, banner)
//! - [`form`]: Form state, marshaling and validation
//! - [`debounce`]: Trailing-edge debouncer for search input
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and terminal output for the binary (not part of the lib API)

pub mod aggregate;
pub mod api;
pub mod arrange;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod model;
pub mod render;
pub mod store;
pub mod subscription;
pub mod wire;
