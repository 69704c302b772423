//! # CLI Behavior
//!
//! This is **one possible UI client** for appdeck, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and the browser.
//!
//! For the overall architecture, see the library documentation.
//!
//! ## Naked Execution (`appdeck`)
//!
//! Running `appdeck` with no arguments lists every entry: paid first, then trials, then
//! free entries, with favorites leading each group.
//!
//! ## References
//!
//! Per-entry commands take a reference: either the position printed by `list` (`3`) or
//! `collection/id` (`tools/8f1c...`). A position is resolved against a fresh listing in
//! the default order, so `appdeck open 1` opens the first entry `appdeck list` shows.
//!
//! ## Open
//!
//! `appdeck open 2` counts the visit on the store and then starts the browser. The visit
//! count is best effort: when the store is unreachable the URL still opens. `--print`
//! prints the URL instead.
//!
//! ## Interactive Search
//!
//! `appdeck search --interactive` reads one search term per line from stdin and re-lists
//! after typing pauses (`debounce_ms`, 300 ms by default).
//!
//! ## Environment
//!
//! - `APPDECK_CONFIG_DIR`: where `config.json` lives
//! - `APPDECK_BASE_URL`, `APPDECK_LIST_LIMIT`, `APPDECK_TIMEOUT_SECS`: config overrides
//! - `APPDECK_LOG`: log filter for stderr diagnostics (`--verbose` is `appdeck=debug`)
//! - `BROWSER`: program used to open URLs

mod commands;
mod open;
mod print;
mod setup;

pub use commands::run;
