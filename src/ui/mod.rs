//! Terminal output for the CLI commands. The HTTP server logs through
//! `tracing` instead.

pub mod output;
pub mod table;

pub use output::{error, header, info, success, theme, warn, Icons, Theme};
pub use table::{mappings_table, stats_table, TableBuilder};
