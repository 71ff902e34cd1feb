//! Command modules for the Label Sync CLI.
//!
//! - `sync_cmd`: bulk reconciliation of a source repository onto the targets

pub mod sync_cmd;
