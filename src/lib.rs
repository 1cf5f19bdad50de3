//! Blockfit (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries and tests can
//! write `blockfit::{core, adapter, types}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use blockfit_adapter as adapter;
pub use blockfit_core as core;
pub use blockfit_types as types;
