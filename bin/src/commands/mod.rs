//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod list;
pub(crate) mod update;
