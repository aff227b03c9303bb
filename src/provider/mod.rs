//! Script metadata provider integration
//!
//! This module provides:
//! - Normalized script types (script kind, timelock rule structure)
//! - The `ScriptProvider` seam used by the analyzer
//! - A Blockfrost-backed client implementing it

pub mod client;
pub mod types;

pub use client::{BlockfrostClient, ScriptProvider};
pub use types::*;
