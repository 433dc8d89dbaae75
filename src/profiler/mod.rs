//! Profiling results for interpreter runs.
//!
//! This module defines the timing tree the executor produces when
//! profiling is enabled. It handles:
//!
//! - The per-call timing tree mirroring the program's call tree
//! - Sorted human-readable output, slowest calls first
//! - CSV serialization and parsing for external result viewers

pub mod profile_result;
