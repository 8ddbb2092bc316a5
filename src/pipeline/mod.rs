// Aggregation pipeline: directory → per-group metadata and services →
// source adapters → one snapshot per group.

pub mod monitor;

pub use monitor::{Monitor, RunSummary};
