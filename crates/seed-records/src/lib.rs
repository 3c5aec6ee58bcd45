//! Shared record types for generated travel-behaviour initial conditions.
//!
//! This crate contains pure data structures with no generation logic.
//! Records are the on-disk shape of a run: the downstream simulation reads
//! them back, so field names are part of the file format.

pub mod manifest;
pub mod records;

pub use manifest::{artifact_names, ManifestRun, RunManifest};
pub use records::{
    ActionRecord, AgentRecord, BehaviourRecord, BeliefRecord, PerformanceRelationships,
};
