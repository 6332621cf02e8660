//! Replication topology module.
//!
//! This module turns validated role counts into nodes, replication
//! agreements, an initialization order, and a verification target.

pub mod types;
pub mod planner;
pub mod sequencer;
pub mod verification;

// Re-export key types and functions for easier access
pub use types::{Agreement, AgreementKind, Node, NodeId, Role, TIER_ORIGIN_INDEX};
pub use planner::{plan_agreements, plan_nodes};
pub use sequencer::{consumer_seed_source, sequence_initializations, InitAction};
pub use verification::select_verification_target;
