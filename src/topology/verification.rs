//! Verification target selection.
//!
//! The generated test writes an entry on master 1 and polls one replica until
//! the entry shows up. The lowest tier present is the one polled, since a write
//! seen there has crossed every tier above it.

use crate::config::Deployment;
use crate::topology::types::{Agreement, NodeId, Role};

/// Pick the node that confirms propagation from master 1.
///
/// Consumer 1 if there are consumers, else hub 1 if there are hubs, else
/// master 2 if there is a second master. Returns `None` for standalone
/// deployments and whenever no agreement exists.
pub fn select_verification_target(deployment: &Deployment, agreements: &[Agreement]) -> Option<NodeId> {
    let counts = match deployment {
        Deployment::Standalone { .. } => return None,
        Deployment::Replication(counts) => counts,
    };

    if agreements.is_empty() {
        return None;
    }

    if counts.consumers > 0 {
        Some(NodeId::tier_origin(Role::Consumer))
    } else if counts.hubs > 0 {
        Some(NodeId::tier_origin(Role::Hub))
    } else if counts.masters >= 2 {
        Some(NodeId::master(2))
    } else {
        None
    }
}
