//! Node and agreement planning.
//!
//! Expands a validated deployment into the concrete node set and the directed
//! agreement set. The connection rules are fixed policy of the generated test
//! suites:
//!
//! - **Full mesh**: every master replicates to every other master.
//! - **Masters feed hubs**: every master replicates to every hub.
//! - **Hubs feed consumers**: when hubs exist, every hub replicates to every
//!   consumer and masters never talk to consumers directly.
//! - **Direct consumers**: without hubs, every master replicates to every
//!   consumer.

use log::debug;

use crate::config::Deployment;
use crate::topology::types::{Agreement, Node, NodeId, Role};

/// Create the nodes of a deployment, ordered masters, hubs, consumers
/// (or standalone instances), each tier by ascending index.
pub fn plan_nodes(deployment: &Deployment) -> Vec<Node> {
    match deployment {
        Deployment::Standalone { instances } => tier(Role::Standalone, *instances).collect(),
        Deployment::Replication(counts) => tier(Role::Master, counts.masters)
            .chain(tier(Role::Hub, counts.hubs))
            .chain(tier(Role::Consumer, counts.consumers))
            .collect(),
    }
}

fn tier(role: Role, count: usize) -> impl Iterator<Item = Node> {
    (1..=count).map(move |index| Node::new(NodeId::new(role, index)))
}

/// Generate every replication agreement of a deployment.
///
/// For each master in ascending order, its mesh agreements to the other
/// masters come first, then its hub agreements. Hub -> consumer agreements
/// follow (hub index, then consumer index), or master -> consumer agreements
/// when there is no hub tier. Standalone deployments have no agreements.
pub fn plan_agreements(deployment: &Deployment) -> Vec<Agreement> {
    let counts = match deployment {
        Deployment::Standalone { .. } => return Vec::new(),
        Deployment::Replication(counts) => counts,
    };

    let mut agreements = Vec::new();

    for source in 1..=counts.masters {
        agreements.extend(master_mesh_from(source, counts.masters));
        agreements.extend(fan_out(NodeId::master(source), Role::Hub, counts.hubs));
    }
    debug!(
        "Planned {} master -> master and {} master -> hub agreements",
        counts.masters * counts.masters.saturating_sub(1),
        counts.masters * counts.hubs
    );

    if counts.hubs > 0 {
        for hub in 1..=counts.hubs {
            agreements.extend(fan_out(NodeId::hub(hub), Role::Consumer, counts.consumers));
        }
        debug!("Planned {} hub -> consumer agreements", counts.hubs * counts.consumers);
    } else if counts.consumers > 0 {
        for master in 1..=counts.masters {
            agreements.extend(fan_out(NodeId::master(master), Role::Consumer, counts.consumers));
        }
        debug!(
            "No hub tier: planned {} master -> consumer agreements",
            counts.masters * counts.consumers
        );
    }

    agreements
}

/// Agreements from one master to every other master
fn master_mesh_from(source: usize, masters: usize) -> impl Iterator<Item = Agreement> {
    (1..=masters)
        .filter(move |target| *target != source)
        .filter_map(move |target| Agreement::between(NodeId::master(source), NodeId::master(target)))
}

/// Agreements from `source` to each node of the `target_role` tier
fn fan_out(source: NodeId, target_role: Role, count: usize) -> impl Iterator<Item = Agreement> {
    (1..=count).filter_map(move |index| Agreement::between(source, NodeId::new(target_role, index)))
}
