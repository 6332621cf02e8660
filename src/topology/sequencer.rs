//! Agreement initialization ordering.
//!
//! A freshly created agreement has to be initialized once, pushing the
//! supplier's data to the new replica. The sequencer decides which agreements
//! get that explicit push and in which order. It orders by tier (masters, then
//! hubs, then consumers) so that a node is only used as a source once it holds
//! the data itself; it does no dependency analysis beyond that.
//!
//! Two fixed rules drive the choice of source:
//!
//! - **Tier origin**: master 1 holds the data to begin with and seeds every
//!   other master, every hub, and (without hubs) every consumer.
//! - **First-hub seeding**: when hubs exist, hub 1 seeds every consumer. The
//!   agreements from hubs 2..N to the consumers are never initialized
//!   explicitly; they catch up through normal replication.

use log::debug;
use serde::Serialize;

use crate::config::{Deployment, RoleCounts};
use crate::topology::types::{Agreement, NodeId, Role};

/// One scheduled initialization: push the data of `source` to `target`
/// over the agreement at position `agreement` of the plan's agreement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitAction {
    pub agreement: usize,
    pub source: NodeId,
    pub target: NodeId,
}

/// Source of every consumer initialization: hub 1 when a hub tier exists,
/// master 1 otherwise.
pub fn consumer_seed_source(counts: &RoleCounts) -> NodeId {
    if counts.hubs > 0 {
        NodeId::tier_origin(Role::Hub)
    } else {
        NodeId::tier_origin(Role::Master)
    }
}

/// Order the agreements that need an explicit initialization.
///
/// `agreements` must be the agreement list planned for the same deployment;
/// each action refers to it by position.
pub fn sequence_initializations(deployment: &Deployment, agreements: &[Agreement]) -> Vec<InitAction> {
    let counts = match deployment {
        Deployment::Standalone { .. } => return Vec::new(),
        Deployment::Replication(counts) => counts,
    };

    let origin = NodeId::tier_origin(Role::Master);
    let consumer_source = consumer_seed_source(counts);

    let masters = (1..=counts.masters)
        .map(NodeId::master)
        .filter(|target| *target != origin)
        .map(|target| (origin, target));
    let hubs = (1..=counts.hubs).map(|index| (origin, NodeId::hub(index)));
    let consumers = (1..=counts.consumers).map(|index| (consumer_source, NodeId::consumer(index)));

    let actions: Vec<InitAction> = masters
        .chain(hubs)
        .chain(consumers)
        .filter_map(|(source, target)| {
            let position = agreements
                .iter()
                .position(|a| a.source == source && a.target == target);
            debug_assert!(position.is_some(), "no agreement planned from {} to {}", source, target);
            position.map(|agreement| InitAction { agreement, source, target })
        })
        .collect();

    debug!(
        "Sequenced {} initializations (consumers seeded from {})",
        actions.len(),
        consumer_source
    );
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::planner::plan_agreements;

    fn sequence(masters: usize, hubs: usize, consumers: usize) -> (Vec<Agreement>, Vec<InitAction>) {
        let deployment = Deployment::Replication(RoleCounts { masters, hubs, consumers });
        let agreements = plan_agreements(&deployment);
        let actions = sequence_initializations(&deployment, &agreements);
        (agreements, actions)
    }

    fn pairs(actions: &[InitAction]) -> Vec<(NodeId, NodeId)> {
        actions.iter().map(|a| (a.source, a.target)).collect()
    }

    #[test]
    fn test_master_inits_come_from_master_one() {
        let (_, actions) = sequence(3, 0, 0);
        assert_eq!(
            pairs(&actions),
            vec![
                (NodeId::master(1), NodeId::master(2)),
                (NodeId::master(1), NodeId::master(3)),
            ]
        );
    }

    #[test]
    fn test_actions_reference_matching_agreements() {
        let (agreements, actions) = sequence(3, 2, 4);
        for action in &actions {
            let agreement = &agreements[action.agreement];
            assert_eq!(agreement.source, action.source);
            assert_eq!(agreement.target, action.target);
        }
    }

    #[test]
    fn test_tier_order_with_hubs() {
        let (_, actions) = sequence(2, 2, 2);
        assert_eq!(
            pairs(&actions),
            vec![
                (NodeId::master(1), NodeId::master(2)),
                (NodeId::master(1), NodeId::hub(1)),
                (NodeId::master(1), NodeId::hub(2)),
                (NodeId::hub(1), NodeId::consumer(1)),
                (NodeId::hub(1), NodeId::consumer(2)),
            ]
        );
    }

    #[test]
    fn test_only_first_hub_seeds_consumers() {
        let (agreements, actions) = sequence(1, 3, 2);
        assert!(actions
            .iter()
            .filter(|a| a.source.role == Role::Hub)
            .all(|a| a.source == NodeId::hub(1)));

        // hubs 2 and 3 keep their consumer agreements, but nothing initializes them
        let uninitialized = agreements
            .iter()
            .enumerate()
            .filter(|(_, a)| a.source.role == Role::Hub && a.source.index > 1)
            .filter(|(i, _)| !actions.iter().any(|action| action.agreement == *i))
            .count();
        assert_eq!(uninitialized, 4);
    }

    #[test]
    fn test_consumers_seeded_by_master_without_hubs() {
        let (_, actions) = sequence(2, 0, 2);
        assert_eq!(
            pairs(&actions),
            vec![
                (NodeId::master(1), NodeId::master(2)),
                (NodeId::master(1), NodeId::consumer(1)),
                (NodeId::master(1), NodeId::consumer(2)),
            ]
        );
    }

    #[test]
    fn test_nothing_to_initialize() {
        assert!(sequence(1, 0, 0).1.is_empty());
        let standalone = Deployment::Standalone { instances: 3 };
        assert!(sequence_initializations(&standalone, &[]).is_empty());
    }
}
