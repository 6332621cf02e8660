//! The topology plan aggregate.
//!
//! A [`TopologyPlan`] is everything a renderer needs to write a test stub:
//! the nodes, the agreements between them, the order in which agreements are
//! initialized, and the node used to verify propagation. It is built in one
//! deterministic pass and never modified afterwards.

use log::info;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::config::Deployment;
use crate::topology::{
    consumer_seed_source, plan_agreements, plan_nodes, select_verification_target,
    sequence_initializations, Agreement, AgreementKind, InitAction, Node, NodeId, Role,
};

/// Planned replication topology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyPlan {
    pub deployment: Deployment,
    pub nodes: Vec<Node>,
    pub agreements: Vec<Agreement>,
    pub init_order: Vec<InitAction>,
    pub verification_target: Option<NodeId>,
}

impl TopologyPlan {
    /// Plan a validated deployment: nodes, agreements, init order, target.
    pub fn build(deployment: &Deployment) -> Self {
        let nodes = plan_nodes(deployment);
        let agreements = plan_agreements(deployment);
        let init_order = sequence_initializations(deployment, &agreements);
        let verification_target = select_verification_target(deployment, &agreements);

        let plan = Self {
            deployment: *deployment,
            nodes,
            agreements,
            init_order,
            verification_target,
        };
        debug_assert_eq!(plan.check_invariants(), Ok(()));

        info!(
            "Planned {} nodes, {} agreements, {} initializations, verification target: {}",
            plan.nodes.len(),
            plan.agreements.len(),
            plan.init_order.len(),
            plan.verification_target
                .map(|t| t.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        plan
    }

    pub fn is_replicated(&self) -> bool {
        self.deployment.is_replicated()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn agreement(&self, action: &InitAction) -> Option<&Agreement> {
        self.agreements.get(action.agreement)
    }

    pub fn nodes_with_role(&self, role: Role) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role() == role)
    }

    pub fn agreements_of_kind(&self, kind: AgreementKind) -> impl Iterator<Item = &Agreement> {
        self.agreements.iter().filter(move |a| a.kind == kind)
    }

    /// Nodes reachable from `start` by following agreements
    pub fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for agreement in self.agreements.iter().filter(|a| a.source == current) {
                if seen.insert(agreement.target) {
                    queue.push_back(agreement.target);
                }
            }
        }
        seen
    }

    /// Check the structural invariants of the plan.
    ///
    /// A violation means the planner itself is broken, never that the input
    /// was bad; the message names the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let members: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        if members.len() != self.nodes.len() {
            return Err("Duplicate node identity in plan".to_string());
        }

        for agreement in &self.agreements {
            if !members.contains(&agreement.source) || !members.contains(&agreement.target) {
                return Err(format!("Agreement {} references a node outside the plan", agreement));
            }
        }

        let counts = match self.deployment {
            Deployment::Standalone { .. } => {
                if !self.agreements.is_empty() || !self.init_order.is_empty() {
                    return Err("Standalone plan must not contain agreements".to_string());
                }
                if self.verification_target.is_some() {
                    return Err("Standalone plan must not have a verification target".to_string());
                }
                return Ok(());
            }
            Deployment::Replication(counts) => counts,
        };

        let origin = NodeId::tier_origin(Role::Master);
        let consumer_source = consumer_seed_source(&counts);
        let mut initialized = HashSet::new();
        for action in &self.init_order {
            let agreement = self
                .agreement(action)
                .ok_or_else(|| format!("Init action refers to missing agreement #{}", action.agreement))?;
            if agreement.source != action.source || agreement.target != action.target {
                return Err(format!("Init action {} -> {} does not match agreement {}", action.source, action.target, agreement));
            }
            if !initialized.insert(action.agreement) {
                return Err(format!("Agreement {} is initialized twice", agreement));
            }
            let expected_source = match agreement.kind {
                AgreementKind::MasterToMaster | AgreementKind::MasterToHub => origin,
                AgreementKind::HubToConsumer | AgreementKind::MasterToConsumer => consumer_source,
            };
            if action.source != expected_source {
                return Err(format!("Agreement {} must be initialized from {}", agreement, expected_source));
            }
        }

        let expected_inits = counts.masters.saturating_sub(1) + counts.hubs + counts.consumers;
        if self.init_order.len() != expected_inits {
            return Err(format!(
                "Expected {} initializations, planned {}",
                expected_inits,
                self.init_order.len()
            ));
        }

        match self.verification_target {
            Some(target) if !self.reachable_from(origin).contains(&target) || target == origin => {
                Err(format!("Verification target {} is not downstream of {}", target, origin))
            }
            None if !self.agreements.is_empty() => {
                Err("Replicated plan with agreements has no verification target".to_string())
            }
            Some(_) if self.agreements.is_empty() => {
                Err("Verification target selected without any agreement".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoleCounts;

    fn build(masters: usize, hubs: usize, consumers: usize) -> TopologyPlan {
        TopologyPlan::build(&Deployment::Replication(RoleCounts { masters, hubs, consumers }))
    }

    #[test]
    fn test_one_master_one_hub_two_consumers() {
        let plan = build(1, 1, 2);
        assert_eq!(plan.nodes.len(), 4);
        assert_eq!(plan.agreements.len(), 3);
        assert_eq!(plan.verification_target, Some(NodeId::consumer(1)));
        assert_eq!(plan.init_order.len(), 3);
        assert_eq!(plan.init_order[0].target, NodeId::hub(1));
        assert!(plan.init_order[1..].iter().all(|a| a.source == NodeId::hub(1)));
        assert_eq!(plan.check_invariants(), Ok(()));
    }

    #[test]
    fn test_three_masters() {
        let plan = build(3, 0, 0);
        assert_eq!(plan.agreements.len(), 6);
        assert_eq!(plan.verification_target, Some(NodeId::master(2)));
    }

    #[test]
    fn test_single_master_degenerates() {
        let plan = build(1, 0, 0);
        assert_eq!(plan.nodes.len(), 1);
        assert!(plan.agreements.is_empty());
        assert!(plan.init_order.is_empty());
        assert_eq!(plan.verification_target, None);
        assert_eq!(plan.check_invariants(), Ok(()));
    }

    #[test]
    fn test_standalone_plan() {
        let plan = TopologyPlan::build(&Deployment::Standalone { instances: 4 });
        assert_eq!(plan.nodes_with_role(Role::Standalone).count(), 4);
        assert!(plan.agreements.is_empty());
        assert_eq!(plan.verification_target, None);
        assert!(!plan.is_replicated());
    }

    #[test]
    fn test_reachability() {
        let plan = build(2, 1, 2);
        let reachable = plan.reachable_from(NodeId::master(1));
        assert_eq!(reachable.len(), plan.nodes.len());
        assert_eq!(plan.reachable_from(NodeId::consumer(1)).len(), 1);
    }

    #[test]
    fn test_invariant_violation_is_reported() {
        let mut plan = build(2, 0, 1);
        plan.init_order.swap(0, 1);
        plan.init_order[0].source = NodeId::master(2);
        assert!(plan.check_invariants().is_err());

        let mut plan = build(2, 0, 0);
        plan.verification_target = Some(NodeId::consumer(1));
        assert!(plan.check_invariants().is_err());
    }
}
