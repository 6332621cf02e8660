//! Topology type definitions.
//!
//! Nodes, agreements, and the role tags that classify them. Everything here is
//! created once during planning and never mutated afterwards.

use serde::Serialize;
use std::fmt;

/// Index of the node that acts as the origin of its tier.
///
/// Master 1 is the implicit data origin of every replicated topology, and hub 1
/// is the node that seeds every consumer. The rest of the planner refers to
/// this constant instead of a literal `1`.
pub const TIER_ORIGIN_INDEX: usize = 1;

/// Replication role of a directory server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Originates and accepts writes
    Master,
    /// Relays changes from masters to consumers
    Hub,
    /// Read-only replica at the bottom of the topology
    Consumer,
    /// Non-replicated instance
    Standalone,
}

impl Role {
    /// Lowercase name used for variable names and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Hub => "hub",
            Role::Consumer => "consumer",
            Role::Standalone => "standalone",
        }
    }

    /// Plural form, matching the command-line option names
    pub fn plural(&self) -> &'static str {
        match self {
            Role::Master => "masters",
            Role::Hub => "hubs",
            Role::Consumer => "consumers",
            Role::Standalone => "instances",
        }
    }

    /// Single-letter prefix used in agreement variable names
    pub fn short(&self) -> char {
        match self {
            Role::Master => 'm',
            Role::Hub => 'h',
            Role::Consumer => 'c',
            Role::Standalone => 's',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a node: its role plus a 1-based index within that role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId {
    pub role: Role,
    pub index: usize,
}

impl NodeId {
    pub fn new(role: Role, index: usize) -> Self {
        Self { role, index }
    }

    pub fn master(index: usize) -> Self {
        Self::new(Role::Master, index)
    }

    pub fn hub(index: usize) -> Self {
        Self::new(Role::Hub, index)
    }

    pub fn consumer(index: usize) -> Self {
        Self::new(Role::Consumer, index)
    }

    pub fn standalone(index: usize) -> Self {
        Self::new(Role::Standalone, index)
    }

    /// The origin node of a tier (see [`TIER_ORIGIN_INDEX`])
    pub fn tier_origin(role: Role) -> Self {
        Self::new(role, TIER_ORIGIN_INDEX)
    }

    /// Variable name of the instance in generated scripts.
    ///
    /// Standalone instance 1 is plain `standalone`, the others carry their
    /// index (`standalone2`). Replicated roles always carry the index.
    pub fn var_name(&self) -> String {
        match self.role {
            Role::Standalone if self.index == TIER_ORIGIN_INDEX => "standalone".to_string(),
            role => format!("{}{}", role.as_str(), self.index),
        }
    }

    /// Suffix of the lib389 constant names for this node
    /// (`MASTER_1`, `HUB_2`, `STANDALONE`, `STANDALONE2`)
    fn label_suffix(&self) -> String {
        match self.role {
            Role::Standalone if self.index == TIER_ORIGIN_INDEX => "STANDALONE".to_string(),
            Role::Standalone => format!("STANDALONE{}", self.index),
            role => format!("{}_{}", role.as_str().to_uppercase(), self.index),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.index)
    }
}

/// Replica id shared by every consumer; consumers are read-only replicas
pub const CONSUMER_REPLICA_ID: &str = "CONSUMER_REPLICAID";

/// A planned directory server instance with its derived labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    /// Variable name in the generated script
    pub name: String,
    /// Host constant (e.g. `HOST_MASTER_1`)
    pub host: String,
    /// Port constant (e.g. `PORT_MASTER_1`)
    pub port: String,
    /// Server id constant (e.g. `SERVERID_MASTER_1`)
    pub server_id: String,
    /// Replica id constant; standalone instances have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_id: Option<String>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        let suffix = id.label_suffix();
        let replica_id = match id.role {
            Role::Master | Role::Hub => Some(format!("REPLICAID_{}", suffix)),
            Role::Consumer => Some(CONSUMER_REPLICA_ID.to_string()),
            Role::Standalone => None,
        };

        Self {
            id,
            name: id.var_name(),
            host: format!("HOST_{}", suffix),
            port: format!("PORT_{}", suffix),
            server_id: format!("SERVERID_{}", suffix),
            replica_id,
        }
    }

    pub fn role(&self) -> Role {
        self.id.role
    }
}

/// Role-pair category of a replication agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementKind {
    MasterToMaster,
    MasterToHub,
    MasterToConsumer,
    HubToConsumer,
}

impl AgreementKind {
    /// Category for a source/target role pair, if the pair is a legal agreement
    pub fn for_roles(source: Role, target: Role) -> Option<Self> {
        match (source, target) {
            (Role::Master, Role::Master) => Some(Self::MasterToMaster),
            (Role::Master, Role::Hub) => Some(Self::MasterToHub),
            (Role::Master, Role::Consumer) => Some(Self::MasterToConsumer),
            (Role::Hub, Role::Consumer) => Some(Self::HubToConsumer),
            _ => None,
        }
    }

    pub fn source_role(&self) -> Role {
        match self {
            Self::MasterToMaster | Self::MasterToHub | Self::MasterToConsumer => Role::Master,
            Self::HubToConsumer => Role::Hub,
        }
    }

    pub fn target_role(&self) -> Role {
        match self {
            Self::MasterToMaster => Role::Master,
            Self::MasterToHub => Role::Hub,
            Self::MasterToConsumer | Self::HubToConsumer => Role::Consumer,
        }
    }
}

impl fmt::Display for AgreementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_role(), self.target_role())
    }
}

/// A directed replication agreement between two planned nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Agreement {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: AgreementKind,
}

impl Agreement {
    /// Create an agreement, deriving its category from the endpoint roles.
    ///
    /// Returns `None` for role pairs that never carry an agreement
    /// (e.g. consumer -> master) and for self-loops.
    pub fn between(source: NodeId, target: NodeId) -> Option<Self> {
        if source == target {
            return None;
        }
        AgreementKind::for_roles(source.role, target.role).map(|kind| Self { source, target, kind })
    }

    /// Variable name of the agreement in generated scripts (`m1_to_h2_agmt`)
    pub fn var_name(&self) -> String {
        format!(
            "{}{}_to_{}{}_agmt",
            self.source.role.short(),
            self.source.index,
            self.target.role.short(),
            self.target.index
        )
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
