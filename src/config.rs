//! Testcase request options and their validation.
//!
//! A [`TestcaseRequest`] holds the raw values collected from the command line
//! and/or a YAML request file. [`TestcaseRequest::validate`] turns it into a
//! [`TestcaseConfig`] with exactly one deployment mode, or fails with a
//! [`ConfigError`]. Nothing downstream of validation can fail.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::render::OutputFormat;
use crate::topology::Role;
use crate::utils::validation::{validate_instance_count, validate_role_count, validate_ticket};

/// Invalid or conflicting testcase options
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required ticket number")]
    MissingTicket,

    #[error("Invalid ticket '{0}': it becomes part of test_ticket<N>, so only letters, digits and '_' are allowed")]
    InvalidTicket(String),

    #[error("You must use \"-m|--masters\" if you want to have hubs and/or consumers")]
    RolesWithoutMaster,

    #[error("Invalid value {value} for \"--{}\": it must be between 0 and {max}", .role.plural())]
    CountOutOfRange { role: Role, value: i64, max: i64 },

    #[error("Invalid value {0} for \"--instances\": it must be greater than 0 and not greater than 10")]
    InstancesOutOfRange(i64),

    #[error("You can not mix \"--instances\" with replication")]
    InstancesWithReplication,
}

/// Raw, unvalidated testcase options.
///
/// Counts are signed so that negative input reaches validation and is
/// reported instead of being rejected by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestcaseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masters: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hubs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl TestcaseRequest {
    /// Overlay `overrides` on top of `self`, field by field.
    pub fn merge(self, overrides: TestcaseRequest) -> TestcaseRequest {
        TestcaseRequest {
            ticket: overrides.ticket.or(self.ticket),
            masters: overrides.masters.or(self.masters),
            hubs: overrides.hubs.or(self.hubs),
            consumers: overrides.consumers.or(self.consumers),
            instances: overrides.instances.or(self.instances),
            output: overrides.output.or(self.output),
            format: overrides.format.or(self.format),
        }
    }

    /// Validate the request and normalize it into a single deployment mode.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// ticket, masters required for hubs/consumers, per-role ranges,
    /// instance range, instances mixed with replication.
    pub fn validate(&self) -> Result<TestcaseConfig, ConfigError> {
        let ticket = match self.ticket.as_deref().map(str::trim) {
            None | Some("") => return Err(ConfigError::MissingTicket),
            Some(ticket) => ticket,
        };
        validate_ticket(ticket)?;

        let raw_masters = self.masters.unwrap_or(0);
        let raw_hubs = self.hubs.unwrap_or(0);
        let raw_consumers = self.consumers.unwrap_or(0);

        if raw_masters == 0 && (raw_hubs > 0 || raw_consumers > 0) {
            return Err(ConfigError::RolesWithoutMaster);
        }

        let counts = RoleCounts {
            masters: validate_role_count(Role::Master, raw_masters)?,
            hubs: validate_role_count(Role::Hub, raw_hubs)?,
            consumers: validate_role_count(Role::Consumer, raw_consumers)?,
        };

        let deployment = match self.instances {
            Some(raw_instances) => {
                let instances = validate_instance_count(raw_instances)?;
                if counts.total() > 0 {
                    return Err(ConfigError::InstancesWithReplication);
                }
                Deployment::Standalone { instances }
            }
            None if counts.total() > 0 => Deployment::Replication(counts),
            None => Deployment::Standalone { instances: 1 },
        };

        debug!("Validated ticket {} as {:?}", ticket, deployment);

        Ok(TestcaseConfig {
            ticket: ticket.to_string(),
            output: self.output.clone(),
            format: self.format.unwrap_or_default(),
            deployment,
        })
    }
}

/// Number of nodes of each replicated role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleCounts {
    pub masters: usize,
    pub hubs: usize,
    pub consumers: usize,
}

impl RoleCounts {
    pub fn total(&self) -> usize {
        self.masters + self.hubs + self.consumers
    }
}

/// The single deployment mode selected by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Deployment {
    /// Replicated topology with at least one node
    Replication(RoleCounts),
    /// Independent, non-replicated instances
    Standalone { instances: usize },
}

impl Deployment {
    pub fn is_replicated(&self) -> bool {
        matches!(self, Deployment::Replication(_))
    }
}

/// Validated testcase configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TestcaseConfig {
    pub ticket: String,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub deployment: Deployment,
}

impl TestcaseConfig {
    /// Output path: the explicit one if given, else derived from the ticket
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::render::default_output_name(&self.ticket, self.format)))
    }
}
