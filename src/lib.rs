//! # dirsrv-testgen - Replication topology test stub generator
//!
//! This library plans the replication topology of a directory server ticket
//! test and renders it as a runnable lib389/pytest stub.
//!
//! ## Overview
//!
//! Given counts of replica roles (masters, hubs, consumers) or a number of
//! standalone instances, the planner decides:
//!
//! - which instances exist and the lib389 constants they use,
//! - which replication agreements connect them,
//! - in what order those agreements are initialized,
//! - which instance verifies that a write on master 1 propagated.
//!
//! ## Architecture
//!
//! - `config`: raw request options, validation, and the normalized deployment
//! - `config_loader`: YAML request files merged with command-line values
//! - `topology`: node and agreement planning, init sequencing, target selection
//! - `plan`: the immutable plan aggregate and its invariant check
//! - `render`: plan renderers (lib389 script, JSON/YAML dump)
//! - `utils`: option validation helpers and file output
//! - `orchestrator`: plan, render, and write in one call
//!
//! ## Example Usage
//!
//! ```rust
//! use dirsrv_testgen::config::TestcaseRequest;
//! use dirsrv_testgen::plan::TopologyPlan;
//! use dirsrv_testgen::topology::NodeId;
//!
//! let config = TestcaseRequest {
//!     ticket: Some("47910".to_string()),
//!     masters: Some(1),
//!     hubs: Some(1),
//!     consumers: Some(2),
//!     ..Default::default()
//! }
//! .validate()?;
//!
//! let plan = TopologyPlan::build(&config.deployment);
//! assert_eq!(plan.agreements.len(), 3);
//! assert_eq!(plan.verification_target, Some(NodeId::consumer(1)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Validation fails with [`config::ConfigError`]; planning itself cannot fail.
//! File and rendering operations return `color_eyre::eyre::Result`.

pub mod config;
pub mod config_loader;
pub mod orchestrator;
pub mod plan;
pub mod render;
pub mod topology;
pub mod utils;
