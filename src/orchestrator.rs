//! Testcase generation orchestrator.
//!
//! Coordinates the flow from a validated configuration through planning and
//! rendering to the generated file on disk.

use color_eyre::eyre::WrapErr;
use std::path::PathBuf;

use crate::config::TestcaseConfig;
use crate::plan::TopologyPlan;
use crate::utils::write_generated_file;

/// Plan the topology and render it in the configured output format
pub fn render_testcase(config: &TestcaseConfig) -> color_eyre::eyre::Result<(TopologyPlan, String)> {
    let plan = TopologyPlan::build(&config.deployment);
    let content = config
        .format
        .renderer()
        .render(&plan, &config.ticket)
        .wrap_err_with(|| format!("Failed to render testcase for ticket {}", config.ticket))?;
    Ok((plan, content))
}

/// Generate the testcase file and return the path it was written to
pub fn generate_testcase(config: &TestcaseConfig) -> color_eyre::eyre::Result<PathBuf> {
    let (_, content) = render_testcase(config)?;
    let path = config.output_path();
    write_generated_file(&path, &content, config.format.renderer().executable())?;
    Ok(path)
}
