//! Plan renderers.
//!
//! A renderer turns a [`TopologyPlan`] into the text of one output file. The
//! planner knows nothing about the output format; adding a new kind of
//! output means adding a [`PlanRenderer`] implementation here.

pub mod lib389;
pub mod plan_dump;

use serde::{Deserialize, Serialize};

use crate::plan::TopologyPlan;

pub use lib389::Lib389Renderer;
pub use plan_dump::{DumpFormat, PlanDumpRenderer};

/// Renders a topology plan into file content
pub trait PlanRenderer {
    /// Render `plan` for the given ticket
    fn render(&self, plan: &TopologyPlan, ticket: &str) -> color_eyre::eyre::Result<String>;

    /// Whether the rendered file is meant to be executed directly
    fn executable(&self) -> bool {
        false
    }
}

/// Kind of file to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// lib389/pytest test script
    #[default]
    Script,
    /// Plan as pretty-printed JSON
    Json,
    /// Plan as YAML
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Script => "py",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Renderer producing this format
    pub fn renderer(&self) -> Box<dyn PlanRenderer> {
        match self {
            OutputFormat::Script => Box::new(Lib389Renderer),
            OutputFormat::Json => Box::new(PlanDumpRenderer::new(DumpFormat::Json)),
            OutputFormat::Yaml => Box::new(PlanDumpRenderer::new(DumpFormat::Yaml)),
        }
    }
}

/// File name used when no output file is given
///
/// # Examples
/// ```
/// use dirsrv_testgen::render::{default_output_name, OutputFormat};
///
/// assert_eq!(default_output_name("47910", OutputFormat::Script), "ticket47910_test.py");
/// assert_eq!(default_output_name("47910", OutputFormat::Json), "ticket47910_plan.json");
/// ```
pub fn default_output_name(ticket: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Script => format!("ticket{}_test.py", ticket),
        other => format!("ticket{}_plan.{}", ticket, other.extension()),
    }
}
