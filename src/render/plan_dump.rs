//! Structured plan output (JSON / YAML).

use color_eyre::eyre::WrapErr;
use serde::Serialize;

use crate::plan::TopologyPlan;
use crate::render::PlanRenderer;

/// Structured encodings a plan can be dumped as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    Yaml,
}

/// Serializes the plan itself instead of a test script
#[derive(Debug, Clone, Copy)]
pub struct PlanDumpRenderer {
    format: DumpFormat,
}

impl PlanDumpRenderer {
    pub fn new(format: DumpFormat) -> Self {
        Self { format }
    }
}

#[derive(Serialize)]
struct PlanDocument<'a> {
    ticket: &'a str,
    #[serde(flatten)]
    plan: &'a TopologyPlan,
}

impl PlanRenderer for PlanDumpRenderer {
    fn render(&self, plan: &TopologyPlan, ticket: &str) -> color_eyre::eyre::Result<String> {
        let document = PlanDocument { ticket, plan };
        match self.format {
            DumpFormat::Yaml => serde_yaml::to_string(&document).wrap_err("Failed to serialize plan to YAML"),
            DumpFormat::Json => {
                let mut json = serde_json::to_string_pretty(&document).wrap_err("Failed to serialize plan to JSON")?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Deployment, RoleCounts};

    fn plan() -> TopologyPlan {
        TopologyPlan::build(&Deployment::Replication(RoleCounts { masters: 1, hubs: 1, consumers: 2 }))
    }

    #[test]
    fn test_json_dump() {
        let text = PlanDumpRenderer::new(DumpFormat::Json).render(&plan(), "47910").unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["ticket"], "47910");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(value["agreements"][0]["kind"], "master_to_hub");
        assert_eq!(value["init_order"].as_array().unwrap().len(), 3);
        assert_eq!(value["verification_target"]["role"], "consumer");
        assert_eq!(value["verification_target"]["index"], 1);
        assert_eq!(value["deployment"]["mode"], "replication");
        assert_eq!(value["deployment"]["hubs"], 1);
    }

    #[test]
    fn test_yaml_dump() {
        let text = PlanDumpRenderer::new(DumpFormat::Yaml).render(&plan(), "47910").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(value["ticket"].as_str(), Some("47910"));
        assert_eq!(value["nodes"][2]["host"].as_str(), Some("HOST_CONSUMER_1"));
    }

    #[test]
    fn test_yaml_deployment_is_plain_mapping() {
        let text = PlanDumpRenderer::new(DumpFormat::Yaml).render(&plan(), "47910").unwrap();
        assert!(!text.contains('!'), "{}", text);

        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(value["deployment"]["mode"].as_str(), Some("replication"));
        assert_eq!(value["deployment"]["consumers"].as_u64(), Some(2));
    }

    #[test]
    fn test_standalone_dump_has_null_target() {
        let plan = TopologyPlan::build(&Deployment::Standalone { instances: 2 });
        let text = PlanDumpRenderer::new(DumpFormat::Json).render(&plan, "1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["verification_target"].is_null());
        assert_eq!(value["deployment"]["mode"], "standalone");
        assert_eq!(value["deployment"]["instances"], 2);
    }
}
