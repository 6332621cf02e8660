use crate::config::{TestcaseConfig, TestcaseRequest};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load a testcase request from a YAML file
pub fn load_request(request_path: &Path) -> Result<TestcaseRequest> {
    info!("Loading testcase request from: {:?}", request_path);

    let file = File::open(request_path)
        .wrap_err_with(|| format!("Failed to open request file '{}'", request_path.display()))?;

    let request: TestcaseRequest = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse request file '{}'", request_path.display()))?;

    Ok(request)
}

/// Combine an optional request file with command-line values and validate.
///
/// Command-line values win over file values field by field.
pub fn resolve_config(request_path: Option<&Path>, cli: TestcaseRequest) -> Result<TestcaseConfig> {
    let request = match request_path {
        Some(path) => load_request(path)?.merge(cli),
        None => cli,
    };

    let config = request.validate()?;
    info!("Ticket {}: {:?}", config.ticket, config.deployment);
    Ok(config)
}
