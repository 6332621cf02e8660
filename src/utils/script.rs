//! Generated file writing.

use color_eyre::eyre::WrapErr;
use log::info;
use std::path::Path;

/// Write rendered output to `path`, creating missing parent directories.
///
/// Test scripts can be run directly (`run_isolated()`), so `executable`
/// marks the file 0o755 on unix.
pub fn write_generated_file(path: &Path, content: &str, executable: bool) -> color_eyre::eyre::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create output directory '{}'", parent.display()))?;
    }

    std::fs::write(path, content).wrap_err_with(|| format!("Can't open file: {}", path.display()))?;

    #[cfg(unix)]
    {
        if executable {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms)?;
        }
    }
    #[cfg(not(unix))]
    let _ = executable;

    info!("Created: {}", path.display());
    Ok(())
}
