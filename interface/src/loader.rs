use std::fs;
use std::path::Path;

use kinematics::{ParsedAttributes, RobotConfig, RobotDescription};

/// Read the parsed attribute document named by `config` from `description_dir`.
///
/// Mesh paths in the document are taken relative to the document's directory.
pub fn load_description(
    config: &RobotConfig,
    description_dir: &Path,
) -> Result<RobotDescription, Box<dyn std::error::Error>> {
    let path = description_dir.join(&config.description_path);
    let text = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let attributes = parse_attributes(&text)?;
    log::debug!(
        "Read {} links and {} joints from {}",
        attributes.links.len(),
        attributes.joints.len(),
        path.display()
    );

    let description = RobotDescription::from_config(config, attributes);
    Ok(match path.parent() {
        Some(root) => description.with_mesh_root(root),
        None => description,
    })
}

pub fn parse_attributes(text: &str) -> Result<ParsedAttributes, serde_json::Error> {
    serde_json::from_str(text)
}
