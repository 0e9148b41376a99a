mod loader;

use std::env;
use std::io::Write;
use std::path::PathBuf;

use kinematics::{KinematicModel, robot_config};

const DEFAULT_ROBOT: &str = "planar_arm";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let robot = env::var("ROBOT_NAME").unwrap_or_else(|_| DEFAULT_ROBOT.to_string());
    let description_dir = env::var_os("ROBOT_DESCRIPTION_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"));

    let config = robot_config(&robot)?;
    log::info!("Loading {} from {}", config.name, description_dir.display());

    let description = loader::load_description(&config, &description_dir)?;
    let model = KinematicModel::from_description(&description)?;

    if !model.within_limits(&config.init_qpos) {
        log::warn!("Initial joint angles {:?} are outside the joint limits", config.init_qpos);
    }
    let poses = model.fk(&config.init_qpos)?;

    // one frame per line for the renderer
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for frame in model.frames(&poses) {
        serde_json::to_writer(&mut out, &frame)?;
        writeln!(out)?;
    }

    log::info!("Published {} link frames", poses.len());
    Ok(())
}
