//! Named robot configurations.
//!
//! A configuration fixes the order of links and joints along the chain and
//! names the parsed attribute document that describes them. The document
//! itself is produced by an external URDF parser.

use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RobotConfig {
    pub name: String,
    /// Attribute document, relative to the caller's description directory
    pub description_path: PathBuf,
    pub link_names: Vec<String>,
    pub joint_names: Vec<String>,
    /// One angle per revolute joint, in chain order
    pub init_qpos: Vec<f64>,
}

const GALBOT_LINKS: &[&str] = &[
    "base_link",
    "left_arm_base_link",
    "left_arm_link1",
    "left_arm_link2",
    "left_arm_link3",
    "left_arm_link4",
    "left_arm_link5",
    "left_arm_link6",
    "left_arm_link7",
    "left_arm_end_effector_mount_link",
    "left_gripper_base_link",
    "left_gripper_tcp_link",
];

const GALBOT_JOINTS: &[&str] = &[
    "left_arm_joint",
    "left_arm_joint1",
    "left_arm_joint2",
    "left_arm_joint3",
    "left_arm_joint4",
    "left_arm_joint5",
    "left_arm_joint6",
    "left_arm_joint7",
    "left_arm_end_effector_mount_joint",
    "left_gripper_joint",
    "left_gripper_tcp_joint",
];

const PLANAR_ARM_LINKS: &[&str] = &["base_link", "upper_arm_link", "forearm_link", "tool_link"];
const PLANAR_ARM_JOINTS: &[&str] = &["shoulder_joint", "elbow_joint", "tool_joint"];

const ROBOT_NAMES: &[&str] = &["galbot", "planar_arm"];

/// Names accepted by [`robot_config`].
pub fn robot_names() -> &'static [&'static str] {
    ROBOT_NAMES
}

/// Look up a registered robot configuration by name.
pub fn robot_config(name: &str) -> Result<RobotConfig> {
    match name {
        "galbot" => Ok(RobotConfig {
            name: name.to_string(),
            description_path: PathBuf::from("galbot/galbot_left_arm_simple.json"),
            link_names: owned(GALBOT_LINKS),
            joint_names: owned(GALBOT_JOINTS),
            init_qpos: vec![-0.65, 1.26, -0.1, -1.6357, 1.7, -0.111, 0.8996],
        }),
        "planar_arm" => Ok(RobotConfig {
            name: name.to_string(),
            description_path: PathBuf::from("planar_arm.json"),
            link_names: owned(PLANAR_ARM_LINKS),
            joint_names: owned(PLANAR_ARM_JOINTS),
            init_qpos: vec![0.3, -0.6],
        }),
        _ => Err(Error::UnknownRobot(name.to_string())),
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
