//! Robot description handed over by the URDF parser.
//!
//! The parser itself lives outside this crate. It produces the raw attribute
//! strings of every `<link>` and `<joint>` element, keyed by name; the
//! ordering of the chain comes from a [`RobotConfig`].

use std::collections::HashMap;
use std::path::PathBuf;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::config::RobotConfig;
use crate::error::{Error, Result};

/// Attributes of a `<link>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAttributes {
    /// `filename` of every `<visual><geometry><mesh>`, in document order
    #[serde(default)]
    pub visual_meshes: Vec<String>,
}

/// Attributes of a `<joint>` element, as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointAttributes {
    /// `type`, e.g. "fixed" or "revolute"
    #[serde(rename = "type")]
    pub joint_type: String,
    /// `<origin xyz>`
    #[serde(default)]
    pub xyz: Option<String>,
    /// `<origin rpy>`
    #[serde(default)]
    pub rpy: Option<String>,
    /// `<axis xyz>`
    #[serde(default)]
    pub axis: Option<String>,
    /// `<limit lower>`
    #[serde(default)]
    pub lower: Option<String>,
    /// `<limit upper>`
    #[serde(default)]
    pub upper: Option<String>,
}

impl JointAttributes {
    pub fn fixed(xyz: &str, rpy: &str) -> Self {
        Self {
            joint_type: "fixed".to_string(),
            xyz: Some(xyz.to_string()),
            rpy: Some(rpy.to_string()),
            axis: None,
            lower: None,
            upper: None,
        }
    }

    pub fn revolute(xyz: &str, rpy: &str, axis: &str, lower: f64, upper: f64) -> Self {
        Self {
            joint_type: "revolute".to_string(),
            xyz: Some(xyz.to_string()),
            rpy: Some(rpy.to_string()),
            axis: Some(axis.to_string()),
            lower: Some(lower.to_string()),
            upper: Some(upper.to_string()),
        }
    }
}

/// Every link and joint element of one parsed document, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAttributes {
    #[serde(default)]
    pub links: HashMap<String, LinkAttributes>,
    #[serde(default)]
    pub joints: HashMap<String, JointAttributes>,
}

/// Ordered link/joint names plus the attributes to build them from.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotDescription {
    pub link_names: Vec<String>,
    pub joint_names: Vec<String>,
    pub attributes: ParsedAttributes,
    /// Directory relative mesh paths are resolved against
    pub mesh_root: Option<PathBuf>,
}

impl RobotDescription {
    pub fn new(
        link_names: Vec<String>,
        joint_names: Vec<String>,
        attributes: ParsedAttributes,
    ) -> Self {
        Self {
            link_names,
            joint_names,
            attributes,
            mesh_root: None,
        }
    }

    pub fn from_config(config: &RobotConfig, attributes: ParsedAttributes) -> Self {
        Self::new(
            config.link_names.clone(),
            config.joint_names.clone(),
            attributes,
        )
    }

    pub fn with_mesh_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mesh_root = Some(root.into());
        self
    }

    pub fn link(&self, name: &str) -> Result<&LinkAttributes> {
        self.attributes
            .links
            .get(name)
            .ok_or_else(|| Error::MissingLink(name.to_string()))
    }

    pub fn joint(&self, name: &str) -> Result<&JointAttributes> {
        self.attributes
            .joints
            .get(name)
            .ok_or_else(|| Error::MissingJoint(name.to_string()))
    }
}

/// Parse a whitespace separated triple such as `"0.1 0.2 0.3"`.
pub fn parse_vec3(text: &str) -> std::result::Result<Vector3<f64>, String> {
    let values = text
        .split_whitespace()
        .map(|v| v.parse::<f64>().map_err(|e| format!("`{v}`: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 values, got {}", values.len())),
    }
}

pub fn parse_scalar(text: &str) -> std::result::Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| format!("`{}`: {e}", text.trim()))
}
