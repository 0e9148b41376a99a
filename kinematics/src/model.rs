//! Serial kinematic chain built from a [`RobotDescription`].
//!
//! Joint `i` connects link `i` (parent) to link `i + 1` (child). Each
//! child link's frame coincides with its parent joint's frame, so forward
//! kinematics is a running product of joint transforms starting from the
//! identity at the root link.

use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::Serialize;

use crate::description::{JointAttributes, RobotDescription, parse_scalar, parse_vec3};
use crate::error::{Error, Result};
use crate::rotation::{RotationMatrix, mat_to_quat, rodrigues, rpy_to_mat};

/// Homogeneous transform `[R t; 0 1]`.
pub type Pose = Matrix4<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub name: String,
    pub visual_meshes: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    Fixed,
    Revolute {
        /// Unit axis in the joint frame
        axis: Vector3<f64>,
        lower: f64,
        upper: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Translation from the parent link frame to the joint frame
    pub trans: Vector3<f64>,
    /// Rotation from the parent link frame to the joint frame
    pub rot: RotationMatrix,
    pub kind: JointKind,
}

impl Joint {
    pub fn is_revolute(&self) -> bool {
        matches!(self.kind, JointKind::Revolute { .. })
    }

    pub fn limits(&self) -> Option<(f64, f64)> {
        match self.kind {
            JointKind::Fixed => None,
            JointKind::Revolute { lower, upper, .. } => Some((lower, upper)),
        }
    }

    /// Static part of the joint transform: the origin offset alone.
    pub fn origin(&self) -> Pose {
        let mut origin = Pose::identity();
        origin.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rot);
        origin.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.trans);
        origin
    }

    /// Parent link to child link transform. `angle` is ignored for fixed joints.
    pub fn transform(&self, angle: f64) -> Pose {
        match self.kind {
            JointKind::Fixed => self.origin(),
            JointKind::Revolute { axis, .. } => {
                let mut motion = Pose::identity();
                motion
                    .fixed_view_mut::<3, 3>(0, 0)
                    .copy_from(&rodrigues(&axis, angle));
                self.origin() * motion
            }
        }
    }

    fn from_attributes(name: &str, attrs: &JointAttributes) -> Result<Self> {
        let invalid = |attribute: &str, message: String| Error::InvalidAttribute {
            element: format!("joint {name}"),
            attribute: attribute.to_string(),
            message,
        };
        let vec3_or_zero = |attribute: &str, text: &Option<String>| match text {
            Some(text) => parse_vec3(text).map_err(|e| invalid(attribute, e)),
            None => Ok(Vector3::zeros()),
        };
        let limit = |attribute: &str, text: &Option<String>| -> Result<f64> {
            let text = text
                .as_deref()
                .ok_or_else(|| invalid(attribute, "revolute joints need a limit".to_string()))?;
            parse_scalar(text).map_err(|e| invalid(attribute, e))
        };

        let trans = vec3_or_zero("origin xyz", &attrs.xyz)?;
        let rot = rpy_to_mat(&vec3_or_zero("origin rpy", &attrs.rpy)?);

        let kind = match attrs.joint_type.as_str() {
            "fixed" => JointKind::Fixed,
            "revolute" => {
                let axis = match &attrs.axis {
                    Some(text) => parse_vec3(text).map_err(|e| invalid("axis xyz", e))?,
                    None => {
                        log::warn!("joint {name} has no axis, using the x axis");
                        Vector3::x()
                    }
                };
                let axis = axis
                    .try_normalize(1e-10)
                    .ok_or_else(|| invalid("axis xyz", "axis has zero length".to_string()))?;
                JointKind::Revolute {
                    axis,
                    lower: limit("limit lower", &attrs.lower)?,
                    upper: limit("limit upper", &attrs.upper)?,
                }
            }
            other => {
                return Err(Error::UnsupportedJointType {
                    joint: name.to_string(),
                    joint_type: other.to_string(),
                });
            }
        };

        Ok(Self {
            name: name.to_string(),
            trans,
            rot,
            kind,
        })
    }
}

/// Forward kinematics over a whole robot.
pub trait ForwardKinematics {
    /// Pose of every link in the root frame for the given revolute joint angles.
    fn forward_kinematics(&self, qpos: &[f64]) -> Result<Vec<Pose>>;
}

/// Immutable serial chain of links and joints.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicModel {
    links: Vec<Link>,
    joints: Vec<Joint>,
    dof: usize,
}

impl KinematicModel {
    /// Build the chain, failing on the first missing or malformed element.
    pub fn from_description(description: &RobotDescription) -> Result<Self> {
        let links = description.link_names.len();
        let joints = description.joint_names.len();
        if links == 0 || joints + 1 != links {
            return Err(Error::InvalidChain { links, joints });
        }

        let links = description
            .link_names
            .iter()
            .map(|name| {
                let attrs = description.link(name)?;
                Ok(Link {
                    name: name.clone(),
                    visual_meshes: attrs
                        .visual_meshes
                        .iter()
                        .map(|mesh| resolve_mesh(description.mesh_root.as_deref(), mesh))
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let joints = description
            .joint_names
            .iter()
            .map(|name| Joint::from_attributes(name, description.joint(name)?))
            .collect::<Result<Vec<_>>>()?;

        let dof = joints.iter().filter(|j| j.is_revolute()).count();
        log::debug!(
            "Built kinematic model: {} links, {} joints, {} dof",
            links.len(),
            joints.len(),
            dof
        );

        Ok(Self { links, joints, dof })
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Number of revolute joints, i.e. the expected length of `qpos`.
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// `(lower, upper)` of each revolute joint in chain order.
    pub fn joint_limits(&self) -> Vec<(f64, f64)> {
        self.joints.iter().filter_map(Joint::limits).collect()
    }

    /// Whether every angle lies inside its joint's limits. Purely
    /// informational; [`fk`](Self::fk) accepts any angle.
    pub fn within_limits(&self, qpos: &[f64]) -> bool {
        qpos.len() == self.dof
            && self
                .joint_limits()
                .iter()
                .zip(qpos)
                .all(|(&(lower, upper), &q)| q >= lower && q <= upper)
    }

    /// Pose of every link in the root link's frame, in link order.
    ///
    /// `qpos` holds one angle per revolute joint in chain order. Joint limits
    /// are not enforced.
    pub fn fk(&self, qpos: &[f64]) -> Result<Vec<Pose>> {
        if qpos.len() != self.dof {
            return Err(Error::InvalidVariableCount {
                expected: self.dof,
                actual: qpos.len(),
            });
        }

        let mut poses = Vec::with_capacity(self.links.len());
        poses.push(Pose::identity());

        let mut angles = qpos.iter();
        for joint in &self.joints {
            let angle = if joint.is_revolute() {
                // length was checked against dof above
                angles.next().copied().unwrap_or_default()
            } else {
                0.0
            };
            let parent = poses[poses.len() - 1];
            poses.push(parent * joint.transform(angle));
        }

        log::trace!("fk({qpos:?}) evaluated {} link poses", poses.len());
        Ok(poses)
    }

    /// Per-link data an external renderer needs to draw `poses`.
    pub fn frames<'a>(&'a self, poses: &[Pose]) -> Vec<LinkFrame<'a>> {
        self.links
            .iter()
            .zip(poses)
            .map(|(link, pose)| LinkFrame::new(link, pose))
            .collect()
    }
}

impl ForwardKinematics for KinematicModel {
    fn forward_kinematics(&self, qpos: &[f64]) -> Result<Vec<Pose>> {
        self.fk(qpos)
    }
}

/// One link placed in the root frame, ready for drawing axes and meshes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame<'a> {
    pub link: &'a str,
    pub translation: [f64; 3],
    /// Orientation as `[w, x, y, z]`
    pub rotation: [f64; 4],
    pub visual_meshes: &'a [PathBuf],
}

impl<'a> LinkFrame<'a> {
    fn new(link: &'a Link, pose: &Pose) -> Self {
        let t = pose_translation(pose);
        let q = mat_to_quat(&pose_rotation(pose));
        Self {
            link: &link.name,
            translation: [t.x, t.y, t.z],
            rotation: [q.w, q.i, q.j, q.k],
            visual_meshes: &link.visual_meshes,
        }
    }
}

pub fn pose_rotation(pose: &Pose) -> Matrix3<f64> {
    pose.fixed_view::<3, 3>(0, 0).into_owned()
}

pub fn pose_translation(pose: &Pose) -> Vector3<f64> {
    pose.fixed_view::<3, 1>(0, 3).into_owned()
}

fn resolve_mesh(root: Option<&Path>, mesh: &str) -> PathBuf {
    match root {
        Some(root) => root.join(mesh),
        None => PathBuf::from(mesh),
    }
}
