//! Rotation algebra and forward kinematics for serial robot arms.
//!
//! [`rotation`] converts between quaternions, rotation matrices and
//! axis-angle vectors. [`model`] turns a parsed robot description into a
//! [`KinematicModel`] and evaluates the pose of every link for a joint
//! vector.
//!
//! ```rust
//! use kinematics::{JointAttributes, KinematicModel, LinkAttributes, ParsedAttributes, RobotDescription};
//!
//! let mut attributes = ParsedAttributes::default();
//! attributes.links.insert("base".into(), LinkAttributes::default());
//! attributes.links.insert("tip".into(), LinkAttributes::default());
//! attributes.joints.insert(
//!     "spin".into(),
//!     JointAttributes::revolute("0 0 0.2", "0 0 0", "0 0 1", -3.14, 3.14),
//! );
//!
//! let description = RobotDescription::new(
//!     vec!["base".into(), "tip".into()],
//!     vec!["spin".into()],
//!     attributes,
//! );
//! let model = KinematicModel::from_description(&description).unwrap();
//! let poses = model.fk(&[1.57]).unwrap();
//! assert_eq!(poses.len(), 2);
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod model;
pub mod rotation;

pub use config::{RobotConfig, robot_config, robot_names};
pub use description::{JointAttributes, LinkAttributes, ParsedAttributes, RobotDescription};
pub use error::{Error, Result};
pub use model::{ForwardKinematics, Joint, JointKind, KinematicModel, Link, LinkFrame, Pose};
pub use nalgebra::{Matrix3, Matrix4, Quaternion, Vector3};
