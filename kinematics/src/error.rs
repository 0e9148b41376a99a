/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a robot or evaluating its kinematics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No robot configuration is registered under this name
    #[error("Unknown robot name: {0}")]
    UnknownRobot(String),

    /// A declared link has no parsed attributes
    #[error("Missing attributes for link: {0}")]
    MissingLink(String),

    /// A declared joint has no parsed attributes
    #[error("Missing attributes for joint: {0}")]
    MissingJoint(String),

    #[error("Unsupported joint type `{joint_type}` for joint {joint}")]
    UnsupportedJointType { joint: String, joint_type: String },

    /// An attribute could not be turned into a number or vector
    #[error("Invalid attribute `{attribute}` on {element}: {message}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        message: String,
    },

    /// The link and joint lists do not form a single chain
    #[error("A chain of {links} links needs {} joints, got {joints}", .links.saturating_sub(1))]
    InvalidChain { links: usize, joints: usize },

    #[error("Expected {expected} joint angles, got {actual}")]
    InvalidVariableCount { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::UnknownRobot("walle".into());
        assert_eq!(e.to_string(), "Unknown robot name: walle");

        let e = Error::MissingJoint("joint1".into());
        assert_eq!(e.to_string(), "Missing attributes for joint: joint1");

        let e = Error::UnsupportedJointType {
            joint: "slider".into(),
            joint_type: "prismatic".into(),
        };
        assert_eq!(e.to_string(), "Unsupported joint type `prismatic` for joint slider");

        let e = Error::InvalidChain { links: 3, joints: 1 };
        assert_eq!(e.to_string(), "A chain of 3 links needs 2 joints, got 1");

        let e = Error::InvalidVariableCount { expected: 7, actual: 6 };
        assert_eq!(e.to_string(), "Expected 7 joint angles, got 6");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_error_is_send_sync() {
        assert_send_sync::<Error>();
    }
}
