//! Error types for scene and world operations.

use core::fmt;

use crate::world::BodyId;

/// Errors that can occur while building or driving a scene.
///
/// None of these are fatal: the frame loop logs them and carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The viewport has no area yet; retry on the next layout.
    LayoutNotReady { width: f64, height: f64 },
    /// The body was removed before this operation reached it.
    StaleBody { id: BodyId },
    /// No entity with this identifier is registered.
    UnknownEntity,
    /// Shape dimensions must be positive and finite; polygons need at least 3 vertices.
    InvalidShape,
    /// Density must be positive and finite for dynamic bodies.
    InvalidMass,
    /// A configuration value is out of range.
    InvalidConfig(&'static str),
    /// The world has been destroyed and accepts no further changes.
    Destroyed,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::LayoutNotReady { width, height } => {
                write!(f, "viewport {}x{} has no area yet", width, height)
            }
            SceneError::StaleBody { id } => write!(f, "{} no longer exists", id),
            SceneError::UnknownEntity => write!(f, "entity is not registered"),
            SceneError::InvalidShape => write!(f, "shape dimensions must be positive and finite"),
            SceneError::InvalidMass => write!(f, "density must be positive and finite"),
            SceneError::InvalidConfig(what) => write!(f, "invalid configuration: {}", what),
            SceneError::Destroyed => write!(f, "world has been destroyed"),
        }
    }
}
