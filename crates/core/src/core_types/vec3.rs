//! Vector and rotation aliases for fire poses.

use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type for positions and wind directions.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used for fire world
/// positions, actor positions in warmth queries, and the weather wind vector.
pub type Vec3 = Vector3<f32>;

/// Orientation of a placed fire.
pub type Rotation = UnitQuaternion<f32>;
