//! Core types and utilities

pub mod ids;
pub mod vec3;

pub use ids::{ActorId, FireId};
pub use vec3::{Rotation, Vec3};
