//! soft3d core library: scene graph, projection, and software
//! rasterization.
//!
//! The pipeline turns a hierarchy of transformable meshes into pixels
//! without any hardware graphics API: hierarchical quaternion transforms,
//! perspective or orthographic projection, conservative view-volume
//! rejection, and edge-walking scanline rasterization with per-pixel
//! depth testing and texture sampling.

pub mod error;
pub mod geometry;
pub mod matrix;
pub mod obj;
pub mod projection;
pub mod quaternion;
pub mod rasterizer;
pub mod scene;
pub mod texture;
pub mod vector;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::{Face, Mesh};
pub use matrix::{Mat3, Mat4};
pub use projection::{Camera, FrameTransforms, RenderMode};
pub use quaternion::Quaternion;
pub use rasterizer::Rasterizer;
pub use scene::{Attachment, NodeId, Scene};
pub use texture::{Rgb, Texture};
pub use vector::{Vec3, Vec4};
