//! Camera frustum and per-frame projection transforms.

use crate::error::{Error, Result};
use crate::matrix::{Mat3, Mat4};
use crate::scene::{NodeId, Scene};

/// Projection model used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Perspective,
    Orthographic,
}

/// A viewing frustum carried by a scene node.
///
/// With identity orientation the camera looks along its local -z axis with
/// +y up; the visible volume spans view-space z in `[-far, -near]`.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub aspect: f64,
    pub y_fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    /// Creates a frustum from the viewport aspect ratio, vertical field of
    /// view (radians), and the near and far clip distances.
    pub fn new(aspect: f64, y_fov: f64, near: f64, far: f64) -> Self {
        Self {
            aspect,
            y_fov,
            near,
            far,
        }
    }

    /// Half the viewport height at the near plane.
    pub fn half_height(&self) -> f64 {
        ((self.y_fov / 2.0).tan() * self.near).abs()
    }

    /// Half the viewport width at the near plane.
    pub fn half_width(&self) -> f64 {
        (self.half_height() * self.aspect).abs()
    }
}

/// The transforms shared by every mesh in a frame: the combined
/// world-to-clip vertex transform and the matching normal transform.
///
/// Rebuilt once per frame from the camera's current global pose, then
/// reused for every mesh.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransforms {
    pub vertex: Mat4,
    pub normal: Mat3,
}

impl FrameTransforms {
    /// Builds the frame transforms for the camera carried by
    /// `camera_node`.
    ///
    /// Fails with [`Error::NotACamera`] when the node has no camera
    /// attachment.
    pub fn build(scene: &Scene, camera_node: NodeId, mode: RenderMode) -> Result<FrameTransforms> {
        let camera = scene.camera(camera_node).ok_or(Error::NotACamera)?;

        // Rotate the world into camera view: the inverse of the camera's
        // orientation, then a shift by its negated position.
        let view = scene
            .global_orientation(camera_node)
            .conjugate()
            .rotation_matrix()
            .with_translation(-scene.global_position(camera_node));

        let n = camera.near;
        let f = camera.far;
        let r = camera.half_width();
        // Negated: the vertical screen axis increases downward.
        let t = -camera.half_height();

        // Symmetric-frustum OpenGL projection matrices.
        let projection = match mode {
            RenderMode::Perspective => Mat4::new([
                [n / r, 0.0, 0.0, 0.0],
                [0.0, n / t, 0.0, 0.0],
                [0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n)],
                [0.0, 0.0, -1.0, 0.0],
            ]),
            RenderMode::Orthographic => Mat4::new([
                [1.0 / r, 0.0, 0.0, 0.0],
                [0.0, 1.0 / t, 0.0, 0.0],
                [0.0, 0.0, -2.0 / (f - n), -(f + n) / (f - n)],
                [0.0, 0.0, 0.0, 1.0],
            ]),
        };

        let vertex = projection * view;
        let normal = vertex.rotation().inverse().transpose();

        Ok(FrameTransforms { vertex, normal })
    }
}
