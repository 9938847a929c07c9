//! Scanline rasterization of scene meshes into color and depth buffers.
//!
//! Each frame projects every mesh's vertices into clip space, rejects
//! faces that cannot be visible, and edge-walks the survivors row by row
//! with per-pixel depth testing and texture sampling.

use log::debug;

use crate::error::Result;
use crate::geometry::{Face, Mesh};
use crate::matrix::{doubled_area, Mat3};
use crate::projection::{FrameTransforms, RenderMode};
use crate::quaternion::Quaternion;
use crate::scene::{Attachment, NodeId, Scene};
use crate::texture::Rgb;
use crate::vector::Vec3;

/// Depth-buffer value meaning "no pixel written yet". Zero is a legitimate
/// depth, so the clear value sits beyond every real one instead.
const DEPTH_CLEAR: f64 = f64::INFINITY;

/// Screen-space triangles whose doubled area falls below this are dropped
/// before the barycentric basis would divide by it.
const MIN_DOUBLED_AREA: f64 = 1e-12;

/// A vertex after projection: clip coordinates and homogeneous w, plus
/// the pixel-space position once `remapped` is set.
///
/// The flag memoizes the divide-and-remap step for vertices shared
/// between faces; clip values stay pristine for the facing and bounds
/// tests.
#[derive(Debug, Clone, Copy)]
struct ProjectedVertex {
    clip: Vec3,
    w: f64,
    screen: Vec3,
    remapped: bool,
}

impl ProjectedVertex {
    /// The vertex in the shared screen plane: perspective divides by the
    /// vertex's own w, orthographic uses the clip values directly.
    fn screen_plane(self, mode: RenderMode) -> Vec3 {
        match mode {
            RenderMode::Perspective => self.clip * (1.0 / self.w),
            RenderMode::Orthographic => self.clip,
        }
    }
}

/// Renders a scene into fixed-size color and depth buffers.
///
/// Buffers are owned exclusively by the renderer; a frame runs to
/// completion before the color buffer is handed out through
/// [`Rasterizer::pixels`].
pub struct Rasterizer {
    width: usize,
    height: usize,
    mode: RenderMode,
    background: Rgb,
    color: Vec<Rgb>,
    depth: Vec<f64>,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize, mode: RenderMode) -> Self {
        debug!("rasterizer buffers sized {width}x{height}, {mode:?}");
        let size = width * height;
        Self {
            width,
            height,
            mode,
            background: Rgb::BLACK,
            color: vec![Rgb::BLACK; size],
            depth: vec![DEPTH_CLEAR; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    /// The color buffer of the most recent frame, row-major.
    pub fn pixels(&self) -> &[Rgb] {
        &self.color
    }

    /// The depth buffer of the most recent frame; untouched pixels hold
    /// `f64::INFINITY`.
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Renders one frame of the scene as seen by the camera at
    /// `camera_node`.
    ///
    /// The root node itself is treated as a plain container; meshes are
    /// drawn in depth-first traversal order below it.
    pub fn render_scene(&mut self, scene: &Scene, root: NodeId, camera_node: NodeId) -> Result<()> {
        self.color.fill(self.background);
        self.depth.fill(DEPTH_CLEAR);

        let transforms = FrameTransforms::build(scene, camera_node, self.mode)?;
        self.draw_children(scene, root, &transforms);
        Ok(())
    }

    fn draw_children(&mut self, scene: &Scene, parent: NodeId, transforms: &FrameTransforms) {
        for &child in scene.children(parent) {
            if let Attachment::Mesh(mesh) = scene.attachment(child) {
                self.draw_mesh(scene, child, mesh, transforms);
            }
            self.draw_children(scene, child, transforms);
        }
    }

    fn draw_mesh(
        &mut self,
        scene: &Scene,
        node: NodeId,
        mesh: &Mesh,
        transforms: &FrameTransforms,
    ) {
        let orientation = scene.global_orientation(node);
        let position = scene.global_position(node);
        let scale = mesh.scale();

        // Object to world to clip, one pass over the vertex buffer.
        let mut vertices: Vec<ProjectedVertex> = mesh
            .vertices
            .iter()
            .map(|&vertex| {
                let world = vertex.scale_by(scale).rotate(orientation) + position;
                let clip = transforms.vertex.transform(world, 1.0);
                ProjectedVertex {
                    clip: clip.truncate(),
                    w: clip.w,
                    screen: Vec3::ZERO,
                    remapped: false,
                }
            })
            .collect();

        let normals = project_normals(mesh, orientation, transforms);

        for face in &mesh.faces {
            let corners = face.vertices;

            // Facing test on the area of the screen-plane triangle;
            // perspective divides by each vertex's own w first.
            let edge_a = vertices[corners[2]].screen_plane(self.mode)
                - vertices[corners[1]].screen_plane(self.mode);
            let edge_b = vertices[corners[0]].screen_plane(self.mode)
                - vertices[corners[1]].screen_plane(self.mode);
            if !(edge_a.cross(edge_b).magnitude() > 0.0) {
                continue;
            }

            // A face whose vertices all sit beyond the same frustum plane
            // cannot be visible. Only meaningful while every corner still
            // holds clip values.
            if corners.iter().all(|&i| !vertices[i].remapped) {
                let limit = |i: usize| match self.mode {
                    RenderMode::Perspective => vertices[i].w,
                    RenderMode::Orthographic => 1.0,
                };
                let out_of_view = (0..3).any(|axis| {
                    let coord = |i: usize| {
                        let c = vertices[i].clip;
                        [c.x, c.y, c.z][axis]
                    };
                    corners.iter().all(|&i| coord(i) > limit(i))
                        || corners.iter().all(|&i| coord(i) < -limit(i))
                });
                if out_of_view {
                    continue;
                }
            }

            // Divide and remap each corner to pixel coordinates, once per
            // frame per vertex.
            for &i in &corners {
                if !vertices[i].remapped {
                    let ndc = vertices[i].screen_plane(self.mode);
                    vertices[i].screen = Vec3::new(
                        ndc.x * self.width as f64 / 2.0 + self.width as f64 / 2.0,
                        ndc.y * self.height as f64 / 2.0 + self.height as f64 / 2.0,
                        ndc.z,
                    );
                    vertices[i].remapped = true;
                }
            }

            let screen = [
                vertices[corners[0]].screen,
                vertices[corners[1]].screen,
                vertices[corners[2]].screen,
            ];
            self.rasterize_face(face, mesh, screen, &normals);
        }
    }

    /// Edge-walking scan conversion of one screen-space triangle.
    fn rasterize_face(&mut self, face: &Face, mesh: &Mesh, screen: [Vec3; 3], _normals: &[Vec3]) {
        if doubled_area(screen[0], screen[1], screen[2]).abs() < MIN_DOUBLED_AREA {
            return;
        }
        let basis = Mat3::barycentric_basis(screen[0], screen[1], screen[2]);

        // Sort corners by descending screen y. Comparisons use > only, so
        // the chain picks exactly one ordering.
        let y_ab = screen[0].y > screen[1].y;
        let y_bc = screen[1].y > screen[2].y;
        let y_ca = screen[2].y > screen[0].y;
        let (top, mid, bot) = if y_ab {
            if y_bc {
                (screen[0], screen[1], screen[2])
            } else if y_ca {
                (screen[2], screen[0], screen[1])
            } else {
                (screen[0], screen[2], screen[1])
            }
        } else if !y_bc {
            (screen[2], screen[1], screen[0])
        } else if y_ca {
            (screen[1], screen[2], screen[0])
        } else {
            (screen[1], screen[0], screen[2])
        };

        // Restrict the scanline range to the buffer; a triangle entirely
        // past either edge is done here.
        let height = self.height as i32;
        let mut y_top = top.y as i32;
        if y_top >= height {
            y_top = height - 1;
        } else if y_top < 0 {
            return;
        }
        let mut y_break = mid.y as i32;
        if y_break >= height {
            y_break = height - 1;
        } else if y_break < 0 {
            y_break = 0;
        }
        let mut y_bottom = bot.y as i32;
        if y_bottom < 0 {
            y_bottom = 0;
        } else if y_bottom >= height {
            return;
        }

        // Slopes are change in x as y decreases. The top-mid or mid-bot
        // slope may be NaN for a flat edge; its span is then empty and
        // never walked.
        let top_mid_slope = (mid.x - top.x) / (top.y - mid.y);
        let top_bot_slope = (bot.x - top.x) / (top.y - bot.y);
        let mid_bot_slope = (bot.x - mid.x) / (mid.y - bot.y);

        // Which side of the long top-bot edge the middle corner sits on
        // decides the left/right slope pairing of both spans.
        let is_mid_right = mid.x > top.x + (top.y - mid.y) * top_bot_slope;
        let (left_top_slope, right_top_slope, left_bot_slope, right_bot_slope) = if is_mid_right {
            (top_bot_slope, top_mid_slope, top_bot_slope, mid_bot_slope)
        } else {
            (top_mid_slope, top_bot_slope, mid_bot_slope, top_bot_slope)
        };

        // Span between top and the break row.
        let mut y = y_top;
        while y > y_break {
            let left = (top.x + left_top_slope * (top.y - y as f64)).floor() as i32;
            let right = (top.x + right_top_slope * (top.y - y as f64)).ceil() as i32;
            self.draw_pixel_row(y, left, right, face, mesh, &screen, &basis);
            y -= 1;
        }

        // The break row itself, drawn once when it lies strictly between
        // the span ends and inside the buffer.
        if y_break != y_top && y_break != y_bottom && mid.y > 0.0 && mid.y < self.height as f64 {
            let y_mid = mid.y as i32;
            let (left, right) = if is_mid_right {
                (
                    (top.x + left_top_slope * (top.y - y_mid as f64)).floor() as i32,
                    mid.x as i32,
                )
            } else {
                (
                    mid.x as i32,
                    (top.x + right_top_slope * (top.y - y_mid as f64)).ceil() as i32,
                )
            };
            self.draw_pixel_row(y_mid, left, right, face, mesh, &screen, &basis);
        }

        // Span between the break row and the bottom.
        let mut y = y_bottom;
        while y < y_break {
            let left = (bot.x + left_bot_slope * (bot.y - y as f64)).floor() as i32;
            let right = (bot.x + right_bot_slope * (bot.y - y as f64)).ceil() as i32;
            self.draw_pixel_row(y, left, right, face, mesh, &screen, &basis);
            y += 1;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_pixel_row(
        &mut self,
        y: i32,
        left: i32,
        right: i32,
        face: &Face,
        mesh: &Mesh,
        screen: &[Vec3; 3],
        basis: &Mat3,
    ) {
        let width = self.width as i32;
        if left >= width || right < 0 {
            return;
        }
        let left = left.max(0);
        let right = right.min(width - 1);

        for x in left..=right {
            let weights = *basis * Vec3::new(1.0, x as f64, y as f64);
            let z = weights.x * screen[0].z + weights.y * screen[1].z + weights.z * screen[2].z;
            self.draw_pixel(x as usize, y as usize, z, weights, face, mesh);
        }
    }

    fn draw_pixel(&mut self, x: usize, y: usize, z: f64, weights: Vec3, face: &Face, mesh: &Mesh) {
        let index = y * self.width + x;
        if z < self.depth[index] {
            self.depth[index] = z;
            self.color[index] = match mesh.texture() {
                Some(texture) => {
                    let a = mesh.tex_coords[face.tex_coords[0]];
                    let b = mesh.tex_coords[face.tex_coords[1]];
                    let c = mesh.tex_coords[face.tex_coords[2]];
                    let u = (weights.x * a.x + weights.y * b.x + weights.z * c.x).clamp(0.0, 1.0);
                    let v = (weights.x * a.y + weights.y * b.y + weights.z * c.y).clamp(0.0, 1.0);
                    texture.sample(u, v)
                }
                None => Rgb::BLACK,
            };
        }
    }
}

/// Projects a mesh's normals into clip orientation: the mesh's own global
/// rotation first, then the frame's normal matrix.
///
/// Scan conversion does not consume these yet (there is no lighting
/// model); they are produced for shading consumers.
pub fn project_normals(
    mesh: &Mesh,
    orientation: Quaternion,
    transforms: &FrameTransforms,
) -> Vec<Vec3> {
    mesh.normals
        .iter()
        .map(|&normal| transforms.normal * normal.rotate(orientation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Camera;
    use crate::scene::Attachment;
    use std::f64::consts::FRAC_PI_2;

    fn triangle_mesh(vertices: [Vec3; 3]) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.extend(vertices);
        mesh.normals.extend([Vec3::ZERO; 3]);
        mesh.tex_coords.extend([Vec3::ZERO; 3]);
        mesh.faces.push(Face::from_vertices([0, 1, 2]));
        mesh.calculate_normals();
        mesh
    }

    fn simple_scene(mesh: Mesh) -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Empty);
        let camera = scene.add_node(
            Vec3::ZERO,
            Quaternion::IDENTITY,
            Attachment::Camera(Camera::new(1.0, FRAC_PI_2, 1.0, 100.0)),
        );
        let model = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Mesh(mesh));
        scene.add_child(root, camera).unwrap();
        scene.add_child(root, model).unwrap();
        (scene, root, camera)
    }

    #[test]
    fn empty_scene_leaves_buffers_cleared() {
        let mut scene = Scene::new();
        let root = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Empty);
        let camera = scene.add_node(
            Vec3::ZERO,
            Quaternion::IDENTITY,
            Attachment::Camera(Camera::new(1.0, FRAC_PI_2, 1.0, 100.0)),
        );
        scene.add_child(root, camera).unwrap();

        let mut rasterizer = Rasterizer::new(8, 8, RenderMode::Perspective);
        rasterizer.set_background(Rgb::new(10, 20, 30));
        rasterizer.render_scene(&scene, root, camera).unwrap();

        assert!(rasterizer.pixels().iter().all(|&p| p == Rgb::new(10, 20, 30)));
        assert!(rasterizer.depth().iter().all(|&d| d == f64::INFINITY));
    }

    #[test]
    fn rendering_with_a_non_camera_node_fails() {
        let (scene, root, _) = simple_scene(triangle_mesh([
            Vec3::new(0.0, 0.5, -10.0),
            Vec3::new(-0.5, -0.5, -10.0),
            Vec3::new(0.5, -0.5, -10.0),
        ]));
        let mut rasterizer = Rasterizer::new(8, 8, RenderMode::Perspective);
        assert!(rasterizer.render_scene(&scene, root, root).is_err());
    }

    #[test]
    fn visible_triangle_writes_pixels_and_depth() {
        let (scene, root, camera) = simple_scene(triangle_mesh([
            Vec3::new(0.0, 2.0, -10.0),
            Vec3::new(-2.0, -2.0, -10.0),
            Vec3::new(2.0, -2.0, -10.0),
        ]));
        let mut rasterizer = Rasterizer::new(32, 32, RenderMode::Perspective);
        rasterizer.render_scene(&scene, root, camera).unwrap();

        let written = rasterizer.depth().iter().filter(|&&d| d.is_finite()).count();
        assert!(written > 0);
    }

    #[test]
    fn triangle_outside_the_frustum_writes_nothing() {
        let (scene, root, camera) = simple_scene(triangle_mesh([
            Vec3::new(50.0, 2.0, -10.0),
            Vec3::new(48.0, -2.0, -10.0),
            Vec3::new(52.0, -2.0, -10.0),
        ]));
        let mut rasterizer = Rasterizer::new(32, 32, RenderMode::Perspective);
        rasterizer.render_scene(&scene, root, camera).unwrap();

        assert!(rasterizer.depth().iter().all(|&d| d == f64::INFINITY));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        // All three corners on one line: zero screen area.
        let (scene, root, camera) = simple_scene(triangle_mesh([
            Vec3::new(-1.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(1.0, 0.0, -10.0),
        ]));
        let mut rasterizer = Rasterizer::new(32, 32, RenderMode::Perspective);
        rasterizer.render_scene(&scene, root, camera).unwrap();

        assert!(rasterizer.depth().iter().all(|&d| d == f64::INFINITY));
    }

    #[test]
    fn orthographic_mode_renders_parallel_projection() {
        let mesh = triangle_mesh([
            Vec3::new(0.0, 0.5, -10.0),
            Vec3::new(-0.5, -0.5, -10.0),
            Vec3::new(0.5, -0.5, -10.0),
        ]);
        let (scene, root, camera) = simple_scene(mesh);
        let mut rasterizer = Rasterizer::new(32, 32, RenderMode::Orthographic);
        rasterizer.render_scene(&scene, root, camera).unwrap();

        let written = rasterizer.depth().iter().filter(|&&d| d.is_finite()).count();
        assert!(written > 0);
    }

    #[test]
    fn mesh_scale_enlarges_coverage() {
        // The triangle lives at z = 0 in mesh-local space and the node is
        // pushed back instead, so scaling grows the silhouette rather
        // than also moving the triangle away from the camera.
        let local = [
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
        ];

        let covered = |scale: Option<f64>| {
            let mut mesh = triangle_mesh(local);
            if let Some(factor) = scale {
                mesh.set_scale(factor);
            }
            let mut scene = Scene::new();
            let root = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Empty);
            let camera = scene.add_node(
                Vec3::ZERO,
                Quaternion::IDENTITY,
                Attachment::Camera(Camera::new(1.0, FRAC_PI_2, 1.0, 100.0)),
            );
            let model = scene.add_node(
                Vec3::new(0.0, 0.0, -10.0),
                Quaternion::IDENTITY,
                Attachment::Mesh(mesh),
            );
            scene.add_child(root, camera).unwrap();
            scene.add_child(root, model).unwrap();
            let mut rasterizer = Rasterizer::new(64, 64, RenderMode::Perspective);
            rasterizer.render_scene(&scene, root, camera).unwrap();
            rasterizer.depth().iter().filter(|&&d| d.is_finite()).count()
        };

        assert!(covered(Some(4.0)) > covered(None));
    }

    #[test]
    fn projected_normals_track_mesh_orientation() {
        let mesh = triangle_mesh([
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        ]);
        let (scene, _, camera) = simple_scene(Mesh::new());
        let transforms = FrameTransforms::build(&scene, camera, RenderMode::Orthographic).unwrap();

        let plain = project_normals(&mesh, Quaternion::IDENTITY, &transforms);
        let spun = project_normals(
            &mesh,
            Quaternion::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2),
            &transforms,
        );
        assert_eq!(plain.len(), mesh.normals.len());
        // A quarter turn about x moves the +-z face normal onto the y axis.
        assert!(spun[0].y.abs() > spun[0].z.abs());
    }
}
