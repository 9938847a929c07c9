//! The scene graph: a tree of hierarchical entities in 3D space.

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::projection::Camera;
use crate::quaternion::Quaternion;
use crate::vector::Vec3;

/// Handle to a node owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node carries: nothing, a renderable mesh, or a camera frustum.
#[derive(Debug)]
pub enum Attachment {
    Empty,
    Mesh(Mesh),
    Camera(Camera),
}

#[derive(Debug)]
struct Node {
    translation: Vec3,
    orientation: Quaternion,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attachment: Attachment,
}

/// A tree of nodes, each holding a parent-relative translation and
/// orientation.
///
/// Nodes are created unattached, linked into the hierarchy once with
/// [`Scene::add_child`], and then mutated only through
/// [`Scene::rotate`] and [`Scene::translate`]; there is no removal path.
/// Global poses are derived on demand by walking the parent chain, never
/// cached.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new unattached node and returns its handle.
    pub fn add_node(
        &mut self,
        translation: Vec3,
        orientation: Quaternion,
        attachment: Attachment,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            translation,
            orientation,
            parent: None,
            children: Vec::new(),
            attachment,
        });
        id
    }

    /// Links `child` under `parent`.
    ///
    /// A node may have at most one parent for its lifetime; linking a node
    /// that is already parented fails with [`Error::AlreadyParented`]
    /// rather than silently overwriting the link.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.nodes[child.0].parent.is_some() {
            return Err(Error::AlreadyParented);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Composes `rotation` onto the node's local orientation, applied in
    /// the node's current local frame.
    pub fn rotate(&mut self, node: NodeId, rotation: Quaternion) {
        let orientation = self.nodes[node.0].orientation;
        self.nodes[node.0].orientation = orientation.multiply(rotation);
    }

    /// Moves the node by `translation` relative to its parent.
    pub fn translate(&mut self, node: NodeId, translation: Vec3) {
        let current = self.nodes[node.0].translation;
        self.nodes[node.0].translation = current + translation;
    }

    pub fn local_position(&self, node: NodeId) -> Vec3 {
        self.nodes[node.0].translation
    }

    pub fn local_orientation(&self, node: NodeId) -> Quaternion {
        self.nodes[node.0].orientation
    }

    /// The node's absolute position, derived bottom-up from the parent
    /// chain: the local translation is rotated into the parent's frame and
    /// offset by the parent's own global position.
    pub fn global_position(&self, node: NodeId) -> Vec3 {
        let n = &self.nodes[node.0];
        match n.parent {
            Some(parent) => {
                let parent_orientation = self.nodes[parent.0].orientation;
                n.translation.rotate(parent_orientation) + self.global_position(parent)
            }
            None => n.translation,
        }
    }

    /// The node's absolute orientation: the parent's global orientation
    /// composed with the local one.
    pub fn global_orientation(&self, node: NodeId) -> Quaternion {
        let n = &self.nodes[node.0];
        match n.parent {
            Some(parent) => self.global_orientation(parent).multiply(n.orientation),
            None => n.orientation,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn attachment(&self, node: NodeId) -> &Attachment {
        &self.nodes[node.0].attachment
    }

    pub fn attachment_mut(&mut self, node: NodeId) -> &mut Attachment {
        &mut self.nodes[node.0].attachment
    }

    /// The node's mesh, if it carries one.
    pub fn mesh(&self, node: NodeId) -> Option<&Mesh> {
        match &self.nodes[node.0].attachment {
            Attachment::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, node: NodeId) -> Option<&mut Mesh> {
        match &mut self.nodes[node.0].attachment {
            Attachment::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The node's camera, if it carries one.
    pub fn camera(&self, node: NodeId) -> Option<&Camera> {
        match &self.nodes[node.0].attachment {
            Attachment::Camera(camera) => Some(camera),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn empty_node(scene: &mut Scene, translation: Vec3) -> NodeId {
        scene.add_node(translation, Quaternion::IDENTITY, Attachment::Empty)
    }

    #[test]
    fn chain_of_identity_orientations_sums_translations() {
        let mut scene = Scene::new();
        let a = empty_node(&mut scene, Vec3::new(1.0, 0.0, 0.0));
        let b = empty_node(&mut scene, Vec3::new(0.0, 2.0, 0.0));
        let c = empty_node(&mut scene, Vec3::new(0.0, 0.0, 3.0));
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        assert_eq!(scene.global_position(c), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn parent_orientation_rotates_child_position() {
        let mut scene = Scene::new();
        let parent = scene.add_node(
            Vec3::ZERO,
            Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2),
            Attachment::Empty,
        );
        let child = empty_node(&mut scene, Vec3::new(1.0, 0.0, 0.0));
        scene.add_child(parent, child).unwrap();

        let position = scene.global_position(child);
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn global_orientation_composes_parent_then_child() {
        let mut scene = Scene::new();
        let z_quarter = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        let y_quarter = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2);

        let parent = scene.add_node(Vec3::ZERO, z_quarter, Attachment::Empty);
        let child = scene.add_node(Vec3::ZERO, y_quarter, Attachment::Empty);
        scene.add_child(parent, child).unwrap();

        let expected = z_quarter.multiply(y_quarter);
        assert!(scene.global_orientation(child).same_orientation(expected));
    }

    #[test]
    fn reparenting_fails_fast() {
        let mut scene = Scene::new();
        let a = empty_node(&mut scene, Vec3::ZERO);
        let b = empty_node(&mut scene, Vec3::ZERO);
        let orphan = empty_node(&mut scene, Vec3::ZERO);

        scene.add_child(a, orphan).unwrap();
        assert!(matches!(
            scene.add_child(b, orphan),
            Err(Error::AlreadyParented)
        ));
        // The original link is untouched.
        assert_eq!(scene.children(a), &[orphan]);
        assert!(scene.children(b).is_empty());
    }

    #[test]
    fn rotate_composes_in_local_frame() {
        let mut scene = Scene::new();
        let node = empty_node(&mut scene, Vec3::ZERO);
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.25);

        scene.rotate(node, q);
        scene.rotate(node, q);

        let expected = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.5);
        assert!(scene.local_orientation(node).same_orientation(expected));
    }

    #[test]
    fn translate_accumulates() {
        let mut scene = Scene::new();
        let node = empty_node(&mut scene, Vec3::new(1.0, 1.0, 1.0));
        scene.translate(node, Vec3::new(0.5, 0.0, -1.0));
        assert_eq!(scene.local_position(node), Vec3::new(1.5, 1.0, 0.0));
    }

    #[test]
    fn attachments_dispatch_by_tag() {
        let mut scene = Scene::new();
        let plain = empty_node(&mut scene, Vec3::ZERO);
        let solid = scene.add_node(Vec3::ZERO, Quaternion::IDENTITY, Attachment::Mesh(Mesh::new()));

        assert!(scene.mesh(plain).is_none());
        assert!(scene.camera(plain).is_none());
        assert!(scene.mesh(solid).is_some());

        scene.mesh_mut(solid).unwrap().set_scale(3.0);
        assert_eq!(scene.mesh(solid).unwrap().scale(), Vec3::new(3.0, 3.0, 3.0));

        *scene.attachment_mut(plain) = Attachment::Mesh(Mesh::new());
        assert!(matches!(scene.attachment(plain), Attachment::Mesh(_)));
    }
}
