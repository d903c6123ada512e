//! Drawable graph: typed nodes, transforms, skeleton and camera.

pub mod camera;
pub mod node;
pub mod skeleton;
pub mod transform;

pub use camera::Camera;
pub use node::{LightState, MeshState, Node, NodeKind};
pub use skeleton::{Bone, BoneTransform, Pose, Skeleton, canonical_bone_name};
pub use transform::Transform;

use glam::Affine3A;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle to a node of the drawable graph.
    pub struct NodeKey;
}

/// The drawable graph of one page session.
///
/// Owned and mutated exclusively by the render loop; input handlers never
/// touch it directly.
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeKey, Node>,
    roots: Vec<NodeKey>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    /// Inserts a node, optionally under a parent. Orphans become roots.
    pub fn add_node(&mut self, node: Node, parent: Option<NodeKey>) -> NodeKey {
        let key = self.nodes.insert(node);

        if let Some(parent_key) = parent {
            if let Some(p) = self.nodes.get_mut(parent_key) {
                p.children.push(key);
            }
            if let Some(c) = self.nodes.get_mut(key) {
                c.parent = Some(parent_key);
            }
        } else {
            self.roots.push(key);
        }
        key
    }

    /// Removes a node together with its entire subtree.
    pub fn remove_node(&mut self, key: NodeKey) {
        let children: Vec<NodeKey> = match self.nodes.get(key) {
            Some(node) => node.children.to_vec(),
            None => return,
        };

        for child in children {
            self.remove_node(child);
        }

        let parent = self.nodes.get(key).and_then(|n| n.parent);
        if let Some(parent_key) = parent {
            if let Some(p) = self.nodes.get_mut(parent_key) {
                if let Some(pos) = p.children.iter().position(|&c| c == key) {
                    p.children.remove(pos);
                }
            }
        } else if let Some(pos) = self.roots.iter().position(|&r| r == key) {
            self.roots.remove(pos);
        }

        self.nodes.remove(key);
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    pub fn iter_nodes_mut(&mut self) -> impl Iterator<Item = (NodeKey, &mut Node)> {
        self.nodes.iter_mut()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Finds the first node with the given name (depth-first from the roots).
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeKey> {
        fn walk(scene: &Scene, current: NodeKey, name: &str) -> Option<NodeKey> {
            let node = scene.get_node(current)?;
            if node.name == name {
                return Some(current);
            }
            for &child in node.children() {
                if let Some(found) = walk(scene, child, name) {
                    return Some(found);
                }
            }
            None
        }

        self.roots
            .iter()
            .find_map(|&root| walk(self, root, name))
    }

    /// Recomputes world matrices for the whole graph. Called once per frame
    /// after animation has written local transforms.
    pub fn update_world_matrices(&mut self) {
        let roots = self.roots.clone();
        for root in roots {
            self.update_world_recursive(root, Affine3A::IDENTITY, false);
        }
    }

    fn update_world_recursive(
        &mut self,
        key: NodeKey,
        parent_world: Affine3A,
        parent_changed: bool,
    ) {
        let (world, children, changed) = {
            let Some(node) = self.nodes.get_mut(key) else {
                return;
            };

            let local_changed = node.transform.update_local_matrix();
            let needs_update = local_changed || parent_changed;
            if needs_update {
                let world = parent_world * *node.transform.local_matrix();
                node.transform.set_world_matrix(world);
            }

            (
                *node.transform.world_matrix(),
                node.children.to_vec(),
                needs_update,
            )
        };

        for child in children {
            self.update_world_recursive(child, world, changed);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
