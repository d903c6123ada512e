use smallvec::SmallVec;

use crate::scene::NodeKey;
use crate::scene::transform::Transform;

/// Runtime state of a drawable mesh node that the scroll timeline animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshState {
    /// Material opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for MeshState {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

/// Runtime state of a light node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub intensity: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self { intensity: 1.0 }
    }
}

/// Explicit node variant tag.
///
/// The drawable graph is fully typed: consumers match on the kind instead of
/// probing nodes with runtime "is this a mesh" checks.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure grouping/transform node (armature roots, empties).
    Group,
    /// Drawable mesh with animatable material state.
    Mesh(MeshState),
    /// Light with animatable intensity.
    Light(LightState),
}

/// A node of the drawable graph.
///
/// Nodes form a single tree through parent/child handles. Only hierarchy and
/// transform data live here; heavyweight resources stay in the asset layer.
#[derive(Debug, Clone)]
pub struct Node {
    /// Canonical node name (used for clip binding and visibility toggles).
    pub name: String,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: SmallVec<[NodeKey; 4]>,

    pub transform: Transform,
    /// Visibility flag, driven by discrete timeline toggles.
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    #[must_use]
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
            visible: true,
            kind,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}
