use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::errors::{Result, VitrineError};
use crate::scene::NodeKey;

/// Local TRS sample of a single bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A single joint of the skeleton.
#[derive(Debug, Clone)]
pub struct Bone {
    /// Canonical name, see [`canonical_bone_name`].
    pub name: String,
    /// Index of the parent bone. `None` only for the root.
    pub parent: Option<usize>,
    /// Bind/rest pose local transform.
    pub rest: BoneTransform,
    /// Scene node this bone drives.
    pub node: NodeKey,
}

/// Normalizes a bone name to a canonical form so group lookups survive
/// authoring-tool quirks: trimmed, lowercased, internal whitespace runs
/// collapsed to a single `_`.
#[must_use]
pub fn canonical_bone_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            in_space = true;
        } else {
            if in_space {
                out.push('_');
                in_space = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Ordered bone set of one character.
///
/// Bones are stored parent-before-child, which both rules out cycles and lets
/// pose application walk the array front to back. The structure is immutable
/// after ingestion; per-frame animation state lives in [`Pose`].
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    index_by_name: HashMap<String, usize>,
}

impl Skeleton {
    /// Validates the tree invariant and builds the name index.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::MalformedAsset`] when bone names collide, a
    /// parent index does not precede its child (which would permit a cycle),
    /// or the bones do not form exactly one tree.
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        let mut index_by_name = HashMap::with_capacity(bones.len());
        let mut roots = 0usize;

        for (i, bone) in bones.iter().enumerate() {
            if index_by_name.insert(bone.name.clone(), i).is_some() {
                return Err(VitrineError::MalformedAsset(format!(
                    "duplicate bone name {:?}",
                    bone.name
                )));
            }
            match bone.parent {
                None => roots += 1,
                Some(p) if p >= i => {
                    return Err(VitrineError::MalformedAsset(format!(
                        "bone {:?} has parent index {p} that does not precede it",
                        bone.name
                    )));
                }
                Some(_) => {}
            }
        }

        if roots != 1 {
            return Err(VitrineError::MalformedAsset(format!(
                "skeleton must form a single tree, found {roots} roots"
            )));
        }

        Ok(Self {
            bones,
            index_by_name,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Looks up a bone by canonical name.
    #[must_use]
    pub fn bone_index(&self, canonical_name: &str) -> Option<usize> {
        self.index_by_name.get(canonical_name).copied()
    }

    /// The default, unanimated pose.
    #[must_use]
    pub fn rest_pose(&self) -> Pose {
        Pose {
            locals: self.bones.iter().map(|b| b.rest).collect(),
        }
    }
}

/// One frame's local transforms for every bone of a skeleton, in bone order.
#[derive(Debug, Clone)]
pub struct Pose {
    pub(crate) locals: Vec<BoneTransform>,
}

impl Pose {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn local(&self, bone: usize) -> &BoneTransform {
        &self.locals[bone]
    }

    #[inline]
    pub fn local_mut(&mut self, bone: usize) -> &mut BoneTransform {
        &mut self.locals[bone]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_collapse_case_and_whitespace() {
        assert_eq!(canonical_bone_name("  Head "), "head");
        assert_eq!(canonical_bone_name("Left  Hand\tIndex"), "left_hand_index");
        assert_eq!(canonical_bone_name("Spine01"), "spine01");
    }

    fn bone(name: &str, parent: Option<usize>) -> Bone {
        Bone {
            name: name.to_string(),
            parent,
            rest: BoneTransform::IDENTITY,
            node: NodeKey::default(),
        }
    }

    #[test]
    fn rejects_multiple_roots() {
        let err = Skeleton::new(vec![bone("a", None), bone("b", None)]).unwrap_err();
        assert!(matches!(err, VitrineError::MalformedAsset(_)));
    }

    #[test]
    fn rejects_parent_after_child() {
        let err = Skeleton::new(vec![bone("a", None), bone("b", Some(2)), bone("c", Some(0))])
            .unwrap_err();
        assert!(matches!(err, VitrineError::MalformedAsset(_)));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Skeleton::new(vec![bone("a", None), bone("a", Some(0))]).unwrap_err();
        assert!(matches!(err, VitrineError::MalformedAsset(_)));
    }
}
