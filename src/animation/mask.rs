use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::{Result, VitrineError};
use crate::scene::skeleton::{Skeleton, canonical_bone_name};

/// Index-based bone subset, resolved once against a concrete skeleton.
///
/// Actions carry one of these instead of bone-name strings, so per-frame
/// blending never compares strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneMask {
    bits: Vec<bool>,
}

impl BoneMask {
    /// Mask covering every bone of a skeleton with `bone_count` bones.
    #[must_use]
    pub fn all(bone_count: usize) -> Self {
        Self {
            bits: vec![true; bone_count],
        }
    }

    #[must_use]
    pub fn from_indices(bone_count: usize, indices: &[usize]) -> Self {
        let mut bits = vec![false; bone_count];
        for &i in indices {
            if let Some(bit) = bits.get_mut(i) {
                *bit = true;
            }
        }
        Self { bits }
    }

    #[inline]
    #[must_use]
    pub fn covers(&self, bone: usize) -> bool {
        self.bits.get(bone).copied().unwrap_or(false)
    }

    /// Number of covered bones.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Externally curated bone-group table shape (JSON: group name -> bone names).
#[derive(Debug, Deserialize)]
struct GroupTable(HashMap<String, Vec<String>>);

/// Static mapping from symbolic group names ("head", "typing_fingers", ...)
/// to the bone names they cover.
///
/// Stateless beyond its table: [`BoneMaskRegistry::resolve`] is a pure
/// lookup that validates against the given skeleton at bind time. Bones
/// named in a definition but absent from the skeleton are skipped with a
/// warning, so masks degrade gracefully across model revisions.
#[derive(Debug, Clone)]
pub struct BoneMaskRegistry {
    groups: HashMap<String, Vec<String>>,
}

impl BoneMaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// The built-in table for the desk character rig.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.define("head", &["neck", "head"]);
        registry.define(
            "eyebrows",
            &["brow_inner_l", "brow_inner_r", "brow_outer_l", "brow_outer_r"],
        );
        registry.define(
            "typing_fingers",
            &[
                "hand_l", "thumb_l", "index_l", "middle_l", "ring_l", "pinky_l",
                "hand_r", "thumb_r", "index_r", "middle_r", "ring_r", "pinky_r",
            ],
        );
        registry.define("spine", &["hips", "spine", "spine1", "spine2"]);
        registry.define("left_arm", &["shoulder_l", "upper_arm_l", "lower_arm_l", "hand_l"]);
        registry.define("right_arm", &["shoulder_r", "upper_arm_r", "lower_arm_r", "hand_r"]);
        registry
    }

    /// Adds (or replaces) a group definition. Bone names are canonicalized.
    pub fn define(&mut self, group: &str, bones: &[&str]) {
        self.groups.insert(
            group.to_string(),
            bones.iter().map(|b| canonical_bone_name(b)).collect(),
        );
    }

    /// Loads a table from JSON: `{ "group": ["Bone A", "boneB"], ... }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: GroupTable = serde_json::from_str(json)?;
        let groups = table
            .0
            .into_iter()
            .map(|(group, bones)| {
                let bones = bones.iter().map(|b| canonical_bone_name(b)).collect();
                (group, bones)
            })
            .collect();
        Ok(Self { groups })
    }

    /// Resolves a group against a skeleton into an index-based mask.
    ///
    /// # Errors
    ///
    /// [`VitrineError::UnknownBoneGroup`] when the symbolic name has no
    /// definition. Definition bones missing from the skeleton are skipped
    /// with a warning.
    pub fn resolve(&self, group: &str, skeleton: &Skeleton) -> Result<BoneMask> {
        let Some(bones) = self.groups.get(group) else {
            return Err(VitrineError::UnknownBoneGroup(group.to_string()));
        };

        let mut indices = Vec::with_capacity(bones.len());
        for name in bones {
            match skeleton.bone_index(name) {
                Some(index) => indices.push(index),
                None => {
                    log::warn!("bone group {group:?}: bone {name:?} not present in skeleton");
                }
            }
        }

        Ok(BoneMask::from_indices(skeleton.len(), &indices))
    }
}

impl Default for BoneMaskRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
