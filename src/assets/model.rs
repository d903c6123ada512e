//! Model ingestion: plaintext glTF-binary bytes to drawable graph,
//! skeleton and animation clips.

use std::collections::HashSet;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::clip::{AnimationClip, ChannelData, Track};
use crate::animation::tracks::{Interpolation, KeyframeTrack};
use crate::errors::{Result, VitrineError};
use crate::scene::node::{LightState, MeshState, Node, NodeKind};
use crate::scene::skeleton::{Bone, BoneTransform, Skeleton, canonical_bone_name};
use crate::scene::{NodeKey, Scene};

/// Everything one model asset contributes to the session.
#[derive(Debug)]
pub struct Model {
    pub scene: Scene,
    /// Present when the asset contains a skinned character.
    pub skeleton: Option<Skeleton>,
    /// Named clips, shared read-only across all actions referencing them.
    pub clips: Vec<Arc<AnimationClip>>,
}

impl Model {
    /// Looks up a clip by name.
    #[must_use]
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.iter().find(|c| c.name == name)
    }
}

/// Parses decrypted model bytes into a [`Model`].
pub struct ModelIngestor;

impl ModelIngestor {
    /// # Errors
    ///
    /// [`VitrineError::MalformedAsset`] when the container or its streams
    /// cannot be decoded, the node hierarchy is not a tree, or the skeleton
    /// violates its structural invariants. Clip channels referencing
    /// unknown bones are dropped with a warning, never fatally.
    pub fn parse(plaintext: &[u8]) -> Result<Model> {
        let (document, buffers, _images) = gltf::import_slice(plaintext)?;

        let Some(gltf_scene) = document
            .default_scene()
            .or_else(|| document.scenes().next())
        else {
            return Err(VitrineError::MalformedAsset(
                "container holds no scene".to_string(),
            ));
        };

        let node_count = document.nodes().len();
        let mut scene = Scene::new();
        let mut keys: Vec<Option<NodeKey>> = vec![None; node_count];
        let mut visited = vec![false; node_count];

        for root in gltf_scene.nodes() {
            build_node(&mut scene, &mut keys, &mut visited, &root, None)?;
        }

        // Joint indices, for classifying animation channel targets.
        let joint_set: HashSet<usize> = document
            .skins()
            .next()
            .map(|skin| skin.joints().map(|j| j.index()).collect())
            .unwrap_or_default();

        let skeleton = document
            .skins()
            .next()
            .map(|skin| build_skeleton(&document, &skin, &keys))
            .transpose()?;

        let clips = load_clips(&document, &buffers, &joint_set);

        Ok(Model {
            scene,
            skeleton,
            clips,
        })
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name().map_or_else(
        || format!("node_{}", node.index()),
        canonical_bone_name,
    )
}

fn node_transform(node: &gltf::Node) -> BoneTransform {
    let (translation, rotation, scale) = node.transform().decomposed();
    BoneTransform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    }
}

fn build_node(
    scene: &mut Scene,
    keys: &mut [Option<NodeKey>],
    visited: &mut [bool],
    gltf_node: &gltf::Node,
    parent: Option<NodeKey>,
) -> Result<()> {
    let index = gltf_node.index();
    if visited[index] {
        return Err(VitrineError::MalformedAsset(format!(
            "node {:?} appears more than once in the hierarchy",
            node_name(gltf_node)
        )));
    }
    visited[index] = true;

    let kind = if gltf_node.mesh().is_some() {
        NodeKind::Mesh(MeshState::default())
    } else if let Some(light) = gltf_node.light() {
        NodeKind::Light(LightState {
            intensity: light.intensity(),
        })
    } else {
        NodeKind::Group
    };

    let mut node = Node::new(&node_name(gltf_node), kind);
    let trs = node_transform(gltf_node);
    node.transform.position = trs.translation;
    node.transform.rotation = trs.rotation;
    node.transform.scale = trs.scale;

    let key = scene.add_node(node, parent);
    keys[index] = Some(key);

    for child in gltf_node.children() {
        build_node(scene, keys, visited, &child, Some(key))?;
    }
    Ok(())
}

fn build_skeleton(
    document: &gltf::Document,
    skin: &gltf::Skin,
    keys: &[Option<NodeKey>],
) -> Result<Skeleton> {
    let joint_indices: HashSet<usize> = skin.joints().map(|j| j.index()).collect();

    // Parent lookup over the whole document.
    let mut parents: Vec<Option<usize>> = vec![None; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            parents[child.index()] = Some(node.index());
        }
    }

    // Joints whose parent is outside the joint set root the skeleton.
    let roots: Vec<gltf::Node> = skin
        .joints()
        .filter(|j| parents[j.index()].map_or(true, |p| !joint_indices.contains(&p)))
        .collect();
    let [root] = roots.as_slice() else {
        return Err(VitrineError::MalformedAsset(format!(
            "skeleton must form a single tree, found {} roots",
            roots.len()
        )));
    };

    // Depth-first from the root yields parent-before-child bone order.
    let mut bones = Vec::with_capacity(joint_indices.len());
    let mut stack: Vec<(gltf::Node, Option<usize>)> = vec![(root.clone(), None)];
    while let Some((node, parent_bone)) = stack.pop() {
        let Some(key) = keys[node.index()] else {
            return Err(VitrineError::MalformedAsset(format!(
                "skeleton joint {:?} is not part of the scene graph",
                node_name(&node)
            )));
        };

        let bone_index = bones.len();
        bones.push(Bone {
            name: node_name(&node),
            parent: parent_bone,
            rest: node_transform(&node),
            node: key,
        });

        for child in node.children() {
            if joint_indices.contains(&child.index()) {
                stack.push((child, Some(bone_index)));
            }
        }
    }

    Skeleton::new(bones)
}

fn load_clips(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    joint_set: &HashSet<usize>,
) -> Vec<Arc<AnimationClip>> {
    let mut clips = Vec::new();

    for (anim_index, anim) in document.animations().enumerate() {
        let clip_name = anim
            .name()
            .map_or_else(|| format!("clip_{anim_index}"), str::to_string);
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let target = channel.target();
            let target_node = target.node();

            if !joint_set.contains(&target_node.index()) {
                log::warn!(
                    "clip {clip_name:?}: channel targets {:?} which is not a skeleton bone, dropped",
                    node_name(&target_node)
                );
                continue;
            }
            let bone = node_name(&target_node);

            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|b| &b[..]));
            let Some(times) = reader.read_inputs().map(|iter| iter.collect::<Vec<f32>>()) else {
                log::warn!("clip {clip_name:?}: channel for {bone:?} has no input curve, dropped");
                continue;
            };
            let Some(outputs) = reader.read_outputs() else {
                log::warn!("clip {clip_name:?}: channel for {bone:?} has no output curve, dropped");
                continue;
            };

            let gltf_interpolation = channel.sampler().interpolation();
            let interpolation = match gltf_interpolation {
                gltf::animation::Interpolation::Step => Interpolation::Step,
                gltf::animation::Interpolation::Linear => Interpolation::Linear,
                gltf::animation::Interpolation::CubicSpline => {
                    // Tangents are discarded; the value points interpolate
                    // linearly, which is visually close at typical sample
                    // rates.
                    log::warn!(
                        "clip {clip_name:?}: cubic-spline channel for {bone:?} downgraded to linear"
                    );
                    Interpolation::Linear
                }
            };
            let cubic = gltf_interpolation == gltf::animation::Interpolation::CubicSpline;

            let data = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => {
                    let values = extract(iter.map(Vec3::from_array), cubic);
                    KeyframeTrack::new(times, values, interpolation).map(ChannelData::Translation)
                }
                gltf::animation::util::ReadOutputs::Rotations(iter) => {
                    let values = extract(iter.into_f32().map(Quat::from_array), cubic);
                    KeyframeTrack::new(times, values, interpolation).map(ChannelData::Rotation)
                }
                gltf::animation::util::ReadOutputs::Scales(iter) => {
                    let values = extract(iter.map(Vec3::from_array), cubic);
                    KeyframeTrack::new(times, values, interpolation).map(ChannelData::Scale)
                }
                gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                    log::warn!(
                        "clip {clip_name:?}: morph-weight channel for {bone:?} is unsupported, dropped"
                    );
                    None
                }
            };

            match data {
                Some(data) => tracks.push(Track { bone, data }),
                None => {
                    log::warn!("clip {clip_name:?}: malformed channel for {bone:?} dropped");
                }
            }
        }

        if tracks.is_empty() {
            log::warn!("clip {clip_name:?} has no usable channels, skipped");
            continue;
        }
        clips.push(Arc::new(AnimationClip::new(clip_name, tracks)));
    }

    clips
}

/// Collects sampler outputs; cubic-spline samplers store
/// (in-tangent, value, out-tangent) triplets, of which only the value
/// points are kept.
fn extract<T>(iter: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        iter.skip(1).step_by(3).collect()
    } else {
        iter.collect()
    }
}
