//! What the renderer needs from the host scene. The renderer doesn't care how nodes are stored or
//! discovered, only that it can enumerate them once per frame and walk up the hierarchy.

use super::{operation::Operation, shape::Shape};
use crate::helper::unique_id_gen::UniqueId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub UniqueId);

impl NodeId {
    #[inline]
    pub fn raw_id(&self) -> UniqueId {
        self.0
    }
}

impl From<UniqueId> for NodeId {
    fn from(id: UniqueId) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationNode {
    pub id: NodeId,
    pub operation: Operation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeNode {
    pub id: NodeId,
    /// World space position
    pub position: Vec3,
    pub shape: Shape,
}

/// Live scene enumeration. Called once per frame; any method may return nothing.
pub trait SceneProvider {
    /// Every node carrying an operation. The order is the order operations are flattened in.
    fn operation_nodes(&self) -> Vec<OperationNode>;
    /// Every node carrying a shape. Relative order is kept among shapes with the same owner.
    fn shape_nodes(&self) -> Vec<ShapeNode>;
    /// Parent of `node` in the hierarchy, `None` for roots and unknown nodes.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
}

/// Directional light lookup. Split into find + read so the renderer can cache which light it uses
/// and re-run the search only when told the light went away.
pub trait LightProvider {
    /// The first directional light in the scene, if any
    fn find_directional_light(&self) -> Option<NodeId>;
    /// World space direction `light` shines in, or `None` if it no longer exists
    fn light_forward(&self, light: NodeId) -> Option<Vec3>;

    fn directional_light_forward(&self) -> Option<Vec3> {
        self.find_directional_light()
            .and_then(|light| self.light_forward(light))
    }
}

/// For hosts without lights. The renderer falls back to its default light direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLights;

impl LightProvider for NoLights {
    fn find_directional_light(&self) -> Option<NodeId> {
        None
    }

    fn light_forward(&self, _light: NodeId) -> Option<Vec3> {
        None
    }
}
