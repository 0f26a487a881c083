use super::{
    config_engine::LOCAL_FORWARD,
    operation::Operation,
    scene_provider::{LightProvider, NodeId, OperationNode, SceneProvider, ShapeNode},
    shape::Shape,
};
use crate::helper::{
    more_errors::from_err_impl,
    unique_id_gen::{UniqueIdError, UniqueIdGen},
};
use ahash::AHashSet;
use glam::{Quat, Vec3};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, error, fmt};

// ~~ Scene Node ~~

/// What a node contributes to the rendered scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeComponent {
    /// Transform only, e.g. for grouping
    Empty,
    Operation(Operation),
    Shape(Shape),
    /// Shines along the node's local -Z
    DirectionalLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    /// Relative to the parent node
    pub translation: Vec3,
    /// Relative to the parent node
    pub rotation: Quat,
    pub component: NodeComponent,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: String, parent: Option<NodeId>, translation: Vec3, component: NodeComponent) -> Self {
        Self {
            name,
            translation,
            rotation: Quat::IDENTITY,
            component,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// World transform of a child node with local transform `child`
    fn then(self, child: &SceneNode) -> Self {
        Self {
            translation: self.translation + self.rotation * child.translation,
            rotation: self.rotation * child.rotation,
        }
    }
}

// ~~ Scene Graph ~~

/// Hierarchy of named nodes, each with a local transform and at most one component.
/// Stands in for the host engine's scene: it's what the renderer enumerates every frame.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    unique_id_gen: UniqueIdGen,
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        translation: Vec3,
        component: NodeComponent,
    ) -> Result<NodeId, SceneGraphError> {
        if let Some(parent_id) = parent {
            self.get_node(parent_id)?;
        }
        let node_id = NodeId(self.unique_id_gen.new_id()?);
        self.nodes.insert(
            node_id,
            SceneNode::new(name.into(), parent, translation, component),
        );
        if let Some(parent_id) = parent {
            self.get_node_mut(parent_id)?.children.push(node_id);
        }
        Ok(node_id)
    }

    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        translation: Vec3,
    ) -> Result<NodeId, SceneGraphError> {
        self.add_node(name, parent, translation, NodeComponent::Empty)
    }

    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        operation: Operation,
    ) -> Result<NodeId, SceneGraphError> {
        self.add_node(name, parent, Vec3::ZERO, NodeComponent::Operation(operation))
    }

    pub fn add_shape(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        translation: Vec3,
        shape: Shape,
    ) -> Result<NodeId, SceneGraphError> {
        self.add_node(name, parent, translation, NodeComponent::Shape(shape))
    }

    pub fn add_directional_light(
        &mut self,
        name: impl Into<String>,
        rotation: Quat,
    ) -> Result<NodeId, SceneGraphError> {
        let light_id = self.add_node(name, None, Vec3::ZERO, NodeComponent::DirectionalLight)?;
        self.get_node_mut(light_id)?.rotation = rotation;
        Ok(light_id)
    }

    /// Removes the node and all of its descendants. Returns the removed ids, parent first.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Vec<NodeId>, SceneGraphError> {
        let parent = self.get_node(node_id)?.parent;
        if let Some(parent_id) = parent {
            self.get_node_mut(parent_id)?
                .children
                .retain(|&child| child != node_id);
        }

        let removed_ids = self.subtree(node_id);
        for &removed_id in &removed_ids {
            self.nodes.remove(&removed_id);
            // tell id generator it can reuse the old id now
            if let Err(e) = self.unique_id_gen.recycle_id(removed_id.raw_id()) {
                info!("{}", e);
            }
        }
        debug!("removed {} scene node(s) starting at id = {}", removed_ids.len(), node_id);
        Ok(removed_ids)
    }

    /// Moves `node_id` (with its subtree) under `new_parent`, appending it after the existing
    /// children. `None` makes it a root.
    pub fn set_parent(
        &mut self,
        node_id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<(), SceneGraphError> {
        let old_parent = self.get_node(node_id)?.parent;

        if let Some(new_parent_id) = new_parent {
            self.get_node(new_parent_id)?;
            if self.is_self_or_ancestor(node_id, new_parent_id) {
                return Err(SceneGraphError::ParentCycle {
                    node: node_id,
                    new_parent: new_parent_id,
                });
            }
        }

        if let Some(old_parent_id) = old_parent {
            self.get_node_mut(old_parent_id)?
                .children
                .retain(|&child| child != node_id);
        }
        if let Some(new_parent_id) = new_parent {
            self.get_node_mut(new_parent_id)?.children.push(node_id);
        }
        self.get_node_mut(node_id)?.parent = new_parent;
        Ok(())
    }

    pub fn node(&self, node_id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&node_id)
    }

    /// Mutable access to name, transform and component. Hierarchy changes go through
    /// [`Self::set_parent`] and [`Self::remove_node`].
    pub fn node_mut(&mut self, node_id: NodeId) -> Result<&mut SceneNode, SceneGraphError> {
        self.get_node_mut(node_id)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in id order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(&id, _)| id)
    }

    /// Every node reachable from the roots, pre-order, children in insertion order
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.visit_depth_first(|node_id, _, _| order.push(node_id));
        order
    }

    pub fn world_transform(&self, node_id: NodeId) -> Option<WorldTransform> {
        let mut chain = vec![self.nodes.get(&node_id)?];
        let mut current = chain[0].parent;
        while let Some(parent_id) = current {
            if chain.len() > self.nodes.len() {
                warn!("scene hierarchy above node {} contains a cycle", node_id);
                return None;
            }
            let parent = self.nodes.get(&parent_id)?;
            chain.push(parent);
            current = parent.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(WorldTransform::IDENTITY, |world, node| world.then(node)),
        )
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|(&id, node)| (id, node.clone()))
                .collect(),
        }
    }

    /// Rebuilds a scene from a snapshot, checking that parent and child links agree and that
    /// every node hangs off a root.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Result<Self, SceneGraphError> {
        let nodes: BTreeMap<NodeId, SceneNode> = snapshot.nodes.into_iter().collect();
        for (&id, node) in &nodes {
            if let Some(parent_id) = node.parent {
                let parent_links_back = nodes
                    .get(&parent_id)
                    .is_some_and(|parent| parent.children.contains(&id));
                if !parent_links_back {
                    return Err(SceneGraphError::BrokenSnapshot(id));
                }
            }
            for child_id in &node.children {
                let child_links_back = nodes
                    .get(child_id)
                    .is_some_and(|child| child.parent == Some(id));
                if !child_links_back {
                    return Err(SceneGraphError::BrokenSnapshot(id));
                }
            }
        }

        let unique_id_gen = UniqueIdGen::from_used_ids(nodes.keys().map(|id| id.raw_id()))?;
        let scene = Self {
            unique_id_gen,
            nodes,
        };
        scene.check_every_node_reached_once()?;
        Ok(scene)
    }
}

// ~~ Private Functions ~~

impl SceneGraph {
    fn get_node(&self, node_id: NodeId) -> Result<&SceneNode, SceneGraphError> {
        self.nodes
            .get(&node_id)
            .ok_or(SceneGraphError::InvalidId(node_id))
    }

    fn get_node_mut(&mut self, node_id: NodeId) -> Result<&mut SceneNode, SceneGraphError> {
        self.nodes
            .get_mut(&node_id)
            .ok_or(SceneGraphError::InvalidId(node_id))
    }

    /// True if `ancestor` is `node_id` or one of the nodes above `node_id`
    fn is_self_or_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> bool {
        let mut current = Some(node_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return true;
            }
            current = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    fn subtree(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut subtree = Vec::new();
        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            subtree.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev());
            }
        }
        subtree
    }

    /// Pre-order traversal from every root, passing each node's world transform along
    /// Walks down from the roots. A node reached twice is listed under more than one parent, a node
    /// never reached sits in a cycle cut off from the roots.
    fn check_every_node_reached_once(&self) -> Result<(), SceneGraphError> {
        let mut reached = AHashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots().collect();
        while let Some(node_id) = stack.pop() {
            if !reached.insert(node_id) {
                return Err(SceneGraphError::BrokenSnapshot(node_id));
            }
            if let Some(node) = self.nodes.get(&node_id) {
                stack.extend(node.children.iter().copied());
            }
        }

        match self.nodes.keys().find(|id| !reached.contains(*id)) {
            Some(&orphan) => Err(SceneGraphError::BrokenSnapshot(orphan)),
            None => Ok(()),
        }
    }

    fn visit_depth_first(&self, mut visit: impl FnMut(NodeId, &SceneNode, WorldTransform)) {
        let mut stack: Vec<(NodeId, WorldTransform)> = self
            .roots()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|id| (id, WorldTransform::IDENTITY))
            .collect();

        while let Some((node_id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            let world = parent_world.then(node);
            visit(node_id, node, world);
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}

// ~~ Scene Provider ~~

impl SceneProvider for SceneGraph {
    fn operation_nodes(&self) -> Vec<OperationNode> {
        let mut operation_nodes = Vec::new();
        self.visit_depth_first(|id, node, _| {
            if let NodeComponent::Operation(operation) = node.component {
                operation_nodes.push(OperationNode { id, operation });
            }
        });
        operation_nodes
    }

    fn shape_nodes(&self) -> Vec<ShapeNode> {
        let mut shape_nodes = Vec::new();
        self.visit_depth_first(|id, node, world| {
            if let NodeComponent::Shape(shape) = node.component {
                shape_nodes.push(ShapeNode {
                    id,
                    position: world.translation,
                    shape,
                });
            }
        });
        shape_nodes
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|node| node.parent)
    }
}

impl LightProvider for SceneGraph {
    fn find_directional_light(&self) -> Option<NodeId> {
        let mut light = None;
        self.visit_depth_first(|id, node, _| {
            if light.is_none() && node.component == NodeComponent::DirectionalLight {
                light = Some(id);
            }
        });
        light
    }

    fn light_forward(&self, light: NodeId) -> Option<Vec3> {
        if self.nodes.get(&light)?.component != NodeComponent::DirectionalLight {
            return None;
        }
        let world = self.world_transform(light)?;
        Some(world.rotation * LOCAL_FORWARD)
    }
}

// ~~ Snapshot ~~

/// Serializable form of a [`SceneGraph`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub nodes: Vec<(NodeId, SceneNode)>,
}

// ~~ Errors ~~

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneGraphError {
    InvalidId(NodeId),
    /// The requested parent is the node itself or one of its descendants
    ParentCycle { node: NodeId, new_parent: NodeId },
    /// Parent/child links of this node disagree, or it can't be reached from a root
    BrokenSnapshot(NodeId),
    UniqueIdError(UniqueIdError),
}

from_err_impl!(SceneGraphError, UniqueIdError);

impl fmt::Display for SceneGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "invalid scene node id {}", id),
            Self::ParentCycle { node, new_parent } => write!(
                f,
                "cannot parent node {} to {} because it would create a cycle",
                node, new_parent
            ),
            Self::BrokenSnapshot(id) => {
                write!(f, "scene snapshot has inconsistent links at node {}", id)
            }
            Self::UniqueIdError(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for SceneGraphError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::UniqueIdError(e) => Some(e),
            _ => None,
        }
    }
}

// ~~ Tests ~~

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::operation::OperationKind;

    fn test_scene() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let union = scene.add_operation("union", None, Operation::union()).unwrap();
        scene
            .add_shape("a", Some(union), Vec3::X, Shape::sphere(1.))
            .unwrap();
        scene
            .add_shape("b", Some(union), Vec3::Y, Shape::cube(Vec3::ONE))
            .unwrap();
        let subtract = scene
            .add_operation(
                "subtract",
                Some(union),
                Operation::new(OperationKind::Subtract, 0.),
            )
            .unwrap();
        let c = scene
            .add_shape("c", Some(subtract), Vec3::Z, Shape::torus(1., 0.2))
            .unwrap();
        (scene, union, subtract, c)
    }

    #[test]
    fn depth_first_is_pre_order() {
        let (scene, union, subtract, c) = test_scene();
        let order = scene.depth_first();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], union);
        assert_eq!(order[3], subtract);
        assert_eq!(order[4], c);
    }

    #[test]
    fn provider_enumerates_components() {
        let (scene, union, subtract, c) = test_scene();
        let operations = scene.operation_nodes();
        assert_eq!(
            operations.iter().map(|op| op.id).collect::<Vec<_>>(),
            vec![union, subtract]
        );
        let shapes = scene.shape_nodes();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[2].id, c);
        assert_eq!(scene.parent(c), Some(subtract));
        assert_eq!(scene.parent(union), None);
    }

    #[test]
    fn world_position_follows_parents() {
        let mut scene = SceneGraph::new();
        let group = scene.add_group("group", None, Vec3::new(0., 2., 0.)).unwrap();
        scene.node_mut(group).unwrap().rotation =
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let shape = scene
            .add_shape("shape", Some(group), Vec3::X, Shape::sphere(1.))
            .unwrap();

        let world = scene.world_transform(shape).unwrap();
        assert!(world
            .translation
            .abs_diff_eq(Vec3::new(0., 2., -1.), 1e-5));
        let from_provider = scene.shape_nodes()[0].position;
        assert!(from_provider.abs_diff_eq(world.translation, 1e-5));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut scene, union, subtract, c) = test_scene();
        assert_eq!(
            scene.set_parent(union, Some(c)),
            Err(SceneGraphError::ParentCycle {
                node: union,
                new_parent: c
            })
        );
        assert!(scene.set_parent(subtract, Some(subtract)).is_err());

        scene.set_parent(c, Some(union)).unwrap();
        assert_eq!(scene.parent(c), Some(union));
        assert!(scene.node(subtract).unwrap().children().is_empty());
        assert_eq!(scene.node(union).unwrap().children().last(), Some(&c));
    }

    #[test]
    fn remove_takes_subtree_and_recycles_ids() {
        let (mut scene, union, subtract, c) = test_scene();
        let removed = scene.remove_node(subtract).unwrap();
        assert_eq!(removed, vec![subtract, c]);
        assert_eq!(scene.len(), 3);
        assert!(!scene.node(union).unwrap().children().contains(&subtract));
        assert_eq!(scene.remove_node(c), Err(SceneGraphError::InvalidId(c)));

        let new_id = scene
            .add_shape("d", None, Vec3::ZERO, Shape::default())
            .unwrap();
        assert_eq!(new_id, subtract);
    }

    #[test]
    fn light_forward_uses_world_rotation() {
        let mut scene = SceneGraph::new();
        assert_eq!(scene.directional_light_forward(), None);
        let light = scene
            .add_directional_light(
                "sun",
                Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            )
            .unwrap();
        assert_eq!(scene.find_directional_light(), Some(light));
        let forward = scene.light_forward(light).unwrap();
        assert!(forward.abs_diff_eq(Vec3::NEG_Y, 1e-5));

        scene.remove_node(light).unwrap();
        assert_eq!(scene.light_forward(light), None);
    }

    #[test]
    fn snapshot_round_trip() {
        let (scene, ..) = test_scene();
        let rebuilt = SceneGraph::from_snapshot(scene.snapshot()).unwrap();
        assert_eq!(rebuilt.snapshot(), scene.snapshot());
        assert_eq!(rebuilt.shape_nodes(), scene.shape_nodes());
    }

    #[test]
    fn broken_snapshot_rejected() {
        let (scene, _, subtract, _) = test_scene();
        let mut snapshot = scene.snapshot();
        for (id, node) in &mut snapshot.nodes {
            if *id == subtract {
                node.parent = None;
            }
        }
        assert!(matches!(
            SceneGraph::from_snapshot(snapshot),
            Err(SceneGraphError::BrokenSnapshot(_))
        ));
    }

    #[test]
    fn child_listed_twice_reported() {
        let (scene, union, _, _) = test_scene();
        let mut snapshot = scene.snapshot();
        let mut repeated = None;
        for (id, node) in &mut snapshot.nodes {
            if *id == union {
                let first_child = node.children[0];
                node.children.push(first_child);
                repeated = Some(first_child);
            }
        }
        assert_eq!(
            SceneGraph::from_snapshot(snapshot).err(),
            repeated.map(SceneGraphError::BrokenSnapshot)
        );
    }

    #[test]
    fn detached_cycle_reports_its_node() {
        let (scene, union, subtract, c) = test_scene();
        let mut snapshot = scene.snapshot();
        for (id, node) in &mut snapshot.nodes {
            if *id == union {
                node.children.retain(|&child| child != subtract);
            } else if *id == subtract {
                node.parent = Some(c);
            } else if *id == c {
                node.children.push(subtract);
            }
        }
        assert_eq!(
            SceneGraph::from_snapshot(snapshot).err(),
            Some(SceneGraphError::BrokenSnapshot(subtract))
        );
    }

    #[test]
    fn sparse_snapshot_ids_load() {
        let mut scene = SceneGraph::new();
        let shape = scene
            .add_shape("far", None, Vec3::ZERO, Shape::default())
            .unwrap();
        let mut snapshot = scene.snapshot();
        let far_id = NodeId(u32::MAX - 1);
        snapshot.nodes[0].0 = far_id;
        assert_ne!(shape, far_id);

        let mut rebuilt = SceneGraph::from_snapshot(snapshot).unwrap();
        assert_eq!(rebuilt.len(), 1);
        let next = rebuilt.add_group("next", None, Vec3::ZERO).unwrap();
        assert_eq!(next, NodeId(1));
    }

    #[test]
    fn exhausted_snapshot_ids_rejected() {
        let mut scene = SceneGraph::new();
        scene
            .add_shape("last", None, Vec3::ZERO, Shape::default())
            .unwrap();
        let mut snapshot = scene.snapshot();
        snapshot.nodes[0].0 = NodeId(u32::MAX);
        assert_eq!(
            SceneGraph::from_snapshot(snapshot).err(),
            Some(SceneGraphError::UniqueIdError(UniqueIdError::MaxReached))
        );
    }
}
