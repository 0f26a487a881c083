use super::shader_interfaces::{
    operation_buffer::{encode_operations, OperationLayout, OperationRecord},
    shape_buffer::{encode_shapes, ShapeLayout, ShapeRecord},
};
use crate::engine::scene_provider::{NodeId, SceneProvider, ShapeNode};
use ahash::{AHashMap, AHashSet};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// The scene as flat arrays, in the order the shader walks them.
///
/// Operation `i` owns the `operations[i].child_count` consecutive shapes that start right after
/// the shapes owned by operations `0..i`. Shapes without an owning operation come last with index
/// -1 and aren't counted by any operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedScene {
    pub operations: Vec<OperationRecord>,
    pub shapes: Vec<ShapeRecord>,
}

impl FlattenedScene {
    #[inline]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Sum of every operation's child count. Equals [`Self::owned_shape_count`].
    pub fn child_count_total(&self) -> usize {
        self.operations
            .iter()
            .map(|op| op.child_count.max(0) as usize)
            .sum()
    }

    pub fn owned_shape_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|shape| shape.owner().is_some())
            .count()
    }

    pub fn encode_operations(&self, layout: OperationLayout) -> Vec<u8> {
        encode_operations(layout, &self.operations)
    }

    pub fn encode_shapes(&self, layout: ShapeLayout) -> Vec<u8> {
        encode_shapes(layout, &self.shapes)
    }
}

/// Rebuilds the flat arrays from the live scene every frame. Nothing but the previous counts
/// (for logging) survives between frames.
#[derive(Debug, Default)]
pub struct SceneFlattener {
    previous_counts: Option<(usize, usize)>,
}

impl SceneFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flatten(&mut self, scene: &dyn SceneProvider) -> FlattenedScene {
        let flattened = flatten_scene(scene);

        let counts = (flattened.operation_count(), flattened.shape_count());
        if self.previous_counts != Some(counts) {
            debug!(
                "flattened scene now has {} operation(s) and {} shape(s) ({} owned)",
                counts.0,
                counts.1,
                flattened.owned_shape_count()
            );
            self.previous_counts = Some(counts);
        }
        flattened
    }
}

/// Enumerates the scene once and emits both record arrays. Child counts are recomputed from the
/// current hierarchy, never taken from a previous frame.
pub fn flatten_scene(scene: &dyn SceneProvider) -> FlattenedScene {
    let operation_nodes = scene.operation_nodes();
    let shape_nodes = scene.shape_nodes();

    let mut operation_indices: AHashMap<NodeId, usize> =
        AHashMap::with_capacity(operation_nodes.len());
    for (index, node) in operation_nodes.iter().enumerate() {
        // a node enumerated twice keeps its first position
        operation_indices.entry(node.id).or_insert(index);
    }

    let owners: Vec<Option<usize>> = shape_nodes
        .iter()
        .map(|shape| resolve_owner(scene, shape, &operation_indices))
        .collect();

    let mut child_counts = vec![0_usize; operation_nodes.len()];
    for owner in owners.iter().flatten() {
        child_counts[*owner] += 1;
    }

    let operations = operation_nodes
        .iter()
        .zip(child_counts)
        .map(|(node, child_count)| OperationRecord::new(node.operation, child_count))
        .collect();

    let mut shapes: Vec<ShapeRecord> = shape_nodes
        .iter()
        .zip(owners)
        .map(|(node, owner)| ShapeRecord::new(node.position, node.shape, owner))
        .collect();
    // stable, so enumeration order is kept within each owner
    shapes.sort_by_key(|shape| shape.owner().unwrap_or(usize::MAX));

    FlattenedScene { operations, shapes }
}

/// Index of the nearest ancestor carrying an operation
fn resolve_owner(
    scene: &dyn SceneProvider,
    shape: &ShapeNode,
    operation_indices: &AHashMap<NodeId, usize>,
) -> Option<usize> {
    let mut visited = AHashSet::new();
    visited.insert(shape.id);

    let mut current = scene.parent(shape.id);
    while let Some(node_id) = current {
        if let Some(&index) = operation_indices.get(&node_id) {
            return Some(index);
        }
        if !visited.insert(node_id) {
            warn!(
                "parent cycle above shape node {} at node {}. treating shape as unowned",
                shape.id, node_id
            );
            return None;
        }
        current = scene.parent(node_id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{
            operation::{Operation, OperationKind},
            scene_graph::SceneGraph,
            scene_provider::OperationNode,
            shape::Shape,
        },
        renderer::shader_interfaces::shape_buffer::NO_OWNER_INDEX,
    };
    use glam::Vec3;

    #[test]
    fn counts_match_scene() {
        let mut scene = SceneGraph::new();
        let union = scene.add_operation("union", None, Operation::union()).unwrap();
        let blend = scene
            .add_operation("blend", Some(union), Operation::blend(0.3))
            .unwrap();
        for i in 0..5 {
            let parent = if i % 2 == 0 { union } else { blend };
            scene
                .add_shape(format!("s{}", i), Some(parent), Vec3::X * i as f32, Shape::default())
                .unwrap();
        }

        let flattened = SceneFlattener::new().flatten(&scene);
        assert_eq!(flattened.operation_count(), 2);
        assert_eq!(flattened.shape_count(), 5);
        assert_eq!(flattened.child_count_total(), flattened.owned_shape_count());
    }

    #[test]
    fn three_children_give_child_count_three() {
        let mut scene = SceneGraph::new();
        let subtract = scene
            .add_operation("subtract", None, Operation::new(OperationKind::Subtract, 0.))
            .unwrap();
        for i in 0..3 {
            scene
                .add_shape(format!("s{}", i), Some(subtract), Vec3::ZERO, Shape::sphere(1.))
                .unwrap();
        }
        let flattened = flatten_scene(&scene);
        assert_eq!(flattened.operations[0].child_count, 3);
        assert!(flattened.shapes.iter().all(|shape| shape.index == 0));
    }

    #[test]
    fn empty_scene() {
        let flattened = flatten_scene(&SceneGraph::new());
        assert_eq!(flattened, FlattenedScene::default());
        assert!(flattened.encode_operations(OperationLayout::Blend).is_empty());
        assert!(flattened.encode_shapes(ShapeLayout::Plain).is_empty());
    }

    #[test]
    fn child_counts_follow_reparenting() {
        let mut scene = SceneGraph::new();
        let first = scene.add_operation("first", None, Operation::union()).unwrap();
        let second = scene.add_operation("second", None, Operation::union()).unwrap();
        let shape = scene
            .add_shape("shape", Some(first), Vec3::ZERO, Shape::default())
            .unwrap();
        let mut flattener = SceneFlattener::new();

        let before = flattener.flatten(&scene);
        assert_eq!(before.operations[0].child_count, 1);
        assert_eq!(before.operations[1].child_count, 0);

        scene.set_parent(shape, Some(second)).unwrap();
        let after = flattener.flatten(&scene);
        assert_eq!(after.operations[0].child_count, 0);
        assert_eq!(after.operations[1].child_count, 1);
        assert_eq!(after.shapes[0].index, 1);

        scene.set_parent(shape, None).unwrap();
        let unowned = flattener.flatten(&scene);
        assert_eq!(unowned.child_count_total(), 0);
        assert_eq!(unowned.shapes[0].index, NO_OWNER_INDEX);
    }

    #[test]
    fn nested_operation_owns_its_own_shapes() {
        let mut scene = SceneGraph::new();
        let outer = scene.add_operation("outer", None, Operation::union()).unwrap();
        let group = scene.add_group("group", Some(outer), Vec3::Y).unwrap();
        let inner = scene
            .add_operation("inner", Some(group), Operation::blend(0.2))
            .unwrap();
        let deep = scene
            .add_shape("deep", Some(inner), Vec3::X, Shape::sphere(0.5))
            .unwrap();
        let grouped = scene
            .add_shape("grouped", Some(group), Vec3::ZERO, Shape::cube(Vec3::ONE))
            .unwrap();
        scene
            .add_shape("loose", None, Vec3::ZERO, Shape::default())
            .unwrap();

        let flattened = flatten_scene(&scene);
        assert_eq!(flattened.operations[0].child_count, 1);
        assert_eq!(flattened.operations[1].child_count, 1);
        assert_eq!(flattened.shapes[0].index, 0);
        assert_eq!(flattened.shapes[1].index, 1);
        assert_eq!(flattened.shapes[2].index, NO_OWNER_INDEX);
        // world positions come through
        assert!(flattened.shapes[1]
            .position
            .abs_diff_eq(scene.world_transform(deep).unwrap().translation, 1e-6));
        assert!(flattened.shapes[0]
            .position
            .abs_diff_eq(scene.world_transform(grouped).unwrap().translation, 1e-6));
    }

    /// Provider with a fixed, unordered enumeration and arbitrary parent links
    struct FixedScene {
        operations: Vec<OperationNode>,
        shapes: Vec<ShapeNode>,
        parents: AHashMap<NodeId, NodeId>,
    }

    impl SceneProvider for FixedScene {
        fn operation_nodes(&self) -> Vec<OperationNode> {
            self.operations.clone()
        }
        fn shape_nodes(&self) -> Vec<ShapeNode> {
            self.shapes.clone()
        }
        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.parents.get(&node).copied()
        }
    }

    fn shape_node(id: u32, radius: f32) -> ShapeNode {
        ShapeNode {
            id: NodeId(id),
            position: Vec3::ZERO,
            shape: Shape::sphere(radius),
        }
    }

    #[test]
    fn shapes_grouped_by_owner_keeping_order() {
        let operations = vec![
            OperationNode {
                id: NodeId(1),
                operation: Operation::union(),
            },
            OperationNode {
                id: NodeId(2),
                operation: Operation::blend(0.1),
            },
        ];
        let shapes = vec![
            shape_node(10, 1.),
            shape_node(11, 2.),
            shape_node(12, 3.),
            shape_node(13, 4.),
        ];
        let mut parents = AHashMap::new();
        parents.insert(NodeId(10), NodeId(2));
        parents.insert(NodeId(11), NodeId(1));
        parents.insert(NodeId(13), NodeId(2));
        let scene = FixedScene {
            operations,
            shapes,
            parents,
        };

        let flattened = flatten_scene(&scene);
        let radii: Vec<f32> = flattened
            .shapes
            .iter()
            .map(|shape| shape.shape.sphere_radius)
            .collect();
        assert_eq!(radii, vec![2., 1., 4., 3.]);
        let indices: Vec<i32> = flattened.shapes.iter().map(|shape| shape.index).collect();
        assert_eq!(indices, vec![0, 1, 1, NO_OWNER_INDEX]);
        assert_eq!(flattened.operations[0].child_count, 1);
        assert_eq!(flattened.operations[1].child_count, 2);
    }

    #[test]
    fn parent_cycle_leaves_shape_unowned() {
        let mut parents = AHashMap::new();
        parents.insert(NodeId(10), NodeId(20));
        parents.insert(NodeId(20), NodeId(21));
        parents.insert(NodeId(21), NodeId(20));
        let scene = FixedScene {
            operations: vec![OperationNode {
                id: NodeId(1),
                operation: Operation::union(),
            }],
            shapes: vec![shape_node(10, 1.)],
            parents,
        };
        let flattened = flatten_scene(&scene);
        assert_eq!(flattened.shapes[0].index, NO_OWNER_INDEX);
        assert_eq!(flattened.operations[0].child_count, 0);
    }
}
