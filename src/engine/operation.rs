use super::config_engine::DEFAULT_BLEND_STRENGTH;
use crate::renderer::shader_interfaces::{operation_buffer::op_codes, GpuInt};
use serde::{Deserialize, Serialize};

/// How an operation combines the shapes it owns with the shape accumulated so far
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum OperationKind {
    /// Plain union (the "none" function in shader terms)
    #[default]
    Union,
    /// Subtract the owned shapes from the current shape
    Subtract,
    /// Keep only the overlap
    Intersect,
    /// Smooth union, width controlled by the blend strength
    Blend,
}

static VARIANTS: &[OperationKind] = &[
    OperationKind::Union,
    OperationKind::Subtract,
    OperationKind::Intersect,
    OperationKind::Blend,
];

impl OperationKind {
    pub fn op_code(&self) -> GpuInt {
        match *self {
            Self::Union => op_codes::UNION,
            Self::Subtract => op_codes::SUBTRACT,
            Self::Intersect => op_codes::INTERSECT,
            Self::Blend => op_codes::BLEND,
        }
    }

    pub fn from_op_code(code: GpuInt) -> Option<Self> {
        VARIANTS.iter().copied().find(|kind| kind.op_code() == code)
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::Union => "Union",
            Self::Subtract => "Subtract",
            Self::Intersect => "Intersect",
            Self::Blend => "Blend",
        }
    }

    /// Only `Blend` reads the blend strength. It's transmitted for every kind regardless.
    pub fn uses_blend_strength(&self) -> bool {
        *self == Self::Blend
    }

    pub fn variant_names() -> Vec<(Self, &'static str)> {
        VARIANTS
            .iter()
            .map(|op| (*op, op.name()))
            .collect::<Vec<(Self, &'static str)>>()
    }
}

/// CSG combinator attached to a scene node. The number of shapes it owns isn't stored here: it's
/// recomputed from the hierarchy every time the scene is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub blend_strength: f32,
}

impl Operation {
    pub const fn new(kind: OperationKind, blend_strength: f32) -> Self {
        Self {
            kind,
            blend_strength,
        }
    }

    pub const fn union() -> Self {
        Self::new(OperationKind::Union, DEFAULT_BLEND_STRENGTH)
    }

    pub const fn blend(blend_strength: f32) -> Self {
        Self::new(OperationKind::Blend, blend_strength)
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::union()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_codes_round_trip() {
        for (kind, _) in OperationKind::variant_names() {
            assert_eq!(OperationKind::from_op_code(kind.op_code()), Some(kind));
        }
        assert_eq!(OperationKind::from_op_code(4), None);
    }

    #[test]
    fn codes_follow_declaration_order() {
        assert_eq!(OperationKind::Union.op_code(), 0);
        assert_eq!(OperationKind::Subtract.op_code(), 1);
        assert_eq!(OperationKind::Intersect.op_code(), 2);
        assert_eq!(OperationKind::Blend.op_code(), 3);
    }

    #[test]
    fn only_blend_uses_strength() {
        assert!(OperationKind::Blend.uses_blend_strength());
        assert!(!OperationKind::Subtract.uses_blend_strength());
    }
}
