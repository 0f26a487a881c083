use super::config_engine::{
    DEFAULT_COLOR, DEFAULT_CONE_HEIGHT, DEFAULT_CONE_RATIO, DEFAULT_DIMENSIONS, DEFAULT_RADIUS,
    DEFAULT_ROUND_BOX_FACTOR, DEFAULT_TORUS_INNER_RADIUS, DEFAULT_TORUS_OUTER_RADIUS,
};
use crate::renderer::shader_interfaces::{shape_buffer::shape_codes, GpuInt};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub mod shape_names {
    pub const SPHERE: &str = "Sphere";
    pub const BOX: &str = "Box";
    pub const TORUS: &str = "Torus";
    pub const CONE: &str = "Cone";
    pub const ROUNDED_BOX: &str = "Rounded Box";
}

/// Implicit surfaces the shader knows how to evaluate
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Sphere,
    Box,
    Torus,
    Cone,
    RoundedBox,
}

static VARIANTS: &[ShapeKind] = &[
    ShapeKind::Sphere,
    ShapeKind::Box,
    ShapeKind::Torus,
    ShapeKind::Cone,
    ShapeKind::RoundedBox,
];

impl ShapeKind {
    pub fn shape_code(&self) -> GpuInt {
        match *self {
            Self::Sphere => shape_codes::SPHERE,
            Self::Box => shape_codes::BOX,
            Self::Torus => shape_codes::TORUS,
            Self::Cone => shape_codes::CONE,
            Self::RoundedBox => shape_codes::ROUNDED_BOX,
        }
    }

    pub fn from_shape_code(code: GpuInt) -> Option<Self> {
        VARIANTS.iter().copied().find(|kind| kind.shape_code() == code)
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::Sphere => shape_names::SPHERE,
            Self::Box => shape_names::BOX,
            Self::Torus => shape_names::TORUS,
            Self::Cone => shape_names::CONE,
            Self::RoundedBox => shape_names::ROUNDED_BOX,
        }
    }

    pub fn variant_names() -> Vec<(Self, &'static str)> {
        VARIANTS
            .iter()
            .map(|kind| (*kind, kind.name()))
            .collect::<Vec<(Self, &'static str)>>()
    }
}

/// Parameters of one implicit surface. Parameters for every kind are kept so a shape can switch
/// kind at runtime without losing its other settings; only the ones matching `kind` are used by
/// the shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub sphere_radius: f32,
    /// Box half extents
    pub box_dimensions: Vec3,
    /// Rounded box half extents
    pub round_box_dimensions: Vec3,
    /// Rounded box corner radius
    pub round_box_factor: f32,
    pub torus_outer_radius: f32,
    pub torus_inner_radius: f32,
    pub cone_height: f32,
    pub cone_ratio: Vec2,
    pub color: Vec3,
}

impl Shape {
    /// All parameters zero
    const BLANK: Self = Self {
        kind: ShapeKind::Sphere,
        sphere_radius: 0.,
        box_dimensions: Vec3::ZERO,
        round_box_dimensions: Vec3::ZERO,
        round_box_factor: 0.,
        torus_outer_radius: 0.,
        torus_inner_radius: 0.,
        cone_height: 0.,
        cone_ratio: Vec2::ZERO,
        color: DEFAULT_COLOR,
    };

    pub const fn sphere(radius: f32) -> Self {
        Self {
            kind: ShapeKind::Sphere,
            sphere_radius: radius,
            ..Self::BLANK
        }
    }

    pub const fn cube(half_extents: Vec3) -> Self {
        Self {
            kind: ShapeKind::Box,
            box_dimensions: half_extents,
            ..Self::BLANK
        }
    }

    pub const fn rounded_box(half_extents: Vec3, corner_radius: f32) -> Self {
        Self {
            kind: ShapeKind::RoundedBox,
            round_box_dimensions: half_extents,
            round_box_factor: corner_radius,
            ..Self::BLANK
        }
    }

    pub const fn torus(outer_radius: f32, inner_radius: f32) -> Self {
        Self {
            kind: ShapeKind::Torus,
            torus_outer_radius: outer_radius,
            torus_inner_radius: inner_radius,
            ..Self::BLANK
        }
    }

    pub const fn cone(height: f32, ratio: Vec2) -> Self {
        Self {
            kind: ShapeKind::Cone,
            cone_height: height,
            cone_ratio: ratio,
            ..Self::BLANK
        }
    }

    pub const fn with_color(self, color: Vec3) -> Self {
        Self { color, ..self }
    }

    /// A shape of `kind` with every parameter set to its default, so switching kinds later
    /// shows something sensible.
    pub const fn with_defaults(kind: ShapeKind) -> Self {
        Self {
            kind,
            sphere_radius: DEFAULT_RADIUS,
            box_dimensions: DEFAULT_DIMENSIONS,
            round_box_dimensions: DEFAULT_DIMENSIONS,
            round_box_factor: DEFAULT_ROUND_BOX_FACTOR,
            torus_outer_radius: DEFAULT_TORUS_OUTER_RADIUS,
            torus_inner_radius: DEFAULT_TORUS_INNER_RADIUS,
            cone_height: DEFAULT_CONE_HEIGHT,
            cone_ratio: DEFAULT_CONE_RATIO,
            color: DEFAULT_COLOR,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::with_defaults(ShapeKind::Sphere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_codes_round_trip() {
        for (kind, _) in ShapeKind::variant_names() {
            assert_eq!(ShapeKind::from_shape_code(kind.shape_code()), Some(kind));
        }
        assert_eq!(ShapeKind::from_shape_code(5), None);
        assert_eq!(ShapeKind::from_shape_code(-1), None);
    }

    #[test]
    fn codes_follow_declaration_order() {
        assert_eq!(ShapeKind::Sphere.shape_code(), 0);
        assert_eq!(ShapeKind::Box.shape_code(), 1);
        assert_eq!(ShapeKind::Torus.shape_code(), 2);
        assert_eq!(ShapeKind::Cone.shape_code(), 3);
        assert_eq!(ShapeKind::RoundedBox.shape_code(), 4);
    }

    #[test]
    fn constructors_only_set_their_parameters() {
        let sphere = Shape::sphere(2.5);
        assert_eq!(sphere.sphere_radius, 2.5);
        assert_eq!(sphere.box_dimensions, Vec3::ZERO);
        assert_eq!(sphere.torus_outer_radius, 0.);

        let rounded = Shape::rounded_box(Vec3::ONE, 0.2);
        assert_eq!(rounded.kind, ShapeKind::RoundedBox);
        assert_eq!(rounded.round_box_factor, 0.2);
        assert_eq!(rounded.sphere_radius, 0.);
    }
}
