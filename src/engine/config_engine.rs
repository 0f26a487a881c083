use crate::helper::angle::Angle;
use glam::{Vec2, Vec3};

pub const DEFAULT_RADIUS: f32 = 0.5;
pub const DEFAULT_DIMENSIONS: Vec3 = Vec3::splat(0.5);
pub const DEFAULT_ROUND_BOX_FACTOR: f32 = 0.1;
pub const DEFAULT_TORUS_OUTER_RADIUS: f32 = 0.5;
pub const DEFAULT_TORUS_INNER_RADIUS: f32 = 0.15;
pub const DEFAULT_CONE_HEIGHT: f32 = 1.;
pub const DEFAULT_CONE_RATIO: Vec2 = Vec2::new(0.5, 1.);
pub const DEFAULT_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);
pub const DEFAULT_BLEND_STRENGTH: f32 = 0.5;

/// Used when the scene has no directional light
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

/// Y up, cameras and lights look down their local -Z
pub const WORLD_SPACE_UP: Vec3 = Vec3::Y;
pub const LOCAL_FORWARD: Vec3 = Vec3::NEG_Z;

/// 60° vertical field of view
pub const FIELD_OF_VIEW: Angle = Angle::from_radians(std::f32::consts::FRAC_PI_3);
pub const CAMERA_NEAR_PLANE: f32 = 0.1;
pub const CAMERA_FAR_PLANE: f32 = 100.;
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0., 1., 6.);

pub const LOCAL_STORAGE_DIR: &str = ".raymarch-csg";
pub const SAVE_STATE_FILENAME_CAMERA: &str = "camera.rmsave";
pub const SAVE_STATE_FILENAME_SETTINGS: &str = "settings.rmsave";
pub const SAVE_STATE_FILENAME_SCENE: &str = "scene.rmsave";
