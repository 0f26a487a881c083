use crate::{
    engine::config_engine::{
        CAMERA_FAR_PLANE, CAMERA_NEAR_PLANE, DEFAULT_CAMERA_POSITION, FIELD_OF_VIEW, LOCAL_FORWARD,
        WORLD_SPACE_UP,
    },
    helper::angle::Angle,
    renderer::frustum::FrustumCorners,
};
use anyhow::ensure;
use glam::{Mat3, Mat4, Quat, UVec2, Vec3};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};

/// Describes the placement and lens of the camera the raymarcher shoots rays from.
/// Looks down its local -Z with +Y up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    position: Vec3,
    rotation: Quat,
    /// Vertical field of view
    fov: Angle,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,
}

// Public functions
impl Camera {
    pub fn new(resolution: UVec2) -> Self {
        let mut camera = Self {
            position: DEFAULT_CAMERA_POSITION,
            rotation: Quat::IDENTITY,
            fov: FIELD_OF_VIEW,
            aspect_ratio: calc_aspect_ratio(resolution),
            near_plane: CAMERA_NEAR_PLANE,
            far_plane: CAMERA_FAR_PLANE,
        };
        if let Err(e) = camera.look_at(Vec3::ZERO) {
            warn!("default camera orientation kept: {}", e);
        }
        camera
    }

    /// Turns the camera to face `target`, keeping world up as up
    pub fn look_at(&mut self, target: Vec3) -> anyhow::Result<()> {
        let direction = target - self.position;
        ensure!(
            direction.length_squared() > f32::EPSILON,
            "camera can't look at its own position {}",
            self.position
        );
        let forward = direction.normalize();
        let right = forward.cross(WORLD_SPACE_UP);
        ensure!(
            right.length_squared() > f32::EPSILON,
            "camera can't look straight along the world up axis"
        );
        let right = right.normalize();
        let up = right.cross(forward);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
        Ok(())
    }

    // Setters

    pub fn set_aspect_ratio(&mut self, resolution: UVec2) {
        self.aspect_ratio = calc_aspect_ratio(resolution);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    pub fn set_fov(&mut self, fov: Angle) {
        self.fov = fov;
    }

    // Getters

    /// Camera local space to world space
    pub fn camera_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn world_to_camera(&self) -> Mat4 {
        self.camera_to_world().inverse()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * LOCAL_FORWARD
    }

    /// Camera space rays through the four corners of the near plane, see [`FrustumCorners`]
    pub fn frustum_corners(&self) -> FrustumCorners {
        FrustumCorners::new(self.fov, self.aspect_ratio)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn fov(&self) -> Angle {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }
}

fn calc_aspect_ratio(resolution: UVec2) -> f32 {
    if resolution.y == 0 {
        return 1.;
    }
    resolution.x as f32 / resolution.y as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_at_origin_by_default() {
        let camera = Camera::new(UVec2::new(1920, 1080));
        let expected = (Vec3::ZERO - DEFAULT_CAMERA_POSITION).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!((camera.aspect_ratio() - 1920. / 1080.).abs() < 1e-6);
    }

    #[test]
    fn look_at_rejects_degenerate_targets() {
        let mut camera = Camera::new(UVec2::new(100, 100));
        let before = camera.rotation();
        assert!(camera.look_at(camera.position()).is_err());
        assert!(camera
            .look_at(camera.position() + Vec3::new(0., 5., 0.))
            .is_err());
        assert_eq!(camera.rotation(), before);
    }

    #[test]
    fn camera_to_world_maps_origin_to_position() {
        let mut camera = Camera::new(UVec2::new(4, 3));
        camera.set_position(Vec3::new(1., 2., 3.));
        let origin = camera.camera_to_world().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(1., 2., 3.), 1e-5));
        let back = camera.world_to_camera().transform_point3(origin);
        assert!(back.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn zero_height_resolution() {
        let camera = Camera::new(UVec2::new(640, 0));
        assert_eq!(camera.aspect_ratio(), 1.);
    }
}
