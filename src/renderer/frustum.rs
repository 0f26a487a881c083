use crate::{engine::config_engine::LOCAL_FORWARD, helper::angle::Angle};
use glam::{Mat4, Vec3};

/// Camera space rays through the four corners of the viewport, for a camera looking down -Z with
/// +Y up. Not normalized: each has a forward component of exactly 1 so the shader can interpolate
/// them linearly across the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumCorners {
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_right: Vec3,
    pub bottom_left: Vec3,
}

impl FrustumCorners {
    /// `fov` is the vertical field of view. Degenerate values (fov or aspect <= 0) aren't checked.
    pub fn new(fov: Angle, aspect_ratio: f32) -> Self {
        let ratio = fov.half().radians().tan();
        let right = Vec3::X * ratio * aspect_ratio;
        let up = Vec3::Y * ratio;

        Self {
            top_left: LOCAL_FORWARD - right + up,
            top_right: LOCAL_FORWARD + right + up,
            bottom_right: LOCAL_FORWARD + right - up,
            bottom_left: LOCAL_FORWARD - right - up,
        }
    }

    /// Packs the corners as rows 0..3 (top-left, top-right, bottom-right, bottom-left).
    /// The fourth column is zero.
    pub fn to_row_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            self.top_left.extend(0.),
            self.top_right.extend(0.),
            self.bottom_right.extend(0.),
            self.bottom_left.extend(0.),
        )
        .transpose()
    }

    pub fn from_row_matrix(matrix: &Mat4) -> Self {
        Self {
            top_left: matrix.row(0).truncate(),
            top_right: matrix.row(1).truncate(),
            bottom_right: matrix.row(2).truncate(),
            bottom_left: matrix.row(3).truncate(),
        }
    }

    pub fn as_array(&self) -> [Vec3; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Frustum corner matrix for a vertical field of view in degrees, see
/// [`FrustumCorners::to_row_matrix`].
pub fn frustum_corners(fov_degrees: f32, aspect_ratio: f32) -> Mat4 {
    FrustumCorners::new(Angle::from_degrees(fov_degrees), aspect_ratio).to_row_matrix()
}
