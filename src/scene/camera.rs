//! Camera system

use bytemuck::{Pod, Zeroable};
use fieldplot_core::mesh::Dimension;
use glam::{Mat4, Vec3};

/// Which projection family a graph draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Orthographic, looking down the Z axis.
    TwoD,
    /// Perspective.
    ThreeD,
}

impl From<Dimension> for CameraKind {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::TwoD => CameraKind::TwoD,
            Dimension::ThreeD => CameraKind::ThreeD,
        }
    }
}

/// Camera projection type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Projection::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        match self {
            Projection::Perspective { aspect: a, .. } => *a = aspect,
            Projection::Orthographic {
                left, right, top, bottom, ..
            } => {
                let half_h = (*top - *bottom) / 2.0;
                *left = -half_h * aspect;
                *right = half_h * aspect;
            }
        }
    }
}

/// Camera for viewing a plot
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub kind: CameraKind,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub projection: Projection,
}

impl Camera {
    /// Default camera for `kind`: a unit orthographic view in 2D, a
    /// perspective view from +Z in 3D.
    pub fn for_kind(kind: CameraKind) -> Self {
        match kind {
            CameraKind::TwoD => Self {
                kind,
                position: Vec3::new(0.0, 0.0, 1.0),
                target: Vec3::ZERO,
                up: Vec3::Y,
                projection: Projection::orthographic(2.0, 2.0, 0.0, 2.0),
            },
            CameraKind::ThreeD => Self {
                kind,
                position: Vec3::new(0.0, 0.0, 3.0),
                target: Vec3::ZERO,
                up: Vec3::Y,
                projection: Projection::default(),
            },
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection.matrix() * self.view_matrix()
    }

    /// Update aspect ratio
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.projection.set_aspect(width / height);
    }
}

/// Push-constant block shared by every node pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub model: Mat4,
    pub view_proj: Mat4,
}

impl CameraUniform {
    /// Size in bytes of the push-constant block.
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;

    pub fn new(model: Mat4, view_proj: Mat4) -> Self {
        Self { model, view_proj }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_two_matrices() {
        assert_eq!(CameraUniform::SIZE, 128);
        assert_eq!(CameraUniform::default().model, Mat4::IDENTITY);
    }

    #[test]
    fn kind_from_dimension() {
        assert_eq!(CameraKind::from(Dimension::TwoD), CameraKind::TwoD);
        assert_eq!(CameraKind::from(Dimension::ThreeD), CameraKind::ThreeD);
    }

    #[test]
    fn planar_camera_maps_origin_to_center() {
        let camera = Camera::for_kind(CameraKind::TwoD);
        let clip = camera.view_projection_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
    }
}
