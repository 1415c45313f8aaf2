/// Frustum: six clipping planes used by every culling stage.
///
/// Each plane is a Vec4 (A, B, C, D): (A, B, C) is the unit inward normal and
/// a point P is inside when `dot(plane.xyz, P) + D >= 0` for all six planes.
/// Planes are extracted for the OpenGL depth convention (clip z in [-w, w]),
/// which is the convention of `Camera::projection_matrix`.

use glam::{Mat4, Vec3, Vec4};
use super::bounds::{AABB, BoundingSphere};

/// Result of a 3-way frustum classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Volume is entirely outside the frustum
    Outside,
    /// Volume is entirely inside the frustum
    Inside,
    /// Volume straddles at least one plane
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Default for Frustum {
    /// Frustum of the identity view-projection (the NDC cube)
    fn default() -> Self {
        Self::from_view_projection(&Mat4::IDENTITY)
    }
}

impl Frustum {
    /// Extract normalized planes from a view-projection matrix (Gribb & Hartmann).
    ///
    /// Works for perspective and orthographic projections alike.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let mut planes = [
            row3 + row0,
            row3 - row0,
            row3 + row1,
            row3 - row1,
            row3 + row2,
            row3 - row2,
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    #[inline]
    fn distance(plane: &Vec4, point: Vec3) -> f32 {
        plane.truncate().dot(point) + plane.w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| Self::distance(p, point) >= 0.0)
    }

    /// Conservative AABB test (positive-vertex): `false` only when fully outside
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb) != FrustumTest::Outside
    }

    /// Classify an AABB with its positive and negative vertices per plane
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if Self::distance(plane, p_vertex) < 0.0 {
                return FrustumTest::Outside;
            }

            let n_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max);
            if Self::distance(plane, n_vertex) < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// Classify a sphere: outside as soon as its center is further than
    /// `radius` behind any plane
    pub fn classify_sphere(&self, sphere: &BoundingSphere) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let d = Self::distance(plane, sphere.center);
            if d < -sphere.radius {
                return FrustumTest::Outside;
            }
            if d < sphere.radius {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.classify_sphere(sphere) != FrustumTest::Outside
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
