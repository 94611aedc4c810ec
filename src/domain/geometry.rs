//! Scalar and vector math shared by FORM's control law and DEC's spatial
//! statistics (dispersion, cohesion, centroid).
//!
//! `spec.md` §3 allows single precision; we use `f32` throughout
//! (`Scalar`) and tolerate the ±1e-6 comparison slack it specifies via
//! [`approx_eq`].

use serde::{Deserialize, Serialize};

/// 32-bit float, per `spec.md` §3 ("single precision acceptable").
pub type Scalar = f32;

/// Absolute tolerance for float comparisons mandated by `spec.md` §3.
pub const EPSILON: Scalar = 1e-6;

/// Returns true if `a` and `b` are within [`EPSILON`] of each other.
pub fn approx_eq(a: Scalar, b: Scalar) -> bool {
    (a - b).abs() <= EPSILON
}

/// A 3-component float vector with the Euclidean operations the formation
/// control law and swarm statistics need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };

    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Vec3) -> Scalar {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn norm(self) -> Scalar {
        self.dot(self).sqrt()
    }

    pub fn norm_squared(self) -> Scalar {
        self.dot(self)
    }

    /// Returns the unit vector in the same direction, or `Vec3::ZERO` for
    /// a zero-length input (avoids NaN propagation in control laws).
    pub fn normalize(self) -> Vec3 {
        let n = self.norm();
        if n <= EPSILON {
            Vec3::ZERO
        } else {
            self * (1.0 / n)
        }
    }

    pub fn distance(self, rhs: Vec3) -> Scalar {
        (self - rhs).norm()
    }

    /// Clamp the vector's magnitude to at most `max_norm`, preserving
    /// direction. Used throughout §4.3's control law to cap `v_cmd`/`a_cmd`.
    pub fn clamp_norm(self, max_norm: Scalar) -> Vec3 {
        let n = self.norm();
        if n <= max_norm || n <= EPSILON {
            self
        } else {
            self * (max_norm / n)
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Mul<Scalar> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: Scalar) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Div<Scalar> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: Scalar) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl std::iter::Sum for Vec3 {
    fn sum<I: Iterator<Item = Vec3>>(iter: I) -> Vec3 {
        iter.fold(Vec3::ZERO, |acc, v| acc + v)
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

/// A unit quaternion representing orientation (leader heading, agent
/// orientation, formation rotation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub w: Scalar,
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(w: Scalar, x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of angle `radians` about the +Z (up) axis — sufficient for
    /// the planar formation geometry in §4.3 (leader heading, formation
    /// rotation are all yaw-only).
    pub fn from_yaw(radians: Scalar) -> Quat {
        let half = radians * 0.5;
        Quat::new(half.cos(), 0.0, 0.0, half.sin())
    }

    /// Yaw angle (radians) this quaternion represents, about +Z.
    pub fn yaw(self) -> Scalar {
        2.0 * self.z.atan2(self.w)
    }

    pub fn normalize(self) -> Quat {
        let n = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if n <= EPSILON {
            Quat::IDENTITY
        } else {
            Quat::new(self.w / n, self.x / n, self.y / n, self.z / n)
        }
    }

    /// Rotate a vector by this quaternion (yaw-only rotations used here
    /// reduce to a 2D rotation in the XY plane, but we implement the full
    /// quaternion sandwich product so `Quat` stays a genuine orientation
    /// type rather than a disguised angle).
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let q = self.normalize();
        let qvec = Vec3::new(q.x, q.y, q.z);
        let uv = qvec.cross(v);
        let uuv = qvec.cross(uv);
        v + (uv * (2.0 * q.w)) + (uuv * 2.0)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Vec3 {
    fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }
}
