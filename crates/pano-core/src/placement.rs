//! Spherical placement math.
//!
//! Pure functions mapping (latitude, longitude, radius, offset,
//! orientation) to a world position and rotation. Overlays are placed
//! on the inside of the panorama sphere: first facing its center, then
//! twisted by a calibrated yaw/pitch/roll correction stored per
//! (scene, view-mode).

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::constants::AMENITY_RADIUS;

/// Additional rotation applied after the face-center step, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Orientation {
    pub fn roll(roll: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll,
        }
    }
}

/// Point on a sphere of `radius` at the given latitude/longitude, via
/// the standard equirectangular mapping (phi = 90 - lat, theta = long).
pub fn sphere_point(lat_deg: f32, long_deg: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = long_deg.to_radians();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Rotation orienting an object at `position` toward the sphere center,
/// local -Z facing the origin and Y kept upward.
pub fn face_center(position: Vec3) -> Quat {
    if position.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    // Near the poles the world up axis degenerates; fall back to Z.
    let up = if position.normalize().y.abs() > 0.999 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Quat::from_mat4(&Mat4::look_at_rh(position, Vec3::ZERO, up).inverse())
}

/// Full placement: sphere position plus offset, rotation = face-center
/// composed with the intrinsic Y-X-Z (yaw, pitch, roll) twist.
///
/// Raw lat/long placement alone does not line an overlay up against a
/// photographic panorama; the twist is the calibrated correction.
pub fn place(
    lat_deg: f32,
    long_deg: f32,
    radius: f32,
    offset: Vec3,
    orientation: Orientation,
) -> (Vec3, Quat) {
    let position = sphere_point(lat_deg, long_deg, radius) + offset;
    let twist = Quat::from_euler(
        EulerRot::YXZ,
        orientation.yaw.to_radians(),
        orientation.pitch.to_radians(),
        orientation.roll.to_radians(),
    );
    (position, face_center(position) * twist)
}

/// Amenity markers use a 180-degree-rotated longitude convention and a
/// fixed reference radius distinct from the building/vector radius.
pub fn amenity_point(lat_deg: f32, long_deg: f32) -> Vec3 {
    sphere_point(lat_deg, long_deg + 180.0, AMENITY_RADIUS)
}

/// Horizontal mirror of a placement position.
pub fn mirror_x(p: Vec3) -> Vec3 {
    Vec3::new(-p.x, p.y, p.z)
}

/// The half-turn about the vertical axis that keeps a mirrored overlay
/// visually correct after its position and scale are x-negated.
pub fn mirror_turn() -> Quat {
    Quat::from_rotation_y(std::f32::consts::PI)
}

/// Apply the mirrored view-mode rule to a placed overlay: x-negated
/// position and scale, plus the vertical half-turn. Every overlay
/// producer must apply this consistently or mirrored and non-mirrored
/// view-modes will visually disagree.
pub fn apply_mirror(position: Vec3, rotation: Quat, scale: Vec3) -> (Vec3, Quat, Vec3) {
    (
        mirror_x(position),
        mirror_turn() * rotation,
        Vec3::new(-scale.x, scale.y, scale.z),
    )
}
