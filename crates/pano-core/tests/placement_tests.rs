// Host-side tests for the spherical placement math.

use glam::Vec3;
use pano_core::constants::AMENITY_RADIUS;
use pano_core::placement::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn sphere_point_preserves_radius() {
    for &(lat, long) in &[(0.0, 0.0), (45.0, 30.0), (-20.0, 200.0), (89.0, -179.0)] {
        let p = sphere_point(lat, long, 500.0);
        assert!(close(p.length(), 500.0), "radius broke at ({lat}, {long})");
    }
}

#[test]
fn sphere_point_axes() {
    // Equator at longitude 0 lands on +X, the pole on +Y.
    let equator = sphere_point(0.0, 0.0, 100.0);
    assert!(close(equator.x, 100.0));
    assert!(close(equator.y, 0.0));
    assert!(close(equator.z, 0.0));

    let pole = sphere_point(90.0, 0.0, 100.0);
    assert!(close(pole.y, 100.0));
}

#[test]
fn face_center_points_local_minus_z_at_origin() {
    for &pos in &[
        Vec3::new(500.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -500.0),
        Vec3::new(100.0, 200.0, -50.0),
    ] {
        let rot = face_center(pos);
        let facing = rot * Vec3::NEG_Z;
        let toward_origin = (-pos).normalize();
        assert!(
            facing.dot(toward_origin) > 0.999,
            "not facing center from {pos:?}"
        );
    }
}

#[test]
fn place_applies_offset() {
    let offset = Vec3::new(1.0, 2.0, 3.0);
    let (with, _) = place(10.0, 20.0, 400.0, offset, Orientation::default());
    let (without, _) = place(10.0, 20.0, 400.0, Vec3::ZERO, Orientation::default());
    let diff = with - without;
    assert!(close(diff.x, 1.0) && close(diff.y, 2.0) && close(diff.z, 3.0));
}

#[test]
fn place_roll_twists_about_facing_axis() {
    let (pos, rolled) = place(0.0, 0.0, 400.0, Vec3::ZERO, Orientation::roll(90.0));
    let (_, plain) = place(0.0, 0.0, 400.0, Vec3::ZERO, Orientation::default());
    // The facing direction is unchanged by roll.
    let f1 = rolled * Vec3::NEG_Z;
    let f2 = plain * Vec3::NEG_Z;
    assert!(f1.dot(f2) > 0.999, "roll changed facing at {pos:?}");
    // But the local X axis is not.
    let x1 = rolled * Vec3::X;
    let x2 = plain * Vec3::X;
    assert!(x1.dot(x2).abs() < 0.01);
}

#[test]
fn amenity_point_uses_rotated_longitude() {
    let p = amenity_point(0.0, 0.0);
    // longitude 0 + 180 lands on -X at the amenity radius
    assert!(close(p.x, -AMENITY_RADIUS));
    assert!(close(p.y, 0.0));
    assert!(p.z.abs() < 0.1);
}

#[test]
fn mirror_negates_x_only() {
    let (pos, rot) = place(12.0, 34.0, 400.0, Vec3::ZERO, Orientation::default());
    let scale = Vec3::new(2.0, -2.0, 2.0);
    let (mpos, _mrot, mscale) = apply_mirror(pos, rot, scale);
    assert!(close(mpos.x, -pos.x));
    assert!(close(mpos.y, pos.y));
    assert!(close(mpos.z, pos.z));
    assert!(close(mscale.x, -2.0));
    assert!(close(mscale.y, -2.0));
    assert!(close(mscale.z, 2.0));
}

#[test]
fn mirror_is_an_involution_on_position() {
    let p = Vec3::new(-3.0, 7.0, 11.0);
    assert_eq!(mirror_x(mirror_x(p)), p);
}
