//! Hotspot builder: turns a scene plus the building status dataset
//! into the clickable overlay set for one view-mode.

use glam::Vec3;

use crate::color;
use crate::constants::{AMENITY_MARKER_RADIUS, AMENITY_OPACITY};
use crate::error::EngineError;
use crate::overlay::{Overlay, OverlayKind, OverlayShape};
use crate::placement::{self, Orientation};
use crate::scene::{BuildingStatus, Scene};
use crate::vector::{tessellate, VectorDoc};

const BUILDING_RENDER_ORDER: i32 = 10;
const AMENITY_RENDER_ORDER: i32 = 15;

/// Build the overlay set for `(scene, view_mode)`.
///
/// The caller fetches the vector asset through the resource cache and
/// hands the parsed document in; a scene/view-mode without vector
/// controls is an `AssetLoad` failure and the caller keeps whatever
/// overlay set it already had. The returned overlays replace the old
/// set atomically via [`crate::overlay::OverlaySet::replace`].
pub fn build_hotspots(
    scene: &Scene,
    view_mode: &str,
    statuses: &[BuildingStatus],
    doc: &VectorDoc,
) -> Result<Vec<Overlay>, EngineError> {
    let variant = scene.variant(view_mode).ok_or_else(|| EngineError::AssetLoad {
        url: format!("{}/{}", scene.id, view_mode),
        reason: "scene has no variant for view-mode".to_string(),
    })?;
    let controls = variant.controls.as_ref().ok_or_else(|| EngineError::AssetLoad {
        url: format!("{}/{}", scene.id, view_mode),
        reason: "view-mode variant has no placement controls".to_string(),
    })?;

    let offset = Vec3::new(controls.offset_x, controls.offset_y, controls.offset_z);
    let orientation = Orientation {
        yaw: controls.yaw,
        pitch: controls.pitch,
        roll: controls.roll,
    };
    let (base_position, base_rotation) =
        placement::place(controls.latitude, controls.longitude, controls.radius, offset, orientation);
    // The vector asset is y-down; the negated y flips it upright.
    let base_scale = Vec3::new(controls.scale, -controls.scale, controls.scale);

    let mut overlays = Vec::new();

    for building in &scene.buildings {
        let Some(status) = statuses.iter().find(|s| s.slug == building.path_id) else {
            continue;
        };
        if !status.lists_view_mode(view_mode) {
            continue;
        }
        let Some(polygons) = doc.get(&building.path_id) else {
            continue;
        };
        let fill = color::building_fill(status.status, &status.building_type.slug);

        // One shape per vector sub-path.
        for polygon in polygons {
            let mesh = tessellate(std::slice::from_ref(polygon));
            if mesh.is_empty() && mesh.outline.is_empty() {
                continue;
            }
            let (position, rotation, scale) = if variant.mirrored {
                placement::apply_mirror(base_position, base_rotation, base_scale)
            } else {
                (base_position, base_rotation, base_scale)
            };
            overlays.push(Overlay {
                kind: OverlayKind::Building {
                    slug: building.path_id.clone(),
                },
                target: building.next_panorama.clone(),
                external_url: building.url.clone(),
                position,
                rotation,
                scale,
                color: fill,
                opacity: controls.opacity,
                base_opacity: controls.opacity,
                shape: OverlayShape::Mesh(mesh),
                render_order: BUILDING_RENDER_ORDER,
            });
        }
    }

    for amenity in &scene.amenities {
        let Some((lat, long)) = amenity.lat_long() else {
            if amenity.location.is_some() {
                log::debug!("skipping amenity '{}' with malformed location", amenity.id);
            }
            continue;
        };
        let position = placement::amenity_point(lat, long);
        let category = amenity.category.clone().unwrap_or_default();
        overlays.push(Overlay {
            kind: OverlayKind::Amenity {
                name: amenity.name.clone(),
                category: category.clone(),
            },
            target: Some(amenity.id.clone()),
            external_url: None,
            position,
            rotation: placement::face_center(position),
            scale: Vec3::ONE,
            color: color::amenity_color(&category),
            opacity: AMENITY_OPACITY,
            base_opacity: AMENITY_OPACITY,
            shape: OverlayShape::Marker {
                radius: AMENITY_MARKER_RADIUS,
            },
            render_order: AMENITY_RENDER_ORDER,
        });
    }

    Ok(overlays)
}
