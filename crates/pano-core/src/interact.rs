//! Pointer interaction: ray construction helpers, overlay picking,
//! hover opacity feedback and click dispatch.
//!
//! Picking is analytic, no GPU readback: markers intersect as spheres,
//! quads and vector meshes as oriented planes with a 2-D containment
//! test in overlay-local space.

use glam::{Quat, Vec3};

use crate::constants::OVERLAY_HOVER_OPACITY;
use crate::overlay::{Overlay, OverlayKind, OverlaySet, OverlayShape};
use crate::vector::Polygon;

/// World-space ray with a normalized direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

/// Nearest forward intersection with a sphere, if any.
pub fn ray_sphere(ray: Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t = -b - sqrt_disc;
    if t > 0.0 {
        return Some(t);
    }
    let t = -b + sqrt_disc;
    (t > 0.0).then_some(t)
}

/// Intersection with the local z = 0 plane of a placed overlay,
/// returned as (ray parameter, local-space point).
fn ray_local_plane(ray: Ray, position: Vec3, rotation: Quat, scale: Vec3) -> Option<(f32, [f32; 2])> {
    let inv_rot = rotation.inverse();
    let local_origin = inv_rot * (ray.origin - position);
    let local_dir = inv_rot * ray.dir;
    if local_dir.z.abs() < 1e-6 {
        return None;
    }
    let t = -local_origin.z / local_dir.z;
    if t <= 0.0 {
        return None;
    }
    let hit = local_origin + local_dir * t;
    if scale.x.abs() < 1e-6 || scale.y.abs() < 1e-6 {
        return None;
    }
    Some((t, [hit.x / scale.x, hit.y / scale.y]))
}

/// Even-odd containment test against a closed polygon.
pub fn point_in_polygon(point: [f32; 2], polygon: &Polygon) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi[1] > point[1]) != (pj[1] > point[1]) {
            let x = (pj[0] - pi[0]) * (point[1] - pi[1]) / (pj[1] - pi[1]) + pi[0];
            if point[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn hit_overlay(ray: Ray, overlay: &Overlay) -> Option<f32> {
    match &overlay.shape {
        OverlayShape::Marker { radius } => ray_sphere(ray, overlay.position, *radius),
        OverlayShape::Quad { width, height } => {
            let (t, p) = ray_local_plane(ray, overlay.position, overlay.rotation, overlay.scale)?;
            (p[0].abs() <= width / 2.0 && p[1].abs() <= height / 2.0).then_some(t)
        }
        OverlayShape::Mesh(mesh) => {
            let (t, p) = ray_local_plane(ray, overlay.position, overlay.rotation, overlay.scale)?;
            mesh.outline
                .iter()
                .any(|poly| point_in_polygon(p, poly))
                .then_some(t)
        }
    }
}

/// Index of the nearest overlay the ray hits, if any.
pub fn pick(overlays: &OverlaySet, ray: Ray) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, overlay) in overlays.iter().enumerate() {
        if let Some(t) = hit_overlay(ray, overlay) {
            if best.is_none_or(|(_, bt)| t < bt) {
                best = Some((i, t));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Hover feedback: the hovered overlay dims to the hover opacity, the
/// previous one returns to its own base opacity.
#[derive(Debug, Default)]
pub struct Hover {
    current: Option<usize>,
}

impl Hover {
    /// Apply a new hover target. Returns `true` when the hover state
    /// changed, which the host uses to flip the cursor affordance.
    pub fn update(&mut self, overlays: &mut OverlaySet, hit: Option<usize>) -> bool {
        if hit == self.current {
            return false;
        }
        if let Some(prev) = self.current {
            if let Some(base) = overlays.get(prev).map(|o| o.base_opacity) {
                overlays.set_opacity(prev, base);
            }
        }
        if let Some(index) = hit {
            overlays.set_opacity(index, OVERLAY_HOVER_OPACITY);
        }
        self.current = hit;
        true
    }

    /// Drop the hover (overlay set replaced or pointer left the
    /// canvas). Does not touch opacities; a replaced set carries fresh
    /// ones anyway.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
}

/// Pixels of total displacement beyond which a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f32 = 4.0;

/// Tracks one pointer through a press/move/release cycle and decides
/// whether the gesture was a drag or a click. The threshold compares
/// accumulated displacement from the press position, so a slow drag
/// made of small steps still counts as a drag.
#[derive(Debug, Default)]
pub struct PointerTrack {
    pub x: f32,
    pub y: f32,
    press: Option<[f32; 2]>,
    dragged: bool,
}

impl PointerTrack {
    pub fn press(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.press = Some([x, y]);
        self.dragged = false;
    }

    /// Record a move, returning the per-move delta for camera orbiting.
    pub fn motion(&mut self, x: f32, y: f32) -> (f32, f32) {
        let delta = (x - self.x, y - self.y);
        self.x = x;
        self.y = y;
        if let Some([px, py]) = self.press {
            if (x - px).hypot(y - py) > DRAG_THRESHOLD_PX {
                self.dragged = true;
            }
        }
        delta
    }

    pub fn is_down(&self) -> bool {
        self.press.is_some()
    }

    pub fn dragged(&self) -> bool {
        self.dragged
    }

    /// End the gesture; `true` when it was a drag rather than a click.
    pub fn release(&mut self) -> bool {
        self.press = None;
        std::mem::take(&mut self.dragged)
    }

    /// Pointer left the canvas mid-gesture.
    pub fn cancel(&mut self) {
        self.press = None;
        self.dragged = false;
    }
}

/// What a click on an overlay asks the engine to do.
#[derive(Clone, Debug, PartialEq)]
pub enum NavAction {
    None,
    Navigate {
        target: String,
        push_history: bool,
        is_back: bool,
        is_unit_scene: bool,
        from_building: Option<String>,
    },
    /// Pop history and return to the previous scene.
    Back,
    /// Open an external reference instead of navigating.
    OpenExternal { url: String },
}

/// Resolve a click on an overlay. `buildings_navigate` is false for
/// informational deployments where building hotspots open an external
/// page instead of switching scenes.
pub fn dispatch_click(overlay: &Overlay, buildings_navigate: bool) -> NavAction {
    match &overlay.kind {
        OverlayKind::Building { slug } => {
            if !buildings_navigate {
                return match &overlay.external_url {
                    Some(url) => NavAction::OpenExternal { url: url.clone() },
                    None => NavAction::None,
                };
            }
            match &overlay.target {
                Some(target) => NavAction::Navigate {
                    target: target.clone(),
                    push_history: true,
                    is_back: false,
                    is_unit_scene: false,
                    from_building: Some(slug.clone()),
                },
                None => NavAction::None,
            }
        }
        OverlayKind::Amenity { .. } => match &overlay.target {
            Some(target) => NavAction::Navigate {
                target: target.clone(),
                push_history: true,
                is_back: false,
                is_unit_scene: false,
                from_building: None,
            },
            None => NavAction::None,
        },
        OverlayKind::UnitHotspot => match &overlay.target {
            Some(target) => NavAction::Navigate {
                target: target.clone(),
                push_history: true,
                is_back: false,
                is_unit_scene: true,
                from_building: None,
            },
            None => NavAction::None,
        },
        OverlayKind::BackHotspot => NavAction::Back,
    }
}
