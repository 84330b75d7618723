//! Clickable overlay model.
//!
//! Overlays are ephemeral: built per scene transition or hotspot
//! rebuild, torn down as a group before the next build. The
//! `OverlaySet` owns them exclusively; the interaction layer and the
//! renderer only read. A generation counter makes stale references
//! observable instead of silently wrong.

use glam::{Quat, Vec3};

use crate::vector::TriangleMesh;

/// Closed set of overlay roles with per-variant payload.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayKind {
    Building { slug: String },
    Amenity { name: String, category: String },
    UnitHotspot,
    BackHotspot,
}

#[derive(Clone, Debug)]
pub enum OverlayShape {
    /// Flat rectangle in local space, centered on the origin.
    Quad { width: f32, height: f32 },
    /// Sphere marker.
    Marker { radius: f32 },
    /// Tessellated vector sub-path in local 2-D space.
    Mesh(TriangleMesh),
}

/// One interactive in-scene object.
#[derive(Clone, Debug)]
pub struct Overlay {
    pub kind: OverlayKind,
    /// Target scene reference (id, or default image URL for unit
    /// hotspots).
    pub target: Option<String>,
    /// External reference for informational-only building setups.
    pub external_url: Option<String>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub color: &'static str,
    pub opacity: f32,
    /// Opacity to restore when the pointer leaves.
    pub base_opacity: f32,
    pub shape: OverlayShape,
    pub render_order: i32,
}

/// Generation-counted owned overlay collection.
#[derive(Debug, Default)]
pub struct OverlaySet {
    generation: u64,
    overlays: Vec<Overlay>,
}

impl OverlaySet {
    /// Tear down the current set. Bumps the generation so anything
    /// holding graphics resources for the old set knows to release
    /// them.
    pub fn clear(&mut self) {
        self.overlays.clear();
        self.generation += 1;
    }

    /// Replace the whole set atomically (clear + extend).
    pub fn replace(&mut self, overlays: Vec<Overlay>) {
        self.clear();
        self.overlays = overlays;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Overlay> {
        self.overlays.get(index)
    }

    pub fn set_opacity(&mut self, index: usize, opacity: f32) {
        if let Some(o) = self.overlays.get_mut(index) {
            o.opacity = opacity;
        }
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
