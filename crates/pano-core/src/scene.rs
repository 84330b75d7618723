//! Scene dataset types.
//!
//! The scene set and the building-status dataset are external,
//! read-only inputs loaded once at startup. Scenes are immutable after
//! load; navigation history stores deep snapshots of them.

use serde::Deserialize;

use crate::error::EngineError;

/// Calibrated parameters aligning a vector-overlay layer to a
/// photographic panorama. One record per (scene, view-mode) pair.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementControls {
    pub latitude: f32,
    pub longitude: f32,
    pub radius: f32,
    pub scale: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    #[serde(default)]
    pub offset_z: f32,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub roll: f32,
    #[serde(default = "default_overlay_opacity")]
    pub opacity: f32,
}

fn default_overlay_opacity() -> f32 {
    1.0
}

/// One image variant of a scene, keyed by view-mode tag.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneImage {
    pub key: String,
    pub image: String,
    /// Vector-overlay asset for this view-mode, if the scene has one.
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub controls: Option<PlacementControls>,
    /// Mirrored variants invert the horizontal axis of overlay
    /// placement and geometry scale.
    #[serde(default)]
    pub mirrored: bool,
}

/// A building hotspot definition inside a scene.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: String,
    /// Vector-path id; doubles as the join key against the building
    /// status dataset.
    #[serde(rename = "svg")]
    pub path_id: String,
    #[serde(default)]
    pub next_panorama: Option<String>,
    #[serde(default)]
    pub latitude: Option<f32>,
    #[serde(default)]
    pub longitude: Option<f32>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default)]
    pub size: Option<f32>,
    /// External reference opened instead of navigating when buildings
    /// are configured as informational-only.
    #[serde(default)]
    pub url: Option<String>,
}

/// A geocoded point-of-interest marker. The `id` is also the target
/// scene reference.
#[derive(Clone, Debug, Deserialize)]
pub struct Amenity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `"lat, long"` pair; malformed values skip the marker.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Amenity {
    /// Parse the `"lat, long"` location string. Returns `None` for
    /// anything that does not split into exactly two floats.
    pub fn lat_long(&self) -> Option<(f32, f32)> {
        let raw = self.location.as_deref()?;
        let mut parts = raw.split(',');
        let lat = parts.next()?.trim().parse::<f32>().ok()?;
        let long = parts.next()?.trim().parse::<f32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((lat, long))
    }
}

/// One navigable panoramic node.
#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
    pub id: String,
    /// Default asset used when no variant matches the view-mode.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<SceneImage>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
}

impl Scene {
    /// The image variant for a view-mode, if one exists.
    pub fn variant(&self, view_mode: &str) -> Option<&SceneImage> {
        self.images.iter().find(|v| v.key == view_mode)
    }

    /// Resolve the image URL for a view-mode, falling back to the
    /// scene's default asset.
    pub fn image_url(&self, view_mode: &str) -> Option<&str> {
        self.variant(view_mode)
            .map(|v| v.image.as_str())
            .or(self.image.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BuildingType {
    pub slug: String,
}

/// A per-view-mode sub-panorama reachable from a building, with its
/// own hotspot position.
#[derive(Clone, Debug, Deserialize)]
pub struct SubPanorama {
    #[serde(alias = "id")]
    pub key: String,
    pub latitude: f32,
    pub longitude: f32,
    /// Target scene reference for the unit hotspot.
    pub image: String,
}

/// External building status record, joined by slug.
#[derive(Clone, Debug, Deserialize)]
pub struct BuildingStatus {
    pub slug: String,
    pub status: i32,
    pub building_type: BuildingType,
    #[serde(default)]
    pub panoramas: Vec<SubPanorama>,
}

impl BuildingStatus {
    /// Whether this record applies to the given view-mode.
    pub fn lists_view_mode(&self, view_mode: &str) -> bool {
        self.panoramas.iter().any(|p| p.key == view_mode)
    }
}

/// Parse the scene dataset. A malformed scene set is a hard
/// configuration error; the engine cannot start without it.
pub fn parse_scene_set(json: &str) -> Result<Vec<Scene>, EngineError> {
    serde_json::from_str(json).map_err(|e| EngineError::DatasetLoad(e.to_string()))
}

/// Parse the building status dataset. Failure degrades to an empty
/// dataset: the engine runs without building-derived overlays.
pub fn parse_building_statuses(json: &str) -> Vec<BuildingStatus> {
    match serde_json::from_str::<Vec<BuildingStatus>>(json) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("building status dataset malformed, continuing empty: {e}");
            Vec::new()
        }
    }
}

/// Locate a scene by id, or by its default image URL (unit hotspots
/// reference their target either way).
pub fn find_scene<'a>(scenes: &'a [Scene], reference: &str) -> Option<&'a Scene> {
    scenes
        .iter()
        .find(|s| s.id == reference)
        .or_else(|| scenes.iter().find(|s| s.image.as_deref() == Some(reference)))
}

/// Every image URL referenced by the scene set, deduplicated in
/// first-seen order. This is the preload working set.
pub fn all_image_urls(scenes: &[Scene]) -> Vec<String> {
    let mut seen = fnv::FnvHashSet::default();
    let mut urls = Vec::new();
    for scene in scenes {
        for variant in &scene.images {
            if seen.insert(variant.image.clone()) {
                urls.push(variant.image.clone());
            }
        }
        if let Some(img) = &scene.image {
            if seen.insert(img.clone()) {
                urls.push(img.clone());
            }
        }
    }
    urls
}
