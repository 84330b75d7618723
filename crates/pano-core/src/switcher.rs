//! Scene transition state machine.
//!
//! One transition at a time: a switch request made while another is in
//! flight is rejected with [`EngineError::Busy`] rather than queued.
//! Phases run `Idle -> AwaitingTexture -> Fading -> Idle`; pointer
//! input stays disabled from the moment a switch is accepted until the
//! cross-fade completes or the texture load fails.

use glam::Vec3;

use crate::constants::{
    BACK_MARKER_LATITUDE_DEG, BACK_MARKER_LONGITUDE_DEG, DEFAULT_HOTSPOT_RADIUS,
    DEFAULT_HOTSPOT_SIZE, FADE_STEP, MARKER_RADIUS, MARKER_SIZE, OVERLAY_REST_OPACITY,
    UNIT_MARKER_ROLL_DEG,
};
use crate::color::COLOR_WHITE;
use crate::error::EngineError;
use crate::overlay::{Overlay, OverlayKind, OverlayShape};
use crate::placement::{self, Orientation};
use crate::scene::{BuildingStatus, Scene};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Switch accepted, waiting for the incoming texture.
    AwaitingTexture,
    /// Both surfaces live, opacities stepping in lock-step.
    Fading,
}

/// How a switch was triggered. Shapes which transient overlays the
/// destination scene receives.
#[derive(Clone, Debug, Default)]
pub struct SwitchOptions {
    /// Back navigation: history is not pushed and no back marker is
    /// produced in the destination.
    pub is_back: bool,
    /// Destination is a unit interior reached from a unit marker.
    pub is_unit_scene: bool,
    /// Slug of the building hotspot that triggered the switch, when
    /// one did. Its sub-panorama list becomes unit markers.
    pub from_building: Option<String>,
}

/// An accepted switch: what the host must load before the fade starts.
#[derive(Clone, Debug)]
pub struct Transition {
    pub scene_id: String,
    pub image_url: String,
}

/// Per-tick cross-fade levels. `incoming + outgoing == 1` throughout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossFade {
    pub incoming: f32,
    pub outgoing: f32,
    pub done: bool,
}

#[derive(Debug)]
struct Pending {
    scene: Scene,
    view_mode: String,
    opts: SwitchOptions,
}

#[derive(Debug)]
pub struct Switcher {
    phase: Phase,
    pending: Option<Pending>,
    fade: f32,
    input_enabled: bool,
    /// Set when a switch is accepted; the host consumes it to return
    /// the camera to its home orientation before the fade is visible.
    camera_reset: bool,
}

impl Default for Switcher {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            fade: 0.0,
            input_enabled: true,
            camera_reset: false,
        }
    }
}

impl Switcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// The texture the current switch is waiting for, if any.
    pub fn pending_image_url(&self) -> Option<String> {
        let pending = self.pending.as_ref()?;
        pending
            .scene
            .image_url(&pending.view_mode)
            .map(str::to_string)
    }

    /// Accept a switch to `next`. Rejected with `Busy` while another
    /// switch is in flight, and with `TransitionFailed` when the
    /// destination has no image for the view-mode.
    pub fn begin(
        &mut self,
        next: &Scene,
        view_mode: &str,
        opts: SwitchOptions,
    ) -> Result<Transition, EngineError> {
        if self.phase != Phase::Idle {
            return Err(EngineError::Busy);
        }
        let image_url = next
            .image_url(view_mode)
            .ok_or_else(|| EngineError::TransitionFailed(next.id.clone()))?
            .to_string();
        self.pending = Some(Pending {
            scene: next.clone(),
            view_mode: view_mode.to_string(),
            opts,
        });
        self.phase = Phase::AwaitingTexture;
        self.fade = 0.0;
        self.input_enabled = false;
        self.camera_reset = true;
        Ok(Transition {
            scene_id: next.id.clone(),
            image_url,
        })
    }

    /// True once per accepted switch: the camera should move to its
    /// home orientation now, before the incoming scene shows.
    pub fn take_camera_reset(&mut self) -> bool {
        std::mem::take(&mut self.camera_reset)
    }

    /// The incoming texture failed to load: abandon the switch and
    /// restore input. The departing scene stays on screen untouched.
    pub fn texture_failed(&mut self) -> EngineError {
        let id = self
            .pending
            .take()
            .map(|p| p.scene.id)
            .unwrap_or_default();
        self.phase = Phase::Idle;
        self.fade = 0.0;
        self.input_enabled = true;
        EngineError::TransitionFailed(id)
    }

    /// The incoming texture is resident: build the destination's
    /// transient overlays and enter the fade. The returned overlays are
    /// staged by the caller and attached only after the fade completes.
    pub fn texture_ready(
        &mut self,
        statuses: &[BuildingStatus],
        has_previous: bool,
    ) -> Vec<Overlay> {
        let Some(pending) = self.pending.as_ref() else {
            return Vec::new();
        };
        if self.phase != Phase::AwaitingTexture {
            return Vec::new();
        }
        let overlays = build_markers(pending, statuses, has_previous);
        self.phase = Phase::Fading;
        self.fade = 0.0;
        overlays
    }

    /// Step the fade by one frame. Opacities move in lock-step so the
    /// pair always sums to one; returns `None` outside the fading
    /// phase.
    pub fn advance(&mut self) -> Option<CrossFade> {
        if self.phase != Phase::Fading {
            return None;
        }
        self.fade = (self.fade + FADE_STEP).min(1.0);
        Some(CrossFade {
            incoming: self.fade,
            outgoing: 1.0 - self.fade,
            done: self.fade >= 1.0,
        })
    }

    /// Commit a finished fade: returns the now-current scene and
    /// whether history should have been pushed for this switch.
    pub fn complete(&mut self) -> Option<(Scene, SwitchOptions)> {
        if self.phase != Phase::Fading || self.fade < 1.0 {
            return None;
        }
        let pending = self.pending.take()?;
        self.phase = Phase::Idle;
        self.fade = 0.0;
        self.input_enabled = true;
        Some((pending.scene, pending.opts))
    }
}

/// Transient overlays for the destination scene: unit markers when
/// arriving from a building hotspot, a back marker inside unit scenes,
/// and the scene's own image-placed building quads.
fn build_markers(pending: &Pending, statuses: &[BuildingStatus], has_previous: bool) -> Vec<Overlay> {
    let scene = &pending.scene;
    let opts = &pending.opts;
    let mirrored = scene
        .variant(&pending.view_mode)
        .is_some_and(|v| v.mirrored);
    let mut overlays = Vec::new();

    if let Some(slug) = &opts.from_building {
        if let Some(status) = statuses.iter().find(|s| &s.slug == slug) {
            for sub in &status.panoramas {
                overlays.push(marker(
                    OverlayKind::UnitHotspot,
                    Some(sub.image.clone()),
                    sub.latitude,
                    sub.longitude,
                    Orientation::roll(UNIT_MARKER_ROLL_DEG),
                    mirrored,
                ));
            }
        }
    }

    if opts.is_unit_scene && !opts.is_back && has_previous {
        overlays.push(marker(
            OverlayKind::BackHotspot,
            None,
            BACK_MARKER_LATITUDE_DEG,
            BACK_MARKER_LONGITUDE_DEG,
            Orientation::default(),
            mirrored,
        ));
    }

    for building in &scene.buildings {
        let (Some(lat), Some(long)) = (building.latitude, building.longitude) else {
            continue;
        };
        let radius = building.radius.unwrap_or(DEFAULT_HOTSPOT_RADIUS);
        let roll = building.rotation.unwrap_or(0.0);
        let size = building.size.unwrap_or(DEFAULT_HOTSPOT_SIZE);
        let (position, rotation) =
            placement::place(lat, long, radius, Vec3::ZERO, Orientation::roll(roll));
        let (position, rotation, scale) = if mirrored {
            placement::apply_mirror(position, rotation, Vec3::ONE)
        } else {
            (position, rotation, Vec3::ONE)
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
            color: COLOR_WHITE,
            opacity: OVERLAY_REST_OPACITY,
            base_opacity: OVERLAY_REST_OPACITY,
            shape: OverlayShape::Quad {
                width: size,
                height: size,
            },
            render_order: 5,
        });
    }

    overlays
}

fn marker(
    kind: OverlayKind,
    target: Option<String>,
    lat: f32,
    long: f32,
    orientation: Orientation,
    mirrored: bool,
) -> Overlay {
    let (position, rotation) =
        placement::place(lat, long, MARKER_RADIUS, Vec3::ZERO, orientation);
    let (position, rotation, scale) = if mirrored {
        placement::apply_mirror(position, rotation, Vec3::ONE)
    } else {
        (position, rotation, Vec3::ONE)
    };
    Overlay {
        kind,
        target,
        external_url: None,
        position,
        rotation,
        scale,
        color: COLOR_WHITE,
        opacity: OVERLAY_REST_OPACITY,
        base_opacity: OVERLAY_REST_OPACITY,
        shape: OverlayShape::Quad {
            width: MARKER_SIZE,
            height: MARKER_SIZE,
        },
        render_order: 20,
    }
}
