//! Engine facade.
//!
//! Owns the scene set, the building status dataset, the overlay set,
//! the transition state machine and the navigation history, and
//! exposes the small surface the web frontend drives from events and
//! the frame loop. The engine never performs I/O: the host fetches
//! textures and vector assets and reports readiness back.

use crate::error::EngineError;
use crate::hotspot::build_hotspots;
use crate::history::History;
use crate::interact::{self, Hover, NavAction, Ray};
use crate::overlay::{Overlay, OverlaySet};
use crate::scene::{find_scene, BuildingStatus, Scene};
use crate::switcher::{CrossFade, Phase, SwitchOptions, Switcher, Transition};
use crate::vector::VectorDoc;

/// Deployment configuration fixed at startup.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// View-mode tag selecting scene image variants and filtering
    /// building records.
    pub view_mode: String,
    /// When false, building hotspots open their external reference
    /// instead of navigating (informational deployments).
    pub buildings_navigate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_mode: String::new(),
            buildings_navigate: true,
        }
    }
}

/// Outcome of a click the host must act on.
#[derive(Clone, Debug)]
pub enum ClickOutcome {
    None,
    /// A scene switch was accepted; load `transition.image_url` and
    /// report back via `texture_ready` / `texture_failed`.
    Transition(Transition),
    /// Open the URL in the host environment.
    OpenExternal(String),
}

pub struct Engine {
    scenes: Vec<Scene>,
    statuses: Vec<BuildingStatus>,
    config: EngineConfig,
    current: Scene,
    overlays: OverlaySet,
    /// Overlays for the incoming scene, attached when the fade lands.
    staged: Vec<Overlay>,
    switcher: Switcher,
    history: History,
    hover: Hover,
}

impl Engine {
    pub fn new(
        scenes: Vec<Scene>,
        statuses: Vec<BuildingStatus>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let current = scenes
            .first()
            .cloned()
            .ok_or_else(|| EngineError::DatasetLoad("scene set is empty".to_string()))?;
        Ok(Self {
            scenes,
            statuses,
            config,
            current,
            overlays: OverlaySet::default(),
            staged: Vec::new(),
            switcher: Switcher::new(),
            history: History::new(),
            hover: Hover::default(),
        })
    }

    pub fn current(&self) -> &Scene {
        &self.current
    }

    pub fn view_mode(&self) -> &str {
        &self.config.view_mode
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn phase(&self) -> Phase {
        self.switcher.phase()
    }

    pub fn input_enabled(&self) -> bool {
        self.switcher.input_enabled()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Image URL of the entry scene for the configured view-mode.
    pub fn initial_image_url(&self) -> Result<String, EngineError> {
        self.current
            .image_url(&self.config.view_mode)
            .map(str::to_string)
            .ok_or_else(|| EngineError::TransitionFailed(self.current.id.clone()))
    }

    /// Texture the in-flight switch is waiting for, if one is.
    pub fn pending_image_url(&self) -> Option<String> {
        self.switcher.pending_image_url()
    }

    /// True once per accepted switch; the host resets its camera to
    /// the home orientation when it observes this.
    pub fn take_camera_reset(&mut self) -> bool {
        self.switcher.take_camera_reset()
    }

    /// Rebuild the current scene's vector hotspots from a parsed
    /// overlay document. On failure the existing set is kept.
    pub fn rebuild_hotspots(&mut self, doc: &VectorDoc) -> Result<(), EngineError> {
        let overlays = build_hotspots(
            &self.current,
            &self.config.view_mode,
            &self.statuses,
            doc,
        )?;
        self.hover.reset();
        self.overlays.replace(overlays);
        Ok(())
    }

    /// Vector asset URL of the current scene's view-mode variant.
    pub fn current_vector_url(&self) -> Option<String> {
        self.current
            .variant(&self.config.view_mode)
            .and_then(|v| v.svg.clone())
    }

    /// Analytic pick against the live overlay set. Suppressed while
    /// input is disabled.
    pub fn pick(&self, ray: Ray) -> Option<usize> {
        if !self.switcher.input_enabled() {
            return None;
        }
        interact::pick(&self.overlays, ray)
    }

    /// Hover feedback. Returns `true` when the hover target changed.
    pub fn hover(&mut self, hit: Option<usize>) -> bool {
        self.hover.update(&mut self.overlays, hit)
    }

    /// Handle a click on overlay `index`.
    pub fn click(&mut self, index: usize) -> Result<ClickOutcome, EngineError> {
        if !self.switcher.input_enabled() {
            return Err(EngineError::Busy);
        }
        let overlay = self
            .overlays
            .get(index)
            .ok_or_else(|| EngineError::MalformedRecord(format!("overlay index {index}")))?;
        let action = interact::dispatch_click(overlay, self.config.buildings_navigate);
        self.apply(action)
    }

    /// Apply a navigation action directly (UI chrome bypasses picking).
    pub fn apply(&mut self, action: NavAction) -> Result<ClickOutcome, EngineError> {
        match action {
            NavAction::None => Ok(ClickOutcome::None),
            NavAction::OpenExternal { url } => Ok(ClickOutcome::OpenExternal(url)),
            NavAction::Back => self.back(),
            NavAction::Navigate {
                target,
                push_history,
                is_back,
                is_unit_scene,
                from_building,
            } => {
                let next = find_scene(&self.scenes, &target)
                    .cloned()
                    .ok_or_else(|| EngineError::TransitionFailed(target.clone()))?;
                let transition = self.switcher.begin(
                    &next,
                    &self.config.view_mode,
                    SwitchOptions {
                        is_back,
                        is_unit_scene,
                        from_building,
                    },
                )?;
                if push_history {
                    self.history.push(&self.current);
                }
                Ok(ClickOutcome::Transition(transition))
            }
        }
    }

    /// Switch the active view-mode by transitioning the current scene
    /// to its variant under the new mode. History is untouched.
    pub fn set_view_mode(&mut self, view_mode: &str) -> Result<Transition, EngineError> {
        if !self.switcher.is_idle() {
            return Err(EngineError::Busy);
        }
        let current = self.current.clone();
        let transition = self
            .switcher
            .begin(&current, view_mode, SwitchOptions::default())?;
        self.config.view_mode = view_mode.to_string();
        Ok(transition)
    }

    /// Back navigation: pop the history stack and switch there without
    /// pushing. A click with empty history is a no-op.
    pub fn back(&mut self) -> Result<ClickOutcome, EngineError> {
        if !self.switcher.is_idle() {
            return Err(EngineError::Busy);
        }
        let Some(previous) = self.history.pop() else {
            return Ok(ClickOutcome::None);
        };
        match self.switcher.begin(
            &previous,
            &self.config.view_mode,
            SwitchOptions {
                is_back: true,
                ..SwitchOptions::default()
            },
        ) {
            Ok(transition) => Ok(ClickOutcome::Transition(transition)),
            Err(e) => {
                // The pop already happened; restore the entry so back
                // remains usable after a failed attempt.
                self.history.push(&previous);
                Err(e)
            }
        }
    }

    /// The incoming texture is resident: clear the live overlays,
    /// stage the destination's transient overlays and start the fade.
    pub fn texture_ready(&mut self) {
        let staged = self
            .switcher
            .texture_ready(&self.statuses, !self.history.is_empty());
        self.hover.reset();
        self.overlays.clear();
        self.staged = staged;
    }

    /// The incoming texture failed: abandon the switch, keep the
    /// departing scene and its overlays on screen.
    pub fn texture_failed(&mut self) -> EngineError {
        self.staged.clear();
        self.switcher.texture_failed()
    }

    /// Advance the fade one frame; when it lands, commit the scene and
    /// attach the staged overlays. Returns the levels to render with.
    pub fn advance_fade(&mut self) -> Option<CrossFade> {
        let fade = self.switcher.advance()?;
        if fade.done {
            if let Some((scene, _opts)) = self.switcher.complete() {
                self.current = scene;
                self.overlays.replace(std::mem::take(&mut self.staged));
                self.hover.reset();
            }
        }
        Some(fade)
    }
}
