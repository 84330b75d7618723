//! Per-frame driver: polls asset residency for the transition state
//! machine, steps the cross-fade and auto-rotation, and renders.

use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use pano_core::camera::OrbitCamera;
use pano_core::interact::PointerTrack;
use pano_core::{Engine, Fetch, Phase};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::loader::{self, TextureCache, VectorCache};
use crate::render::{self, GpuState};

pub struct FrameContext<'a> {
    pub engine: Rc<RefCell<Engine>>,
    pub camera: Rc<RefCell<OrbitCamera>>,
    pub pointer: Rc<RefCell<PointerTrack>>,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: GpuState<'a>,
    pub textures: TextureCache,
    pub vectors: VectorCache,
    pub last_instant: Instant,
    /// Texture URL we are currently waiting on, so a failed entry is
    /// retried once per transition rather than every frame.
    requested_texture: Option<String>,
    /// Vector asset already applied to the live overlay set.
    built_vector_url: Option<String>,
    /// Vector fetch started for the current scene, so a failure is
    /// final for this scene instead of retrying every frame.
    requested_vector: Option<String>,
    /// (current slot, incoming slot) opacities for this frame.
    fade_levels: (f32, f32),
}

impl<'a> FrameContext<'a> {
    pub fn new(
        engine: Rc<RefCell<Engine>>,
        camera: Rc<RefCell<OrbitCamera>>,
        pointer: Rc<RefCell<PointerTrack>>,
        canvas: web::HtmlCanvasElement,
        gpu: GpuState<'a>,
        textures: TextureCache,
        vectors: VectorCache,
    ) -> Self {
        Self {
            engine,
            camera,
            pointer,
            canvas,
            gpu,
            textures,
            vectors,
            last_instant: Instant::now(),
            requested_texture: None,
            built_vector_url: None,
            requested_vector: None,
            fade_levels: (1.0, 0.0),
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        self.camera.borrow_mut().tick(dt_sec);
        // An accepted switch moves the camera home before the incoming
        // scene becomes visible.
        if self.engine.borrow_mut().take_camera_reset() {
            self.camera.borrow_mut().reset();
        }

        match self.engine.borrow().phase() {
            Phase::AwaitingTexture => self.poll_pending_texture(),
            Phase::Fading => self.step_fade(),
            Phase::Idle => {
                self.fade_levels = (1.0, 0.0);
                self.poll_vector_overlay();
            }
        }

        self.gpu
            .resize_if_needed(self.canvas.width(), self.canvas.height());
        let (w, h) = self.gpu.size();
        let view_proj = self.camera.borrow().view_proj(w, h);
        let overlay_vertices = render::overlay_vertices(self.engine.borrow().overlays());
        let (current, incoming) = self.fade_levels;
        if let Err(e) = self.gpu.render(view_proj, current, incoming, &overlay_vertices) {
            log::error!("render error: {:?}", e);
        }
    }

    fn poll_pending_texture(&mut self) {
        let Some(url) = self.engine.borrow().pending_image_url() else {
            return;
        };
        if self.requested_texture.as_deref() != Some(url.as_str()) {
            if self.textures.borrow_mut().request(&url) == Fetch::Start {
                loader::spawn_texture_fetch(self.textures.clone(), url.clone());
            }
            self.requested_texture = Some(url.clone());
        }
        match self.textures.borrow().settled(&url) {
            Some(true) => {
                if let Some(bitmap) = self.textures.borrow().get(&url) {
                    self.gpu.upload_incoming(bitmap);
                }
                self.engine.borrow_mut().texture_ready();
                self.requested_texture = None;
                self.fade_levels = (1.0, 0.0);
            }
            Some(false) => {
                let err = self.engine.borrow_mut().texture_failed();
                log::warn!("{err}");
                self.requested_texture = None;
            }
            None => {}
        }
    }

    fn step_fade(&mut self) {
        let Some(fade) = self.engine.borrow_mut().advance_fade() else {
            return;
        };
        self.fade_levels = (fade.outgoing, fade.incoming);
        if fade.done {
            self.gpu.swap();
            self.fade_levels = (1.0, 0.0);
            // The committed scene gets fresh vector hotspots and the
            // auto-rotate resume delay.
            self.built_vector_url = None;
            self.requested_vector = None;
            self.camera.borrow_mut().interrupt();
        }
    }

    fn poll_vector_overlay(&mut self) {
        let Some(url) = self.engine.borrow().current_vector_url() else {
            return;
        };
        if self.built_vector_url.as_deref() == Some(url.as_str()) {
            return;
        }
        if self.requested_vector.as_deref() != Some(url.as_str()) {
            if self.vectors.borrow_mut().request(&url) == Fetch::Start {
                loader::spawn_vector_fetch(self.vectors.clone(), url.clone());
            }
            self.requested_vector = Some(url.clone());
        }
        match self.vectors.borrow().settled(&url) {
            Some(true) => {
                let vectors = self.vectors.borrow();
                if let Some(doc) = vectors.get(&url) {
                    if let Err(e) = self.engine.borrow_mut().rebuild_hotspots(doc) {
                        log::warn!("hotspot rebuild failed: {e}");
                    }
                }
                self.built_vector_url = Some(url);
            }
            // A failed or unparsable asset keeps the previous set.
            Some(false) => self.built_vector_url = Some(url),
            None => {}
        }
    }
}

/// Kick off the requestAnimationFrame loop, keeping the closure alive
/// through a self-referential slot.
pub fn start_loop(mut ctx: FrameContext<'static>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        ctx.frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ =
            w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
