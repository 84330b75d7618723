#![cfg(target_arch = "wasm32")]
//! WASM entry point: bootstraps the datasets, the WebGPU renderer and
//! the frame loop around the navigation engine.

mod dom;
mod events;
mod frame;
mod input;
mod loader;
mod render;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use pano_core::{all_image_urls, parse_building_statuses, parse_scene_set, Engine, EngineConfig};
use pano_core::ResourceCache;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const CANVAS_ID: &str = "pano-canvas";
const SCENES_URL: &str = "assets/scenes.json";
const STATUSES_URL: &str = "assets/buildings.json";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("pano-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    dom::sync_canvas_backing_size(&canvas);
    {
        let canvas_resize = canvas.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            dom::sync_canvas_backing_size(&canvas_resize);
        }) as Box<dyn FnMut()>);
        let _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
        resize_closure.forget();
    }

    ui::set_loading(&document, true);

    // Scene set is required; building statuses degrade to empty.
    let scenes_json = loader::fetch_text(SCENES_URL).await?;
    let scenes = parse_scene_set(&scenes_json)?;
    let statuses = match loader::fetch_text(STATUSES_URL).await {
        Ok(json) => parse_building_statuses(&json),
        Err(e) => {
            log::warn!("building status dataset unavailable: {e}");
            Vec::new()
        }
    };
    log::info!(
        "dataset loaded: {} scenes, {} building records",
        scenes.len(),
        statuses.len()
    );

    let fallback_mode = scenes
        .first()
        .and_then(|s| s.images.first())
        .map(|v| v.key.clone())
        .unwrap_or_default();
    let view_mode = ui::initial_view_mode(&document, &fallback_mode);
    let buildings_navigate = canvas.get_attribute("data-informational").as_deref() != Some("true");

    let preload_urls = all_image_urls(&scenes);
    let engine = Engine::new(
        scenes,
        statuses,
        EngineConfig {
            view_mode,
            buildings_navigate,
        },
    )?;

    // Leak a canvas clone to satisfy the surface's 'static lifetime.
    let leaked_canvas: &'static web::HtmlCanvasElement = Box::leak(Box::new(canvas.clone()));
    let mut gpu = render::GpuState::new(leaked_canvas).await?;

    let textures: loader::TextureCache = Rc::new(RefCell::new(ResourceCache::new()));
    let vectors: loader::VectorCache = Rc::new(RefCell::new(ResourceCache::new()));

    // The entry panorama is loaded before the first frame.
    let initial_url = engine.initial_image_url()?;
    textures.borrow_mut().request(&initial_url);
    match loader::load_bitmap(&initial_url).await {
        Ok(bitmap) => {
            gpu.upload_current(&bitmap);
            textures.borrow_mut().fulfill(&initial_url, bitmap);
        }
        Err(e) => {
            log::error!("entry panorama failed to load: {e}");
            textures.borrow_mut().fail(&initial_url);
        }
    }

    {
        let document = document.clone();
        loader::spawn_preload(textures.clone(), preload_urls, move || {
            log::info!("panorama preload settled");
            ui::set_loading(&document, false);
        });
    }

    let engine = Rc::new(RefCell::new(engine));
    let camera = Rc::new(RefCell::new(pano_core::camera::OrbitCamera::new()));
    let pointer = Rc::new(RefCell::new(pano_core::interact::PointerTrack::default()));

    events::wire_canvas_events(&events::EventContext {
        engine: engine.clone(),
        camera: camera.clone(),
        pointer: pointer.clone(),
        canvas: canvas.clone(),
    });
    ui::wire_back_button(&document, engine.clone());
    ui::wire_view_mode_select(&document, engine.clone());
    dom::set_cursor(&canvas, "grab");

    frame::start_loop(frame::FrameContext::new(
        engine, camera, pointer, canvas, gpu, textures, vectors,
    ));
    Ok(())
}
