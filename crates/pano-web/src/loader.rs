//! Network and image loading. Every asset lands in a shared
//! `ResourceCache`, which the frame loop polls; nothing in here calls
//! back into the engine.

use std::cell::RefCell;
use std::rc::Rc;

use pano_core::vector::{parse_vector_doc, VectorDoc};
use pano_core::{Preload, ResourceCache};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type TextureCache = Rc<RefCell<ResourceCache<web::ImageBitmap>>>;
pub type VectorCache = Rc<RefCell<ResourceCache<VectorDoc>>>;

pub async fn fetch_text(url: &str) -> anyhow::Result<String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("fetch {url}: {e}"))?;
    if !resp.ok() {
        return Err(anyhow::anyhow!("fetch {url}: HTTP {}", resp.status()));
    }
    resp.text()
        .await
        .map_err(|e| anyhow::anyhow!("read {url}: {e}"))
}

/// Decode an image URL into a GPU-uploadable bitmap.
pub async fn load_bitmap(url: &str) -> anyhow::Result<web::ImageBitmap> {
    let img = web::HtmlImageElement::new()
        .map_err(|e| anyhow::anyhow!(format!("image element: {:?}", e)))?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(url);
    JsFuture::from(img.decode())
        .await
        .map_err(|e| anyhow::anyhow!(format!("decode {url}: {:?}", e)))?;

    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let promise = window
        .create_image_bitmap_with_html_image_element(&img)
        .map_err(|e| anyhow::anyhow!(format!("createImageBitmap {url}: {:?}", e)))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!(format!("bitmap {url}: {:?}", e)))?
        .dyn_into::<web::ImageBitmap>()
        .map_err(|e| anyhow::anyhow!(format!("bitmap cast: {:?}", e)))
}

/// Start a texture fetch that settles the cache entry either way.
pub fn spawn_texture_fetch(cache: TextureCache, url: String) {
    spawn_local(async move {
        match load_bitmap(&url).await {
            Ok(bitmap) => cache.borrow_mut().fulfill(&url, bitmap),
            Err(e) => {
                log::warn!("texture load failed: {e}");
                cache.borrow_mut().fail(&url);
            }
        }
    });
}

/// Start a vector-overlay fetch; parse failures settle as failed.
pub fn spawn_vector_fetch(cache: VectorCache, url: String) {
    spawn_local(async move {
        let text = match fetch_text(&url).await {
            Ok(t) => t,
            Err(e) => {
                log::warn!("vector asset fetch failed: {e}");
                cache.borrow_mut().fail(&url);
                return;
            }
        };
        match parse_vector_doc(&url, &text) {
            Ok(doc) => cache.borrow_mut().fulfill(&url, doc),
            Err(e) => {
                log::warn!("{e}");
                cache.borrow_mut().fail(&url);
            }
        }
    });
}

/// Kick off the best-effort warm-up of every panorama in the scene
/// set. `on_ready` fires once, when the last URL settles.
pub fn spawn_preload(
    cache: TextureCache,
    urls: Vec<String>,
    on_ready: impl FnOnce() + 'static,
) {
    let preload = Rc::new(RefCell::new(Preload::new(urls.len())));
    let on_ready = Rc::new(RefCell::new(Some(on_ready)));
    if preload.borrow().is_ready() {
        if let Some(f) = on_ready.borrow_mut().take() {
            f();
        }
        return;
    }
    for url in urls {
        if cache.borrow_mut().request(&url) != pano_core::Fetch::Start {
            // already in flight from the initial scene load
            if preload.borrow_mut().settle() {
                if let Some(f) = on_ready.borrow_mut().take() {
                    f();
                }
            }
            continue;
        }
        let cache = cache.clone();
        let preload = preload.clone();
        let on_ready = on_ready.clone();
        spawn_local(async move {
            match load_bitmap(&url).await {
                Ok(bitmap) => cache.borrow_mut().fulfill(&url, bitmap),
                Err(e) => {
                    log::warn!("preload skipped an asset: {e}");
                    cache.borrow_mut().fail(&url);
                }
            }
            if preload.borrow_mut().settle() {
                if let Some(f) = on_ready.borrow_mut().take() {
                    f();
                }
            }
        });
    }
}
