//! Optional page chrome: loading veil, back button and the view-mode
//! selector. Every element is looked up by id and silently skipped
//! when the page does not provide it.

use std::cell::RefCell;
use std::rc::Rc;

use pano_core::interact::NavAction;
use pano_core::{Engine, EngineError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;

pub const LOADING_ID: &str = "pano-loading";
pub const BACK_BUTTON_ID: &str = "pano-back";
pub const VIEW_MODE_SELECT_ID: &str = "pano-view-mode";

pub fn set_loading(document: &web::Document, visible: bool) {
    if let Some(el) = document.get_element_by_id(LOADING_ID) {
        let _ = el.set_attribute("style", if visible { "" } else { "display:none" });
    }
}

pub fn wire_back_button(document: &web::Document, engine: Rc<RefCell<Engine>>) {
    dom::add_click_listener(document, BACK_BUTTON_ID, move || {
        match engine.borrow_mut().apply(NavAction::Back) {
            Ok(_) => {}
            Err(EngineError::Busy) => log::debug!("back ignored during transition"),
            Err(e) => log::warn!("{e}"),
        }
    });
}

pub fn wire_view_mode_select(document: &web::Document, engine: Rc<RefCell<Engine>>) {
    let Some(el) = document.get_element_by_id(VIEW_MODE_SELECT_ID) else {
        return;
    };
    let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() else {
        return;
    };
    let select_for_closure = select.clone();
    let closure = Closure::wrap(Box::new(move || {
        let mode = select_for_closure.value();
        match engine.borrow_mut().set_view_mode(&mode) {
            Ok(t) => log::info!("view-mode '{mode}' via scene '{}'", t.scene_id),
            Err(EngineError::Busy) => log::debug!("view-mode change ignored during transition"),
            Err(e) => log::warn!("{e}"),
        }
    }) as Box<dyn FnMut()>);
    let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// The page's initial view-mode, falling back to the first variant of
/// the entry scene when no selector is present.
pub fn initial_view_mode(document: &web::Document, fallback: &str) -> String {
    document
        .get_element_by_id(VIEW_MODE_SELECT_ID)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
        .map(|s| s.value())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
