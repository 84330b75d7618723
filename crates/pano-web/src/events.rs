//! Pointer and wheel wiring on the canvas.
//!
//! Dragging steers the camera; a press whose accumulated movement
//! never crosses the drag threshold is a click and goes through the
//! engine's pick/dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use pano_core::camera::OrbitCamera;
use pano_core::interact::PointerTrack;
use pano_core::{ClickOutcome, Engine, EngineError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;
use crate::input;

pub struct EventContext {
    pub engine: Rc<RefCell<Engine>>,
    pub camera: Rc<RefCell<OrbitCamera>>,
    pub pointer: Rc<RefCell<PointerTrack>>,
    pub canvas: web::HtmlCanvasElement,
}

pub fn wire_canvas_events(ctx: &EventContext) {
    wire_pointer_move(ctx);
    wire_pointer_down(ctx);
    wire_pointer_up(ctx);
    wire_pointer_leave(ctx);
    wire_wheel(ctx);
}

fn wire_pointer_move(ctx: &EventContext) {
    let engine = ctx.engine.clone();
    let camera = ctx.camera.clone();
    let pointer = ctx.pointer.clone();
    let canvas = ctx.canvas.clone();
    let canvas_for_listener = ctx.canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = input::pointer_canvas_px(&ev, &canvas);
        let (dx, dy, down) = {
            let mut p = pointer.borrow_mut();
            let (dx, dy) = p.motion(pos.x, pos.y);
            (dx, dy, p.is_down())
        };
        if down {
            camera.borrow_mut().rotate(-dx, dy);
            return;
        }
        let ray = camera
            .borrow()
            .screen_to_world_ray(canvas.width(), canvas.height(), pos.x, pos.y);
        let hit = engine.borrow().pick(ray);
        let mut eng = engine.borrow_mut();
        if eng.hover(hit) {
            dom::set_cursor(&canvas, if hit.is_some() { "pointer" } else { "grab" });
        }
    }) as Box<dyn FnMut(_)>);
    let _ = canvas_for_listener
        .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointer_down(ctx: &EventContext) {
    let camera = ctx.camera.clone();
    let pointer = ctx.pointer.clone();
    let canvas = ctx.canvas.clone();
    let canvas_for_listener = ctx.canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = input::pointer_canvas_px(&ev, &canvas);
        pointer.borrow_mut().press(pos.x, pos.y);
        camera.borrow_mut().interrupt();
        dom::set_cursor(&canvas, "grabbing");
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    let _ = canvas_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointer_up(ctx: &EventContext) {
    let engine = ctx.engine.clone();
    let camera = ctx.camera.clone();
    let pointer = ctx.pointer.clone();
    let canvas = ctx.canvas.clone();
    let canvas_for_listener = ctx.canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let was_drag = pointer.borrow_mut().release();
        dom::set_cursor(&canvas, "grab");
        if was_drag {
            return;
        }
        let pos = input::pointer_canvas_px(&ev, &canvas);
        let ray = camera
            .borrow()
            .screen_to_world_ray(canvas.width(), canvas.height(), pos.x, pos.y);
        let Some(index) = engine.borrow().pick(ray) else {
            return;
        };
        match engine.borrow_mut().click(index) {
            Ok(ClickOutcome::Transition(t)) => {
                log::info!("switching to scene '{}'", t.scene_id);
            }
            Ok(ClickOutcome::OpenExternal(url)) => dom::open_external(&url),
            Ok(ClickOutcome::None) => {}
            Err(EngineError::Busy) => log::debug!("click ignored during transition"),
            Err(e) => log::warn!("{e}"),
        }
    }) as Box<dyn FnMut(_)>);
    let _ = canvas_for_listener
        .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointer_leave(ctx: &EventContext) {
    let engine = ctx.engine.clone();
    let pointer = ctx.pointer.clone();
    let canvas = ctx.canvas.clone();
    let canvas_for_listener = ctx.canvas.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        pointer.borrow_mut().cancel();
        engine.borrow_mut().hover(None);
        dom::set_cursor(&canvas, "grab");
    }) as Box<dyn FnMut(_)>);
    let _ = canvas_for_listener
        .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_wheel(ctx: &EventContext) {
    let camera = ctx.camera.clone();
    let canvas = ctx.canvas.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        camera.borrow_mut().zoom(ev.delta_y() as f32);
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}
