//! Mounts the particle field on a canvas and drives it with
//! `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use backdrop_core::{
    Animator, FieldConfig, FrameOutcome, ParticleField, Srgb, StopHandle, Xorshift64,
};
use glam::DVec2;
use log::{debug, error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use crate::canvas::CanvasSurface;

/// CSS custom property holding the theme accent.
const ACCENT_PROPERTY: &str = "--accent-primary";

/// Everything one running backdrop owns.
struct Backdrop {
    animator: Animator<ParticleField>,
    surface: CanvasSurface,
}

fn now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

/// Layout size of the canvas container, or of the canvas if it has none.
fn container_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let parent = canvas
        .parent_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let (w, h) = match parent {
        Some(el) => (el.offset_width(), el.offset_height()),
        None => (canvas.offset_width(), canvas.offset_height()),
    };
    (w.max(0) as u32, h.max(0) as u32)
}

/// Reads the accent from the root element's computed style.
fn read_accent(window: &Window) -> Srgb {
    let raw = window
        .document()
        .and_then(|d| d.document_element())
        .and_then(|root| window.get_computed_style(&root).ok().flatten())
        .and_then(|style| style.get_property_value(ACCENT_PROPERTY).ok());
    Srgb::resolve_accent(raw.as_deref())
}

/// Starts the animation on `canvas` and returns its stop handle.
pub fn mount(
    window: &Window,
    canvas: HtmlCanvasElement,
    config: FieldConfig,
    rng: Xorshift64,
) -> Result<StopHandle, JsValue> {
    let surface = CanvasSurface::new(canvas)?;
    let (w, h) = container_size(surface.canvas());
    surface.set_size(w, h);

    let settle = config.settle_delay_ms;
    let field = ParticleField::new(
        f64::from(w),
        f64::from(h),
        read_accent(window),
        config,
        rng,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    info!("backdrop mounted at {w}x{h} with {} particles", field.len());

    let animator = Animator::new(field, settle);
    let stop = animator.stop_handle();
    let state = Rc::new(RefCell::new(Backdrop { animator, surface }));

    let on_move = {
        let state = state.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let mut backdrop = state.borrow_mut();
            let rect = backdrop.surface.canvas().get_bounding_client_rect();
            let at = DVec2::new(
                f64::from(event.client_x()) - rect.left(),
                f64::from(event.client_y()) - rect.top(),
            );
            backdrop.animator.scene_mut().pointer_moved(at);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;

    let on_resize = {
        let state = state.clone();
        let win = window.clone();
        Closure::wrap(Box::new(move || {
            let mut backdrop = state.borrow_mut();
            let (w, h) = container_size(backdrop.surface.canvas());
            backdrop.surface.set_size(w, h);
            debug!("canvas resized to {w}x{h}");
            backdrop.animator.resize(f64::from(w), f64::from(h), now(&win));
        }) as Box<dyn FnMut()>)
    };
    if let Err(e) =
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
    {
        remove_listener(window, "mousemove", &on_move);
        return Err(e);
    }

    // The frame closure reschedules itself through `f`; `pending` holds the
    // id of the frame request not yet served.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    {
        let win = window.clone();
        let f = f.clone();
        let pending = pending.clone();
        // May run inside the frame closure, where `state` is borrowed.
        stop.on_stop(move || {
            remove_listener(&win, "mousemove", &on_move);
            remove_listener(&win, "resize", &on_resize);
            if let Some(id) = pending.take() {
                if let Err(e) = win.cancel_animation_frame(id) {
                    debug!("cancelAnimationFrame failed: {e:?}");
                }
            }
            drop(f.borrow_mut().take());
            debug!("backdrop listeners released");
        });
    }

    let g = f.clone();
    let win = window.clone();
    let queued = pending.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        queued.set(None);
        let outcome = {
            let mut guard = state.borrow_mut();
            let backdrop = &mut *guard;
            if !backdrop.surface.canvas().is_connected() {
                info!("canvas detached from the document");
                backdrop.animator.stop();
            }
            let accent = read_accent(&win);
            if accent != backdrop.animator.scene().accent() {
                backdrop.animator.scene_mut().set_accent(accent);
            }
            backdrop.animator.frame(&mut backdrop.surface, now(&win))
        };
        if outcome == FrameOutcome::Stop {
            return;
        }
        let scheduled = f
            .borrow()
            .as_ref()
            .map(|cb| win.request_animation_frame(cb.as_ref().unchecked_ref()));
        match scheduled {
            Some(Ok(id)) => queued.set(Some(id)),
            Some(Err(e)) => error!("requestAnimationFrame failed: {e:?}"),
            None => {}
        }
    }) as Box<dyn FnMut()>));

    let first = g
        .borrow()
        .as_ref()
        .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
        .transpose();
    match first {
        Ok(id) => pending.set(id),
        Err(e) => {
            stop.stop();
            return Err(e);
        }
    }
    Ok(stop)
}

/// Detaches a listener added with `add_event_listener_with_callback`.
fn remove_listener<T: ?Sized>(window: &Window, event: &str, listener: &Closure<T>) {
    let callback = listener.as_ref().unchecked_ref();
    if let Err(e) = window.remove_event_listener_with_callback(event, callback) {
        debug!("removing {event} listener failed: {e:?}");
    }
}
