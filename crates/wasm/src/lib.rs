#![deny(unsafe_code)]
//! Browser bindings for the backdrop.
//!
//! On load the module installs the theme toggle, smooth anchor scrolling and
//! fade-in reveal, then starts the particle animation on `#geometric-bg`.
//! `start_with_config` restarts the animation with field overrides and
//! returns a handle whose `stop()` ends it.

mod animation;
mod canvas;
mod page;

use std::cell::RefCell;

use backdrop_core::page::StyleInjector;
use backdrop_core::{FieldConfig, StopHandle, Xorshift64};
use log::{debug, error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, Window};

/// Id of the canvas the animation draws on.
const CANVAS_ID: &str = "geometric-bg";

thread_local! {
    static RUNNING: RefCell<Option<StopHandle>> = const { RefCell::new(None) };
    static INJECTOR: RefCell<StyleInjector> = RefCell::new(StyleInjector::new());
}

/// Stops a running backdrop animation.
#[wasm_bindgen]
pub struct BackdropHandle {
    stop: StopHandle,
}

#[wasm_bindgen]
impl BackdropHandle {
    pub fn stop(&self) {
        self.stop.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        self.stop.is_stopped()
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn document(window: &Window) -> Result<Document, JsValue> {
    window.document().ok_or_else(|| JsValue::from_str("no document"))
}

/// Runs `f` once the DOM has been parsed.
fn on_ready(document: &Document, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }
    let cb = Closure::once(f);
    document.add_event_listener_with_callback("DOMContentLoaded", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn install_page(document: &Document) {
    if let Err(e) = page::install_theme_toggle(document) {
        warn!("theme toggle: {e:?}");
    }
    if let Err(e) = page::install_anchor_scroll(document) {
        warn!("anchor scroll: {e:?}");
    }
    let reveal = INJECTOR.with(|injector| page::install_reveal(document, &mut injector.borrow_mut()));
    if let Err(e) = reveal {
        warn!("fade-in reveal: {e:?}");
    }
}

fn start_backdrop(config: FieldConfig) -> Result<Option<BackdropHandle>, JsValue> {
    stop();
    let window = window()?;
    let Some(el) = document(&window)?.get_element_by_id(CANVAS_ID) else {
        debug!("#{CANVAS_ID} not found; animation skipped");
        return Ok(None);
    };
    let canvas = el.dyn_into::<HtmlCanvasElement>()?;
    let rng = Xorshift64::from_unit(js_sys::Math::random());
    let handle = animation::mount(&window, canvas, config, rng)?;
    RUNNING.with(|running| *running.borrow_mut() = Some(handle.clone()));
    Ok(Some(BackdropHandle { stop: handle }))
}

/// Parses a JS object of field overrides; `undefined` and `null` mean defaults.
fn parse_config(config: &JsValue) -> Result<FieldConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(FieldConfig::default());
    }
    let text: String = js_sys::JSON::stringify(config)?.into();
    let params: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    FieldConfig::from_json(&params).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    info!("backdrop starting");

    let window = window()?;
    let doc = document(&window)?;
    let ready_doc = doc.clone();
    on_ready(&doc, move || {
        install_page(&ready_doc);
        if let Err(e) = start_backdrop(FieldConfig::default()) {
            error!("backdrop failed to start: {e:?}");
        }
    })
}

/// Restarts the animation with the given field overrides.
///
/// Returns `undefined` when the page has no backdrop canvas.
#[wasm_bindgen]
pub fn start_with_config(config: JsValue) -> Result<Option<BackdropHandle>, JsValue> {
    let config = parse_config(&config)?;
    start_backdrop(config)
}

/// Stops the running animation, if any.
#[wasm_bindgen]
pub fn stop() {
    RUNNING.with(|running| {
        if let Some(handle) = running.borrow_mut().take() {
            handle.stop();
        }
    });
}
