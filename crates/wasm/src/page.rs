//! DOM wiring for the theme toggle, in-page anchors and fade-in reveal.
//!
//! Each feature is skipped (with a warning) when its elements are missing.

use std::cell::RefCell;
use std::rc::Rc;

use backdrop_core::page::{
    anchor_target, RevealOptions, RevealTracker, StyleInjector, FADE_IN_CLASS, FADE_IN_CSS,
    HIDDEN_STYLES, REVEAL_SELECTOR,
};
use backdrop_core::theme::{Icon, Theme, ThemeStore, ThemeToggle};
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions, Storage,
};

const TOGGLE_ID: &str = "theme-toggle";
const THEME_ATTR: &str = "data-theme";
const REVEAL_INDEX_ATTR: &str = "data-reveal-index";

/// `localStorage`-backed theme persistence. Storage failures (private mode,
/// quota) degrade to an unpersisted preference.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage unavailable; theme will not persist");
        }
        Self { storage }
    }
}

impl ThemeStore for LocalStorageStore {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                warn!("could not persist theme {value:?}");
            }
        }
    }
}

fn apply_theme(body: &HtmlElement, icon: Option<&Element>, theme: Theme) -> Result<(), JsValue> {
    body.set_attribute(THEME_ATTR, theme.as_str())?;
    if let Some(icon) = icon {
        let classes = icon.class_list();
        let shown = theme.icon();
        let hidden = match shown {
            Icon::Sun => Icon::Moon,
            Icon::Moon => Icon::Sun,
        };
        classes.remove_1(hidden.class())?;
        classes.add_1(shown.class())?;
    }
    Ok(())
}

/// Applies the stored theme and wires the toggle button.
pub fn install_theme_toggle(document: &Document) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id(TOGGLE_ID) else {
        warn!("#{TOGGLE_ID} not found; theme toggle disabled");
        return Ok(());
    };
    let Some(body) = document.body() else {
        warn!("document has no body; theme toggle disabled");
        return Ok(());
    };
    let icon = button.query_selector("i")?;

    let toggle = ThemeToggle::load(LocalStorageStore::new());
    apply_theme(&body, icon.as_ref(), toggle.current())?;
    let toggle = Rc::new(RefCell::new(toggle));

    let on_click = Closure::wrap(Box::new(move |_: Event| {
        let theme = toggle.borrow_mut().toggle();
        debug!("theme toggled to {theme}");
        if let Err(e) = apply_theme(&body, icon.as_ref(), theme) {
            warn!("could not apply theme: {e:?}");
        }
    }) as Box<dyn FnMut(Event)>);
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Makes `a[href^="#"]` links scroll smoothly to their target.
pub fn install_anchor_scroll(document: &Document) -> Result<(), JsValue> {
    let anchors = document.query_selector_all(r##"a[href^="#"]"##)?;
    for i in 0..anchors.length() {
        let Some(anchor) = anchors.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let doc = document.clone();
        let link = anchor.clone();
        let on_click = Closure::wrap(Box::new(move |event: Event| {
            event.prevent_default();
            let href = link.get_attribute("href").unwrap_or_default();
            let Some(selector) = anchor_target(&href) else {
                return;
            };
            match doc.query_selector(selector) {
                Ok(Some(target)) => {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    target.scroll_into_view_with_scroll_into_view_options(&options);
                }
                Ok(None) => debug!("anchor target {selector} not found"),
                Err(_) => warn!("invalid anchor selector {selector:?}"),
            }
        }) as Box<dyn FnMut(Event)>);
        anchor.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }
    Ok(())
}

fn inject_fade_in_style(document: &Document, injector: &mut StyleInjector) -> Result<(), JsValue> {
    let injected = injector.inject(|| {
        let head = document.head().ok_or("document has no head")?;
        let style = document.create_element("style")?;
        style.set_text_content(Some(FADE_IN_CSS));
        head.append_child(&style)?;
        Ok::<(), JsValue>(())
    })?;
    if injected {
        debug!("fade-in style injected");
    }
    Ok(())
}

/// Hides sections and cards until they scroll into view, then fades them in.
pub fn install_reveal(document: &Document, injector: &mut StyleInjector) -> Result<(), JsValue> {
    let tracker = RevealTracker::<u32>::new(RevealOptions::default());
    let options = *tracker.options();
    let tracker = Rc::new(RefCell::new(tracker));

    let on_intersect = Closure::wrap(Box::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let Some(index) = target
                    .get_attribute(REVEAL_INDEX_ATTR)
                    .and_then(|raw| raw.parse::<u32>().ok())
                else {
                    continue;
                };
                if tracker.borrow_mut().observe(index, entry.is_intersecting()) {
                    if let Err(e) = target.class_list().add_1(FADE_IN_CLASS) {
                        debug!("adding {FADE_IN_CLASS}: {e:?}");
                    }
                    observer.unobserve(&target);
                }
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(options.threshold));
    init.set_root_margin(&options.root_margin());
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init)?;
    on_intersect.forget();

    let targets = document.query_selector_all(REVEAL_SELECTOR)?;
    for i in 0..targets.length() {
        let Some(el) = targets.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        el.set_attribute(REVEAL_INDEX_ATTR, &i.to_string())?;
        let style = el.style();
        for (name, value) in HIDDEN_STYLES {
            style.set_property(name, value)?;
        }
        observer.observe(&el);
    }
    debug!("observing {} reveal targets", targets.length());

    inject_fade_in_style(document, injector)
}
