//! Page conveniences around the backdrop: anchor scrolling and fade-in reveal.
//!
//! The browser wiring lives in `backdrop-wasm`; this module holds the parts
//! that do not need a DOM.

use std::collections::HashSet;
use std::hash::Hash;

/// Class added to an element once it has been revealed.
pub const FADE_IN_CLASS: &str = "fade-in-up";

/// Selector for elements that fade in when scrolled into view.
pub const REVEAL_SELECTOR: &str = "section, .card";

/// Style rule that makes [`FADE_IN_CLASS`] override the hidden state.
pub const FADE_IN_CSS: &str = "
        .fade-in-up {
            opacity: 1 !important;
            transform: translateY(0) !important;
        }
    ";

/// Inline styles applied to reveal targets before they are observed.
pub const HIDDEN_STYLES: [(&str, &str); 3] = [
    ("opacity", "0"),
    ("transform", "translateY(20px)"),
    ("transition", "opacity 0.6s ease-out, transform 0.6s ease-out"),
];

/// Returns the selector an in-page link scrolls to.
///
/// `"#features"` yields `Some("#features")`. A bare `"#"` and hrefs that are
/// not fragments yield `None`.
pub fn anchor_target(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    if id.trim().is_empty() {
        return None;
    }
    Some(href)
}

/// Intersection settings for the reveal observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    /// Fraction of the target that must be visible.
    pub threshold: f64,
    /// Offset applied to the viewport's bottom edge, in pixels.
    pub root_margin_bottom: f64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_bottom: -50.0,
        }
    }
}

impl RevealOptions {
    /// CSS margin string for `IntersectionObserverInit.rootMargin`.
    pub fn root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.root_margin_bottom)
    }
}

/// Tracks which targets have been revealed; each is revealed at most once.
#[derive(Debug, Clone)]
pub struct RevealTracker<K> {
    options: RevealOptions,
    revealed: HashSet<K>,
}

impl<K: Eq + Hash> RevealTracker<K> {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            options,
            revealed: HashSet::new(),
        }
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Reports an intersection change. Returns `true` when the target should
    /// be revealed now (and unobserved).
    pub fn observe(&mut self, key: K, intersecting: bool) -> bool {
        intersecting && self.revealed.insert(key)
    }
}

/// Inserts a style rule at most once.
#[derive(Debug, Clone, Default)]
pub struct StyleInjector {
    injected: bool,
}

impl StyleInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `insert` the first time only. Returns whether it ran.
    pub fn inject<E>(&mut self, insert: impl FnOnce() -> Result<(), E>) -> Result<bool, E> {
        if self.injected {
            return Ok(false);
        }
        insert()?;
        self.injected = true;
        Ok(true)
    }
}
