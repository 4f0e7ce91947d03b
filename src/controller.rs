use std::rc::Rc;

use log::debug;

use crate::dataset::Dataset;
use crate::events::{DomEvent, EventKind, EventTarget, KeyboardEvent, PointerEvent, Region, Subscription};
use crate::filter::filter;
use crate::model::SearchResult;

/// Receives input focus when the overlay opens.
pub trait InputFocus {
    fn focus(&mut self);
}

/// Listener pair held while the overlay is mounted on a document.
pub struct Mount {
    _keydown: Subscription<SearchOverlay>,
    _pointerdown: Subscription<SearchOverlay>,
}

/// Owns overlay visibility and the query. Every query change recomputes
/// the result set before returning.
pub struct SearchOverlay {
    dataset: Rc<Dataset>,
    visible: bool,
    query: String,
    results: SearchResult,
    container: Option<Region>,
    input: Box<dyn InputFocus>,
    mount: Option<Mount>,
}

impl SearchOverlay {
    pub fn new(dataset: Rc<Dataset>, input: Box<dyn InputFocus>) -> Self {
        let results = filter(&dataset, "");
        Self {
            dataset,
            visible: false,
            query: String::new(),
            results,
            container: None,
            input,
            mount: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &SearchResult {
        &self.results
    }

    #[cfg(test)]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Sets visibility to `explicit`, or flips it when `None`. Returns
    /// whether the state changed. Focus is requested on the hidden to
    /// visible edge only.
    pub fn toggle(&mut self, explicit: Option<bool>) -> bool {
        let next = explicit.unwrap_or(!self.visible);
        if next == self.visible {
            return false;
        }
        self.visible = next;
        debug!("SearchOverlay: visible={}", self.visible);
        if self.visible {
            self.input.focus();
        }
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.results = filter(&self.dataset, &self.query);
        debug!(
            "SearchOverlay: query='{}', categories={}, items={}",
            self.query,
            self.results.groups.len(),
            self.results.item_count()
        );
    }

    /// Bounding region of the rendered popover; `None` while nothing is
    /// rendered.
    pub fn set_container(&mut self, region: Option<Region>) {
        self.container = region;
    }

    #[cfg(test)]
    pub fn container(&self) -> Option<Region> {
        self.container
    }

    /// Ctrl/Cmd+K suppresses the default action and opens the overlay. It
    /// never closes it.
    pub fn on_global_keydown(&mut self, event: &mut KeyboardEvent) {
        if !event.is_search_shortcut() {
            return;
        }
        event.prevent_default();
        if !self.visible {
            self.toggle(Some(true));
        }
    }

    /// Hides the overlay when the press lands outside the container.
    pub fn on_outside_interaction(&mut self, event: &PointerEvent) {
        let Some(container) = self.container else {
            return;
        };
        if !container.contains(event.x, event.y) {
            self.toggle(Some(false));
        }
    }

    /// Subscribes the keyboard and pointer handlers on `document`. Mounting
    /// again releases the previous pair first.
    pub fn mount(&mut self, document: &EventTarget<SearchOverlay>) {
        self.mount = None;
        let keydown = document.add_listener(EventKind::KeyDown, |event, overlay: &mut SearchOverlay| {
            if let DomEvent::KeyDown(key) = event {
                overlay.on_global_keydown(key);
            }
        });
        let pointerdown = document.add_listener(EventKind::PointerDown, |event, overlay: &mut SearchOverlay| {
            if let DomEvent::PointerDown(pointer) = event {
                overlay.on_outside_interaction(pointer);
            }
        });
        self.mount = Some(Mount {
            _keydown: keydown,
            _pointerdown: pointerdown,
        });
        debug!("SearchOverlay: mounted");
    }

    /// Releases the listener pair. A no-op when not mounted.
    pub fn unmount(&mut self) {
        if self.mount.take().is_some() {
            debug!("SearchOverlay: unmounted");
        }
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }
}
