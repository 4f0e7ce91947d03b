//! Process-wide event target the overlay subscribes to, plus the event
//! types the Wayland frontend translates seat input into.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    KeyDown,
    PointerDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Escape,
    Up,
    Down,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            default_prevented: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Ctrl+K or Cmd/Super+K. Only a lowercase `k` counts.
    pub fn is_search_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.key == Key::Char('k')
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    KeyDown(KeyboardEvent),
    PointerDown(PointerEvent),
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::KeyDown(_) => EventKind::KeyDown,
            DomEvent::PointerDown(_) => EventKind::PointerDown,
        }
    }
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

type Listener<D> = Rc<RefCell<dyn FnMut(&mut DomEvent, &mut D)>>;

struct Registered<D> {
    id: u64,
    kind: EventKind,
    callback: Listener<D>,
}

struct Registry<D> {
    next_id: u64,
    listeners: Vec<Registered<D>>,
}

impl<D> Registry<D> {
    fn contains(&self, id: u64) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }
}

/// Listener registry. Listeners receive the event and the data passed to
/// [`EventTarget::dispatch`], in the order they were added.
pub struct EventTarget<D> {
    registry: Rc<RefCell<Registry<D>>>,
}

impl<D> Default for EventTarget<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> EventTarget<D> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers `callback` for `kind`. The listener stays registered for
    /// exactly as long as the returned [`Subscription`] lives.
    #[must_use = "dropping the subscription removes the listener"]
    pub fn add_listener<F>(&self, kind: EventKind, callback: F) -> Subscription<D>
    where
        F: FnMut(&mut DomEvent, &mut D) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Registered {
            id,
            kind,
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Runs every listener registered for the event's kind and returns how
    /// many were invoked. A listener removed while the dispatch is in
    /// progress is skipped.
    pub fn dispatch(&self, event: &mut DomEvent, data: &mut D) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(u64, Listener<D>)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| (l.id, Rc::clone(&l.callback)))
            .collect();

        let mut invoked = 0;
        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            (&mut *callback.borrow_mut())(event, data);
            invoked += 1;
        }
        invoked
    }
}

/// Registration handle returned by [`EventTarget::add_listener`]; removes
/// the listener when dropped.
pub struct Subscription<D> {
    registry: Weak<RefCell<Registry<D>>>,
    id: u64,
}

impl<D> Drop for Subscription<D> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.retain(|l| l.id != self.id);
        }
    }
}
