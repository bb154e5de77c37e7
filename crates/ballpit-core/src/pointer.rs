//! Shared pointer registry for rendering surfaces.
//!
//! One registry serves every surface. It owns a single [`PointerEventSource`]
//! which is attached when the first listener registers and detached when the
//! last one is disposed. The host forwards document-level pointer events to
//! [`PointerRegistry::pointer_move`], [`PointerRegistry::click`] and
//! [`PointerRegistry::pointer_leave`].

use fnv::FnvHashMap;
use glam::Vec2;
use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

/// Axis-aligned client-space rectangle (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }
}

/// Anything that can report its current client rectangle.
pub trait SurfaceBounds {
    fn bounding_rect(&self) -> Rect;
}

impl SurfaceBounds for Rect {
    fn bounding_rect(&self) -> Rect {
        *self
    }
}

/// Document-level event subscription managed by the registry.
pub trait PointerEventSource {
    fn attach(&mut self);
    fn detach(&mut self);
}

/// Live pointer state for one surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Surface-local position in CSS pixels.
    pub position: Vec2,
    /// Normalized device coordinates in [-1, 1], y up.
    pub n_position: Vec2,
    pub hover: bool,
}

impl PointerState {
    fn track(&mut self, pointer: Vec2, rect: &Rect) {
        self.position = Vec2::new(pointer.x - rect.left, pointer.y - rect.top);
        let w = if rect.width > 0.0 { rect.width } else { 1.0 };
        let h = if rect.height > 0.0 { rect.height } else { 1.0 };
        self.n_position = Vec2::new(
            (self.position.x / w) * 2.0 - 1.0,
            (-self.position.y / h) * 2.0 + 1.0,
        );
    }
}

pub type PointerCallback = Box<dyn FnMut(&PointerState)>;

#[derive(Default)]
pub struct PointerCallbacks {
    pub on_enter: Option<PointerCallback>,
    pub on_move: Option<PointerCallback>,
    pub on_click: Option<PointerCallback>,
    pub on_leave: Option<PointerCallback>,
}

impl PointerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(mut self, f: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_move(mut self, f: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    pub fn on_click(mut self, f: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    pub fn on_leave(mut self, f: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }
}

#[inline]
fn fire(cb: &mut Option<PointerCallback>, state: &PointerState) {
    if let Some(f) = cb.as_mut() {
        f(state);
    }
}

struct Entry {
    bounds: Box<dyn SurfaceBounds>,
    callbacks: PointerCallbacks,
    state: Rc<Cell<PointerState>>,
}

impl Entry {
    fn leave(&mut self) {
        let mut s = self.state.get();
        if s.hover {
            s.hover = false;
            self.state.set(s);
            fire(&mut self.callbacks.on_leave, &s);
        }
    }
}

/// Handle returned by [`PointerRegistry::register`].
pub struct ListenerHandle<K> {
    key: K,
    state: Rc<Cell<PointerState>>,
}

impl<K: Clone> ListenerHandle<K> {
    pub fn key(&self) -> K {
        self.key.clone()
    }

    /// Latest pointer state for this surface.
    pub fn state(&self) -> PointerState {
        self.state.get()
    }
}

pub struct PointerRegistry<K> {
    listeners: FnvHashMap<K, Entry>,
    source: Box<dyn PointerEventSource>,
    attached: bool,
}

impl<K: Eq + Hash + Clone> PointerRegistry<K> {
    pub fn new(source: Box<dyn PointerEventSource>) -> Self {
        Self {
            listeners: FnvHashMap::default(),
            source,
            attached: false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of live document subscriptions: always 0 or 1.
    pub fn active_subscriptions(&self) -> usize {
        usize::from(self.attached)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.listeners.contains_key(key)
    }

    /// Register a surface. Returns `None` if the surface is already registered.
    pub fn register(
        &mut self,
        key: K,
        bounds: Box<dyn SurfaceBounds>,
        callbacks: PointerCallbacks,
    ) -> Option<ListenerHandle<K>> {
        if self.listeners.contains_key(&key) {
            log::warn!("[pointer] surface already registered; ignoring");
            return None;
        }
        let state = Rc::new(Cell::new(PointerState::default()));
        self.listeners.insert(
            key.clone(),
            Entry {
                bounds,
                callbacks,
                state: state.clone(),
            },
        );
        if !self.attached {
            self.source.attach();
            self.attached = true;
            log::debug!("[pointer] document listeners attached");
        }
        Some(ListenerHandle { key, state })
    }

    /// Remove a surface. A hovering listener receives `on_leave` first.
    pub fn dispose(&mut self, handle: &ListenerHandle<K>) {
        if let Some(mut entry) = self.listeners.remove(&handle.key) {
            entry.leave();
        }
        if self.listeners.is_empty() && self.attached {
            self.source.detach();
            self.attached = false;
            log::debug!("[pointer] document listeners detached");
        }
    }

    /// Document pointer move at client coordinates.
    pub fn pointer_move(&mut self, client: Vec2) {
        for entry in self.listeners.values_mut() {
            let rect = entry.bounds.bounding_rect();
            if rect.contains(client) {
                let mut s = entry.state.get();
                s.track(client, &rect);
                let entering = !s.hover;
                s.hover = true;
                entry.state.set(s);
                if entering {
                    fire(&mut entry.callbacks.on_enter, &s);
                }
                fire(&mut entry.callbacks.on_move, &s);
            } else {
                entry.leave();
            }
        }
    }

    /// Document click at client coordinates. Positions update for every
    /// surface; `on_click` fires only where the click landed.
    pub fn click(&mut self, client: Vec2) {
        for entry in self.listeners.values_mut() {
            let rect = entry.bounds.bounding_rect();
            let mut s = entry.state.get();
            s.track(client, &rect);
            entry.state.set(s);
            if rect.contains(client) {
                fire(&mut entry.callbacks.on_click, &s);
            }
        }
    }

    /// The pointer left the document.
    pub fn pointer_leave(&mut self) {
        for entry in self.listeners.values_mut() {
            entry.leave();
        }
    }
}
