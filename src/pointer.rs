use crate::dom;
use ballpit_core::{PointerEventSource, PointerRegistry, Rect, SurfaceBounds};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedRegistry = Rc<RefCell<PointerRegistry<u32>>>;

/// One registry per runtime, subscribed to `document.body` only while at
/// least one surface is registered.
pub fn shared_registry() -> SharedRegistry {
    Rc::new_cyclic(|weak: &Weak<RefCell<PointerRegistry<u32>>>| {
        RefCell::new(PointerRegistry::new(Box::new(DomPointerSource {
            registry: weak.clone(),
            body: None,
            listeners: Vec::new(),
        })))
    })
}

pub struct CanvasBounds(pub web::HtmlCanvasElement);

impl SurfaceBounds for CanvasBounds {
    fn bounding_rect(&self) -> Rect {
        let r = self.0.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
    }
}

#[derive(Clone, Copy)]
enum PointerKind {
    Move,
    Click,
    Leave,
}

struct DomPointerSource {
    registry: Weak<RefCell<PointerRegistry<u32>>>,
    body: Option<web::HtmlElement>,
    listeners: Vec<(&'static str, Closure<dyn FnMut(web::MouseEvent)>)>,
}

fn dispatch(
    registry: &Weak<RefCell<PointerRegistry<u32>>>,
    kind: PointerKind,
    ev: &web::MouseEvent,
) {
    let Some(registry) = registry.upgrade() else {
        return;
    };
    // A callback re-entering the registry would already hold the borrow
    let Ok(mut registry) = registry.try_borrow_mut() else {
        return;
    };
    let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
    match kind {
        PointerKind::Move => registry.pointer_move(client),
        PointerKind::Click => registry.click(client),
        PointerKind::Leave => registry.pointer_leave(),
    }
}

impl PointerEventSource for DomPointerSource {
    fn attach(&mut self) {
        let Some(body) = dom::window_document().and_then(|d| d.body()) else {
            log::warn!("[pointer] document has no body; pointer input disabled");
            return;
        };
        for (name, kind) in [
            ("pointermove", PointerKind::Move),
            ("click", PointerKind::Click),
            ("pointerleave", PointerKind::Leave),
        ] {
            let registry = self.registry.clone();
            let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
                dispatch(&registry, kind, &ev);
            }) as Box<dyn FnMut(web::MouseEvent)>);
            _ = body.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            self.listeners.push((name, closure));
        }
        self.body = Some(body);
    }

    fn detach(&mut self) {
        let Some(body) = self.body.take() else {
            return;
        };
        for (name, closure) in self.listeners.drain(..) {
            _ = body.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}
