use crate::constants::SURFACE_ATTR;
use ballpit_core::SizingMode;
use std::cell::Cell;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Accept either a canvas element or the id of one.
pub fn resolve_canvas(target: &JsValue) -> Option<web::HtmlCanvasElement> {
    if let Some(id) = target.as_string() {
        return window_document()?
            .get_element_by_id(&id)?
            .dyn_into::<web::HtmlCanvasElement>()
            .ok();
    }
    target.dyn_ref::<web::HtmlCanvasElement>().cloned()
}

fn window_size(window: &web::Window) -> (f64, f64) {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

pub fn parent_element(canvas: &web::HtmlCanvasElement) -> Option<web::HtmlElement> {
    canvas
        .parent_element()
        .and_then(|p| p.dyn_into::<web::HtmlElement>().ok())
}

/// CSS size of the canvas for the configured sizing mode.
pub fn css_size(canvas: &web::HtmlCanvasElement, mode: &SizingMode) -> (f64, f64) {
    let window = web::window().map(|w| window_size(&w)).unwrap_or((0.0, 0.0));
    let parent =
        parent_element(canvas).map(|p| (p.offset_width() as f64, p.offset_height() as f64));
    mode.resolve(window, parent)
}

pub fn device_pixel_ratio() -> f64 {
    web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0)
}

/// Set the backing store to physical pixels and the style to CSS pixels.
pub fn apply_canvas_size(canvas: &web::HtmlCanvasElement, css: (f32, f32), physical: (u32, u32)) {
    canvas.set_width(physical.0);
    canvas.set_height(physical.1);
    let style = canvas.style();
    _ = style.set_property("width", &format!("{}px", css.0));
    _ = style.set_property("height", &format!("{}px", css.1));
}

/// Registry key stored on the canvas, assigned on first use.
pub fn surface_id(canvas: &web::HtmlCanvasElement, next: &Cell<u32>) -> u32 {
    if let Some(id) = canvas
        .get_attribute(SURFACE_ATTR)
        .and_then(|v| v.parse::<u32>().ok())
    {
        return id;
    }
    let id = next.get();
    next.set(id.wrapping_add(1));
    _ = canvas.set_attribute(SURFACE_ATTR, &id.to_string());
    id
}

pub fn page_hidden() -> bool {
    window_document().map(|d| d.hidden()).unwrap_or(false)
}
