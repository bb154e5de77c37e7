#![cfg(target_arch = "wasm32")]
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

mod ballpit;
mod constants;
mod dom;
mod pointer;
mod render;
mod viewport;

pub use ballpit::Ballpit;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);
    log::info!("[ballpit] wasm module loaded");
}

/// Owns the pointer registry shared by every mounted canvas.
#[wasm_bindgen]
pub struct Runtime {
    registry: pointer::SharedRegistry,
    next_surface: Rc<Cell<u32>>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Runtime {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Runtime {
        Runtime {
            registry: pointer::shared_registry(),
            next_surface: Rc::new(Cell::new(1)),
        }
    }

    /// Mount a sphere scene on `target`, a canvas element or its id.
    ///
    /// Resolves to a `Ballpit` handle. Invalid options and GPU setup failures
    /// reject the promise; a missing canvas logs the reason and resolves to an
    /// inert handle.
    pub fn mount(&self, target: JsValue, options: JsValue) -> js_sys::Promise {
        let config = ballpit::parse_config(&options);
        let canvas = dom::resolve_canvas(&target);
        let registry = self.registry.clone();
        let next = self.next_surface.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let config = config.map_err(|e| JsValue::from_str(&e.to_string()))?;
            let Some(canvas) = canvas else {
                log::error!("[ballpit] mount target is not a canvas; nothing rendered");
                return Ok(JsValue::from(Ballpit::degraded()));
            };
            let surface = dom::surface_id(&canvas, &next);
            match ballpit::mount(canvas, config, registry, surface).await {
                Ok(handle) => Ok(JsValue::from(handle)),
                Err(e) => {
                    log::error!("[ballpit] mount failed: {:#}", e);
                    Err(JsValue::from_str(&format!("{:#}", e)))
                }
            }
        })
    }
}
