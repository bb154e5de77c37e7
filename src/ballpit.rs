//! The mounted sphere scene and its JavaScript handle.

use crate::constants::POINTER_PLANE_CONSTANT;
use crate::dom;
use crate::pointer::{CanvasBounds, SharedRegistry};
use crate::render::{GpuContext, SphereRenderer};
use crate::viewport::{Scene, Viewport};
use anyhow::anyhow;
use ballpit_core::{
    clamp_pixel_ratio, BallpitConfig, Camera, ConfigError, ControlTarget, ListenerHandle,
    PointerCallbacks, SphereSystem, TimeSample, ViewportState,
};
use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

/// Latest pointer input, applied once per frame.
#[derive(Clone, Copy, Debug)]
enum PointerIntent {
    Move(Vec2),
    Leave,
}

pub struct SphereScene {
    system: SphereSystem,
    renderer: SphereRenderer,
    intent: Rc<Cell<Option<PointerIntent>>>,
    paused: bool,
}

impl SphereScene {
    fn steer(&mut self, camera: &Camera) {
        let center = self.system.physics().center();
        match self.intent.take() {
            Some(PointerIntent::Move(ndc)) => {
                let hit = camera
                    .ray_from_ndc(ndc)
                    .intersect_plane(camera.forward(), POINTER_PLANE_CONSTANT);
                self.system.apply_target(ControlTarget {
                    center: hit.unwrap_or(center),
                    active: true,
                });
            }
            Some(PointerIntent::Leave) => self.system.apply_target(ControlTarget {
                center,
                active: false,
            }),
            None => {}
        }
    }

    fn set_count(&mut self, gpu: &GpuContext, count: usize) -> Result<(), ConfigError> {
        self.system.set_count(count)?;
        self.renderer.release();
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.renderer = SphereRenderer::new(gpu, &self.system);
        let scope = gpu.device.pop_error_scope();
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(err) = scope.await {
                log::error!("[spheres] renderer rebuild for {} spheres failed: {}", count, err);
            }
        });
        Ok(())
    }

    fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("[ballpit] physics {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }
}

impl Scene for SphereScene {
    fn after_resize(&mut self, state: &ViewportState) {
        self.system
            .set_bounds_from_viewport(state.world_width, state.world_height);
    }

    fn before_render(&mut self, gpu: &GpuContext, camera: &Camera, time: TimeSample) {
        self.steer(camera);
        if !self.paused {
            self.system.update(time.delta);
        }
        self.renderer.upload(gpu, &self.system, camera);
    }

    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        self.renderer.draw(rpass);
    }

    fn release(&mut self) {
        self.renderer.release();
    }
}

struct Mounted {
    viewport: Rc<RefCell<Viewport<SphereScene>>>,
    registry: SharedRegistry,
    listener: ListenerHandle<u32>,
}

/// Handle returned by `Runtime.mount`.
///
/// A handle whose mount failed is inert: every method is a no-op.
#[wasm_bindgen]
pub struct Ballpit {
    mounted: Option<Mounted>,
    disposed: bool,
}

impl Ballpit {
    pub(crate) fn degraded() -> Self {
        Self {
            mounted: None,
            disposed: false,
        }
    }
}

#[wasm_bindgen]
impl Ballpit {
    /// Rebuild the pool with `count` spheres.
    #[wasm_bindgen(js_name = setCount)]
    pub fn set_count(&mut self, count: u32) -> Result<(), JsValue> {
        let Some(m) = &self.mounted else {
            return Ok(());
        };
        m.viewport
            .borrow_mut()
            .with_scene(|scene, gpu| scene.set_count(gpu, count as usize))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Freeze or unfreeze the simulation. Rendering continues either way.
    /// Returns whether the simulation is now paused.
    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) -> bool {
        match &self.mounted {
            Some(m) => m
                .viewport
                .borrow_mut()
                .with_scene(|scene, _| scene.toggle_pause()),
            None => false,
        }
    }

    pub fn dispose(&mut self) {
        if let Some(m) = self.mounted.take() {
            m.viewport.borrow_mut().dispose();
            log::info!("[ballpit] disposed surface {}", m.listener.key());
            release_listener(m.registry, m.listener);
        }
        self.disposed = true;
    }

    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Drop a surface from the registry, retrying on the next task when the
/// registry is mid-dispatch.
fn release_listener(registry: SharedRegistry, listener: ListenerHandle<u32>) {
    if let Ok(mut r) = registry.try_borrow_mut() {
        r.dispose(&listener);
        return;
    }
    log::warn!(
        "[pointer] registry busy; deferring removal of surface {}",
        listener.key()
    );
    wasm_bindgen_futures::spawn_local(async move {
        match registry.try_borrow_mut() {
            Ok(mut r) => r.dispose(&listener),
            Err(_) => log::error!("[pointer] surface {} listener leaked", listener.key()),
        }
    });
}

impl Drop for Ballpit {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Read a plain JavaScript options object into a validated config.
pub fn parse_config(value: &JsValue) -> anyhow::Result<BallpitConfig> {
    if value.is_undefined() || value.is_null() {
        return Ok(BallpitConfig::default());
    }
    let json = js_sys::JSON::stringify(value)
        .map_err(|e| anyhow!("options are not serializable: {:?}", e))?;
    let json: String = json.into();
    let config: BallpitConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}

pub async fn mount(
    canvas: web::HtmlCanvasElement,
    config: BallpitConfig,
    registry: SharedRegistry,
    surface: u32,
) -> anyhow::Result<Ballpit> {
    if registry.borrow().contains(&surface) {
        anyhow::bail!("canvas is already mounted");
    }
    let (w, h) = dom::css_size(&canvas, &config.viewport.size);
    let ratio = clamp_pixel_ratio(
        dom::device_pixel_ratio() as f32,
        config.viewport.min_pixel_ratio,
        config.viewport.max_pixel_ratio,
    );
    let gpu = GpuContext::new(
        &canvas,
        (w as f32 * ratio).round() as u32,
        (h as f32 * ratio).round() as u32,
    )
    .await?;

    let system = SphereSystem::new(config.simulation.clone())?;
    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let renderer = SphereRenderer::new(&gpu, &system);
    if let Some(err) = gpu.device.pop_error_scope().await {
        anyhow::bail!("GPU resource creation failed: {}", err);
    }

    let intent = Rc::new(Cell::new(None));
    let scene = SphereScene {
        system,
        renderer,
        intent: intent.clone(),
        paused: false,
    };
    let viewport = Viewport::mount(canvas.clone(), config.viewport, gpu, scene);

    let on_move = intent.clone();
    let on_leave = intent;
    let callbacks = PointerCallbacks::new()
        .on_move(move |s| on_move.set(Some(PointerIntent::Move(s.n_position))))
        .on_leave(move |_| on_leave.set(Some(PointerIntent::Leave)));
    let registered = registry
        .borrow_mut()
        .register(surface, Box::new(CanvasBounds(canvas)), callbacks);
    let Some(listener) = registered else {
        // Lost a race with a concurrent mount of the same canvas
        viewport.borrow_mut().dispose();
        return Err(anyhow!("canvas is already mounted"));
    };
    log::info!("[ballpit] mounted surface {}", surface);

    Ok(Ballpit {
        mounted: Some(Mounted {
            viewport,
            registry,
            listener,
        }),
        disposed: false,
    })
}
