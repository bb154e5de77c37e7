//! Camera, surface sizing and the visibility-gated render loop.
//!
//! `Viewport` knows nothing about spheres. It drives any [`Scene`] through
//! resize and frame hooks and tears down every listener, observer, timer and
//! GPU resource it created when disposed.

use crate::constants::{CAMERA_TARGET, RESIZE_DEBOUNCE_MS};
use crate::dom;
use crate::render::GpuContext;
use ballpit_core::{
    Camera, FrameClock, InstantSource, LoopScheduler, LoopTransition, SizingMode, Teardown,
    TimeSample, ViewportConfig, ViewportState,
};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// What a viewport renders.
pub trait Scene {
    fn after_resize(&mut self, state: &ViewportState);
    fn before_render(&mut self, gpu: &GpuContext, camera: &Camera, time: TimeSample);
    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>);
    fn after_render(&mut self, _time: TimeSample) {}
    /// Free every GPU resource reachable from the scene.
    fn release(&mut self);
}

pub struct Viewport<S: Scene> {
    canvas: web::HtmlCanvasElement,
    options: ViewportConfig,
    camera: Camera,
    state: ViewportState,
    gpu: GpuContext,
    scene: S,
    clock: FrameClock<InstantSource>,
    scheduler: LoopScheduler,
    teardown: Teardown,
    frame_cb: Option<Closure<dyn FnMut()>>,
    resize_cb: Option<Closure<dyn FnMut()>>,
    raf_id: Option<i32>,
    resize_timer: Option<i32>,
    disposed: bool,
}

impl<S: Scene + 'static> Viewport<S> {
    pub fn mount(
        canvas: web::HtmlCanvasElement,
        options: ViewportConfig,
        gpu: GpuContext,
        scene: S,
    ) -> Rc<RefCell<Self>> {
        let mut camera = Camera::new(options.fov, Vec3::new(0.0, 0.0, options.camera_z));
        camera.target = Vec3::from_array(CAMERA_TARGET);
        let viewport = Rc::new(RefCell::new(Self {
            canvas,
            options,
            camera,
            state: ViewportState::default(),
            gpu,
            scene,
            clock: FrameClock::new(InstantSource::new()),
            scheduler: LoopScheduler::new(),
            teardown: Teardown::new(),
            frame_cb: None,
            resize_cb: None,
            raf_id: None,
            resize_timer: None,
            disposed: false,
        }));
        {
            let mut v = viewport.borrow_mut();
            v.wire(Rc::downgrade(&viewport));
            v.resize();
            let t = v.scheduler.set_page_hidden(dom::page_hidden());
            v.apply(t);
        }
        log::info!("[viewport] mounted");
        viewport
    }

    /// Run `f` with the scene and the GPU context it renders with.
    pub fn with_scene<R>(&mut self, f: impl FnOnce(&mut S, &GpuContext) -> R) -> R {
        f(&mut self.scene, &self.gpu)
    }

    fn wire(&mut self, weak: Weak<RefCell<Self>>) {
        let w = weak.clone();
        self.frame_cb = Some(Closure::wrap(Box::new(move || {
            if let Some(vp) = w.upgrade() {
                vp.borrow_mut().frame();
            }
        }) as Box<dyn FnMut()>));

        let w = weak.clone();
        self.resize_cb = Some(Closure::wrap(Box::new(move || {
            if let Some(vp) = w.upgrade() {
                let mut vp = vp.borrow_mut();
                vp.resize_timer = None;
                vp.resize();
            }
        }) as Box<dyn FnMut()>));

        self.wire_window_resize(weak.clone());
        if matches!(self.options.size, SizingMode::Parent) {
            self.wire_parent_observer(weak.clone());
        }
        self.wire_intersection(weak.clone());
        self.wire_visibility(weak);
    }

    fn wire_window_resize(&mut self, weak: Weak<RefCell<Self>>) {
        let Some(window) = web::window() else {
            return;
        };
        let closure = Closure::wrap(Box::new(move || {
            if let Some(vp) = weak.upgrade() {
                vp.borrow_mut().schedule_resize();
            }
        }) as Box<dyn FnMut()>);
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        self.teardown.push(move || {
            _ = window
                .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        });
    }

    fn wire_parent_observer(&mut self, weak: Weak<RefCell<Self>>) {
        let Some(parent) = dom::parent_element(&self.canvas) else {
            return;
        };
        let closure = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            if let Some(vp) = weak.upgrade() {
                vp.borrow_mut().schedule_resize();
            }
        }) as Box<dyn FnMut(js_sys::Array)>);
        match web::ResizeObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&parent);
                self.teardown.push(move || {
                    observer.disconnect();
                    drop(closure);
                });
            }
            Err(e) => log::warn!("[viewport] ResizeObserver unavailable: {:?}", e),
        }
    }

    fn wire_intersection(&mut self, weak: Weak<RefCell<Self>>) {
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let visible = entries
                .iter()
                .filter_map(|e| e.dyn_into::<web::IntersectionObserverEntry>().ok())
                .last()
                .map(|e| e.is_intersecting());
            if let (Some(visible), Some(vp)) = (visible, weak.upgrade()) {
                let mut vp = vp.borrow_mut();
                let t = vp.scheduler.set_intersecting(visible);
                vp.apply(t);
            }
        }) as Box<dyn FnMut(js_sys::Array)>);
        match web::IntersectionObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.canvas);
                self.teardown.push(move || {
                    observer.disconnect();
                    drop(closure);
                });
            }
            Err(e) => log::warn!("[viewport] IntersectionObserver unavailable: {:?}", e),
        }
    }

    fn wire_visibility(&mut self, weak: Weak<RefCell<Self>>) {
        let Some(document) = dom::window_document() else {
            return;
        };
        let closure = Closure::wrap(Box::new(move || {
            if let Some(vp) = weak.upgrade() {
                let mut vp = vp.borrow_mut();
                let t = vp.scheduler.set_page_hidden(dom::page_hidden());
                vp.apply(t);
            }
        }) as Box<dyn FnMut()>);
        _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        self.teardown.push(move || {
            _ = document.remove_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
        });
    }

    fn apply(&mut self, transition: Option<LoopTransition>) {
        match transition {
            Some(LoopTransition::Start) => {
                self.clock.resume();
                self.request_frame();
                log::debug!("[viewport] loop started");
            }
            Some(LoopTransition::Stop) => {
                self.clock.pause();
                self.cancel_frame();
                log::debug!("[viewport] loop stopped");
            }
            None => {}
        }
    }

    fn request_frame(&mut self) {
        if self.raf_id.is_some() {
            return;
        }
        if let (Some(window), Some(cb)) = (web::window(), self.frame_cb.as_ref()) {
            self.raf_id = window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .ok();
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(window) = web::window() {
                _ = window.cancel_animation_frame(id);
            }
        }
    }

    fn schedule_resize(&mut self) {
        if self.disposed {
            return;
        }
        let Some(window) = web::window() else {
            return;
        };
        if let Some(id) = self.resize_timer.take() {
            window.clear_timeout_with_handle(id);
        }
        if let Some(cb) = self.resize_cb.as_ref() {
            self.resize_timer = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    cb.as_ref().unchecked_ref(),
                    RESIZE_DEBOUNCE_MS,
                )
                .ok();
        }
    }

    /// Re-measure the canvas, reframe the camera and notify the scene.
    pub fn resize(&mut self) {
        if self.disposed {
            return;
        }
        let (w, h) = dom::css_size(&self.canvas, &self.options.size);
        self.state = ViewportState::measure(
            &mut self.camera,
            w as f32,
            h as f32,
            dom::device_pixel_ratio() as f32,
            &self.options,
        );
        let physical = self.state.physical_size();
        dom::apply_canvas_size(&self.canvas, (self.state.width, self.state.height), physical);
        self.gpu.resize(physical.0, physical.1);
        self.scene.after_resize(&self.state);
        log::debug!(
            "[viewport] resize css={}x{} px={}x{} world={:.2}x{:.2} fov={:.1}",
            self.state.width,
            self.state.height,
            physical.0,
            physical.1,
            self.state.world_width,
            self.state.world_height,
            self.camera.fov
        );
    }

    fn frame(&mut self) {
        self.raf_id = None;
        if self.disposed || !self.scheduler.animating() {
            return;
        }
        let time = self.clock.tick();
        self.scene.before_render(&self.gpu, &self.camera, time);
        let scene = &self.scene;
        match self.gpu.frame(|rpass| scene.draw(rpass)) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[viewport] surface lost; reconfiguring");
                self.gpu.reconfigure();
            }
            Err(e) => log::warn!("[viewport] frame skipped: {:?}", e),
        }
        self.scene.after_render(time);
        self.request_frame();
    }

    /// Stop the loop and release everything. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let t = self.scheduler.dispose();
        self.apply(t);
        self.disposed = true;
        self.cancel_frame();
        if let (Some(id), Some(window)) = (self.resize_timer.take(), web::window()) {
            window.clear_timeout_with_handle(id);
        }
        let removed = self.teardown.run();
        self.scene.release();
        self.gpu.release();
        log::info!("[viewport] disposed; {} listeners/observers removed", removed);
    }
}
