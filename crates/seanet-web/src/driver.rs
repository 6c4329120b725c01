#![forbid(unsafe_code)]

//! Browser driver: asset tasks, DOM listeners and the animation loop.
//!
//! Fetch tasks never touch the [`App`]. They drop their results into shared
//! slots which the frame callback drains, so every mutation of the session
//! happens inside a frame or an input event.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use seanet_core::assets::LoadBarrier;
use seanet_core::background::BackgroundUniforms;
use seanet_core::config::ContentMode;
use seanet_core::error::{AssetKind, SeaError};
use seanet_core::text::{markup_to_text, page_markup};
use seanet_core::{GlyphAtlas, SceneConfig, Session, TextBuffer};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, Window};
use web_time::Instant;

use crate::fetch::{fetch_bytes, fetch_text};
use crate::pointer::{clamp_client, page_to_canvas, synced_size};
use crate::renderer::{RendererError, WebGpuRenderer};

/// Decoded RGBA8 atlas image.
pub(crate) struct AtlasImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

type FontBarrier = LoadBarrier<AtlasImage, GlyphAtlas>;
type ContentSlot = Option<Result<TextBuffer, SeaError>>;

fn decode_atlas_image(bytes: &[u8]) -> Result<AtlasImage, RendererError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| RendererError::AtlasDecode(e.to_string()))?
        .to_rgba8();
    Ok(AtlasImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

async fn load_atlas_image(url: &str) -> Result<AtlasImage, SeaError> {
    let bytes = fetch_bytes(url, AssetKind::AtlasImage).await?;
    Ok(decode_atlas_image(&bytes)?)
}

async fn load_atlas_metrics(url: &str) -> Result<GlyphAtlas, SeaError> {
    let json = fetch_text(url, AssetKind::AtlasMetrics).await?;
    Ok(GlyphAtlas::load(&json)?)
}

async fn load_content(url: &str, mode: ContentMode) -> Result<TextBuffer, SeaError> {
    let json = fetch_text(url, AssetKind::PageContent).await?;
    let markup = page_markup(&json)?;
    Ok(TextBuffer::from_plain_with(&markup_to_text(&markup), mode))
}

fn client_size(canvas: &HtmlCanvasElement) -> (i32, i32) {
    (canvas.client_width(), canvas.client_height())
}

/// Offsets of the canvas and each ancestor that still has an offset parent.
fn offset_chain(canvas: &HtmlCanvasElement) -> Vec<Vec2> {
    let mut offsets = Vec::new();
    let mut node: Option<HtmlElement> = Some(canvas.clone().unchecked_into());
    while let Some(el) = node {
        let Some(parent) = el.offset_parent() else {
            break;
        };
        offsets.push(Vec2::new(el.offset_left() as f32, el.offset_top() as f32));
        node = parent.dyn_into::<HtmlElement>().ok();
    }
    offsets
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub(crate) struct App {
    canvas: HtmlCanvasElement,
    session: Session,
    renderer: WebGpuRenderer,
    fonts: Rc<RefCell<FontBarrier>>,
    content: Rc<RefCell<ContentSlot>>,
    start: Instant,
    font_failure_reported: bool,
}

impl App {
    pub(crate) async fn new(canvas: HtmlCanvasElement, config: SceneConfig) -> Result<Self, SeaError> {
        let session = Session::new(config)?;
        let (width, height) = clamp_client(client_size(&canvas));
        canvas.set_width(width);
        canvas.set_height(height);
        let renderer = WebGpuRenderer::init(canvas.clone(), width, height).await?;

        let mut app = Self {
            canvas,
            session,
            renderer,
            fonts: Rc::new(RefCell::new(FontBarrier::new())),
            content: Rc::new(RefCell::new(None)),
            start: Instant::now(),
            font_failure_reported: false,
        };
        app.session.resize(width, height);
        Ok(app)
    }

    /// Kick off the atlas and content fetches.
    pub(crate) fn start_loading(&mut self) {
        let assets = &self.session.config().assets;
        let (image_url, metrics_url) = (assets.atlas_image_url(), assets.atlas_metrics_url());
        tracing::debug!(%image_url, %metrics_url, "fetching font atlas");

        let fonts = Rc::clone(&self.fonts);
        wasm_bindgen_futures::spawn_local(async move {
            match load_atlas_image(&image_url).await {
                Ok(image) => fonts.borrow_mut().provide_image(image),
                Err(err) => {
                    tracing::error!(error = %err, "atlas image unavailable");
                    fonts.borrow_mut().fail(AssetKind::AtlasImage, err.to_string());
                }
            }
        });

        let fonts = Rc::clone(&self.fonts);
        wasm_bindgen_futures::spawn_local(async move {
            match load_atlas_metrics(&metrics_url).await {
                Ok(atlas) => fonts.borrow_mut().provide_metrics(atlas),
                Err(err) => {
                    tracing::error!(error = %err, "atlas metrics unavailable");
                    fonts.borrow_mut().fail(AssetKind::AtlasMetrics, err.to_string());
                }
            }
        });

        self.reload_content();
    }

    /// Fetch the page content again; the current text stays up meanwhile.
    pub(crate) fn reload_content(&mut self) {
        self.session.begin_loading();
        let assets = &self.session.config().assets;
        let (url, mode) = (assets.content_url.clone(), assets.content_mode);
        let slot = Rc::clone(&self.content);
        wasm_bindgen_futures::spawn_local(async move {
            let result = load_content(&url, mode).await;
            *slot.borrow_mut() = Some(result);
        });
    }

    pub(crate) fn pointer_moved(&mut self, event: &MouseEvent) {
        let page = Vec2::new(event.page_x() as f32, event.page_y() as f32);
        let local = page_to_canvas(page, offset_chain(&self.canvas));
        self.session.pointer_moved(local.x, local.y);
    }

    fn sync_size(&mut self) {
        let backing = (self.canvas.width(), self.canvas.height());
        if let Some((width, height)) = synced_size(backing, client_size(&self.canvas)) {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.renderer.resize(width, height);
            self.session.resize(width, height);
        }
    }

    fn poll_assets(&mut self) {
        let ready = self.fonts.borrow_mut().take_ready();
        if let Some((image, atlas)) = ready {
            self.renderer.upload_atlas(image.width, image.height, &image.rgba);
            self.session.set_atlas(Arc::new(atlas));
        } else if !self.font_failure_reported {
            if let Some((asset, reason)) = self.fonts.borrow().failure() {
                tracing::warn!(%asset, reason, "fonts will not load");
                self.font_failure_reported = true;
            }
        }

        let content = self.content.borrow_mut().take();
        match content {
            Some(Ok(text)) => self.session.content_loaded(text),
            Some(Err(err)) => self.session.content_failed(&err),
            None => {}
        }
    }

    /// One animation frame.
    pub(crate) fn frame(&mut self) {
        self.sync_size();
        self.poll_assets();
        self.session.tick(self.start.elapsed().as_secs_f32());

        let config = self.session.config();
        let background = config.background.enabled.then(|| {
            BackgroundUniforms::new(
                self.session.background_input(),
                config.background.mouse_radius,
                self.session.grid().viewport(),
            )
        });
        let instances = self.session.glyph_instances();
        if let Err(err) = self.renderer.render_frame(background.as_ref(), instances) {
            tracing::warn!(error = %err, "frame skipped");
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Owns the [`App`] plus the JS callbacks that feed it.
pub(crate) struct Driver {
    app: Rc<RefCell<App>>,
    running: Rc<Cell<bool>>,
    mousemove: Option<Closure<dyn FnMut(MouseEvent)>>,
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut()>) {
    if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        tracing::error!(error = ?err, "requestAnimationFrame failed");
    }
}

impl Driver {
    pub(crate) fn new(app: App) -> Self {
        Self {
            app: Rc::new(RefCell::new(app)),
            running: Rc::new(Cell::new(false)),
            mousemove: None,
        }
    }

    /// Attach listeners, start the fetches and the animation loop.
    pub(crate) fn start(&mut self) -> Result<(), SeaError> {
        let window = web_sys::window()
            .ok_or_else(|| SeaError::RenderContextUnavailable("no window".into()))?;

        let app = Rc::clone(&self.app);
        let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.pointer_moved(&event);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        window
            .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
            .map_err(|e| SeaError::RenderContextUnavailable(format!("{e:?}")))?;
        self.mousemove = Some(on_move);

        self.app.borrow_mut().start_loading();

        // The closure re-requests itself, so it has to live in a shared slot.
        let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let g = Rc::clone(&f);
        let app = Rc::clone(&self.app);
        let running = Rc::clone(&self.running);
        let loop_window = window.clone();
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !running.get() {
                let _ = f.borrow_mut().take();
                return;
            }
            if let Ok(mut app) = app.try_borrow_mut() {
                app.frame();
            }
            if let Some(callback) = f.borrow().as_ref() {
                request_frame(&loop_window, callback);
            }
        }) as Box<dyn FnMut()>));

        self.running.set(true);
        if let Some(callback) = g.borrow().as_ref() {
            request_frame(&window, callback);
        }
        tracing::info!("animation loop started");
        Ok(())
    }

    pub(crate) fn reload(&self) {
        if let Ok(mut app) = self.app.try_borrow_mut() {
            app.reload_content();
        }
    }

    /// Stop the loop and detach listeners.
    pub(crate) fn stop(&mut self) {
        self.running.set(false);
        if let (Some(window), Some(on_move)) = (web_sys::window(), self.mousemove.take()) {
            let _ = window
                .remove_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}
