use crate::browser;
use anyhow::{anyhow, Context, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use futures::future::try_join_all;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - because we control the closure creation and specify the expected type,
    // in principle this should be generally safe (unsafe) code
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use self::input::InputEvent;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `dt` is the real time since the previous frame, in seconds
    fn update(&mut self, dt: f64, input: &[InputEvent]);
    fn draw(&self, renderer: &Renderer);
}

// A backgrounded tab stops animation frames; on return the first delta
// would be huge, so clamp it
const MAX_FRAME_SECONDS: f64 = 0.25;

/// Seconds between two `performance.now()` stamps
pub fn frame_delta(last_frame: f64, now: f64) -> f64 {
    ((now - last_frame) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS)
}

pub struct GameLoop {
    last_frame: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    /// ┌────────────── One Frame ──────────────┐
    /// │  drain input  →  update(dt)  →  draw  │
    /// └───────────────────────────────────────┘
    /// Draw always sees the state the update just produced.
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut game = game.initialize().await?;
        let mut input = input::prepare_input()?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
        };
        let renderer = Renderer::new(browser::context()?);
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            let dt = frame_delta(game_loop.last_frame, perf);
            game_loop.last_frame = perf;
            let events = input::drain(&mut input);
            game.update(dt, &events);
            game.draw(&renderer);
            if let Some(next_frame) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next_frame) {
                    log::error!("GameLoop: could not request next frame : {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        log::info!("game loop started");
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(self, by: Point) -> Point {
        Point {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Axis aligned overlap. Strict on both axes, so boxes that only share
    /// an edge do not collide.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right() > other.x()
            && self.x() < other.right()
            && self.bottom() > other.y()
            && self.y() < other.bottom()
    }
}

pub struct TextStyle {
    pub font: &'static str,
    pub color: &'static str,
    pub align: &'static str,
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }

    pub fn clear(&self, rect: &Rect) {
        self.context
            .clear_rect(rect.x(), rect.y(), rect.size.width, rect.size.height);
    }

    /// Whole image, natural size, top left corner at `position`
    pub fn draw_entire_image(&self, image: &HtmlImageElement, position: &Point) {
        if let Err(err) =
            self.context
                .draw_image_with_html_image_element(image, position.x, position.y)
        {
            log::error!("Renderer: could not draw {} : {:#?}", image.src(), err);
        }
    }

    pub fn set_text_style(&self, style: &TextStyle) {
        self.context.set_font(style.font);
        self.context.set_fill_style_str(style.color);
        self.context.set_text_align(style.align);
    }

    pub fn draw_text(&self, text: &str, position: &Point) {
        if let Err(err) = self.context.fill_text(text, position.x, position.y) {
            log::error!("Renderer: could not draw text '{}' : {:#?}", text, err);
        }
    }
}

/// Images keyed by the url they were fetched from.
/// Awaiting `load` is the "on ready" signal: every image is decoded, or the
/// first failure is returned.
pub struct ResourceCache {
    images: HashMap<String, HtmlImageElement>,
}

impl ResourceCache {
    pub async fn load(urls: &[&str]) -> Result<Self> {
        // all images in flight at once, total time is the slowest image
        let images = try_join_all(urls.iter().map(|url| async move {
            load_image(url)
                .await
                .with_context(|| format!("Failed to load image resource from : {}", url))
                .map(|image| (url.to_string(), image))
        }))
        .await?;

        log::info!("loaded {} images", images.len());
        Ok(ResourceCache {
            images: images.into_iter().collect(),
        })
    }

    pub fn get(&self, url: &str) -> Option<&HtmlImageElement> {
        let image = self.images.get(url);
        if image.is_none() {
            log::warn!("ResourceCache: {} was never loaded", url);
        }
        image
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields channel result : Result<(), Error>
    // - second ? yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}

/// Browser callbacks never touch game state. They push into a channel that
/// the loop drains once per frame, before `update`.
pub mod input {
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use wasm_bindgen::JsCast;
    use web_sys::{KeyboardEvent, MouseEvent};

    #[derive(Debug, Clone, PartialEq)]
    pub enum InputEvent {
        /// `KeyboardEvent.code` of a released key, e.g. "ArrowUp"
        KeyUp(String),
        /// Click in canvas relative pixels
        Click { x: f64, y: f64 },
    }

    pub type InputReceiver = UnboundedReceiver<InputEvent>;

    pub fn prepare_input() -> Result<InputReceiver> {
        let (sender, receiver) = unbounded();
        let canvas = browser::canvas()?;

        let key_sender = sender.clone();
        let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            let _ = key_sender.unbounded_send(InputEvent::KeyUp(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let bounds = canvas.clone();
        let onclick = browser::closure_wrap(Box::new(move |event: MouseEvent| {
            let rect = bounds.get_bounding_client_rect();
            let _ = sender.unbounded_send(InputEvent::Click {
                x: f64::from(event.client_x()) - rect.left(),
                y: f64::from(event.client_y()) - rect.top(),
            });
        }) as Box<dyn FnMut(MouseEvent)>);

        browser::document()?.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        canvas.set_onclick(Some(onclick.as_ref().unchecked_ref()));

        // listeners live as long as the page
        onkeyup.forget();
        onclick.forget();

        Ok(receiver)
    }

    pub fn drain(receiver: &mut InputReceiver) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
