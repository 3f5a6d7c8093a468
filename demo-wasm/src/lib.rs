use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use letterfall::{
    CursorFollower, EntityId, FollowMode, FollowerConfig, HoverSlot, HoverTarget, NavItem, PhysicsScene,
    Renderer, SceneConfig, Vec2, Viewport, Visual,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, MouseEvent};

fn viewport_of(element: &Element) -> Viewport<f32> {
    let rect = element.get_bounding_client_rect();
    Viewport::new(rect.width() as f32, rect.height() as f32)
}

/// Pointer position relative to `element`'s top-left corner.
fn local_point(element: &Element, event: &MouseEvent) -> Vec2<f32> {
    let rect = element.get_bounding_client_rect();
    Vec2::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    )
}

fn center_of(element: &Element) -> Vec2<f32> {
    let rect = element.get_bounding_client_rect();
    Vec2::new(
        (rect.left() + rect.width() * 0.5) as f32,
        (rect.top() + rect.height() * 0.5) as f32,
    )
}

fn create_html(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

fn warn(message: &str, error: impl core::fmt::Display) {
    web_sys::console::warn_1(&JsValue::from_str(&format!("{message}: {error}")));
}

// ---- DOM renderer ----

/// Writes each visual's pose into an absolutely positioned element's
/// `transform`. Ball elements are created on first draw.
struct DomRenderer {
    document: Document,
    container: HtmlElement,
    nodes: BTreeMap<EntityId, HtmlElement>,
    ball_diameter: f32,
}

impl DomRenderer {
    fn node(&mut self, entity: EntityId) -> Option<&HtmlElement> {
        if let EntityId::Ball(_) = entity {
            if !self.nodes.contains_key(&entity) {
                let ball = create_html(&self.document, "div", "ball").ok()?;
                let size = format!("{}px", self.ball_diameter);
                let style = ball.style();
                let _ = style.set_property("width", &size);
                let _ = style.set_property("height", &size);
                self.container.append_child(&ball).ok()?;
                self.nodes.insert(entity, ball);
            }
        }
        self.nodes.get(&entity)
    }
}

impl Renderer<f32> for DomRenderer {
    fn draw(&mut self, visual: &Visual<f32>) {
        let Some(node) = self.node(visual.entity) else { return };
        let transform = format!(
            "translate({}px, {}px) translate(-50%, -50%) rotate({}rad) scale({})",
            visual.pos.x, visual.pos.y, visual.angle, visual.scale
        );
        let _ = node.style().set_property("transform", &transform);
        let _ = node.class_list().toggle_with_force("returning", visual.returning);
    }

    fn detach(&mut self) {
        for (entity, node) in std::mem::take(&mut self.nodes) {
            if let EntityId::Ball(_) = entity {
                node.remove();
            } else {
                let _ = node.style().remove_property("transform");
            }
        }
    }
}

// ---- Navigation scene ----

struct SceneView {
    container: HtmlElement,
    scene: RefCell<PhysicsScene<f32>>,
    mounted: Rc<Cell<bool>>,
    alive: Cell<bool>,
    letters: RefCell<Vec<HtmlElement>>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
    timeouts: RefCell<Vec<Timeout>>,
    navigate: RefCell<Option<js_sys::Function>>,
}

impl SceneView {
    /// Runs the frame loop. While the mount is still pending (the container
    /// had no size yet) each tick polls the container instead, so a size
    /// that arrives through CSS or layout completes the mount.
    fn schedule(self: &Rc<Self>) {
        if self.frame.borrow().is_some() || !self.alive.get() {
            return;
        }
        let view = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| {
            view.frame.borrow_mut().take();
            if !view.alive.get() {
                return;
            }
            if view.mounted.get() {
                view.scene.borrow_mut().frame(timestamp);
            } else if !view.retry_mount() {
                return;
            }
            view.schedule();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    /// Returns false once there is nothing left to wait for.
    fn retry_mount(&self) -> bool {
        let mut scene = self.scene.borrow_mut();
        if !scene.is_pending() {
            return false;
        }
        match scene.poll_mount(viewport_of(&self.container)) {
            Ok(_) => true,
            Err(e) => {
                warn("deferred mount failed", e);
                false
            }
        }
    }

    fn install_listeners(self: &Rc<Self>, letters: &[(u16, HtmlElement)]) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
        let mut listeners = Vec::new();

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&window, "mousemove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
            let pos = local_point(&view.container, event);
            if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                handle.on_pointer_move(pos);
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&self.container, "mousedown", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
            let pos = local_point(&view.container, event);
            if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                handle.on_pointer_down(pos);
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&window, "mouseup", move |_event: &Event| {
            if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                handle.on_pointer_up();
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&window, "wheel", move |event: &Event| {
            if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                handle.on_wheel(event.time_stamp());
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&window, "touchmove", move |event: &Event| {
            if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                handle.on_touch_move(event.time_stamp());
            }
        }));

        let view = Rc::clone(self);
        listeners.push(EventListener::new(&window, "resize", move |_event: &Event| {
            let viewport = viewport_of(&view.container);
            if let Err(e) = view.scene.borrow_mut().resize(viewport) {
                warn("resize failed", e);
            }
            view.schedule();
        }));

        for (index, element) in letters {
            let view = Rc::clone(self);
            let index = *index;
            listeners.push(EventListener::new(element, "mouseenter", move |_event: &Event| {
                if let Some(handle) = view.scene.borrow_mut().handle_mut() {
                    handle.on_pointer_enter(HoverTarget::Letter(index));
                }
            }));
        }

        *self.listeners.borrow_mut() = listeners;
        Ok(())
    }

    fn teardown(&self) {
        self.alive.set(false);
        self.scene.borrow_mut().unmount();
        for letter in self.letters.borrow_mut().drain(..) {
            letter.remove();
        }
        self.frame.borrow_mut().take();
        self.listeners.borrow_mut().clear();
        self.timeouts.borrow_mut().clear();
    }
}

/// The falling-letters scene bound to one container element.
#[wasm_bindgen]
pub struct NavScene {
    view: Rc<SceneView>,
    hover: HoverSlot<f32>,
}

#[wasm_bindgen]
impl NavScene {
    /// Builds one absolutely positioned span per letter of `name` inside
    /// `container`, mounts the physics scene and starts the frame loop.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, name: &str) -> Result<NavScene, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("document unavailable"))?;
        let config: SceneConfig<f32> = SceneConfig::new().with_letters(name);

        let mut letters = Vec::new();
        let mut nodes = BTreeMap::new();
        for (i, ch) in name.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let span = create_html(&document, "span", "letter")?;
            span.set_text_content(Some(&ch.to_string()));
            container.append_child(&span)?;
            nodes.insert(EntityId::Letter(i as u16), span.clone());
            letters.push((i as u16, span));
        }

        let viewport = viewport_of(&container);
        let balls = if viewport.is_mobile(config.mobile_breakpoint) {
            config.mobile_balls
        } else {
            config.desktop_balls
        };
        let renderer = DomRenderer {
            document,
            container: container.clone(),
            nodes,
            ball_diameter: balls.radius * 2.0,
        };

        let hover = HoverSlot::new();
        let mut scene = PhysicsScene::new(config, hover.clone());
        scene
            .mount(viewport, Some(Box::new(renderer)))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let view = Rc::new(SceneView {
            container,
            mounted: scene.mounted_flag(),
            alive: Cell::new(true),
            letters: RefCell::new(letters.iter().map(|(_, span)| span.clone()).collect()),
            scene: RefCell::new(scene),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            timeouts: RefCell::new(Vec::new()),
            navigate: RefCell::new(None),
        });
        view.install_listeners(&letters)?;
        view.schedule();
        Ok(NavScene { view, hover })
    }

    /// Router callback invoked with the path after a nav click.
    pub fn set_navigate(&self, callback: js_sys::Function) {
        *self.view.navigate.borrow_mut() = Some(callback);
    }

    /// Wires a nav link: hover magnetizes the cursor, click navigates after
    /// the exit delay.
    pub fn bind_nav(&self, element: HtmlElement, label: String, path: String) {
        let item = NavItem::new(&label, &path);
        let mut listeners = self.view.listeners.borrow_mut();

        let hover = self.hover.clone();
        let target = element.clone();
        listeners.push(EventListener::new(&element, "mouseenter", move |_event: &Event| {
            hover.set_hovered(true, Some(&label), Some(center_of(&target)));
        }));

        let hover = self.hover.clone();
        listeners.push(EventListener::new(&element, "mouseleave", move |_event: &Event| {
            hover.set_hovered(false, None, None);
        }));

        let view = Rc::clone(&self.view);
        let hover = self.hover.clone();
        listeners.push(EventListener::new(&element, "click", move |event: &Event| {
            event.prevent_default();
            let request = view.scene.borrow_mut().handle_mut().map(|h| h.on_nav_click(&item));
            let (path, delay) = match request {
                Some(request) => (request.path, request.delay_ms),
                None => {
                    hover.set_hovered(false, None, None);
                    (item.path.clone(), 0.0)
                }
            };
            let Some(callback) = view.navigate.borrow().clone() else { return };
            let timeout = Timeout::new(delay.max(0.0) as u32, move || {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&path)) {
                    web_sys::console::warn_1(&e);
                }
            });
            view.timeouts.borrow_mut().push(timeout);
        }));
    }

    /// A blob cursor that follows the pointer and snaps to this scene's nav links.
    pub fn cursor(&self, element: HtmlElement) -> Result<BlobCursor, JsValue> {
        BlobCursor::attach(element, &self.hover)
    }

    pub fn is_mounted(&self) -> bool {
        self.view.mounted.get()
    }

    /// Stops the frame loop, releases every body and listener and removes
    /// the letter spans built by the constructor.
    pub fn destroy(&self) {
        self.view.teardown();
    }
}

impl Drop for NavScene {
    fn drop(&mut self) {
        self.view.teardown();
    }
}

// ---- Blob cursor ----

struct CursorView {
    element: HtmlElement,
    follower: RefCell<CursorFollower<f32>>,
    alive: Cell<bool>,
    frame: RefCell<Option<AnimationFrame>>,
    listener: RefCell<Option<EventListener>>,
}

impl CursorView {
    fn schedule(self: &Rc<Self>) {
        if !self.alive.get() {
            return;
        }
        let view = Rc::clone(self);
        let handle = request_animation_frame(move |_| {
            view.frame.borrow_mut().take();
            if !view.alive.get() {
                return;
            }
            view.render();
            view.schedule();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn render(&self) {
        let state = self.follower.borrow_mut().update();
        let half = state.size * 0.5;
        let transform = format!(
            "translate({}px, {}px) scale({}, {})",
            state.position.x - half,
            state.position.y - half,
            state.stretch.x,
            state.stretch.y
        );
        let style = self.element.style();
        let size = format!("{}px", state.size);
        let _ = style.set_property("width", &size);
        let _ = style.set_property("height", &size);
        let _ = style.set_property("transform", &transform);
        let _ = self
            .element
            .class_list()
            .toggle_with_force("magnetized", state.mode == FollowMode::Magnetized);
    }

    fn teardown(&self) {
        self.alive.set(false);
        self.frame.borrow_mut().take();
        self.listener.borrow_mut().take();
        self.follower.borrow_mut().detach();
    }
}

#[wasm_bindgen]
pub struct BlobCursor {
    view: Rc<CursorView>,
}

impl BlobCursor {
    fn attach(element: HtmlElement, hover: &HoverSlot<f32>) -> Result<BlobCursor, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
        let start = Vec2::new(
            window.inner_width()?.as_f64().unwrap_or(0.0) as f32 * 0.5,
            window.inner_height()?.as_f64().unwrap_or(0.0) as f32 * 0.5,
        );
        let mut follower =
            CursorFollower::new(FollowerConfig::new(), start).map_err(|e| JsValue::from_str(&e.to_string()))?;
        follower.attach(hover);

        let view = Rc::new(CursorView {
            element,
            follower: RefCell::new(follower),
            alive: Cell::new(true),
            frame: RefCell::new(None),
            listener: RefCell::new(None),
        });

        let moved = Rc::clone(&view);
        let listener = EventListener::new(&window, "mousemove", move |event: &Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else { return };
            let pos = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            moved.follower.borrow_mut().on_pointer_move(pos);
        });
        *view.listener.borrow_mut() = Some(listener);
        view.schedule();
        Ok(BlobCursor { view })
    }
}

#[wasm_bindgen]
impl BlobCursor {
    pub fn destroy(&self) {
        self.view.teardown();
    }
}

impl Drop for BlobCursor {
    fn drop(&mut self) {
        self.view.teardown();
    }
}
