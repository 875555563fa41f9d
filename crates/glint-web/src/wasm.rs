//! `wasm-bindgen` exports: mount the page and wire browser signals into it.
//!
//! Host-driven like the core expects: the browser delivers events, frames and
//! intersection reports; each one is forwarded to the shared [`Page`].

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{AnimationFrame, request_animation_frame};
use js_sys::{Array, Reflect};
use tracing::{debug, error, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    ErrorEvent, Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent,
};

use glint_core::{Binding, Page, PageConfig, PageEvent, Point, Signal};

use crate::console::ConsoleLayer;
use crate::dom::DomSurface;

fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let global = js_sys::global();
            if let Ok(console) = Reflect::get(&global, &"console".into()) {
                if let Ok(error) = Reflect::get(&console, &"error".into()) {
                    if let Ok(f) = error.dyn_into::<js_sys::Function>() {
                        let _ = f.call1(&console, &JsValue::from_str(&format!("{info}")));
                    }
                }
            }
        }));
    });
}

fn install_logging() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let level = if cfg!(debug_assertions) {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let subscriber = tracing_subscriber::registry()
            .with(level)
            .with(ConsoleLayer::browser());
        // Another subscriber may already be installed by the embedding page.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

type VisibilityCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Everything kept alive while the page is mounted.
struct Host {
    page: RefCell<Page<DomSurface>>,
    listeners: RefCell<Vec<EventListener>>,
    frame: RefCell<Option<AnimationFrame>>,
    observer: RefCell<Option<(IntersectionObserver, VisibilityCallback)>>,
}

thread_local! {
    static MOUNTED: RefCell<Option<Rc<Host>>> = const { RefCell::new(None) };
}

/// Mount with the stock configuration.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    mount_page(PageConfig::default())
}

/// Mount with a (partial) JSON configuration.
#[wasm_bindgen(js_name = mountWithConfig)]
pub fn mount_with_config(json: &str) -> Result<(), JsValue> {
    let config = crate::load_config(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    mount_page(config)
}

/// Tear down and detach every listener.
#[wasm_bindgen]
pub fn unmount() {
    let Some(host) = MOUNTED.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    host.teardown();
    host.listeners.borrow_mut().clear();
}

fn mount_page(config: PageConfig) -> Result<(), JsValue> {
    install_panic_hook();
    install_logging();
    if MOUNTED.with(|slot| slot.borrow().is_some()) {
        return Err(JsValue::from_str("glint is already mounted"));
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let surface = DomSurface::new(window.clone(), document.clone());
    let page = Page::new(surface, config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let host = Rc::new(Host {
        page: RefCell::new(page),
        listeners: RefCell::new(Vec::new()),
        frame: RefCell::new(None),
        observer: RefCell::new(None),
    });

    host.install_window_listeners();
    if document.ready_state() == "loading" {
        let ready = Rc::clone(&host);
        let listener = EventListener::once(&document, "DOMContentLoaded", move |_event: &Event| {
            ready.start();
        });
        host.listeners.borrow_mut().push(listener);
    } else {
        host.start();
    }

    MOUNTED.with(|slot| *slot.borrow_mut() = Some(host));
    Ok(())
}

impl Host {
    fn start(self: &Rc<Self>) {
        let plan = match self.page.try_borrow_mut() {
            Ok(mut page) => page.on_ready(),
            Err(_) => {
                warn!(target: "glint::page", "page busy at startup");
                return;
            }
        };
        for binding in plan.bindings {
            self.bind(binding);
        }
        if plan.keyboard {
            self.bind_keyboard();
        }
        if plan.float_loop {
            self.request_float_frame();
        }
        if !plan.observe.is_empty() {
            self.observe(plan.observe);
        }
    }

    /// Forward `event` to the page; honor its request to cancel `dom_event`.
    fn dispatch(&self, event: PageEvent<HtmlElement>, dom_event: &Event) {
        let outcome = match self.page.try_borrow_mut() {
            Ok(mut page) => page.handle(event),
            Err(_) => {
                warn!(target: "glint::page", "page busy; event dropped");
                return;
            }
        };
        if outcome.prevent_default {
            dom_event.prevent_default();
        }
    }

    fn bind(self: &Rc<Self>, binding: Binding<HtmlElement>) {
        let host = Rc::clone(self);
        let Binding { node, signal } = binding;
        let target = node.clone();
        let listener = EventListener::new(&target, signal.event_type(), move |event: &Event| {
            let page_event = match signal {
                Signal::Click => {
                    let point = event
                        .dyn_ref::<MouseEvent>()
                        .map(|mouse| Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y())))
                        .unwrap_or_default();
                    PageEvent::Click {
                        target: node.clone(),
                        point,
                    }
                }
                Signal::PointerEnter => PageEvent::PointerEnter(node.clone()),
                Signal::PointerLeave => PageEvent::PointerLeave(node.clone()),
                Signal::Focus => PageEvent::Focus(node.clone()),
                Signal::Blur => PageEvent::Blur(node.clone()),
            };
            host.dispatch(page_event, event);
        });
        self.listeners.borrow_mut().push(listener);
    }

    fn bind_keyboard(self: &Rc<Self>) {
        let host = Rc::clone(self);
        let document = self.page.borrow().surface().document().clone();
        let active = document.clone();
        let listener = EventListener::new_with_options(
            &document,
            "keydown",
            EventListenerOptions {
                phase: EventListenerPhase::Bubble,
                passive: false,
            },
            move |event: &Event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let focused = active
                    .active_element()
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok());
                host.dispatch(
                    PageEvent::KeyDown {
                        key: key_event.key(),
                        focused,
                    },
                    event,
                );
            },
        );
        self.listeners.borrow_mut().push(listener);
    }

    fn request_float_frame(self: &Rc<Self>) {
        let host = Rc::clone(self);
        let handle = request_animation_frame(move |_timestamp| {
            host.frame.borrow_mut().take();
            let again = match host.page.try_borrow_mut() {
                Ok(mut page) => page.float_frame(),
                Err(_) => true,
            };
            if again {
                host.request_float_frame();
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn observe(self: &Rc<Self>, nodes: Vec<HtmlElement>) {
        let (threshold, root_margin) = {
            let page = self.page.borrow();
            let visibility = &page.config().visibility;
            (visibility.threshold, visibility.root_margin.clone())
        };
        let host = Rc::clone(self);
        let callback: VisibilityCallback = Closure::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let Ok(target) = entry.target().dyn_into::<HtmlElement>() else {
                    continue;
                };
                let marked = match host.page.try_borrow_mut() {
                    Ok(mut page) => page.on_visible(&target),
                    Err(_) => false,
                };
                if marked {
                    observer.unobserve(&target);
                }
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(&root_margin);
        let observer = match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => observer,
            Err(err) => {
                warn!(
                    target: "glint::page",
                    error = %crate::dom::js_error(err),
                    "visibility markers disabled"
                );
                return;
            }
        };
        for node in &nodes {
            observer.observe(node);
        }
        debug!(target: "glint::page", observed = nodes.len(), "visibility observer attached");
        *self.observer.borrow_mut() = Some((observer, callback));
    }

    fn install_window_listeners(self: &Rc<Self>) {
        let window = self.page.borrow().surface().window().clone();

        let host = Rc::clone(self);
        let on_error = EventListener::new(&window, "error", move |event: &Event| {
            let message = event
                .dyn_ref::<ErrorEvent>()
                .map(ErrorEvent::message)
                .unwrap_or_else(|| "unknown error".to_string());
            match host.page.try_borrow() {
                Ok(page) => page.report_uncaught(&message),
                Err(_) => error!(target: "glint::page", detail = %message, "uncaught page error"),
            }
        });

        // Unload can be cancelled or restored from the page cache, so only
        // leftover effects go; the page keeps running.
        let host = Rc::clone(self);
        let on_unload = EventListener::new(&window, "beforeunload", move |_event: &Event| {
            if let Ok(mut page) = host.page.try_borrow_mut() {
                page.sweep_effects();
            }
        });

        self.listeners.borrow_mut().extend([on_error, on_unload]);
    }

    /// Stop the float loop and observer and sweep leftover effects. The caller
    /// drops the listeners.
    fn teardown(&self) {
        self.frame.borrow_mut().take();
        if let Some((observer, _callback)) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        if let Ok(mut page) = self.page.try_borrow_mut() {
            page.teardown();
        }
    }
}
