//! [`EffectSurface`] over the live browser document.

use std::time::Duration;

use gloo::timers::callback::Timeout;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use glint_core::Rect;
use glint_core::surface::{
    Callback, EffectSurface, ElementSpec, Keyframe, KeyframeAnimation, SurfaceError, TimingValue,
};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn set_js(obj: &Object, key: &str, value: &JsValue) -> Result<(), SurfaceError> {
    Reflect::set(obj, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

/// Convert a thrown JS value into a [`SurfaceError`].
pub(crate) fn js_error(value: JsValue) -> SurfaceError {
    let message = value
        .as_string()
        .or_else(|| {
            Reflect::get(&value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"));
    SurfaceError::Js(message)
}

fn keyframe_object(frame: &Keyframe) -> Result<Object, SurfaceError> {
    let obj = Object::new();
    set_js(&obj, "transform", &JsValue::from_str(&frame.transform))?;
    set_js(&obj, "opacity", &JsValue::from_f64(frame.opacity))?;
    Ok(obj)
}

/// The page's window and document.
#[derive(Debug, Clone)]
pub struct DomSurface {
    window: Window,
    document: Document,
}

impl DomSurface {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn root(&self) -> Result<HtmlElement, SurfaceError> {
        self.document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(SurfaceError::Unsupported("document element"))
    }
}

impl EffectSurface for DomSurface {
    type Node = HtmlElement;

    fn query(&self, selector: &str) -> Option<HtmlElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn query_all(&self, selector: &str) -> Vec<HtmlElement> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn append_element(
        &self,
        parent: &HtmlElement,
        spec: &ElementSpec,
    ) -> Result<HtmlElement, SurfaceError> {
        let el = self
            .document
            .create_element(spec.tag)
            .map_err(js_error)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SurfaceError::Unsupported("non-HTML element"))?;
        el.set_class_name(&spec.class);
        if let Some(text) = &spec.text {
            el.set_text_content(Some(text));
        }
        for (name, value) in &spec.attributes {
            el.set_attribute(name, value).map_err(js_error)?;
        }
        let style = el.style();
        for (property, value) in &spec.styles {
            style.set_property(property, value).map_err(js_error)?;
        }
        parent.append_child(&el).map_err(js_error)?;
        Ok(el)
    }

    fn remove(&self, node: &HtmlElement) {
        node.remove();
    }

    fn is_attached(&self, node: &HtmlElement) -> bool {
        node.is_connected()
    }

    fn set_style(&self, node: &HtmlElement, property: &str, value: &str) -> Result<(), SurfaceError> {
        node.style().set_property(property, value).map_err(js_error)
    }

    fn set_root_property(&self, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.root()?.style().set_property(name, value).map_err(js_error)
    }

    fn add_class(&self, node: &HtmlElement, class: &str) -> Result<(), SurfaceError> {
        node.class_list().add_1(class).map_err(js_error)
    }

    fn bounding_rect(&self, node: &HtmlElement) -> Rect {
        let r = node.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.width(), r.height())
    }

    fn is_statically_positioned(&self, node: &HtmlElement) -> bool {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("position").ok())
            .is_none_or(|position| position == "static")
    }

    fn force_layout(&self, node: &HtmlElement) {
        // Reading a layout property flushes pending style changes.
        std::hint::black_box(node.offset_height());
    }

    fn animate(
        &self,
        node: &HtmlElement,
        animation: &KeyframeAnimation,
        on_finish: Callback,
    ) -> Result<(), SurfaceError> {
        let keyframes = Array::new();
        keyframes.push(&keyframe_object(&animation.from)?.into());
        keyframes.push(&keyframe_object(&animation.to)?.into());

        let options = Object::new();
        for (key, value) in animation.timing_options() {
            let value = match value {
                TimingValue::Number(n) => JsValue::from_f64(n),
                TimingValue::Text(text) => JsValue::from_str(&text),
            };
            set_js(&options, key, &value)?;
        }

        let animate = Reflect::get(node, &"animate".into())
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| SurfaceError::Unsupported("Element.animate"))?;
        let handle = animate.call2(node, &keyframes, &options).map_err(js_error)?;
        let on_finish = Closure::once_into_js(on_finish);
        Reflect::set(&handle, &"onfinish".into(), &on_finish).map_err(js_error)?;
        Ok(())
    }

    fn schedule(&self, delay: Duration, task: Callback) -> Result<(), SurfaceError> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task).forget();
        Ok(())
    }

    fn prefers_reduced_motion(&self) -> bool {
        let Ok(match_media) = Reflect::get(&self.window, &"matchMedia".into()) else {
            return false;
        };
        let Ok(match_media) = match_media.dyn_into::<Function>() else {
            return false;
        };
        let Ok(query) = match_media.call1(&self.window, &REDUCED_MOTION_QUERY.into()) else {
            return false;
        };
        Reflect::get(&query, &"matches".into())
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }
}
