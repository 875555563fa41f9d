#![forbid(unsafe_code)]

//! In-memory [`EffectSurface`] for tests.
//!
//! [`FakeSurface`] models just enough of a document for the page logic: a
//! flat element list with parent links, classes, inline styles (with full
//! write history), root custom properties, and a deterministic clock.
//! Animation completions and scheduled tasks are queued on that clock and run
//! in time order by [`FakeSurface::advance`].
//!
//! Selectors support comma-separated lists of `tag`, `.class`, `#id` and
//! `tag.class` compounds, which is all the page uses.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::geometry::Rect;
use crate::surface::{Callback, EffectSurface, ElementSpec, KeyframeAnimation, SurfaceError};

/// Handle to an element in a [`FakeSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNode(usize);

/// An animation started on the fake surface.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRecord {
    pub node: FakeNode,
    pub animation: KeyframeAnimation,
    pub started_at: Duration,
}

#[derive(Debug, Default)]
struct FakeElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    attached: bool,
    rect: Rect,
    base_position: &'static str,
    style_log: Vec<(String, String)>,
    layout_reads: usize,
}

impl FakeElement {
    fn style(&self, property: &str) -> Option<&str> {
        self.style_log
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .any(|simple| self.matches_compound(simple))
    }

    fn matches_compound(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.id.as_deref() == Some(id);
        }
        let mut parts = selector.split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && !tag.eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        parts.all(|class| self.classes.iter().any(|c| c == class))
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    task: Callback,
}

#[derive(Default)]
struct FakeDocument {
    elements: Vec<FakeElement>,
    body: Option<usize>,
    root_log: Vec<(String, String)>,
    now: Duration,
    seq: u64,
    timers: Vec<Timer>,
    animations: Vec<AnimationRecord>,
    removals: Vec<(FakeNode, Duration)>,
    reduced_motion: bool,
    failing_styles: Vec<String>,
    fail_animations: bool,
}

impl FakeDocument {
    fn element(&self, node: FakeNode) -> &FakeElement {
        &self.elements[node.0]
    }

    fn element_mut(&mut self, node: FakeNode) -> &mut FakeElement {
        &mut self.elements[node.0]
    }

    fn push(&mut self, parent: Option<usize>, tag: &str) -> FakeNode {
        let attached = parent.is_none_or(|p| self.elements[p].attached);
        self.elements.push(FakeElement {
            tag: tag.to_string(),
            parent,
            attached,
            base_position: "static",
            ..FakeElement::default()
        });
        FakeNode(self.elements.len() - 1)
    }

    fn queue(&mut self, delay: Duration, task: Callback) {
        self.seq += 1;
        self.timers.push(Timer {
            due: self.now + delay,
            seq: self.seq,
            task,
        });
    }

    /// Pop the earliest timer due at or before `limit`.
    fn next_due(&mut self, limit: Duration) -> Option<Timer> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(idx, _)| idx)?;
        Some(self.timers.swap_remove(idx))
    }

    fn detach(&mut self, idx: usize) {
        if !self.elements[idx].attached {
            return;
        }
        self.elements[idx].attached = false;
        let children: Vec<usize> = (0..self.elements.len())
            .filter(|&i| self.elements[i].parent == Some(idx))
            .collect();
        for child in children {
            self.detach(child);
        }
    }
}

/// Shared handle to an in-memory document.
#[derive(Clone)]
pub struct FakeSurface {
    doc: Rc<RefCell<FakeDocument>>,
}

impl std::fmt::Debug for FakeSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("FakeSurface")
            .field("elements", &doc.elements.len())
            .field("now", &doc.now)
            .field("pending", &doc.timers.len())
            .finish()
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSurface {
    /// A document with an empty `<body>`.
    pub fn new() -> Self {
        let surface = Self::without_body();
        {
            let mut doc = surface.doc.borrow_mut();
            let body = doc.push(None, "body");
            doc.body = Some(body.0);
        }
        surface
    }

    /// A document with no body at all.
    pub fn without_body() -> Self {
        Self {
            doc: Rc::new(RefCell::new(FakeDocument::default())),
        }
    }

    // -- building the host document -----------------------------------------

    /// Append `<tag class="...">` to `parent` (or the body).
    pub fn add_element(&self, parent: Option<FakeNode>, tag: &str, classes: &[&str]) -> FakeNode {
        let mut doc = self.doc.borrow_mut();
        let parent = parent.map(|p| p.0).or(doc.body);
        let node = doc.push(parent, tag);
        doc.element_mut(node).classes = classes.iter().map(|c| (*c).to_string()).collect();
        node
    }

    pub fn set_rect(&self, node: FakeNode, rect: Rect) {
        self.doc.borrow_mut().element_mut(node).rect = rect;
    }

    /// Set the stylesheet-computed `position` of `node`.
    pub fn set_computed_position(&self, node: FakeNode, position: &'static str) {
        self.doc.borrow_mut().element_mut(node).base_position = position;
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.doc.borrow_mut().reduced_motion = reduced;
    }

    /// Make every `set_style` of `property` fail.
    pub fn fail_style(&self, property: &str) {
        self.doc.borrow_mut().failing_styles.push(property.to_string());
    }

    /// Make `animate` fail.
    pub fn fail_animations(&self, fail: bool) {
        self.doc.borrow_mut().fail_animations = fail;
    }

    // -- clock ---------------------------------------------------------------

    pub fn now(&self) -> Duration {
        self.doc.borrow().now
    }

    /// Advance the clock by `dt`, running due completions and tasks in order.
    pub fn advance(&self, dt: Duration) {
        let target = self.doc.borrow().now + dt;
        loop {
            let next = self.doc.borrow_mut().next_due(target);
            let Some(timer) = next else {
                break;
            };
            self.doc.borrow_mut().now = timer.due;
            (timer.task)();
        }
        self.doc.borrow_mut().now = target;
    }

    /// Completions and tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.doc.borrow().timers.len()
    }

    // -- inspection ----------------------------------------------------------

    /// Latest inline value of `property` on `node`.
    pub fn style(&self, node: FakeNode, property: &str) -> Option<String> {
        self.doc.borrow().element(node).style(property).map(str::to_string)
    }

    /// Every value written to `property` on `node`, in order.
    pub fn style_history(&self, node: FakeNode, property: &str) -> Vec<String> {
        self.doc
            .borrow()
            .element(node)
            .style_log
            .iter()
            .filter(|(name, _)| name == property)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Latest value of a root property.
    pub fn root_property(&self, name: &str) -> Option<String> {
        self.root_history(name).pop()
    }

    /// Every value written to a root property, in order.
    pub fn root_history(&self, name: &str) -> Vec<String> {
        self.doc
            .borrow()
            .root_log
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn classes(&self, node: FakeNode) -> Vec<String> {
        self.doc.borrow().element(node).classes.clone()
    }

    pub fn text(&self, node: FakeNode) -> Option<String> {
        self.doc.borrow().element(node).text.clone()
    }

    pub fn attribute(&self, node: FakeNode, name: &str) -> Option<String> {
        self.doc
            .borrow()
            .element(node)
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    pub fn parent(&self, node: FakeNode) -> Option<FakeNode> {
        self.doc.borrow().element(node).parent.map(FakeNode)
    }

    /// Attached children of `node`.
    pub fn children(&self, node: FakeNode) -> Vec<FakeNode> {
        let doc = self.doc.borrow();
        (0..doc.elements.len())
            .filter(|&i| doc.elements[i].parent == Some(node.0) && doc.elements[i].attached)
            .map(FakeNode)
            .collect()
    }

    pub fn layout_reads(&self, node: FakeNode) -> usize {
        self.doc.borrow().element(node).layout_reads
    }

    /// Every animation started so far.
    pub fn animations(&self) -> Vec<AnimationRecord> {
        self.doc.borrow().animations.clone()
    }

    /// Nodes removed so far, with the clock time of removal.
    pub fn removals(&self) -> Vec<(FakeNode, Duration)> {
        self.doc.borrow().removals.clone()
    }
}

impl EffectSurface for FakeSurface {
    type Node = FakeNode;

    fn query(&self, selector: &str) -> Option<FakeNode> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<FakeNode> {
        let doc = self.doc.borrow();
        doc.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.attached && el.matches(selector))
            .map(|(idx, _)| FakeNode(idx))
            .collect()
    }

    fn body(&self) -> Option<FakeNode> {
        self.doc.borrow().body.map(FakeNode)
    }

    fn append_element(
        &self,
        parent: &FakeNode,
        spec: &ElementSpec,
    ) -> Result<FakeNode, SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        if !doc.element(*parent).attached {
            return Err(SurfaceError::Detached);
        }
        let node = doc.push(Some(parent.0), spec.tag);
        let el = doc.element_mut(node);
        el.classes = spec.class.split_whitespace().map(str::to_string).collect();
        el.text = spec.text.clone();
        el.attributes = spec
            .attributes
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        el.style_log = spec
            .styles
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        Ok(node)
    }

    fn remove(&self, node: &FakeNode) {
        let mut doc = self.doc.borrow_mut();
        if doc.element(*node).attached {
            doc.detach(node.0);
            let now = doc.now;
            doc.removals.push((*node, now));
        }
    }

    fn is_attached(&self, node: &FakeNode) -> bool {
        self.doc.borrow().element(*node).attached
    }

    fn set_style(&self, node: &FakeNode, property: &str, value: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        if doc.failing_styles.iter().any(|p| p == property) {
            return Err(SurfaceError::Js(format!("cannot set {property}")));
        }
        doc.element_mut(*node)
            .style_log
            .push((property.to_string(), value.to_string()));
        Ok(())
    }

    fn set_root_property(&self, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.doc
            .borrow_mut()
            .root_log
            .push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn add_class(&self, node: &FakeNode, class: &str) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        let el = doc.element_mut(*node);
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_string());
        }
        Ok(())
    }

    fn bounding_rect(&self, node: &FakeNode) -> Rect {
        self.doc.borrow().element(*node).rect
    }

    fn is_statically_positioned(&self, node: &FakeNode) -> bool {
        let doc = self.doc.borrow();
        let el = doc.element(*node);
        el.style("position").unwrap_or(el.base_position) == "static"
    }

    fn force_layout(&self, node: &FakeNode) {
        self.doc.borrow_mut().element_mut(*node).layout_reads += 1;
    }

    fn animate(
        &self,
        node: &FakeNode,
        animation: &KeyframeAnimation,
        on_finish: Callback,
    ) -> Result<(), SurfaceError> {
        let mut doc = self.doc.borrow_mut();
        if doc.fail_animations {
            return Err(SurfaceError::Unsupported("animate"));
        }
        let started_at = doc.now;
        doc.animations.push(AnimationRecord {
            node: *node,
            animation: animation.clone(),
            started_at,
        });
        doc.queue(animation.duration, on_finish);
        Ok(())
    }

    fn schedule(&self, delay: Duration, task: Callback) -> Result<(), SurfaceError> {
        self.doc.borrow_mut().queue(delay, task);
        Ok(())
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.doc.borrow().reduced_motion
    }
}
