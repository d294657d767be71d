//! In-memory web surface
//!
//! Backs the CLI and the integration tests with a static page described by a
//! [`PageFixture`]. Atoms are evaluated against a flattened copy of the fixture
//! document; mutations (typing, clearing, clicks) are kept in memory and
//! recorded as [`SurfaceEvent`]s.

use atom_catalog::{AtomOp, Locator, ResolvedAtom};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;
use webatoms_core_types::{
    AutomationFailure, ElementId, ElementRef, SurfaceScope, ViewMatcher, WindowRef,
};

use crate::handle::{element_value, window_value};
use crate::ports::{ElementRegistry, EvalContext, WebViewPort};

/// Static description of a page and the web views showing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFixture {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub javascript_enabled: bool,
    /// Native element id -> web view name
    #[serde(default)]
    pub views: BTreeMap<String, String>,
    #[serde(default)]
    pub document: Vec<DomNode>,
    #[serde(default)]
    pub frames: Vec<FrameFixture>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameFixture {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document: Vec<DomNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomNode {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

/// Side effect observed on the in-memory surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    JavascriptEnabled,
    Click { element: String },
    Keys { element: String, text: String },
    Clear { element: String },
    ScrollIntoView { element: String },
    Script { source: String },
}

#[derive(Debug, Clone)]
struct Node {
    window: usize,
    parent: Option<usize>,
    tag: String,
    id: Option<String>,
    name: Option<String>,
    classes: Vec<String>,
    text: String,
    value: String,
    disabled: bool,
}

impl Node {
    fn matches(&self, locator: Locator, query: &str) -> Result<bool, AutomationFailure> {
        let matched = match locator {
            Locator::Id => self.id.as_deref() == Some(query),
            Locator::Name => self.name.as_deref() == Some(query),
            Locator::ClassName => self.classes.iter().any(|c| c == query),
            Locator::TagName => self.tag.eq_ignore_ascii_case(query),
            Locator::LinkText => self.is_link() && self.text == query,
            Locator::PartialLinkText => self.is_link() && self.text.contains(query),
            Locator::CssSelector => self.matches_css(query)?,
            Locator::Xpath => {
                return Err(AutomationFailure::new(
                    "XPATH lookups are not supported by the in-memory surface",
                ))
            }
        };
        Ok(matched)
    }

    fn is_link(&self) -> bool {
        self.tag.eq_ignore_ascii_case("a")
    }

    // Supports `#id`, `.class`, `tag` and `tag.class`
    fn matches_css(&self, selector: &str) -> Result<bool, AutomationFailure> {
        let selector = selector.trim();
        if selector.is_empty() || selector.contains(char::is_whitespace) {
            return Err(AutomationFailure::new(format!(
                "unsupported css selector '{}'",
                selector
            )));
        }
        if let Some(id) = selector.strip_prefix('#') {
            return Ok(self.id.as_deref() == Some(id));
        }
        if let Some(class) = selector.strip_prefix('.') {
            return Ok(self.classes.iter().any(|c| c == class));
        }
        match selector.split_once('.') {
            Some((tag, class)) => {
                Ok(self.tag.eq_ignore_ascii_case(tag) && self.classes.iter().any(|c| c == class))
            }
            None => Ok(self.tag.eq_ignore_ascii_case(selector)),
        }
    }
}

#[derive(Debug, Clone)]
struct Window {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug)]
struct SurfaceState {
    nodes: Vec<Node>,
    javascript_enabled: bool,
    active: Option<usize>,
    events: Vec<SurfaceEvent>,
}

/// [`WebViewPort`] evaluating atoms against a [`PageFixture`].
#[derive(Debug)]
pub struct MemoryWebView {
    url: String,
    title: String,
    views: Vec<String>,
    windows: Vec<Window>,
    state: Mutex<SurfaceState>,
}

impl MemoryWebView {
    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut nodes = Vec::new();
        let mut windows = vec![Window {
            id: None,
            name: None,
        }];
        flatten(&fixture.document, 0, None, &mut nodes);
        for frame in &fixture.frames {
            windows.push(Window {
                id: frame.id.clone(),
                name: frame.name.clone(),
            });
            flatten(&frame.document, windows.len() - 1, None, &mut nodes);
        }

        let mut views: Vec<String> = fixture.views.values().cloned().collect();
        views.sort();
        views.dedup();

        Self {
            url: fixture.url.clone(),
            title: fixture.title.clone(),
            views,
            windows,
            state: Mutex::new(SurfaceState {
                nodes,
                javascript_enabled: fixture.javascript_enabled,
                active: None,
                events: Vec::new(),
            }),
        }
    }

    /// Side effects applied so far, oldest first
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.state.lock().events.clone()
    }

    pub fn javascript_enabled(&self) -> bool {
        self.state.lock().javascript_enabled
    }

    /// Current value of the element with the given DOM id
    pub fn value_of(&self, dom_id: &str) -> Option<String> {
        self.state
            .lock()
            .nodes
            .iter()
            .find(|node| node.id.as_deref() == Some(dom_id))
            .map(|node| node.value.clone())
    }

    fn check_surface(&self, surface: &SurfaceScope) -> Result<(), AutomationFailure> {
        match surface {
            SurfaceScope::Default => Ok(()),
            SurfaceScope::View(matcher) if self.views.contains(&matcher.view) => Ok(()),
            SurfaceScope::View(matcher) => Err(AutomationFailure::new(format!(
                "no web view matches {}",
                matcher
            ))),
        }
    }

    fn window_index(&self, window: Option<&WindowRef>) -> Result<usize, AutomationFailure> {
        let Some(window) = window else {
            return Ok(0);
        };
        parse_key(&window.0, "window-")
            .filter(|index| *index < self.windows.len())
            .ok_or_else(|| AutomationFailure::new(format!("stale window reference '{}'", window.0)))
    }

    fn select_frame(&self, matches: impl Fn(usize, &Window) -> bool) -> Option<Value> {
        self.windows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(index, window)| matches(*index, *window))
            .map(|(index, _)| window_value(&window_ref(index)))
    }
}

impl WebViewPort for MemoryWebView {
    fn evaluate(&self, ctx: &EvalContext, atom: &ResolvedAtom) -> Result<Value, AutomationFailure> {
        self.check_surface(&ctx.surface)?;
        let window = self.window_index(ctx.window.as_ref())?;
        debug!(atom = %atom, window, element = ?ctx.element, "Evaluating atom in memory");

        let mut state = self.state.lock();
        let scope = match &ctx.element {
            Some(element) => Some(node_index(&state, element)?),
            None => None,
        };

        match &atom.op {
            AtomOp::FindElement { locator, value } => {
                let found = find(&state, window, scope, *locator, value)?;
                found
                    .first()
                    .map(|index| element_value(&element_ref(*index)))
                    .ok_or_else(|| {
                        AutomationFailure::new(format!(
                            "no element found using {} '{}'",
                            locator, value
                        ))
                    })
            }
            AtomOp::FindElements { locator, value } => {
                let found = find(&state, window, scope, *locator, value)?;
                Ok(Value::Array(
                    found
                        .into_iter()
                        .map(|index| element_value(&element_ref(index)))
                        .collect(),
                ))
            }
            AtomOp::SelectActiveElement => state
                .active
                .filter(|index| state.nodes[*index].window == window)
                .or_else(|| state.nodes.iter().position(|node| node.window == window))
                .map(|index| element_value(&element_ref(index)))
                .ok_or_else(|| AutomationFailure::new("document has no active element")),
            AtomOp::SelectFrameByIndex(position) => {
                let wanted = usize::try_from(*position).ok().map(|p| p + 1);
                self.select_frame(|index, _| Some(index) == wanted)
                    .ok_or_else(|| AutomationFailure::new(format!("no frame at index {}", position)))
            }
            AtomOp::SelectFrameByIdOrName(key) => self
                .select_frame(|_, frame| {
                    frame.id.as_deref() == Some(key.as_str())
                        || frame.name.as_deref() == Some(key.as_str())
                })
                .ok_or_else(|| AutomationFailure::new(format!("no frame named '{}'", key))),
            AtomOp::ClearElement => {
                let index = interactable(&state, scope)?;
                state.nodes[index].value.clear();
                state.events.push(SurfaceEvent::Clear {
                    element: element_ref(index).0,
                });
                Ok(Value::Null)
            }
            AtomOp::Click => {
                let index = interactable(&state, scope)?;
                state.active = Some(index);
                state.events.push(SurfaceEvent::Click {
                    element: element_ref(index).0,
                });
                Ok(Value::Null)
            }
            AtomOp::SendKeys(text) => {
                let index = interactable(&state, scope)?;
                state.nodes[index].value.push_str(text);
                state.active = Some(index);
                state.events.push(SurfaceEvent::Keys {
                    element: element_ref(index).0,
                    text: text.clone(),
                });
                Ok(Value::Null)
            }
            AtomOp::ScrollIntoView => {
                let index = focused(scope)?;
                state.events.push(SurfaceEvent::ScrollIntoView {
                    element: element_ref(index).0,
                });
                Ok(Value::Bool(true))
            }
            AtomOp::GetText => {
                let node = &state.nodes[focused(scope)?];
                let text = if node.tag.eq_ignore_ascii_case("input")
                    || node.tag.eq_ignore_ascii_case("textarea")
                {
                    node.value.clone()
                } else {
                    node.text.clone()
                };
                Ok(Value::String(text))
            }
            AtomOp::GetCurrentUrl => Ok(Value::String(self.url.clone())),
            AtomOp::GetTitle => Ok(Value::String(self.title.clone())),
            AtomOp::Script { source, .. } => {
                if !state.javascript_enabled {
                    return Err(AutomationFailure::new("javascript is disabled in this web view"));
                }
                // Scripts are recorded, not interpreted.
                state.events.push(SurfaceEvent::Script {
                    source: source.clone(),
                });
                Ok(Value::Null)
            }
        }
    }

    fn enable_javascript(&self, surface: &SurfaceScope) -> Result<(), AutomationFailure> {
        self.check_surface(surface)?;
        let mut state = self.state.lock();
        if !state.javascript_enabled {
            state.javascript_enabled = true;
            state.events.push(SurfaceEvent::JavascriptEnabled);
        }
        Ok(())
    }
}

fn flatten(document: &[DomNode], window: usize, parent: Option<usize>, out: &mut Vec<Node>) {
    for node in document {
        out.push(Node {
            window,
            parent,
            tag: node.tag.clone(),
            id: node.id.clone(),
            name: node.name.clone(),
            classes: node.classes.clone(),
            text: node.text.clone(),
            value: node.value.clone(),
            disabled: node.disabled,
        });
        let index = out.len() - 1;
        flatten(&node.children, window, Some(index), out);
    }
}

fn element_ref(index: usize) -> ElementRef {
    ElementRef(format!("node-{}", index))
}

fn window_ref(index: usize) -> WindowRef {
    WindowRef(format!("window-{}", index))
}

fn parse_key(key: &str, prefix: &str) -> Option<usize> {
    key.strip_prefix(prefix)?.parse().ok()
}

fn node_index(state: &SurfaceState, element: &ElementRef) -> Result<usize, AutomationFailure> {
    parse_key(&element.0, "node-")
        .filter(|index| *index < state.nodes.len())
        .ok_or_else(|| AutomationFailure::new(format!("stale element reference '{}'", element.0)))
}

fn is_descendant(state: &SurfaceState, index: usize, ancestor: usize) -> bool {
    let mut current = state.nodes[index].parent;
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = state.nodes[parent].parent;
    }
    false
}

fn find(
    state: &SurfaceState,
    window: usize,
    scope: Option<usize>,
    locator: Locator,
    query: &str,
) -> Result<Vec<usize>, AutomationFailure> {
    let mut found = Vec::new();
    for (index, node) in state.nodes.iter().enumerate() {
        if node.window != window {
            continue;
        }
        if let Some(ancestor) = scope {
            if !is_descendant(state, index, ancestor) {
                continue;
            }
        }
        if node.matches(locator, query)? {
            found.push(index);
        }
    }
    Ok(found)
}

fn focused(scope: Option<usize>) -> Result<usize, AutomationFailure> {
    scope.ok_or_else(|| AutomationFailure::new("atom requires a focused element"))
}

fn interactable(state: &SurfaceState, scope: Option<usize>) -> Result<usize, AutomationFailure> {
    let index = focused(scope)?;
    if state.nodes[index].disabled {
        return Err(AutomationFailure::new(format!(
            "element '{}' is not interactable",
            element_ref(index).0
        )));
    }
    Ok(index)
}

/// [`ElementRegistry`] over a fixed id -> view map.
#[derive(Debug, Default)]
pub struct MemoryElementRegistry {
    views: DashMap<ElementId, ViewMatcher>,
}

impl MemoryElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let registry = Self::new();
        for (element, view) in &fixture.views {
            registry.register(
                ElementId::new(element.clone()),
                ViewMatcher::with_view(view.clone()),
            );
        }
        registry
    }

    pub fn register(&self, id: ElementId, matcher: ViewMatcher) {
        self.views.insert(id, matcher);
    }
}

impl ElementRegistry for MemoryElementRegistry {
    fn view_by_id(&self, id: &ElementId) -> Option<ViewMatcher> {
        self.views.get(id).map(|entry| entry.value().clone())
    }
}
