//! Concrete interaction handle over a [`WebViewPort`]

use atom_catalog::{AtomKind, ResolvedAtom};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use webatoms_core_types::{AutomationFailure, ElementRef, SurfaceScope, WindowRef};

use crate::errors::InteractionError;
use crate::ports::{EvalContext, SurfaceLauncher, WebViewPort};
use crate::vocabulary::{Accepts, InteractionTable, StepOutcome};

/// Wire key of an element reference, `{"ELEMENT": "<id>"}`
pub const ELEMENT_KEY: &str = "ELEMENT";
/// Wire key of a window reference, `{"WINDOW": "<id>"}`
pub const WINDOW_KEY: &str = "WINDOW";
/// Evaluation timeout a fresh interaction starts with
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn element_value(element: &ElementRef) -> Value {
    json!({ ELEMENT_KEY: element.0 })
}

pub fn window_value(window: &WindowRef) -> Value {
    json!({ WINDOW_KEY: window.0 })
}

fn element_from(value: &Value) -> Option<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
}

fn window_from(value: &Value) -> Option<WindowRef> {
    value
        .get(WINDOW_KEY)
        .and_then(Value::as_str)
        .map(|id| WindowRef(id.to_string()))
}

/// Point of interaction with one web surface.
///
/// Every operation consumes the handle and returns a new one, so a chain
/// always holds exactly one current handle.
#[derive(Clone)]
pub struct WebInteraction {
    port: Arc<dyn WebViewPort>,
    context: EvalContext,
    javascript_forced: bool,
    result: Option<Value>,
}

impl WebInteraction {
    pub fn new(port: Arc<dyn WebViewPort>, surface: SurfaceScope) -> Self {
        Self {
            port,
            context: EvalContext {
                surface,
                window: None,
                element: None,
                timeout: Some(DEFAULT_TIMEOUT),
            },
            javascript_forced: false,
            result: None,
        }
    }

    pub fn context(&self) -> &EvalContext {
        &self.context
    }

    pub fn javascript_forced(&self) -> bool {
        self.javascript_forced
    }

    /// Result of the most recent `perform`
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Focus the element the atom evaluates to, searching from the window root.
    pub fn with_element(self, atom: ResolvedAtom) -> Result<Self, AutomationFailure> {
        let ctx = EvalContext {
            element: None,
            ..self.context.clone()
        };
        let value = self.port.evaluate(&ctx, &atom)?;
        let element = element_from(&value).ok_or_else(|| not_a_reference(&atom, "an element"))?;
        Ok(Self {
            context: EvalContext {
                element: Some(element),
                ..self.context
            },
            result: None,
            ..self
        })
    }

    /// Focus the element the atom evaluates to, searching below the current element.
    pub fn with_contextual_element(self, atom: ResolvedAtom) -> Result<Self, AutomationFailure> {
        if self.context.element.is_none() {
            return Err(AutomationFailure::new(
                "no element is focused; call 'withElement' first",
            ));
        }
        let value = self.port.evaluate(&self.context, &atom)?;
        let element = element_from(&value).ok_or_else(|| not_a_reference(&atom, "an element"))?;
        Ok(Self {
            context: EvalContext {
                element: Some(element),
                ..self.context
            },
            result: None,
            ..self
        })
    }

    /// Move into the window or frame the atom evaluates to.
    pub fn in_window(self, atom: ResolvedAtom) -> Result<Self, AutomationFailure> {
        let ctx = EvalContext {
            element: None,
            ..self.context.clone()
        };
        let value = self.port.evaluate(&ctx, &atom)?;
        let window = window_from(&value).ok_or_else(|| not_a_reference(&atom, "a window"))?;
        Ok(Self {
            context: EvalContext {
                window: Some(window),
                element: None,
                ..self.context
            },
            result: None,
            ..self
        })
    }

    pub fn perform(self, atom: ResolvedAtom) -> Result<Self, AutomationFailure> {
        let value = self.port.evaluate(&self.context, &atom)?;
        debug!(atom = %atom, "Performed atom");
        Ok(Self {
            result: Some(value),
            ..self
        })
    }

    pub fn get(self) -> Result<Value, AutomationFailure> {
        self.result
            .ok_or_else(|| AutomationFailure::new("no result available; call 'perform' first"))
    }

    /// Drop the focused element, window and last result.
    pub fn reset(self) -> Self {
        Self {
            context: EvalContext {
                window: None,
                element: None,
                ..self.context
            },
            result: None,
            ..self
        }
    }

    pub fn force_javascript_enabled(self) -> Result<Self, AutomationFailure> {
        self.port.enable_javascript(&self.context.surface)?;
        Ok(Self {
            javascript_forced: true,
            ..self
        })
    }

    pub fn with_no_timeout(self) -> Self {
        Self {
            context: EvalContext {
                timeout: None,
                ..self.context
            },
            ..self
        }
    }

    /// Interaction vocabulary exposed to command chains.
    pub fn vocabulary() -> Result<InteractionTable<Self>, InteractionError> {
        InteractionTable::builder()
            .unary("withElement", Accepts::Kind(AtomKind::Element), |h: Self, atom| {
                h.with_element(atom).map(StepOutcome::Handle)
            })
            .unary(
                "withContextualElement",
                Accepts::Kind(AtomKind::Element),
                |h: Self, atom| h.with_contextual_element(atom).map(StepOutcome::Handle),
            )
            .unary("inWindow", Accepts::Kind(AtomKind::Window), |h: Self, atom| {
                h.in_window(atom).map(StepOutcome::Handle)
            })
            .unary("perform", Accepts::Any, |h: Self, atom| {
                h.perform(atom).map(StepOutcome::Handle)
            })
            .nullary("get", |h: Self| h.get().map(StepOutcome::Value))
            .nullary("reset", |h: Self| Ok(StepOutcome::Handle(h.reset())))
            .nullary("forceJavascriptEnabled", |h: Self| {
                h.force_javascript_enabled().map(StepOutcome::Handle)
            })
            .nullary("withNoTimeout", |h: Self| {
                Ok(StepOutcome::Handle(h.with_no_timeout()))
            })
            .build()
    }
}

impl fmt::Debug for WebInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebInteraction")
            .field("context", &self.context)
            .field("javascript_forced", &self.javascript_forced)
            .field("result", &self.result)
            .finish()
    }
}

fn not_a_reference(atom: &ResolvedAtom, what: &str) -> AutomationFailure {
    AutomationFailure::new(format!(
        "'{}' did not evaluate to {} reference",
        atom.name, what
    ))
}

/// Opens [`WebInteraction`]s over a shared port.
#[derive(Clone)]
pub struct WebViewLauncher {
    port: Arc<dyn WebViewPort>,
}

impl WebViewLauncher {
    pub fn new(port: Arc<dyn WebViewPort>) -> Self {
        Self { port }
    }
}

impl SurfaceLauncher<WebInteraction> for WebViewLauncher {
    fn open(&self, scope: SurfaceScope) -> Result<WebInteraction, AutomationFailure> {
        Ok(WebInteraction::new(self.port.clone(), scope))
    }

    fn force_scripting(&self, handle: WebInteraction) -> Result<WebInteraction, AutomationFailure> {
        handle.force_javascript_enabled()
    }
}
