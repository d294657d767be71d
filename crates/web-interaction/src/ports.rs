use atom_catalog::ResolvedAtom;
use serde_json::Value;
use std::time::Duration;
use webatoms_core_types::{
    AutomationFailure, ElementId, ElementRef, SurfaceScope, ViewMatcher, WindowRef,
};

/// Where an atom is evaluated inside a web surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalContext {
    pub surface: SurfaceScope,
    pub window: Option<WindowRef>,
    pub element: Option<ElementRef>,
    pub timeout: Option<Duration>,
}

/// Evaluates atoms against a live web surface.
pub trait WebViewPort: Send + Sync {
    fn evaluate(&self, ctx: &EvalContext, atom: &ResolvedAtom) -> Result<Value, AutomationFailure>;

    fn enable_javascript(&self, surface: &SurfaceScope) -> Result<(), AutomationFailure>;
}

/// Maps native element ids onto the views they denote.
pub trait ElementRegistry: Send + Sync {
    fn view_by_id(&self, id: &ElementId) -> Option<ViewMatcher>;
}

/// Produces the initial interaction handle of a chain.
pub trait SurfaceLauncher<H>: Send + Sync {
    fn open(&self, scope: SurfaceScope) -> Result<H, AutomationFailure>;

    fn force_scripting(&self, handle: H) -> Result<H, AutomationFailure>;
}
