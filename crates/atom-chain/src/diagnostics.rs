//! Per-chain observability port
//!
//! The executor reports what it is about to do through [`ChainDiagnostics`]
//! before doing it. Implementations only observe; nothing they do feeds back
//! into control flow.

use atom_catalog::ResolvedAtom;
use tracing::{info, info_span, warn, Span};
use webatoms_core_types::{ChainId, SurfaceScope};

use crate::errors::ChainError;
use crate::executor::{ChainReport, ChainState};
use crate::model::{AtomSpec, CommandChainRequest};

pub trait ChainDiagnostics: Send + Sync {
    /// Span entered for the whole chain execution
    fn span(&self, _chain: &ChainId) -> Span {
        Span::none()
    }

    fn chain_started(&self, _chain: &ChainId, _request: &CommandChainRequest) {}

    fn initializing(&self, _chain: &ChainId, _scope: &SurfaceScope, _force_scripting: bool) {}

    fn state_changed(&self, _chain: &ChainId, _state: &ChainState) {}

    fn resolving_atom(&self, _chain: &ChainId, _step: usize, _atom: &AtomSpec) {}

    fn invoking(
        &self,
        _chain: &ChainId,
        _step: usize,
        _interaction: &str,
        _atom: Option<&ResolvedAtom>,
    ) {
    }

    fn chain_finished(&self, _chain: &ChainId, _outcome: &Result<ChainReport, ChainError>) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl ChainDiagnostics for NoopDiagnostics {}

/// Emits structured `tracing` events inside a `webatoms.chain` span.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl ChainDiagnostics for TracingDiagnostics {
    fn span(&self, chain: &ChainId) -> Span {
        info_span!("webatoms.chain", chain = %chain)
    }

    fn chain_started(&self, _chain: &ChainId, request: &CommandChainRequest) {
        info!(
            steps = request.steps.len(),
            target = ?request.target_surface_ref,
            force_scripting = request.capability_flags.force_scripting_enabled,
            "Starting command chain"
        );
    }

    fn initializing(&self, _chain: &ChainId, scope: &SurfaceScope, force_scripting: bool) {
        match scope {
            SurfaceScope::View(matcher) => {
                info!(view = %matcher, force_scripting, "Initializing web interaction on view")
            }
            SurfaceScope::Default => {
                info!(force_scripting, "Initializing web interaction without selector")
            }
        }
    }

    fn resolving_atom(&self, _chain: &ChainId, step: usize, atom: &AtomSpec) {
        let args: Vec<String> = atom.args.iter().map(|arg| arg.to_string()).collect();
        info!(
            step,
            atom = %atom.name,
            args = %args.join(", "),
            "Calling atom"
        );
    }

    fn invoking(
        &self,
        _chain: &ChainId,
        step: usize,
        interaction: &str,
        atom: Option<&ResolvedAtom>,
    ) {
        match atom {
            Some(atom) => info!(step, interaction, atom = %atom, "Calling interaction with atom"),
            None => info!(step, interaction, "Calling interaction"),
        }
    }

    fn chain_finished(&self, _chain: &ChainId, outcome: &Result<ChainReport, ChainError>) {
        match outcome {
            Ok(report) => info!(
                steps = report.steps_executed,
                has_value = report.value.is_some(),
                "Command chain succeeded"
            ),
            Err(err) => warn!(kind = %err.kind, step = ?err.step, "Command chain failed: {}", err.message),
        }
    }
}
