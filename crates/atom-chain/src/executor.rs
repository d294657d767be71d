//! Chain executor implementation

use atom_catalog::{AtomCatalog, ResolvedAtom};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use web_interaction::{ElementRegistry, InteractionTable, StepOutcome, SurfaceLauncher};
use webatoms_core_types::{ChainId, SurfaceScope};

use crate::diagnostics::{ChainDiagnostics, TracingDiagnostics};
use crate::errors::{ChainError, ChainErrorKind};
use crate::model::{ChainStep, CommandChainRequest};

/// Lifecycle of a single chain execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Initializing,
    Running(usize),
    Succeeded,
    Failed(ChainErrorKind),
}

impl ChainState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::Succeeded | ChainState::Failed(_))
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainState::Initializing => f.write_str("initializing"),
            ChainState::Running(step) => write!(f, "running({})", step),
            ChainState::Succeeded => f.write_str("succeeded"),
            ChainState::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Outcome of a successful chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainReport {
    pub chain_id: ChainId,
    pub steps_executed: usize,
    /// Terminal value of the last step, if it returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Executes command chains against handles of type `H`.
///
/// The executor itself is reusable; every call to [`ChainExecutor::execute`]
/// drives a fresh single-use run. Callers must not run two chains against the
/// same automation session at once.
pub struct ChainExecutor<H> {
    catalog: Arc<AtomCatalog>,
    interactions: Arc<InteractionTable<H>>,
    launcher: Arc<dyn SurfaceLauncher<H>>,
    registry: Arc<dyn ElementRegistry>,
    diagnostics: Arc<dyn ChainDiagnostics>,
}

impl<H: 'static> ChainExecutor<H> {
    pub fn new(
        catalog: Arc<AtomCatalog>,
        interactions: Arc<InteractionTable<H>>,
        launcher: Arc<dyn SurfaceLauncher<H>>,
        registry: Arc<dyn ElementRegistry>,
    ) -> Self {
        Self {
            catalog,
            interactions,
            launcher,
            registry,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn ChainDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn catalog(&self) -> &AtomCatalog {
        &self.catalog
    }

    pub fn interactions(&self) -> &InteractionTable<H> {
        &self.interactions
    }

    /// Run `request` to completion or to its first failure.
    pub fn execute(&self, request: &CommandChainRequest) -> Result<ChainReport, ChainError> {
        ChainRun::new(self, request).run()
    }
}

struct ChainRun<'a, H> {
    executor: &'a ChainExecutor<H>,
    request: &'a CommandChainRequest,
    chain_id: ChainId,
    state: ChainState,
}

impl<'a, H: 'static> ChainRun<'a, H> {
    fn new(executor: &'a ChainExecutor<H>, request: &'a CommandChainRequest) -> Self {
        Self {
            executor,
            request,
            chain_id: ChainId::new(),
            state: ChainState::Initializing,
        }
    }

    // Consumes the run; a finished run cannot be restarted.
    fn run(mut self) -> Result<ChainReport, ChainError> {
        let diagnostics = self.executor.diagnostics.clone();
        let span = diagnostics.span(&self.chain_id);
        let _guard = span.enter();

        diagnostics.chain_started(&self.chain_id, self.request);
        let outcome = self.walk();
        match &outcome {
            Ok(_) => self.transition(ChainState::Succeeded),
            Err(err) => self.transition(ChainState::Failed(err.kind)),
        }
        diagnostics.chain_finished(&self.chain_id, &outcome);
        outcome
    }

    fn walk(&mut self) -> Result<ChainReport, ChainError> {
        let request = self.request;
        request.validate()?;
        let handle = self.initialize()?;

        let Some((last, leading)) = request.steps.split_last() else {
            return Ok(self.report(0, None));
        };

        let total = request.steps.len();
        let handle = leading
            .iter()
            .enumerate()
            .try_fold(handle, |handle, (index, step)| {
                match self.invoke(handle, index, step)? {
                    StepOutcome::Handle(next) => Ok(next),
                    StepOutcome::Value(_) => Err(ChainError::at_step(
                        ChainErrorKind::UnexpectedReturnType,
                        index,
                        format!(
                            "step {}: '{}' does not return an interaction handle; only the last of {} steps may return a value",
                            index, step.interaction_name, total
                        ),
                    )),
                }
            })?;

        let value = match self.invoke(handle, leading.len(), last)? {
            StepOutcome::Handle(_) => None,
            StepOutcome::Value(value) => Some(value),
        };
        Ok(self.report(total, value))
    }

    fn initialize(&self) -> Result<H, ChainError> {
        let request = self.request;
        let scope = match &request.target_surface_ref {
            Some(element) => {
                let matcher = self.executor.registry.view_by_id(element).ok_or_else(|| {
                    ChainError::new(
                        ChainErrorKind::ElementNotFound,
                        format!("no live view is registered for element '{}'", element),
                    )
                })?;
                SurfaceScope::View(matcher)
            }
            None => SurfaceScope::Default,
        };

        let force_scripting = request.capability_flags.force_scripting_enabled;
        self.executor
            .diagnostics
            .initializing(&self.chain_id, &scope, force_scripting);

        let launcher = &self.executor.launcher;
        let handle = launcher.open(scope).map_err(|err| {
            ChainError::new(
                ChainErrorKind::UnderlyingAutomationFailure,
                format!("failed to open web interaction: {}", err),
            )
        })?;

        if !force_scripting {
            return Ok(handle);
        }
        launcher.force_scripting(handle).map_err(|err| {
            ChainError::new(
                ChainErrorKind::UnderlyingAutomationFailure,
                format!("failed to force javascript: {}", err),
            )
        })
    }

    fn invoke(
        &mut self,
        handle: H,
        index: usize,
        step: &ChainStep,
    ) -> Result<StepOutcome<H>, ChainError> {
        self.transition(ChainState::Running(index));
        let atom = self.resolve(index, step)?;
        self.executor.diagnostics.invoking(
            &self.chain_id,
            index,
            &step.interaction_name,
            atom.as_ref(),
        );
        self.executor
            .interactions
            .invoke(handle, &step.interaction_name, atom)
            .map_err(|err| ChainError::from_interaction(err, index))
    }

    fn resolve(&self, index: usize, step: &ChainStep) -> Result<Option<ResolvedAtom>, ChainError> {
        let Some(spec) = &step.atom else {
            return Ok(None);
        };
        self.executor
            .diagnostics
            .resolving_atom(&self.chain_id, index, spec);
        self.executor
            .catalog
            .resolve(&spec.name, &spec.args)
            .map(Some)
            .map_err(|err| ChainError::from_catalog(err, index, &step.interaction_name))
    }

    fn transition(&mut self, next: ChainState) {
        debug_assert!(!self.state.is_terminal(), "chain already finished");
        self.state = next;
        self.executor
            .diagnostics
            .state_changed(&self.chain_id, &self.state);
    }

    fn report(&self, steps_executed: usize, value: Option<Value>) -> ChainReport {
        ChainReport {
            chain_id: self.chain_id.clone(),
            steps_executed,
            value,
        }
    }
}
