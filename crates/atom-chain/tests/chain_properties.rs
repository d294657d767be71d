use atom_catalog::{driver_atoms, AtomKind};
use atom_chain::{
    AtomSpec, ChainDiagnostics, ChainErrorKind, ChainExecutor, ChainState, ChainStep,
    CommandChainRequest,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use web_interaction::{
    Accepts, ElementRegistry, InteractionTable, StepOutcome, SurfaceLauncher,
};
use webatoms_core_types::{AutomationFailure, ChainId, ElementId, SurfaceScope, ViewMatcher};

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    interaction: String,
    tag: u32,
    scripting: bool,
}

/// Handle tagged with the number of steps that produced it.
#[derive(Debug, Clone)]
struct Tracked {
    tag: u32,
    scripting: bool,
    scope: SurfaceScope,
    log: Arc<Mutex<Vec<Invocation>>>,
}

impl Tracked {
    fn record(&self, interaction: &str) {
        self.log.lock().push(Invocation {
            interaction: interaction.to_string(),
            tag: self.tag,
            scripting: self.scripting,
        });
    }

    fn next(self) -> StepOutcome<Tracked> {
        StepOutcome::Handle(Tracked {
            tag: self.tag + 1,
            ..self
        })
    }
}

fn vocabulary() -> InteractionTable<Tracked> {
    InteractionTable::builder()
        .unary("navigate", Accepts::Any, |handle: Tracked, _| {
            handle.record("navigate");
            Ok(handle.next())
        })
        .unary("click", Accepts::Kind(AtomKind::Element), |handle: Tracked, _| {
            handle.record("click");
            Ok(handle.next())
        })
        .nullary("click", |handle: Tracked| {
            handle.record("click");
            Err(AutomationFailure::new("element is not actionable"))
        })
        .nullary("getText", |handle: Tracked| {
            handle.record("getText");
            Ok(StepOutcome::Value(json!(format!("text@{}", handle.tag))))
        })
        .nullary("scope", |handle: Tracked| {
            handle.record("scope");
            Ok(StepOutcome::Value(json!(handle.scope.to_string())))
        })
        .build()
        .unwrap()
}

#[derive(Default)]
struct TrackedLauncher {
    log: Arc<Mutex<Vec<Invocation>>>,
    opened: Mutex<u32>,
}

impl SurfaceLauncher<Tracked> for TrackedLauncher {
    fn open(&self, scope: SurfaceScope) -> Result<Tracked, AutomationFailure> {
        *self.opened.lock() += 1;
        Ok(Tracked {
            tag: 0,
            scripting: false,
            scope,
            log: self.log.clone(),
        })
    }

    fn force_scripting(&self, handle: Tracked) -> Result<Tracked, AutomationFailure> {
        Ok(Tracked {
            scripting: true,
            ..handle
        })
    }
}

struct OneView;

impl ElementRegistry for OneView {
    fn view_by_id(&self, id: &ElementId) -> Option<ViewMatcher> {
        (id.as_str() == "el-1").then(|| ViewMatcher::with_view("main"))
    }
}

#[derive(Default)]
struct StateRecorder {
    states: Mutex<Vec<ChainState>>,
}

impl ChainDiagnostics for StateRecorder {
    fn state_changed(&self, _chain: &ChainId, state: &ChainState) {
        self.states.lock().push(*state);
    }
}

struct Harness {
    executor: ChainExecutor<Tracked>,
    launcher: Arc<TrackedLauncher>,
    states: Arc<StateRecorder>,
}

impl Harness {
    fn new() -> Self {
        let launcher = Arc::new(TrackedLauncher::default());
        let states = Arc::new(StateRecorder::default());
        let executor = ChainExecutor::new(
            Arc::new(driver_atoms().unwrap()),
            Arc::new(vocabulary()),
            launcher.clone(),
            Arc::new(OneView),
        )
        .with_diagnostics(states.clone());
        Self {
            executor,
            launcher,
            states,
        }
    }

    fn invocations(&self) -> Vec<Invocation> {
        self.launcher.log.lock().clone()
    }

    fn invoked(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|invocation| invocation.interaction)
            .collect()
    }
}

fn navigate() -> ChainStep {
    ChainStep::new("navigate").with_atom(AtomSpec::new("getCurrentUrl", vec![]))
}

fn click_element() -> ChainStep {
    ChainStep::new("click").with_atom(AtomSpec::new(
        "findElement",
        vec![json!("ID"), json!("submit")],
    ))
}

#[test]
fn first_step_failure_stops_the_chain() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![
        ChainStep::new("click"),
        navigate(),
        ChainStep::new("getText"),
    ]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::UnderlyingAutomationFailure);
    assert_eq!(err.step, Some(0));
    assert!(err.message.contains("click"));
    assert_eq!(harness.invoked(), vec!["click"]);
}

#[test]
fn middle_step_failure_skips_remaining_steps() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![
        navigate(),
        ChainStep::new("navigate").with_atom(AtomSpec::new("noSuchAtom", vec![])),
        ChainStep::new("getText"),
    ]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::AtomNotFound);
    assert_eq!(err.step, Some(1));
    assert!(err.message.contains("noSuchAtom"));
    assert_eq!(harness.invoked(), vec!["navigate"]);
}

#[test]
fn failing_invocation_skips_later_steps() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![
        navigate(),
        ChainStep::new("click"),
        ChainStep::new("getText"),
    ]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::UnderlyingAutomationFailure);
    assert_eq!(err.step, Some(1));
    assert_eq!(harness.invoked(), vec!["navigate", "click"]);
}

#[test]
fn atom_resolution_is_repeatable() {
    let catalog = driver_atoms().unwrap();
    let args = [json!("CSS_SELECTOR"), json!("form.login")];

    let first = catalog.resolve("findElement", &args).unwrap();
    let second = catalog.resolve("findElement", &args).unwrap();
    assert_eq!(first, second);

    let first = catalog.resolve("findElement", &args[..1]).unwrap_err();
    let second = catalog.resolve("findElement", &args[..1]).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn each_step_receives_the_previous_handle() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![
        navigate(),
        click_element(),
        navigate(),
        ChainStep::new("getText"),
    ]);

    let report = harness.executor.execute(&request).unwrap();

    let tags: Vec<u32> = harness.invocations().iter().map(|i| i.tag).collect();
    assert_eq!(tags, vec![0, 1, 2, 3]);
    assert_eq!(report.steps_executed, 4);
    assert_eq!(report.value, Some(json!("text@3")));
}

#[test]
fn terminal_value_before_last_step_is_rejected() {
    let harness = Harness::new();
    let request =
        CommandChainRequest::new(vec![navigate(), ChainStep::new("getText"), navigate()]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::UnexpectedReturnType);
    assert_eq!(err.step, Some(1));
    assert!(err.message.contains("getText"));
    assert_eq!(harness.invoked(), vec!["navigate", "getText"]);
}

#[test]
fn chain_ending_on_a_handle_has_no_value() {
    let harness = Harness::new();
    let report = harness
        .executor
        .execute(&CommandChainRequest::new(vec![navigate()]))
        .unwrap();
    assert_eq!(report.steps_executed, 1);
    assert_eq!(report.value, None);
}

#[test]
fn empty_chain_only_initializes() {
    let harness = Harness::new();

    let report = harness
        .executor
        .execute(&CommandChainRequest::default())
        .unwrap();

    assert_eq!(report.steps_executed, 0);
    assert_eq!(report.value, None);
    assert!(harness.invocations().is_empty());
    assert_eq!(*harness.launcher.opened.lock(), 1);
    assert_eq!(
        *harness.states.states.lock(),
        vec![ChainState::Succeeded]
    );
}

#[test]
fn forced_scripting_is_visible_to_first_step() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![navigate(), navigate()]).force_scripting(true);

    harness.executor.execute(&request).unwrap();

    let invocations = harness.invocations();
    assert!(invocations.iter().all(|i| i.scripting));

    let harness = Harness::new();
    harness
        .executor
        .execute(&CommandChainRequest::new(vec![navigate()]))
        .unwrap();
    assert!(!harness.invocations()[0].scripting);
}

#[test]
fn unknown_interaction_names_the_culprit() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![ChainStep::new("doesNotExist"), navigate()]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::UnknownInteraction);
    assert!(err.message.contains("doesNotExist"));
    assert!(harness.invocations().is_empty());
}

#[test]
fn atom_kind_mismatch_is_invalid_arguments() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![
        ChainStep::new("click").with_atom(AtomSpec::new("getTitle", vec![]))
    ]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::InvalidArguments);
    assert!(err.message.contains("getTitle"));
    assert!(harness.invocations().is_empty());
}

#[test]
fn bad_atom_arguments_are_invalid_arguments() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![ChainStep::new("click").with_atom(
        AtomSpec::new("findElement", vec![json!("ID")]),
    )]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::InvalidArguments);
    assert!(err.message.contains("findElement"));
}

#[test]
fn target_reference_scopes_the_handle() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![ChainStep::new("scope")])
        .targeting(ElementId::new("el-1"));

    let report = harness.executor.execute(&request).unwrap();

    assert_eq!(report.value, Some(json!("withView(main)")));
}

#[test]
fn unknown_target_reference_fails_before_initialization() {
    let harness = Harness::new();
    let request =
        CommandChainRequest::new(vec![navigate()]).targeting(ElementId::new("el-404"));

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::ElementNotFound);
    assert!(err.message.contains("el-404"));
    assert_eq!(err.step, None);
    assert_eq!(*harness.launcher.opened.lock(), 0);
}

#[test]
fn malformed_step_is_rejected_before_any_invocation() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![navigate(), ChainStep::new("")]);

    let err = harness.executor.execute(&request).unwrap_err();

    assert_eq!(err.kind, ChainErrorKind::InvalidArguments);
    assert_eq!(err.step, Some(1));
    assert!(harness.invocations().is_empty());
    assert_eq!(*harness.launcher.opened.lock(), 0);
}

#[test]
fn states_walk_sequentially() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![navigate(), ChainStep::new("click")]);

    harness.executor.execute(&request).unwrap_err();

    assert_eq!(
        *harness.states.states.lock(),
        vec![
            ChainState::Running(0),
            ChainState::Running(1),
            ChainState::Failed(ChainErrorKind::UnderlyingAutomationFailure),
        ]
    );
}

#[test]
fn executor_is_reusable_across_chains() {
    let harness = Harness::new();
    let request = CommandChainRequest::new(vec![navigate(), ChainStep::new("getText")]);

    let first = harness.executor.execute(&request).unwrap();
    let second = harness.executor.execute(&request).unwrap();

    assert_ne!(first.chain_id, second.chain_id);
    assert_eq!(first.value, second.value);
    assert_eq!(*harness.launcher.opened.lock(), 2);
}
