use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use atom_catalog::driver_atoms;
use atom_chain::{ChainError, ChainErrorKind, ChainExecutor, ChainReport, CommandChainRequest};
use clap::Args;
use tokio::{task, time};
use tracing::{info, warn};
use web_interaction::{
    MemoryElementRegistry, MemoryWebView, PageFixture, WebInteraction, WebViewLauncher,
};

use super::context::CliContext;
use super::documents::read_document;
use super::output::{print_failure, print_summary, RunSummary};
use crate::errors::CliError;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Command chain request (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub request: PathBuf,

    /// Page fixture backing the in-memory web view (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Chain deadline in milliseconds, overriding the configuration (0 disables it)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let request: CommandChainRequest = read_document(&args.request).await?;
    let page: PageFixture = read_document(&args.page).await?;
    let deadline = match args.timeout_ms {
        Some(0) => None,
        Some(ms) => Some(Duration::from_millis(ms)),
        None => ctx.config().chain.timeout(),
    };

    let surface = Arc::new(MemoryWebView::from_fixture(&page));
    let executor = ChainExecutor::new(
        Arc::new(driver_atoms().context("Failed to build atom catalog")?),
        Arc::new(WebInteraction::vocabulary().context("Failed to build interaction table")?),
        Arc::new(WebViewLauncher::new(surface.clone())),
        Arc::new(MemoryElementRegistry::from_fixture(&page)),
    );

    info!(
        request = %args.request.display(),
        page = %args.page.display(),
        steps = request.steps.len(),
        deadline_ms = deadline.map(|d| d.as_millis() as u64),
        "Running command chain"
    );

    match execute_with_deadline(move || executor.execute(&request), deadline).await? {
        Ok(report) => print_summary(ctx.output(), &RunSummary::new(report, surface.events())),
        Err(err) => {
            print_failure(ctx.output(), &err)?;
            Err(CliError::ChainFailed(err).into())
        }
    }
}

// The chain itself is synchronous; the deadline is enforced here. A chain that
// overruns keeps its blocking thread until the current step returns, and the
// process does not wait for it on exit (see `runtime::block_on`).
async fn execute_with_deadline<F>(
    chain: F,
    deadline: Option<Duration>,
) -> Result<Result<ChainReport, ChainError>>
where
    F: FnOnce() -> Result<ChainReport, ChainError> + Send + 'static,
{
    let handle = task::spawn_blocking(chain);
    let joined = match deadline {
        None => handle.await,
        Some(limit) => match time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(deadline_ms = limit.as_millis() as u64, "Command chain timed out");
                return Ok(Err(ChainError::new(
                    ChainErrorKind::UnderlyingAutomationFailure,
                    format!("chain did not finish within {} ms", limit.as_millis()),
                )));
            }
        },
    };
    joined.context("Chain execution task failed")
}
