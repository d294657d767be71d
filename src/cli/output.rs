use anyhow::Result;
use atom_chain::{ChainError, ChainErrorKind, ChainReport};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use web_interaction::SurfaceEvent;
use webatoms_core_types::ChainId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Outcome of `webatoms run` on success.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub chain_id: ChainId,
    pub steps_executed: usize,
    pub value: Option<Value>,
    /// Side effects observed on the in-memory page
    pub events: Vec<SurfaceEvent>,
}

impl RunSummary {
    pub fn new(report: ChainReport, events: Vec<SurfaceEvent>) -> Self {
        Self {
            chain_id: report.chain_id,
            steps_executed: report.steps_executed,
            value: report.value,
            events,
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureView<'a> {
    kind: ChainErrorKind,
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<usize>,
}

impl<'a> From<&'a ChainError> for FailureView<'a> {
    fn from(err: &'a ChainError) -> Self {
        Self {
            kind: err.kind,
            code: err.kind.code(),
            message: &err.message,
            step: err.step,
        }
    }
}

pub fn print_summary(format: OutputFormat, summary: &RunSummary) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Human => {
            println!("Chain {} succeeded", summary.chain_id);
            println!("Steps executed: {}", summary.steps_executed);
            match &summary.value {
                Some(value) => println!("Value: {}", value),
                None => println!("Value: (none)"),
            }
            if !summary.events.is_empty() {
                println!("Events:");
                for event in &summary.events {
                    println!("  - {}", serde_json::to_string(event)?);
                }
            }
        }
    }
    Ok(())
}

pub fn print_failure(format: OutputFormat, err: &ChainError) -> Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&FailureView::from(err))?
        ),
        OutputFormat::Human => match err.step {
            Some(step) => println!("Chain failed at step {} [{}]: {}", step, err.kind, err.message),
            None => println!("Chain failed [{}]: {}", err.kind, err.message),
        },
    }
    Ok(())
}

/// Print a listing, one entry per line or as a JSON array.
pub fn print_list<T: Serialize>(
    format: OutputFormat,
    entries: &[T],
    human: impl Fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Human => {
            for entry in entries {
                println!("{}", human(entry));
            }
        }
    }
    Ok(())
}
