//! Static request checks that need no live surface

use atom_catalog::AtomCatalog;
use web_interaction::InteractionTable;

use crate::errors::{ChainError, ChainErrorKind};
use crate::model::CommandChainRequest;

/// Check `request` against `catalog` and `interactions` without executing it.
///
/// Catches malformed steps, unknown interaction names, unknown atoms and bad
/// atom arguments. Whether an interaction accepts a given atom kind, and every
/// runtime failure, is only known once the chain runs.
pub fn preflight<H>(
    request: &CommandChainRequest,
    catalog: &AtomCatalog,
    interactions: &InteractionTable<H>,
) -> Result<(), ChainError> {
    request.validate()?;
    for (index, step) in request.steps.iter().enumerate() {
        if !interactions.contains(&step.interaction_name) {
            return Err(ChainError::at_step(
                ChainErrorKind::UnknownInteraction,
                index,
                format!(
                    "step {}: unknown interaction '{}'",
                    index, step.interaction_name
                ),
            ));
        }
        if let Some(atom) = &step.atom {
            catalog
                .resolve(&atom.name, &atom.args)
                .map_err(|err| ChainError::from_catalog(err, index, &step.interaction_name))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AtomSpec, ChainStep};
    use atom_catalog::driver_atoms;
    use serde_json::json;
    use web_interaction::StepOutcome;

    fn table() -> InteractionTable<()> {
        InteractionTable::builder()
            .nullary("reset", |_: ()| Ok(StepOutcome::Handle(())))
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_known_steps() {
        let request = CommandChainRequest::new(vec![ChainStep::new("reset")]);
        assert!(preflight(&request, &driver_atoms().unwrap(), &table()).is_ok());
    }

    #[test]
    fn reports_first_offending_step() {
        let catalog = driver_atoms().unwrap();
        let request = CommandChainRequest::new(vec![
            ChainStep::new("reset"),
            ChainStep::new("reset").with_atom(AtomSpec::new("webKeys", vec![json!(7)])),
            ChainStep::new("tap"),
        ]);
        let err = preflight(&request, &catalog, &table()).unwrap_err();
        assert_eq!(err.kind, ChainErrorKind::InvalidArguments);
        assert_eq!(err.step, Some(1));

        let request = CommandChainRequest::new(vec![ChainStep::new("tap")]);
        let err = preflight(&request, &catalog, &table()).unwrap_err();
        assert_eq!(err.kind, ChainErrorKind::UnknownInteraction);
        assert!(err.message.contains("tap"));
    }
}
