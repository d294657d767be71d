//! Built-in web-driver atoms

use crate::catalog::{AtomArgs, AtomCatalog, AtomDefinition};
use crate::errors::CatalogError;
use crate::types::{AtomKind, AtomOp, ParamType};

/// The standard web-driver atom catalog.
///
/// Fails only if the built-in definitions are ambiguous with each other.
pub fn driver_atoms() -> Result<AtomCatalog, CatalogError> {
    let catalog = AtomCatalog::builder()
        .register(
            AtomDefinition::new("findElement", AtomKind::Element, find_element)
                .param(ParamType::Locator)
                .param(ParamType::String),
        )?
        .register(
            AtomDefinition::new("findMultipleElements", AtomKind::ElementList, find_elements)
                .param(ParamType::Locator)
                .param(ParamType::String),
        )?
        .register(AtomDefinition::new(
            "selectActiveElement",
            AtomKind::Element,
            |_| Ok(AtomOp::SelectActiveElement),
        ))?
        .register(
            AtomDefinition::new("selectFrameByIndex", AtomKind::Window, |args| {
                Ok(AtomOp::SelectFrameByIndex(args.integer(0)?))
            })
            .param(ParamType::Integer),
        )?
        .register(
            AtomDefinition::new("selectFrameByIdOrName", AtomKind::Window, |args| {
                Ok(AtomOp::SelectFrameByIdOrName(args.string(0)?))
            })
            .param(ParamType::String),
        )?
        .register(AtomDefinition::new(
            "clearElement",
            AtomKind::Evaluation,
            |_| Ok(AtomOp::ClearElement),
        ))?
        .register(AtomDefinition::new("webClick", AtomKind::Evaluation, |_| {
            Ok(AtomOp::Click)
        }))?
        .register(
            AtomDefinition::new("webKeys", AtomKind::Evaluation, |args| {
                Ok(AtomOp::SendKeys(args.string(0)?))
            })
            .param(ParamType::String),
        )?
        .register(AtomDefinition::new(
            "webScrollIntoView",
            AtomKind::Evaluation,
            |_| Ok(AtomOp::ScrollIntoView),
        ))?
        .register(AtomDefinition::new("getText", AtomKind::Text, |_| {
            Ok(AtomOp::GetText)
        }))?
        .register(AtomDefinition::new("getCurrentUrl", AtomKind::Text, |_| {
            Ok(AtomOp::GetCurrentUrl)
        }))?
        .register(AtomDefinition::new("getTitle", AtomKind::Text, |_| {
            Ok(AtomOp::GetTitle)
        }))?
        .register(
            AtomDefinition::new("script", AtomKind::Evaluation, script)
                .param(ParamType::String)
                .variadic(ParamType::Any),
        )?
        .build();

    Ok(catalog)
}

fn find_element(args: &AtomArgs<'_>) -> Result<AtomOp, CatalogError> {
    Ok(AtomOp::FindElement {
        locator: args.locator(0)?,
        value: args.string(1)?,
    })
}

fn find_elements(args: &AtomArgs<'_>) -> Result<AtomOp, CatalogError> {
    Ok(AtomOp::FindElements {
        locator: args.locator(0)?,
        value: args.string(1)?,
    })
}

fn script(args: &AtomArgs<'_>) -> Result<AtomOp, CatalogError> {
    Ok(AtomOp::Script {
        source: args.string(0)?,
        args: args.rest(1),
    })
}
