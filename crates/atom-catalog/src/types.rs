//! Core data types for atoms

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Declared capability type of an atom's result.
///
/// Interactions accept atoms by kind: `withElement` only takes atoms that
/// evaluate to an element reference, `inWindow` only window references, and
/// so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    /// Evaluates to a single element reference
    Element,
    /// Evaluates to a list of element references
    ElementList,
    /// Evaluates to a window/frame reference
    Window,
    /// Performs an action; the result carries no reference
    Evaluation,
    /// Evaluates to a string
    Text,
}

impl AtomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::ElementList => "element_list",
            Self::Window => "window",
            Self::Evaluation => "evaluation",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of one atom parameter, checked against the wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Locator,
    Any,
}

impl ParamType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.as_i64().is_some(),
            ParamType::Locator => value.as_str().and_then(Locator::from_wire).is_some(),
            ParamType::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "String",
            ParamType::Integer => "Integer",
            ParamType::Locator => "Locator",
            ParamType::Any => "Any",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element lookup strategy, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Locator {
    ClassName,
    CssSelector,
    Id,
    LinkText,
    Name,
    PartialLinkText,
    TagName,
    Xpath,
}

impl Locator {
    pub const ALL: [Locator; 8] = [
        Locator::ClassName,
        Locator::CssSelector,
        Locator::Id,
        Locator::LinkText,
        Locator::Name,
        Locator::PartialLinkText,
        Locator::TagName,
        Locator::Xpath,
    ];

    /// Case-sensitive lookup by wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locator| locator.as_wire() == name)
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Locator::ClassName => "CLASS_NAME",
            Locator::CssSelector => "CSS_SELECTOR",
            Locator::Id => "ID",
            Locator::LinkText => "LINK_TEXT",
            Locator::Name => "NAME",
            Locator::PartialLinkText => "PARTIAL_LINK_TEXT",
            Locator::TagName => "TAG_NAME",
            Locator::Xpath => "XPATH",
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Closed set of primitive operations an atom can describe.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomOp {
    FindElement { locator: Locator, value: String },
    FindElements { locator: Locator, value: String },
    SelectActiveElement,
    SelectFrameByIndex(i64),
    SelectFrameByIdOrName(String),
    ClearElement,
    Click,
    SendKeys(String),
    ScrollIntoView,
    GetText,
    GetCurrentUrl,
    GetTitle,
    Script { source: String, args: Vec<Value> },
}

/// An atom instantiated from the catalog, ready to be fed to an interaction.
///
/// Consumed by exactly one interaction call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAtom {
    pub name: String,
    pub kind: AtomKind,
    pub op: AtomOp,
}

impl fmt::Display for ResolvedAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locator_wire_names_are_case_sensitive() {
        assert_eq!(Locator::from_wire("CSS_SELECTOR"), Some(Locator::CssSelector));
        assert_eq!(Locator::from_wire("XPATH"), Some(Locator::Xpath));
        assert_eq!(Locator::from_wire("css_selector"), None);
        assert_eq!(Locator::from_wire("Id"), None);
    }

    #[test]
    fn locator_serde_uses_wire_names() {
        let encoded = serde_json::to_value(Locator::PartialLinkText).unwrap();
        assert_eq!(encoded, json!("PARTIAL_LINK_TEXT"));
    }

    #[test]
    fn param_types_check_wire_values() {
        assert!(ParamType::String.accepts(&json!("abc")));
        assert!(!ParamType::String.accepts(&json!(1)));
        assert!(ParamType::Integer.accepts(&json!(3)));
        assert!(!ParamType::Integer.accepts(&json!(1.5)));
        assert!(!ParamType::Integer.accepts(&json!("3")));
        assert!(ParamType::Locator.accepts(&json!("ID")));
        assert!(!ParamType::Locator.accepts(&json!("BY_MAGIC")));
        assert!(ParamType::Any.accepts(&Value::Null));
    }
}
