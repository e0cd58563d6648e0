use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Malformed or contradictory schema. Fatal at load time; no partially
/// valid class, enum or schema is ever produced.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("schema json is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}

impl SchemaError {
    /// The aggregated validation tree, if this is a validation failure.
    #[must_use]
    pub const fn tree(&self) -> Option<&ErrorTree> {
        match self {
            Self::Validation(tree) => Some(tree),
            Self::Parse(_) => None,
        }
    }
}

impl From<ErrorTree> for SchemaError {
    fn from(tree: ErrorTree) -> Self {
        Self::Validation(tree)
    }
}

///
/// ErrorTree
///
/// Route-keyed collection of validation messages. Nodes add their own
/// messages and nest children under the id they were validated for, so a
/// single pass reports every problem in a class.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Nest `child` under `route`, merging with anything already there.
    pub fn add_child(&mut self, route: impl Into<String>, child: Self) {
        if child.is_empty() {
            return;
        }

        let slot = self.children.entry(route.into()).or_default();
        slot.merge(child);
    }

    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        for (route, child) in other.children {
            self.add_child(route, child);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of messages in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn child(&self, route: &str) -> Option<&Self> {
        self.children.get(route)
    }

    /// Flatten into `route: message` lines.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<String>) {
        for message in &self.messages {
            if prefix.is_empty() {
                out.push(message.clone());
            } else {
                out.push(format!("{prefix}: {message}"));
            }
        }

        for (route, child) in &self.children {
            let path = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix}.{route}")
            };
            child.flatten_into(&path, out);
        }
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten().join("; "))
    }
}
