//! Hiding runtime and IDE classes from filtered output.

use serde::{Deserialize, Serialize};

/// Namespaces hidden by default: the Kotlin and Java runtimes plus
/// JetBrains/IntelliJ annotations.
pub const DEFAULT_SUPPRESSED_PREFIXES: &[&str] = &[
    "kotlin.",
    "kotlinx.",
    "java.",
    "javax.",
    "org.intellij.",
    "org.jetbrains.",
];

/// Prefix set deciding which fully-qualified class names are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuppressionPredicate {
    prefixes: Vec<String>,
}

impl SuppressionPredicate {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Predicate that hides nothing.
    pub fn none() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Whether `class_name` (dot-separated) falls under a suppressed prefix.
    pub fn matches(&self, class_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| class_name.starts_with(prefix.as_str()))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for SuppressionPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSED_PREFIXES.iter().copied())
    }
}
