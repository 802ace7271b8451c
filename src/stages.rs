//! Stage vocabulary and alias normalization
//!
//! Each pipeline has a closed, ordered set of canonical stage names plus a
//! many-to-one alias table for caller-supplied synonyms. The registry is an
//! explicit value injected into the lifecycle manager at construction, so
//! tests and config can substitute their own vocabulary.

use crate::error::{LifecycleError, LifecycleResult};
use std::collections::HashMap;

/// Canonical stages of the agent update pipeline, in execution order
const AGENT_STAGES: &[&str] = &[
    "requirements_analysis",
    "tool_generation",
    "prompt_generation",
    "code_generation",
    "validation",
];

/// Accepted synonyms for agent update stages
const AGENT_ALIASES: &[(&str, &str)] = &[
    ("requirements", "requirements_analysis"),
    ("requirements_update", "requirements_analysis"),
    ("tools", "tool_generation"),
    ("tool_update", "tool_generation"),
    ("prompts", "prompt_generation"),
    ("prompt_update", "prompt_generation"),
    ("code", "code_generation"),
    ("code_update", "code_generation"),
    ("test", "validation"),
    ("testing", "validation"),
    ("validate", "validation"),
];

/// Canonical stages of the tool build pipeline, in execution order
const TOOL_STAGES: &[&str] = &[
    "requirements_analysis",
    "schema_design",
    "code_generation",
    "validation",
];

/// Accepted synonyms for tool build stages
const TOOL_ALIASES: &[(&str, &str)] = &[
    ("requirements", "requirements_analysis"),
    ("requirements_update", "requirements_analysis"),
    ("schema", "schema_design"),
    ("code", "code_generation"),
    ("test", "validation"),
    ("testing", "validation"),
];

/// A closed vocabulary of stage names with alias normalization
#[derive(Debug, Clone)]
pub struct StageRegistry {
    canonical: Vec<String>,
    aliases: HashMap<String, String>,
}

impl StageRegistry {
    /// Build a registry from an ordered canonical set and an alias table
    ///
    /// Names are lowercased and trimmed; duplicate canonical entries are
    /// dropped, preserving first-seen order.
    pub fn new<C, A, S, T>(canonical: C, aliases: A) -> Self
    where
        C: IntoIterator<Item = S>,
        A: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut seen = Vec::new();
        for name in canonical {
            let name = name.as_ref().trim().to_lowercase();
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }

        let aliases = aliases
            .into_iter()
            .map(|(alias, target)| {
                (
                    alias.as_ref().trim().to_lowercase(),
                    target.as_ref().trim().to_lowercase(),
                )
            })
            .collect();

        Self {
            canonical: seen,
            aliases,
        }
    }

    /// The built-in agent update pipeline
    pub fn agent_pipeline() -> Self {
        Self::new(AGENT_STAGES.iter().copied(), AGENT_ALIASES.iter().copied())
    }

    /// The built-in tool build pipeline
    pub fn tool_pipeline() -> Self {
        Self::new(TOOL_STAGES.iter().copied(), TOOL_ALIASES.iter().copied())
    }

    /// Canonical stage names in pipeline order
    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }

    /// Number of canonical stages
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// True if the registry has no canonical stages
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// True if `name` is already a canonical stage name
    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonical.iter().any(|s| s == name)
    }

    /// Normalize a caller-supplied stage name to its canonical form
    ///
    /// Lowercases and trims the input, resolves aliases, then checks
    /// membership in the canonical set. Must run before any operation that
    /// accepts a stage name touches the status store.
    pub fn normalize(&self, name: &str) -> LifecycleResult<String> {
        let trimmed = name.trim().to_lowercase();
        if trimmed.is_empty() {
            return Err(LifecycleError::validation("stage name must not be empty"));
        }

        let canonical = match self.aliases.get(&trimmed) {
            Some(target) => target.clone(),
            None => trimmed,
        };

        if !self.is_canonical(&canonical) {
            return Err(LifecycleError::validation(format!(
                "unknown stage '{}': allowed stages are [{}]",
                name.trim(),
                self.canonical.join(", ")
            )));
        }

        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_canonical_name() {
        let registry = StageRegistry::agent_pipeline();
        assert_eq!(
            registry.normalize("requirements_analysis").unwrap(),
            "requirements_analysis"
        );
    }

    #[test]
    fn test_normalize_alias() {
        let registry = StageRegistry::agent_pipeline();
        assert_eq!(
            registry.normalize("requirements_update").unwrap(),
            "requirements_analysis"
        );
        assert_eq!(registry.normalize("prompts").unwrap(), "prompt_generation");
    }

    #[test]
    fn test_normalize_case_and_whitespace() {
        let registry = StageRegistry::agent_pipeline();
        assert_eq!(
            registry.normalize("  Requirements_Update  ").unwrap(),
            "requirements_analysis"
        );
    }

    #[test]
    fn test_unknown_stage_names_allowed_set() {
        let registry = StageRegistry::tool_pipeline();
        let err = registry.normalize("deployment").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("deployment"));
        assert!(msg.contains("schema_design"));
        assert!(msg.contains("requirements_analysis"));
    }

    #[test]
    fn test_empty_stage_name_rejected() {
        let registry = StageRegistry::agent_pipeline();
        assert!(registry.normalize("   ").is_err());
    }

    #[test]
    fn test_custom_vocabulary() {
        let registry = StageRegistry::new(["draft", "review"], [("proofread", "review")]);
        assert_eq!(registry.canonical(), ["draft", "review"]);
        assert_eq!(registry.normalize("proofread").unwrap(), "review");
        assert!(registry.normalize("publish").is_err());
    }

    #[test]
    fn test_pipeline_order_preserved() {
        let registry = StageRegistry::agent_pipeline();
        assert_eq!(registry.canonical()[0], "requirements_analysis");
        assert_eq!(registry.canonical()[4], "validation");
        assert_eq!(registry.len(), 5);
    }
}
