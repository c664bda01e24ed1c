use crate::workflow::WorkflowGraph;
use serde::Serialize;
use tracing::debug;

mod connection;
pub mod rules;

pub use connection::check_connection;
use rules::register_default_rules;
pub use rules::{
    EndpointRequiredRule, ScannerFault, ScannerWiringRule, SingletonRule, ValidationRule,
    scanner_fault,
};

/// The outcome of a structural check: `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Runs a set of [`ValidationRule`]s over a graph and collects every message.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

pub struct ValidatorBuilder {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        let mut rules: Vec<Box<dyn ValidationRule>> = Vec::new();
        register_default_rules(&mut rules);
        Self { rules }
    }

    /// Starts from no rules at all, for callers assembling their own set.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> Validator {
        Validator { rules: self.rules }
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Validator {
    fn default() -> Self {
        ValidatorBuilder::new().build()
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Evaluates every rule in registration order; nothing short-circuits.
    pub fn validate(&self, graph: &WorkflowGraph) -> ValidationReport {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let before = errors.len();
            rule.check(graph, &mut errors);
            if errors.len() > before {
                debug!(rule = rule.name(), count = errors.len() - before, "Validation rule failed");
            }
        }
        ValidationReport::from_errors(errors)
    }
}

/// Validates a graph against the default rule set.
pub fn validate(graph: &WorkflowGraph) -> ValidationReport {
    Validator::default().validate(graph)
}
