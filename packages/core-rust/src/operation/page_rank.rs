use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Operation, OperationType, Options};
use crate::error::CloneError;
use crate::frame::GraphFrame;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::validation::ValidationResult;

fn default_reset_probability() -> f64 {
    PageRank::DEFAULT_RESET_PROBABILITY
}

/// Computes a page-rank score for every vertex of a [`GraphFrame`].
///
/// Exactly one of `max_iterations` and `tolerance` must be set. The frame is
/// transient and is not part of the encoded form.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRank {
    #[serde(skip)]
    input: Option<Arc<GraphFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tolerance: Option<f64>,
    #[serde(default = "default_reset_probability")]
    reset_probability: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            input: None,
            max_iterations: None,
            tolerance: None,
            reset_probability: Self::DEFAULT_RESET_PROBABILITY,
            options: Options::new(),
        }
    }
}

impl OperationType for PageRank {
    const TYPE_TAG: &'static str = "graphops.operation.PageRank";
}

impl PageRank {
    pub const DEFAULT_RESET_PROBABILITY: f64 = 0.15;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(mut self, frame: impl Into<Arc<GraphFrame>>) -> Self {
        self.input = Some(frame.into());
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    #[must_use]
    pub fn with_reset_probability(mut self, reset_probability: f64) -> Self {
        self.reset_probability = reset_probability;
        self
    }

    #[must_use]
    pub fn input(&self) -> Option<&Arc<GraphFrame>> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn max_iterations(&self) -> Option<u32> {
        self.max_iterations
    }

    #[must_use]
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    #[must_use]
    pub fn reset_probability(&self) -> f64 {
        self.reset_probability
    }

    /// Copies the operation. The frame is shared, never duplicated.
    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        Ok(Self {
            input: self.input.clone(),
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            reset_probability: self.reset_probability,
            options: self.options.clone(),
        })
    }
}

impl Operation for PageRank {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::GraphFrame
    }

    fn output_type(&self) -> TypeRef {
        TypeRef::GraphFrame
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn has_input(&self) -> bool {
        self.input.is_some()
    }

    fn set_input(&mut self, input: Payload) -> Result<(), InputMismatch> {
        self.input = Some(input.into_graph_frame(Self::TYPE_TAG)?);
        Ok(())
    }

    fn validate_rules(&self, result: &mut ValidationResult) {
        match (self.max_iterations, self.tolerance) {
            (Some(_), Some(_)) => {
                result.add_error("Only one of maxIterations or tolerance should be set.");
            }
            (None, None) => result.add_error("One of maxIterations or tolerance must be set."),
            _ => {}
        }
        if let Some(tolerance) = self.tolerance {
            if tolerance.is_nan() || tolerance <= 0.0 {
                result.add_error(format!("tolerance must be greater than 0, was {tolerance}"));
            }
        }
        if !(0.0..=1.0).contains(&self.reset_probability) {
            result.add_error(format!(
                "resetProbability must be between 0 and 1, was {}",
                self.reset_probability
            ));
        }
    }

    fn shallow_clone_boxed(&self) -> Result<Box<dyn Operation>, CloneError> {
        Ok(Box::new(self.shallow_clone()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_object() -> PageRank {
        PageRank::new()
            .with_input(GraphFrame::default())
            .with_max_iterations(1)
    }

    #[test]
    fn builder_populates_fields() {
        let op = test_object();
        assert!(op.input().is_some());
        assert_eq!(op.max_iterations(), Some(1));
        assert_eq!(op.reset_probability(), PageRank::DEFAULT_RESET_PROBABILITY);
    }

    #[test]
    fn exactly_one_limit_is_valid() {
        assert!(test_object().validate().is_valid());
        assert!(PageRank::new().with_tolerance(0.1).validate().is_valid());
    }

    #[test]
    fn both_limits_are_invalid() {
        let op = PageRank::new()
            .with_input(GraphFrame::default())
            .with_max_iterations(1)
            .with_tolerance(0.1);
        assert!(!op.validate().is_valid());
    }

    #[test]
    fn neither_limit_is_invalid() {
        let op = PageRank::new().with_input(GraphFrame::default());
        assert_eq!(
            op.validate().errors(),
            ["One of maxIterations or tolerance must be set."]
        );
    }

    #[test]
    fn reset_probability_out_of_range_is_invalid() {
        let op = test_object().with_reset_probability(1.5);
        assert!(!op.validate().is_valid());
    }

    #[test]
    fn shallow_clone_shares_frame() {
        let op = test_object();
        let clone = op.shallow_clone().unwrap();
        assert_eq!(clone, op);
        assert!(Arc::ptr_eq(op.input().unwrap(), clone.input().unwrap()));
        assert_eq!(clone.tolerance(), op.tolerance());
        assert_eq!(clone.max_iterations(), op.max_iterations());
    }

    #[test]
    fn tolerance_must_be_positive() {
        for tolerance in [0.0, -0.5, f64::NAN] {
            let result = PageRank::new().with_tolerance(tolerance).validate();
            assert!(!result.is_valid(), "tolerance {tolerance} was accepted");
            assert!(result.errors()[0].starts_with("tolerance must be greater than 0"));
        }
        assert!(PageRank::new().with_tolerance(1e-6).validate().is_valid());
    }
}
