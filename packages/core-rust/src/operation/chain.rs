use std::any::Any;

use super::{Operation, OperationType, Options};
use crate::error::CloneError;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::validation::ValidationResult;

/// An ordered sequence of operations executed as one.
///
/// The output of stage `i` becomes the input of stage `i + 1`. The chain's
/// input type is that of its first stage and its output type that of its
/// last. A chain is itself an operation and may be nested.
#[derive(Debug, Default)]
pub struct OperationChain {
    operations: Vec<Box<dyn Operation>>,
    options: Options,
}

impl OperationType for OperationChain {
    const TYPE_TAG: &'static str = "graphops.operation.OperationChain";
}

impl OperationChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from already boxed stages.
    #[must_use]
    pub fn from_operations(operations: Vec<Box<dyn Operation>>) -> Self {
        Self {
            operations,
            options: Options::new(),
        }
    }

    /// Appends a stage, returning the chain.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Operation) -> Self {
        self.push(operation);
        self
    }

    pub fn push(&mut self, operation: impl Operation) {
        self.operations.push(Box::new(operation));
    }

    pub fn push_boxed(&mut self, operation: Box<dyn Operation>) {
        self.operations.push(operation);
    }

    #[must_use]
    pub fn operations(&self) -> &[Box<dyn Operation>] {
        &self.operations
    }

    pub fn operations_mut(&mut self) -> &mut Vec<Box<dyn Operation>> {
        &mut self.operations
    }

    #[must_use]
    pub fn into_operations(self) -> Vec<Box<dyn Operation>> {
        self.operations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Copies every stage with its own shallow clone.
    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        let operations = self
            .operations
            .iter()
            .map(|op| op.shallow_clone_boxed())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            operations,
            options: self.options.clone(),
        })
    }
}

impl Operation for OperationChain {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        self.operations
            .first()
            .map_or(TypeRef::Void, |op| op.input_type())
    }

    fn output_type(&self) -> TypeRef {
        self.operations
            .last()
            .map_or(TypeRef::Void, |op| op.output_type())
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn has_input(&self) -> bool {
        self.operations.first().is_some_and(|op| op.has_input())
    }

    fn set_input(&mut self, input: Payload) -> Result<(), InputMismatch> {
        match self.operations.first_mut() {
            Some(first) => first.set_input(input),
            None => input.into_void(Self::TYPE_TAG),
        }
    }

    fn validate_rules(&self, result: &mut ValidationResult) {
        if self.operations.is_empty() {
            result.add_error("operations are required");
            return;
        }
        for (i, op) in self.operations.iter().enumerate() {
            let prefix = format!("stage {i} ({}): ", op.type_name());
            result.merge_prefixed(&prefix, op.validate());
        }
        for (i, pair) in self.operations.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let output = current.output_type();
            let input = next.input_type();
            if !output.is_assignable_to(input) {
                result.add_error(format!(
                    "stage {i} ({}) output {output} is not compatible with stage {} ({}) input {input}",
                    current.type_name(),
                    i + 1,
                    next.type_name(),
                ));
            }
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
    use crate::operation::{GetElements, MultiInput, PageRank, ToEntitySeeds};
    use crate::types::EntitySeed;

    fn seeds_to_elements() -> OperationChain {
        OperationChain::new()
            .with_operation(GetElements::new().with_input([EntitySeed::new("a")]))
            .with_operation(ToEntitySeeds::new())
            .with_operation(GetElements::new())
    }

    #[test]
    fn types_come_from_first_and_last_stage() {
        let chain = seeds_to_elements();
        assert_eq!(chain.input_type(), TypeRef::EntitySeeds);
        assert_eq!(chain.output_type(), TypeRef::Elements);
        assert_eq!(OperationChain::new().output_type(), TypeRef::Void);
    }

    #[test]
    fn compatible_chain_is_valid() {
        let result = seeds_to_elements().validate();
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn empty_chain_is_invalid() {
        assert_eq!(
            OperationChain::new().validate().errors(),
            ["operations are required"]
        );
    }

    #[test]
    fn incompatible_adjacent_stages_are_reported() {
        let chain = OperationChain::new()
            .with_operation(GetElements::new())
            .with_operation(GetElements::new());
        assert_eq!(
            chain.validate().errors(),
            ["stage 0 (GetElements) output Iterable<Element> is not compatible with stage 1 (GetElements) input Iterable<EntitySeed>"]
        );
    }

    #[test]
    fn stage_errors_are_prefixed_with_their_index() {
        let chain = OperationChain::new()
            .with_operation(GetElements::new())
            .with_operation(ToEntitySeeds::new())
            .with_operation(PageRank::new());
        let errors = chain.validate().into_errors();
        assert!(errors.contains(
            &"stage 2 (PageRank): One of maxIterations or tolerance must be set.".to_string()
        ));
    }

    #[test]
    fn set_input_reaches_first_stage() {
        let mut chain = OperationChain::new()
            .with_operation(GetElements::new())
            .with_operation(ToEntitySeeds::new());
        assert!(!chain.has_input());
        chain
            .set_input(Payload::EntitySeeds(vec![EntitySeed::new("x")]))
            .unwrap();
        assert!(chain.has_input());
        assert!(chain.set_input(Payload::Void).is_err());
    }

    #[test]
    fn shallow_clone_copies_each_stage() {
        let chain = seeds_to_elements().with_option("k", "v");
        let mut clone = chain.shallow_clone().unwrap();
        assert_eq!(format!("{clone:?}"), format!("{chain:?}"));

        clone.operations_mut().pop();
        assert_eq!(chain.len(), 3);
        assert_eq!(clone.len(), 2);
    }

    #[test]
    fn shallow_clone_fails_on_streamed_stage() {
        let chain = OperationChain::new()
            .with_operation(GetElements::new().with_streamed_input(std::iter::empty()));
        assert!(chain.shallow_clone().is_err());
    }

    #[test]
    fn nested_chains_validate_recursively() {
        let inner = OperationChain::new();
        let outer = OperationChain::new().with_operation(inner);
        assert_eq!(
            outer.validate().errors(),
            ["stage 0 (OperationChain): operations are required"]
        );
    }
}
