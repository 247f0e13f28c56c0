use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{clone_input, GetElements, MultiInput, Operation, OperationType, Options};
use crate::error::CloneError;
use crate::input::Input;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::types::EntitySeed;
use crate::validation::{FieldDef, ValidationResult};
use crate::view::View;

/// Retrieves every path starting from a set of seed vertices.
///
/// Each entry of `operations` is one hop. The seeds are supplied once on the
/// `Path` itself; hop `n` is seeded with the vertices reached by hop `n - 1`.
/// The result holds one edge sequence per seed and is never flattened.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operations: Option<Vec<GetElements>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Input<EntitySeed>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl OperationType for Path {
    const TYPE_TAG: &'static str = "graphops.operation.Path";
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = GetElements>) -> Self {
        self.operations = Some(operations.into_iter().collect());
        self
    }

    #[must_use]
    pub fn operations(&self) -> Option<&[GetElements]> {
        self.operations.as_deref()
    }

    pub fn operations_mut(&mut self) -> Option<&mut Vec<GetElements>> {
        self.operations.as_mut()
    }

    pub fn set_operations(&mut self, operations: Option<Vec<GetElements>>) {
        self.operations = operations;
    }

    /// Copies the operation. Each hop is copied by its own shallow clone.
    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        let operations = self
            .operations
            .as_ref()
            .map(|ops| {
                ops.iter()
                    .map(GetElements::shallow_clone)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            operations,
            input: clone_input(Self::TYPE_TAG, self.input.as_ref())?,
            options: self.options.clone(),
        })
    }
}

impl Operation for Path {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::EntitySeeds
    }

    fn output_type(&self) -> TypeRef {
        TypeRef::NestedEdges
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
        self.input = Some(input.into_entity_seeds(Self::TYPE_TAG)?.into());
        Ok(())
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![FieldDef::required("operations", self.operations.is_some())]
    }

    fn validate_rules(&self, result: &mut ValidationResult) {
        match self.operations.as_deref() {
            None | Some([]) => result.add_error("operations are required"),
            Some(operations) => {
                for op in operations {
                    if op.has_input() {
                        result.add_error(format!(
                            "The supplied operations should not have an input. \
                             The input should be set on the outer {} operation.",
                            self.type_name()
                        ));
                    }
                    if op.view().is_some_and(View::has_entities) {
                        result.add_error("The supplied operation views should not contain any Entities");
                    }
                }
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

impl MultiInput for Path {
    type Item = EntitySeed;

    fn input(&self) -> Option<&Input<EntitySeed>> {
        self.input.as_ref()
    }

    fn input_slot(&mut self) -> &mut Option<Input<EntitySeed>> {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop() -> GetElements {
        GetElements::new().with_view(View::new().edge("knows"))
    }

    fn valid_path() -> Path {
        Path::new()
            .with_input([EntitySeed::new("a"), EntitySeed::new("b")])
            .with_operations([hop(), hop()])
    }

    #[test]
    fn two_hops_without_inputs_are_valid() {
        let result = valid_path().validate();
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn missing_operations_are_reported() {
        let result = Path::new().with_input([EntitySeed::new("a")]).validate();
        assert!(!result.is_valid());
        assert!(result.errors().contains(&"operations are required".to_string()));
        assert!(result
            .errors()
            .contains(&"operations is required for: Path".to_string()));
    }

    #[test]
    fn empty_operations_are_reported() {
        let result = Path::new().with_operations([]).validate();
        assert_eq!(result.errors(), ["operations are required"]);
    }

    #[test]
    fn hop_with_input_is_rejected() {
        let path = Path::new().with_operations([hop().with_input([EntitySeed::new("x")]), hop()]);
        let result = path.validate();
        assert_eq!(
            result.errors(),
            ["The supplied operations should not have an input. The input should be set on the outer Path operation."]
        );
    }

    #[test]
    fn hop_with_entity_view_is_rejected() {
        let path = Path::new().with_operations([GetElements::new().with_view(View::new().entity("person"))]);
        let result = path.validate();
        assert_eq!(
            result.errors(),
            ["The supplied operation views should not contain any Entities"]
        );
    }

    #[test]
    fn every_offending_hop_is_reported() {
        let bad = || {
            GetElements::new()
                .with_input([EntitySeed::new("x")])
                .with_view(View::new().entity("person"))
        };
        let result = Path::new().with_operations([bad(), bad()]).validate();
        assert_eq!(result.errors().len(), 4);
    }

    #[test]
    fn validation_is_repeatable() {
        let path = Path::new().with_operations([]);
        assert_eq!(path.validate(), path.validate());
    }

    #[test]
    fn declared_types_are_fixed() {
        let path = valid_path();
        assert_eq!(path.input_type(), TypeRef::EntitySeeds);
        assert_eq!(path.output_type(), TypeRef::NestedEdges);
        assert_eq!(Path::new().output_type(), TypeRef::NestedEdges);
    }

    #[test]
    fn shallow_clone_copies_hops_independently() {
        let path = valid_path().with_option("k", "v");
        let mut clone = path.shallow_clone().unwrap();
        assert_eq!(clone, path);

        clone.operations_mut().unwrap()[0].set_view(None);
        clone.operations_mut().unwrap().push(hop());
        clone.options_mut().clear();

        assert_eq!(path.operations().map(<[_]>::len), Some(2));
        assert!(path.operations().unwrap()[0].view().is_some());
        assert_eq!(path.option("k"), Some("v"));
    }

    #[test]
    fn shallow_clone_shares_seed_values() {
        let path = valid_path();
        let clone = path.shallow_clone().unwrap();
        match (path.input(), clone.input()) {
            (Some(Input::Values(a)), Some(Input::Values(b))) => {
                assert!(std::sync::Arc::ptr_eq(a, b));
            }
            other => panic!("unexpected inputs: {other:?}"),
        }
    }

    #[test]
    fn shallow_clone_fails_when_a_hop_cannot_be_copied() {
        let path = Path::new().with_operations([
            hop(),
            GetElements::new().with_streamed_input(std::iter::empty()),
        ]);
        assert!(matches!(
            path.shallow_clone(),
            Err(CloneError::StreamedInput {
                operation: "graphops.operation.GetElements",
                ..
            })
        ));
    }
}
