use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{clone_input, MultiInput, Operation, OperationType, Options};
use crate::error::CloneError;
use crate::input::Input;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::types::{EntitySeed, IncludeIncomingOutgoing};
use crate::view::View;

/// Retrieves the elements adjacent to a set of seed vertices.
///
/// Also used as the per-hop step inside [`Path`](super::Path).
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetElements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Input<EntitySeed>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    view: Option<View>,
    #[serde(default)]
    include_incoming_out_going: IncludeIncomingOutgoing,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl OperationType for GetElements {
    const TYPE_TAG: &'static str = "graphops.operation.GetElements";
}

impl GetElements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: IncludeIncomingOutgoing) -> Self {
        self.include_incoming_out_going = direction;
        self
    }

    #[must_use]
    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: Option<View>) {
        self.view = view;
    }

    #[must_use]
    pub fn direction(&self) -> IncludeIncomingOutgoing {
        self.include_incoming_out_going
    }

    /// Copies the operation. Fails if the input is a one-shot stream.
    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        Ok(Self {
            input: clone_input(Self::TYPE_TAG, self.input.as_ref())?,
            view: self.view.clone(),
            include_incoming_out_going: self.include_incoming_out_going,
            options: self.options.clone(),
        })
    }
}

impl Operation for GetElements {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::EntitySeeds
    }

    fn output_type(&self) -> TypeRef {
        TypeRef::Elements
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

    fn shallow_clone_boxed(&self) -> Result<Box<dyn Operation>, CloneError> {
        Ok(Box::new(self.shallow_clone()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MultiInput for GetElements {
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

    #[test]
    fn builder_populates_fields() {
        let op = GetElements::new()
            .with_input([EntitySeed::new("a")])
            .with_view(View::new().edge("knows"))
            .with_direction(IncludeIncomingOutgoing::Outgoing)
            .with_option("k", "v");

        assert_eq!(op.input().and_then(Input::values).map(<[_]>::len), Some(1));
        assert!(op.view().is_some_and(View::has_edges));
        assert_eq!(op.direction(), IncludeIncomingOutgoing::Outgoing);
        assert_eq!(op.option("k"), Some("v"));
        assert!(op.validate().is_valid());
    }

    #[test]
    fn set_input_accepts_seeds_only() {
        let mut op = GetElements::new();
        op.set_input(Payload::EntitySeeds(vec![EntitySeed::new(1)])).unwrap();
        assert!(op.has_input());

        let err = op.set_input(Payload::Elements(vec![])).unwrap_err();
        assert_eq!(err.expected, TypeRef::EntitySeeds);
    }

    #[test]
    fn shallow_clone_is_equal_and_independent() {
        let op = GetElements::new()
            .with_input([EntitySeed::new("a")])
            .with_option("k", "v");
        let mut clone = op.shallow_clone().unwrap();
        assert_eq!(clone, op);

        clone.options_mut().insert("k".into(), "changed".into());
        clone.set_view(Some(View::new().entity("e")));
        assert_eq!(op.option("k"), Some("v"));
        assert!(op.view().is_none());
    }

    #[test]
    fn shallow_clone_fails_on_streamed_input() {
        let op = GetElements::new().with_streamed_input(std::iter::once(EntitySeed::new("a")));
        let err = op.shallow_clone().unwrap_err();
        assert_eq!(
            err,
            CloneError::StreamedInput {
                operation: GetElements::TYPE_TAG,
                field: "input"
            }
        );
    }
}
