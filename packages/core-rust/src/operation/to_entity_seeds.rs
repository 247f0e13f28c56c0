use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{clone_input, MultiInput, Operation, OperationType, Options};
use crate::error::CloneError;
use crate::input::Input;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::types::Element;

/// Converts elements into entity seeds.
///
/// Entities yield their vertex; edges yield both endpoints.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToEntitySeeds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Input<Element>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl OperationType for ToEntitySeeds {
    const TYPE_TAG: &'static str = "graphops.operation.ToEntitySeeds";
}

impl ToEntitySeeds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        Ok(Self {
            input: clone_input(Self::TYPE_TAG, self.input.as_ref())?,
            options: self.options.clone(),
        })
    }
}

impl Operation for ToEntitySeeds {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::Elements
    }

    fn output_type(&self) -> TypeRef {
        TypeRef::EntitySeeds
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
        self.input = Some(input.into_elements(Self::TYPE_TAG)?.into());
        Ok(())
    }

    fn shallow_clone_boxed(&self) -> Result<Box<dyn Operation>, CloneError> {
        Ok(Box::new(self.shallow_clone()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MultiInput for ToEntitySeeds {
    type Item = Element;

    fn input(&self) -> Option<&Input<Element>> {
        self.input.as_ref()
    }

    fn input_slot(&mut self) -> &mut Option<Input<Element>> {
        &mut self.input
    }
}
