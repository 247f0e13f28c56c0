use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Operation, OperationType, Options};
use crate::error::CloneError;
use crate::payload::{InputMismatch, Payload};
use crate::properties::StoreProperties;
use crate::type_ref::TypeRef;
use crate::validation::{FieldDef, ValidationResult};

/// Adds a property set to the store's graph library.
///
/// When `parent_properties_id` is set, the named library entry is merged
/// underneath `store_properties` before adding.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStoreProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    store_properties: Option<StoreProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_properties_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl OperationType for AddStoreProperties {
    const TYPE_TAG: &'static str = "graphops.operation.AddStoreProperties";
}

impl AddStoreProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store_properties(mut self, properties: StoreProperties) -> Self {
        self.store_properties = Some(properties);
        self
    }

    #[must_use]
    pub fn with_parent_properties_id(mut self, id: impl Into<String>) -> Self {
        self.parent_properties_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn store_properties(&self) -> Option<&StoreProperties> {
        self.store_properties.as_ref()
    }

    #[must_use]
    pub fn parent_properties_id(&self) -> Option<&str> {
        self.parent_properties_id.as_deref()
    }

    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        Ok(self.clone())
    }
}

impl Operation for AddStoreProperties {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::Void
    }

    fn output_type(&self) -> TypeRef {
        TypeRef::Void
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    fn has_input(&self) -> bool {
        false
    }

    fn set_input(&mut self, input: Payload) -> Result<(), InputMismatch> {
        input.into_void(Self::TYPE_TAG)
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![FieldDef::required(
            "storeProperties",
            self.store_properties.is_some(),
        )]
    }

    fn validate_rules(&self, result: &mut ValidationResult) {
        if self
            .store_properties
            .as_ref()
            .is_some_and(|properties| properties.id.is_none())
        {
            result.add_error("storeProperties must have an id");
        }
    }

    fn shallow_clone_boxed(&self) -> Result<Box<dyn Operation>, CloneError> {
        Ok(Box::new(self.shallow_clone()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
