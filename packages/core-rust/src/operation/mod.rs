//! Operation model: the [`Operation`] trait, capability traits, and the
//! built-in operation types.
//!
//! Every operation is a plain value describing a unit of work. It declares
//! its input and output [`TypeRef`]s, validates itself without side effects,
//! and can be shallow-cloned. Handlers are chosen at dispatch time by the
//! operation's [`type_tag`](Operation::type_tag).

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CloneError;
use crate::input::Input;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::validation::{validate_required, FieldDef, ValidationResult};

pub mod add_store_properties;
pub mod chain;
pub mod get_elements;
pub mod page_rank;
pub mod path;
pub mod to_entity_seeds;
pub mod transform;

pub use add_store_properties::AddStoreProperties;
pub use chain::OperationChain;
pub use get_elements::GetElements;
pub use page_rank::PageRank;
pub use path::Path;
pub use to_entity_seeds::ToEntitySeeds;
pub use transform::{function, ElementTransformer, Transform, TransformFunction, TransformStep};

/// Free-form per-execution hints. Order is irrelevant.
pub type Options = BTreeMap<String, String>;

/// Stable identity of a concrete operation type, known without an instance.
pub trait OperationType {
    /// Discriminator used for handler lookup and serialization.
    const TYPE_TAG: &'static str;
}

/// A declarative, validatable, cloneable unit of work.
pub trait Operation: Any + fmt::Debug + Send + Sync {
    /// Stable discriminator of the concrete type.
    fn type_tag(&self) -> &'static str;

    /// Short human-readable type name (the last segment of the tag).
    fn type_name(&self) -> &'static str {
        let tag = self.type_tag();
        tag.rsplit('.').next().unwrap_or(tag)
    }

    fn input_type(&self) -> TypeRef;

    fn output_type(&self) -> TypeRef;

    fn options(&self) -> &Options;

    fn options_mut(&mut self) -> &mut Options;

    /// Looks up a single option.
    fn option(&self, key: &str) -> Option<&str> {
        self.options().get(key).map(String::as_str)
    }

    /// Whether an input value is currently set.
    fn has_input(&self) -> bool;

    /// Replaces the input with the output of a previous stage.
    fn set_input(&mut self, input: Payload) -> Result<(), InputMismatch>;

    /// Fields subject to the generic required-field check.
    fn field_defs(&self) -> Vec<FieldDef> {
        Vec::new()
    }

    /// Type-specific rules, run after the required-field check.
    fn validate_rules(&self, _result: &mut ValidationResult) {}

    /// Runs the required-field check followed by [`validate_rules`](Self::validate_rules).
    ///
    /// Implementations extend `validate_rules` rather than overriding this.
    fn validate(&self) -> ValidationResult {
        let mut result = validate_required(self.type_name(), &self.field_defs());
        self.validate_rules(&mut result);
        result
    }

    /// Object-safe form of the concrete type's `shallow_clone`.
    fn shallow_clone_boxed(&self) -> Result<Box<dyn Operation>, CloneError>;

    fn as_any(&self) -> &dyn Any;

    /// Sets one option, returning the operation.
    fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.options_mut().insert(key.into(), value.into());
        self
    }

    /// Replaces all options, returning the operation.
    fn with_options(mut self, options: Options) -> Self
    where
        Self: Sized,
    {
        *self.options_mut() = options;
        self
    }
}

/// Operations whose input is an ordered sequence of items.
pub trait MultiInput: Operation + Sized {
    type Item: Clone + Send + Sync + 'static;

    fn input(&self) -> Option<&Input<Self::Item>>;

    fn input_slot(&mut self) -> &mut Option<Input<Self::Item>>;

    /// Sets materialized input values, returning the operation.
    fn with_input(mut self, items: impl IntoIterator<Item = Self::Item>) -> Self {
        *self.input_slot() = Some(Input::from_values(items));
        self
    }

    /// Sets a one-shot streamed input, returning the operation.
    fn with_streamed_input(
        mut self,
        items: impl Iterator<Item = Self::Item> + Send + 'static,
    ) -> Self {
        *self.input_slot() = Some(Input::streamed(items));
        self
    }

    /// Removes the input.
    fn clear_input(&mut self) {
        *self.input_slot() = None;
    }
}

/// Copies an optional input for a shallow clone.
pub(crate) fn clone_input<T>(
    operation: &'static str,
    input: Option<&Input<T>>,
) -> Result<Option<Input<T>>, CloneError> {
    input
        .map(|i| {
            i.try_clone().ok_or(CloneError::StreamedInput {
                operation,
                field: "input",
            })
        })
        .transpose()
}
