use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use super::{clone_input, MultiInput, Operation, OperationType, Options};
use crate::error::CloneError;
use crate::input::Input;
use crate::payload::{InputMismatch, Payload};
use crate::type_ref::TypeRef;
use crate::types::{Element, Value};

/// A function computing one property value from a selection of properties.
///
/// Missing properties are passed as `None`.
pub trait TransformFunction: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, args: &[Option<&Value>]) -> anyhow::Result<Value>;
}

struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> TransformFunction for FnTransform<F>
where
    F: Fn(&[Option<&Value>]) -> anyhow::Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, args: &[Option<&Value>]) -> anyhow::Result<Value> {
        (self.f)(args)
    }
}

/// Wraps a closure as a named [`TransformFunction`].
pub fn function<F>(name: impl Into<String>, f: F) -> Arc<dyn TransformFunction>
where
    F: Fn(&[Option<&Value>]) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(FnTransform {
        name: name.into(),
        f,
    })
}

/// select → apply → project.
#[derive(Clone)]
pub struct TransformStep {
    pub selection: Vec<String>,
    pub function: Arc<dyn TransformFunction>,
    pub projection: String,
}

impl fmt::Debug for TransformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformStep")
            .field("selection", &self.selection)
            .field("function", &self.function.name())
            .field("projection", &self.projection)
            .finish()
    }
}

/// Steps are equal when they share the same function instance.
impl PartialEq for TransformStep {
    fn eq(&self, other: &Self) -> bool {
        self.selection == other.selection
            && self.projection == other.projection
            && Arc::ptr_eq(&self.function, &other.function)
    }
}

/// Ordered property transformations applied to each element.
///
/// Functions are immutable and shared between copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTransformer {
    steps: Vec<TransformStep>,
}

impl ElementTransformer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step writing `function(selection...)` into `projection`.
    #[must_use]
    pub fn with_step<I, S>(
        mut self,
        selection: I,
        function: Arc<dyn TransformFunction>,
        projection: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.push(TransformStep {
            selection: selection.into_iter().map(Into::into).collect(),
            function,
            projection: projection.into(),
        });
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Applies every step in order. Later steps see earlier projections.
    pub fn apply(&self, element: &mut Element) -> anyhow::Result<()> {
        for step in &self.steps {
            let value = {
                let properties = element.properties();
                let args: Vec<Option<&Value>> =
                    step.selection.iter().map(|k| properties.get(k)).collect();
                step.function
                    .apply(&args)
                    .with_context(|| format!("transform function {} failed", step.function.name()))?
            };
            element.properties_mut().insert(step.projection.clone(), value);
        }
        Ok(())
    }
}

/// Applies an [`ElementTransformer`] to each input element.
///
/// The transformer holds function objects and has no encoded form.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Input<Element>>,
    #[serde(skip)]
    element_transformer: Option<ElementTransformer>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: Options,
}

impl OperationType for Transform {
    const TYPE_TAG: &'static str = "graphops.operation.Transform";
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transformer(mut self, transformer: ElementTransformer) -> Self {
        self.element_transformer = Some(transformer);
        self
    }

    #[must_use]
    pub fn element_transformer(&self) -> Option<&ElementTransformer> {
        self.element_transformer.as_ref()
    }

    pub fn set_element_transformer(&mut self, transformer: Option<ElementTransformer>) {
        self.element_transformer = transformer;
    }

    pub fn shallow_clone(&self) -> Result<Self, CloneError> {
        Ok(Self {
            input: clone_input(Self::TYPE_TAG, self.input.as_ref())?,
            element_transformer: self.element_transformer.clone(),
            options: self.options.clone(),
        })
    }
}

impl Operation for Transform {
    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn input_type(&self) -> TypeRef {
        TypeRef::Elements
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

impl MultiInput for Transform {
    type Item = Element;

    fn input(&self) -> Option<&Input<Element>> {
        self.input.as_ref()
    }

    fn input_slot(&mut self) -> &mut Option<Input<Element>> {
        &mut self.input
    }
}
