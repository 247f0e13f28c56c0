use graphops_core::{MultiInput, OperationType, Payload, Transform};

use super::consumed;
use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Applies the operation's transformer to a copy of each input element.
///
/// Without a transformer the elements pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformHandler;

impl OperationHandler for TransformHandler {
    type Operation = Transform;

    fn do_operation(
        &self,
        operation: &Transform,
        _context: &Context,
        _store: &Store,
    ) -> anyhow::Result<Payload> {
        let Some(input) = operation.input() else {
            return Ok(Payload::Elements(Vec::new()));
        };
        let mut elements = input.drain().ok_or_else(|| consumed(Transform::TYPE_TAG))?;
        if let Some(transformer) = operation.element_transformer() {
            for element in &mut elements {
                transformer.apply(element)?;
            }
        }
        Ok(Payload::Elements(elements))
    }
}

#[cfg(test)]
mod tests {
    use graphops_core::operation::function;
    use graphops_core::{ElementTransformer, Entity, OperationError, Value};

    use super::*;
    use crate::handlers::fixtures;

    fn label() -> ElementTransformer {
        let concat = function("concat", |args| {
            let parts: Vec<String> = args
                .iter()
                .map(|v| v.and_then(Value::as_str).unwrap_or("?").to_string())
                .collect();
            Ok(Value::String(parts.join("-")))
        });
        ElementTransformer::new().with_step(["first", "last"], concat, "label")
    }

    #[test]
    fn projects_function_result_into_each_element() {
        let op = Transform::new()
            .with_input([
                Entity::new("person", 1)
                    .with_property("first", "ada")
                    .with_property("last", "lovelace")
                    .into(),
                Entity::new("person", 2).with_property("first", "alan").into(),
            ])
            .with_transformer(label());
        let elements = fixtures::store()
            .execute(&op, &Context::default())
            .unwrap()
            .into_elements("test")
            .unwrap();
        let labels: Vec<_> = elements
            .iter()
            .map(|e| e.properties()["label"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(labels, ["ada-lovelace", "alan-?"]);
    }

    #[test]
    fn original_input_is_untouched() {
        let op = Transform::new()
            .with_input([Entity::new("person", 1).into()])
            .with_transformer(label());
        fixtures::store().execute(&op, &Context::default()).unwrap();
        let original = op.input().and_then(|i| i.values()).unwrap();
        assert!(original[0].properties().is_empty());
    }

    #[test]
    fn function_errors_become_execution_failures() {
        let failing = function("explode", |_| anyhow::bail!("boom"));
        let op = Transform::new()
            .with_input([Entity::new("person", 1).into()])
            .with_transformer(ElementTransformer::new().with_step(["x"], failing, "y"));
        let err = fixtures::store()
            .execute(&op, &Context::default())
            .unwrap_err();
        assert!(matches!(err, OperationError::Execution { .. }));
        assert!(err.to_string().contains("transform function explode failed"));
        assert!(err.to_string().contains("boom"));
    }
}
