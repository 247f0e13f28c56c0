//! Failure kinds surfaced by validation, cloning, and dispatch.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned when executing an operation.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// One or more structural rule violations. Raised before any handler runs.
    #[error("{operation} failed validation: {}", errors.join("; "))]
    Validation {
        operation: &'static str,
        errors: Vec<String>,
    },
    /// No handler is bound to the operation's type tag.
    #[error("no handler registered for operation type {operation}")]
    NoHandlerRegistered { operation: &'static str },
    /// A handler failed while doing its work.
    #[error("failed to execute {operation}: {message}")]
    Execution {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    /// An operation could not be copied.
    #[error(transparent)]
    Clone(#[from] CloneError),
    /// A chain stage failed. Added once per enclosing chain.
    #[error("chain stage {index} ({operation}) failed: {source}")]
    ChainStage {
        index: usize,
        operation: &'static str,
        #[source]
        source: Box<OperationError>,
    },
}

impl OperationError {
    /// An execution failure with no underlying cause.
    pub fn execution(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Execution {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary handler failure.
    ///
    /// If `error` already is an `OperationError` it is returned unchanged, so
    /// failures crossing nested dispatches are wrapped exactly once.
    pub fn wrap(operation: &'static str, error: anyhow::Error) -> Self {
        match error.downcast::<OperationError>() {
            Ok(existing) => existing,
            Err(error) => Self::Execution {
                operation,
                message: format!("{error:#}"),
                source: Some(error.into()),
            },
        }
    }

    /// Records that this failure happened in stage `index` of a chain, where
    /// the stage is an `operation`.
    #[must_use]
    pub fn in_stage(self, index: usize, operation: &'static str) -> Self {
        Self::ChainStage {
            index,
            operation,
            source: Box::new(self),
        }
    }

    /// The failure underneath every chain stage layer.
    #[must_use]
    pub fn root(&self) -> &OperationError {
        let mut current = self;
        while let Self::ChainStage { source, .. } = current {
            current = source;
        }
        current
    }

    /// Index of the failing stage in the outermost chain.
    #[must_use]
    pub fn stage(&self) -> Option<usize> {
        match self {
            Self::ChainStage { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Stage indices from the outermost chain down to the innermost.
    #[must_use]
    pub fn stage_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::ChainStage { index, source, .. } = current {
            path.push(*index);
            current = source;
        }
        path
    }
}

/// Failure to produce an independent copy of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CloneError {
    /// The field holds a one-shot stream; copying it would alias the original.
    #[error("cannot clone {operation}: field `{field}` holds a one-shot streamed input")]
    StreamedInput {
        operation: &'static str,
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_leaves_operation_errors_untouched() {
        let inner = OperationError::NoHandlerRegistered { operation: "a.B" };
        let wrapped = OperationError::wrap("x.Y", anyhow::Error::new(inner));
        assert!(matches!(
            wrapped,
            OperationError::NoHandlerRegistered { operation: "a.B" }
        ));
    }

    #[test]
    fn wrap_converts_foreign_errors_once() {
        let wrapped = OperationError::wrap("x.Y", anyhow::anyhow!("disk on fire"));
        match &wrapped {
            OperationError::Execution {
                operation,
                message,
                source,
            } => {
                assert_eq!(*operation, "x.Y");
                assert_eq!(message, "disk on fire");
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let rewrapped = OperationError::wrap("z.Z", anyhow::Error::new(wrapped));
        assert!(matches!(
            rewrapped,
            OperationError::Execution { operation: "x.Y", .. }
        ));
    }

    #[test]
    fn stage_layers_nest_outermost_first() {
        let err = OperationError::NoHandlerRegistered { operation: "x.Y" }
            .in_stage(1, "x.Y")
            .in_stage(2, "x.Chain");
        assert_eq!(err.stage(), Some(2));
        assert_eq!(err.stage_path(), [2, 1]);
        assert!(matches!(
            err.root(),
            OperationError::NoHandlerRegistered { operation: "x.Y" }
        ));
        assert_eq!(
            err.to_string(),
            "chain stage 2 (x.Chain) failed: chain stage 1 (x.Y) failed: \
             no handler registered for operation type x.Y"
        );
    }

    #[test]
    fn errors_outside_chains_have_no_stage() {
        let err = OperationError::Validation {
            operation: "x.Y",
            errors: vec!["a".into(), "b".into()],
        };
        assert!(err.stage().is_none());
        assert!(err.stage_path().is_empty());
        assert!(matches!(err.root(), OperationError::Validation { .. }));
        assert_eq!(err.to_string(), "x.Y failed validation: a; b");
    }
}
