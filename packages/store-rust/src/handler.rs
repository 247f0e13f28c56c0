//! Handler traits.
//!
//! [`OperationHandler`] is the typed form implemented by most handlers. The
//! registry stores the type-erased [`Handler`]; [`TypedHandler`] adapts one to
//! the other by downcasting the operation.

use std::fmt;

use graphops_core::{Operation, OperationType, Payload};

use crate::context::Context;
use crate::store::Store;

/// Type-erased executor stored in the registry.
///
/// Implement this directly for handlers serving several operation types,
/// such as fallback handlers.
pub trait Handler: Send + Sync + 'static {
    fn handle(
        &self,
        operation: &dyn Operation,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload>;
}

/// Executor bound to one concrete operation type.
pub trait OperationHandler: Send + Sync + 'static {
    type Operation: Operation + OperationType;

    fn do_operation(
        &self,
        operation: &Self::Operation,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload>;
}

/// Adapts an [`OperationHandler`] into a [`Handler`].
pub struct TypedHandler<H>(H);

impl<H> TypedHandler<H> {
    pub fn new(handler: H) -> Self {
        Self(handler)
    }
}

impl<H: OperationHandler> fmt::Debug for TypedHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedHandler")
            .field(&H::Operation::TYPE_TAG)
            .finish()
    }
}

impl<H: OperationHandler> Handler for TypedHandler<H> {
    fn handle(
        &self,
        operation: &dyn Operation,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let Some(typed) = operation.as_any().downcast_ref::<H::Operation>() else {
            anyhow::bail!(
                "handler for {} cannot execute {}",
                H::Operation::TYPE_TAG,
                operation.type_tag()
            );
        };
        self.0.do_operation(typed, context, store)
    }
}
