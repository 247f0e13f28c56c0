use graphops_core::{Operation, Options, User};
use uuid::Uuid;

/// Per-execution state passed to every handler.
///
/// Distinct from store-wide configuration: a new context is created for each
/// top-level call and shared by every nested dispatch it triggers.
#[derive(Debug, Clone)]
pub struct Context {
    job_id: Uuid,
    user: User,
    options: Options,
}

impl Context {
    /// A context for `user` with a fresh job id.
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            user,
            options: Options::new(),
        }
    }

    /// Adds a per-call option override, returning the context.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Resolves an option, preferring the context override over the
    /// operation's own value.
    #[must_use]
    pub fn resolve_option<'a>(&'a self, operation: &'a dyn Operation, key: &str) -> Option<&'a str> {
        self.option(key).or_else(|| operation.option(key))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(User::default())
    }
}
