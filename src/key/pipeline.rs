//! Pluggable hook chains applied to every pattern before it reaches the tree.
//!
//! Validation sees the pattern exactly as the caller typed it. Conversion runs
//! afterwards and produces the form that is stored and queried.

use crate::error::HookError;

/// Checks a raw pattern before conversion.
pub trait Validator: Send + Sync {
    /// Returns an error if the pattern must be rejected.
    fn validate(&self, pattern: &str) -> Result<(), HookError>;
}

/// Rewrites a validated pattern into its stored form.
pub trait Converter: Send + Sync {
    /// Returns the converted pattern.
    fn convert(&self, pattern: &str) -> String;
}

impl<F> Validator for F
where
    F: Fn(&str) -> Result<(), HookError> + Send + Sync,
{
    fn validate(&self, pattern: &str) -> Result<(), HookError> {
        self(pattern)
    }
}

impl<F> Converter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn convert(&self, pattern: &str) -> String {
        self(pattern)
    }
}

type ValidatorHook = Box<dyn Fn(&str) -> Result<(), HookError> + Send + Sync>;
type ConverterHook = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Ordered chain of validator hooks. Stops at the first failure.
#[derive(Default)]
pub struct ValidatorPipeline {
    hooks: Vec<ValidatorHook>,
}

impl ValidatorPipeline {
    /// Create an empty pipeline, which accepts every pattern.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook to the end of the chain.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl Validator for ValidatorPipeline {
    fn validate(&self, pattern: &str) -> Result<(), HookError> {
        self.hooks.iter().try_for_each(|hook| hook(pattern))
    }
}

/// Ordered chain of converter hooks, each fed the previous hook's output.
#[derive(Default)]
pub struct ConverterPipeline {
    hooks: Vec<ConverterHook>,
}

impl ConverterPipeline {
    /// Create an empty pipeline, which returns patterns unchanged.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook to the end of the chain.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl Converter for ConverterPipeline {
    fn convert(&self, pattern: &str) -> String {
        self.hooks
            .iter()
            .fold(pattern.to_owned(), |acc, hook| hook(&acc))
    }
}
