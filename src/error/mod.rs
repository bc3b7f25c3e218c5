//! The unified error handling system for the gateways.

use std::fmt::Display;

// 1. Core Types
pub use types::GatewayError;

/// A unified `Result` type for the entire crate.
///
/// Every gateway operation that can fail returns this type.
pub type Result<T> = std::result::Result<T, GatewayError>;

// 2. Module declarations
pub mod macros;
pub mod types;

// 3. Context Trait for adding context to errors.
pub trait Context<T, E> {
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display;

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<GatewayError>,
{
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display,
    {
        self.with_context(|| context)
    }

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => {
                let context_message = context().to_string();
                Err(GatewayError::Context {
                    context: context_message,
                    source: Box::new(error.into()),
                })
            }
        }
    }
}

/// Helper to attach context to an error without intermediate boilerplate.
#[track_caller]
pub fn context_error<T>(err: impl Into<GatewayError>, context: impl Display) -> Result<T> {
    Err(err.into()).context(context)
}

// 4. Error Category for callers deciding how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Errors caused by the caller (bad configuration, state mismatch, unknown provider).
    Client,
    /// Errors reported by, or on the way to, the OAuth provider.
    Upstream,
}

#[cfg(test)]
mod tests;
