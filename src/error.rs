//! Error taxonomy for the two validation checkpoints.
//!
//! Registration time: [`SignatureError`], raised when one or more declared
//! parameters are structurally unusable. Fatal to that registration; the
//! route never becomes reachable.
//!
//! Request time: [`ValidationErrors`], raised when extracted parameters are
//! missing or failed coercion. Recovered into a client-facing 400 by the
//! dispatch adapter; the handler is never invoked.
//!
//! Both carry the full list of `(parameter, message)` pairs found in a single
//! pass, never just the first failure. Injector factory failures and handler
//! body failures are deliberately outside this taxonomy: they indicate
//! programmer error or downstream faults and surface through the adapter's
//! runtime handling instead.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// One failed parameter: which one, and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamError {
    pub name: String,
    pub message: String,
}

impl ParamError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Registration-time failure: the handler's declared signature cannot be
/// bound. Names every offending parameter so an operator can fix all broken
/// declarations in one pass instead of iterating on registration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureError {
    pub handler: String,
    pub errors: Vec<ParamError>,
}

impl SignatureError {
    pub fn new(handler: impl Into<String>, errors: Vec<ParamError>) -> Self {
        Self {
            handler: handler.into(),
            errors,
        }
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot bind handler `{}`: {} parameter error(s)",
            self.handler,
            self.errors.len()
        )?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SignatureError {}

/// Request-time failure: every parameter that could not be resolved during
/// one `resolve` pass. All parameters are attempted before this is built;
/// resolution never short-circuits on the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<ParamError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ParamError>) -> Self {
        Self { errors }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if `name` is among the failing parameters.
    #[must_use]
    pub fn names(&self, name: &str) -> bool {
        self.errors.iter().any(|e| e.name == name)
    }

    /// Serialized form used as the body of the client-facing 400 response.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({
            "error": "validation failed",
            "errors": self.errors,
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
