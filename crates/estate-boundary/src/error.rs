//! Child render failures

use estate_core::{ErrorRecord, EstateError};
use std::error::Error as StdError;
use std::fmt;

/// Why a guarded child failed to render.
///
/// A child may raise an already-classified [`ErrorRecord`], which is reported
/// as is; every other shape is classified with the boundary's category.
pub enum RenderError {
    /// A record raised deliberately by the child
    Record(ErrorRecord),
    /// An arbitrary error value
    Error(Box<dyn StdError + Send + Sync + 'static>),
    /// A bare message
    Message(String),
}

impl RenderError {
    /// Wrap any error value.
    pub fn error<E>(e: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Error(Box::new(e))
    }
}

impl fmt::Debug for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(r) => f.debug_tuple("Record").field(&r.id).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Self::Message(m) => f.debug_tuple("Message").field(m).finish(),
        }
    }
}

impl From<ErrorRecord> for RenderError {
    fn from(record: ErrorRecord) -> Self {
        Self::Record(record)
    }
}

impl From<EstateError> for RenderError {
    fn from(e: EstateError) -> Self {
        Self::error(e)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for RenderError {
    fn from(e: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self::Error(e)
    }
}

impl From<String> for RenderError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for RenderError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Message carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "render panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_conversions() {
        assert_matches!(RenderError::from("boom"), RenderError::Message(m) if m == "boom");
        assert_matches!(
            RenderError::from(EstateError::platform("no camera")),
            RenderError::Error(_)
        );
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("layout overflow")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "layout overflow");

        let payload = std::panic::catch_unwind(|| panic!("row {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "row 7");
    }
}
