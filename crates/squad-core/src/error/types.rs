//! Core error types and traits shared by every squad component

use std::fmt;

/// Unified error trait that all squad errors implement.
///
/// This trait keeps error handling uniform across components by providing:
/// - error_code(): stable SCREAMING_CASE code for programmatic matching
/// - message(): human-readable message
/// - suggestion(): optional remediation hint shown to the user
/// - context(): optional additional context (usually a path)
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get the remediation hint, if any
    fn suggestion(&self) -> Option<&str> {
        None
    }

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// A closed set of error codes owned by one component.
pub trait ErrorCode: Copy + fmt::Debug + PartialEq + Eq + Send + Sync + 'static {
    /// The SCREAMING_CASE code string
    fn as_str(&self) -> &'static str;

    fn is_retryable(&self) -> bool {
        false
    }
}

/// Error value produced by a component.
///
/// Every component error has the same shape: a code from the component's
/// closed enum, a message, an optional suggestion and optional context.
/// `details` carries itemised diagnostics such as validation errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentError<C: ErrorCode> {
    pub code: C,
    pub message: String,
    pub suggestion: Option<String>,
    pub context: Option<String>,
    pub details: Vec<String>,
}

impl<C: ErrorCode> ComponentError<C> {
    pub fn new(code: C, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: None,
            context: None,
            details: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn code(&self) -> C {
        self.code
    }
}

impl<C: ErrorCode> fmt::Display for ComponentError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl<C: ErrorCode> std::error::Error for ComponentError<C> {}

impl<C: ErrorCode> UnifiedError for ComponentError<C> {
    fn error_code(&self) -> &str {
        self.code.as_str()
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Implements `ErrorCode` and `Display` for a component code enum.
///
/// Codes listed after `retryable` report `is_retryable() == true`.
macro_rules! error_codes {
    (
        $name:ident { $($variant:ident => $code:literal),+ $(,)? }
        $(retryable [$($retry:ident),+ $(,)?])?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::error::ErrorCode for $name {
            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            #[allow(unreachable_patterns)]
            fn is_retryable(&self) -> bool {
                match self {
                    $($(Self::$retry => true,)+)?
                    _ => false,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::error::ErrorCode::as_str(self))
            }
        }
    };
}

pub(crate) use error_codes;
