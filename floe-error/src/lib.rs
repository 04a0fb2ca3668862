#![feature(error_generic_member_access)]
#![deny(missing_docs)]

//! This crate defines error & result types for Floe.
//! It also contains a variety of useful macros for error handling.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{env, fmt};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("FLOE_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Floe.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum FloeError {
    /// A precondition on user input was violated (bad schema edit, missing
    /// field, unconvertible literal, illegal promotion). The offending
    /// builder remains usable after this is returned.
    #[error("{0}\nBacktrace:\n{1}")]
    Validation(ErrString, Backtrace),
    /// A structural programmer error, e.g. bucketing an unsupported type.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// An internal invariant failed. Raised loudly; not meant to be caught.
    #[error("{0}\nBacktrace:\n{1}")]
    IllegalState(ErrString, Backtrace),
    /// A compare-and-swap against the metadata store lost the race. Callers
    /// may rebuild their update against the new base and retry.
    #[error("{0}\nBacktrace:\n{1}")]
    CommitConflict(ErrString, Backtrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<FloeError>),
    /// A wrapper for errors from serde_json.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FloeError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        FloeError::Context(msg.into(), Box::new(self))
    }
}

impl Debug for FloeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return FloeErrors as their error type.
pub type FloeResult<T> = Result<T, FloeError>;

/// A trait for unwrapping a FloeResult.
pub trait FloeUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn floe_unwrap(self) -> Self::Output;
}

impl<T> FloeUnwrap for FloeResult<T> {
    type Output = T;

    #[inline(always)]
    fn floe_unwrap(self) -> Self::Output {
        self.unwrap_or_else(|err| floe_panic!(err))
    }
}

/// A trait for expect-ing a FloeResult or an Option.
pub trait FloeExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn floe_expect(self, msg: &str) -> Self::Output;
}

impl<T> FloeExpect for FloeResult<T> {
    type Output = T;

    #[inline(always)]
    fn floe_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|e| floe_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> FloeExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn floe_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = FloeError::IllegalState(msg.to_string().into(), Backtrace::capture());
            floe_panic!(err)
        })
    }
}

/// A convenient macro for creating a FloeError.
#[macro_export]
macro_rules! floe_err {
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::FloeError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::FloeError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::__private::must_use(
            $crate::FloeError::$variant($err)
        )
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::floe_err!(Validation: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a FloeError.
#[macro_export]
macro_rules! floe_bail {
    ($($tt:tt)+) => {
        return Err($crate::floe_err!($($tt)+))
    };
}

/// A convenient macro for panicking with a FloeError in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! floe_panic {
    (Context: $msg:literal, $err:expr) => {{
        $crate::floe_panic!($crate::floe_err!(Context: $msg, $err))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::floe_panic!($crate::floe_err!($variant: $fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::FloeError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::floe_panic!($crate::floe_err!(IllegalState: $fmt, $($arg),*))
    };
    ($err:expr) => {{
        let err: $crate::FloeError = $err;
        panic!("{}", err)
    }};
}

// Not public, referenced by macros only.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::FloeError) -> crate::FloeError {
        error
    }
}
