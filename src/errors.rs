use std::num::TryFromIntError;

use ed25519_dalek::SignatureError;
use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

pub use crate::parsing::{Error as ParsingError, RemainingError};

/// Error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The packet sequence violates the transferable key grammar.
    #[snafu(display("invalid key structure: {message}"))]
    Structure { message: String },
    /// Signatures could not establish trust in the key.
    #[snafu(display("signature verification failed: {message}"))]
    Verification { message: String },
    #[snafu(display("invalid input"))]
    InvalidInput,
    #[snafu(display("invalid key length"))]
    InvalidKeyLength,
    #[snafu(display("packet is incomplete"))]
    PacketIncomplete { source: ParsingError },
    #[snafu(transparent)]
    PacketParsing { source: ParsingError },
    #[snafu(transparent)]
    IO {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    /// Signals packet versions and parameters we don't support, but can safely ignore
    #[snafu(display("Unsupported: {message}"))]
    Unsupported { message: String },
    #[snafu(display("{message}"))]
    Message { message: String },
    #[snafu(transparent)]
    Utf8Error { source: std::str::Utf8Error },
    #[snafu(transparent)]
    SignatureError { source: SignatureError },
    #[snafu(transparent)]
    TryFromInt { source: TryFromIntError },
}

impl Error {
    /// Returns true for grammar violations raised while grouping packets.
    pub fn is_structure(&self) -> bool {
        matches!(self, Self::Structure { .. })
    }

    /// Returns true for failures to establish trust in the key.
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::Message { message: err }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Error {
        Error::Message {
            message: err.to_string(),
        }
    }
}

macro_rules! unsupported_err {
    ($e:expr) => {
        return Err($crate::errors::Error::Unsupported { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Unsupported { message: format!($fmt, $($arg)+) })
    };
}

macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::Error::Message { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Message { message: format!($fmt, $($arg)+) })
    };
}

macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::Message { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Message { message: format!($fmt, $($arg)+) }
    };
}

/// Builds an [`Error::Structure`].
macro_rules! structure_err {
    ($e:expr) => {
        $crate::errors::Error::Structure { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Structure { message: format!($fmt, $($arg)+) }
    };
}

/// Builds an [`Error::Verification`].
macro_rules! verification_err {
    ($e:expr) => {
        $crate::errors::Error::Verification { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Verification { message: format!($fmt, $($arg)+) }
    };
}

macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            $crate::errors::bail!($e);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::errors::bail!($fmt, $($arg)+);
        }
    };
}

macro_rules! ensure_eq {
    ($left:expr, $right:expr) => ({
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    $crate::errors::bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val)
                }
            }
        }
    });
    ($left:expr, $right:expr, $($arg:tt)+) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    $crate::errors::bail!(r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#, left_val, right_val,
                           format_args!($($arg)+))
                }
            }
        }
    });
}

#[allow(unused_imports)]
pub(crate) use bail;
#[allow(unused_imports)]
pub(crate) use ensure;
#[allow(unused_imports)]
pub(crate) use ensure_eq;
#[allow(unused_imports)]
pub(crate) use format_err;
#[allow(unused_imports)]
pub(crate) use structure_err;
#[allow(unused_imports)]
pub(crate) use unsupported_err;
#[allow(unused_imports)]
pub(crate) use verification_err;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = structure_err!("missing user id");
        assert!(err.is_structure());
        assert!(!err.is_verification());
        assert_eq!(err.to_string(), "invalid key structure: missing user id");

        let err = verification_err!("{} verified user ids", 0);
        assert!(err.is_verification());
        assert_eq!(
            err.to_string(),
            "signature verification failed: 0 verified user ids"
        );
    }

    fn check(a: u8, b: u8) -> Result<()> {
        ensure_eq!(a, b, "values differ");
        Ok(())
    }

    #[test]
    fn test_ensure_eq() {
        assert!(check(1, 1).is_ok());
        let err = check(1, 2).unwrap_err();
        assert!(matches!(err, Error::Message { .. }));
    }
}
