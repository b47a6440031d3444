use alloc::string::String;
#[cfg(not(feature = "std"))]
use core::fmt::{self, Display, Formatter};
#[cfg(feature = "std")]
use thiserror::Error;

use crate::descriptor::Field;

/// Errors that abort the instantiation of a precision.
///
/// Failures are local to the precision being instantiated. Nothing of a failed
/// instantiation is produced, and other precisions are unaffected.
#[cfg_attr(feature = "std", derive(Error))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstantiationError {
    /// A mandatory descriptor field was not supplied.
    #[cfg_attr(feature = "std", error("precision descriptor is missing field `{0}`"))]
    MissingDescriptorField(Field),
    /// The limits provider has no data for a limits prefix.
    #[cfg_attr(feature = "std", error("no platform limits for prefix `{0}`"))]
    UnknownPrecisionPrefix(String),
    /// A name outside of the fixed operation vocabulary.
    #[cfg_attr(feature = "std", error("`{0}` is not a generic operation name"))]
    UnsupportedOperationName(String),
    /// A symbol name is already bound in the exported surface.
    #[cfg_attr(feature = "std", error("symbol `{0}` is already exported"))]
    DuplicateSymbol(String),
    /// A symbol is exported before its canonical definition exists.
    #[cfg_attr(feature = "std", error("symbol `{0}` is not defined"))]
    UndefinedSymbol(String),
    /// An exported symbol does not refer to the canonical definition it is
    /// exported for, or claims to be canonical itself.
    #[cfg_attr(
        feature = "std",
        error("symbol `{0}` does not refer to its canonical definition")
    )]
    MisdirectedSymbol(String),
}

// When the `std` feature is enabled, the `thiserror` crate is used to implement
// `Display`.
#[cfg(not(feature = "std"))]
impl Display for InstantiationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InstantiationError::MissingDescriptorField(field) => {
                write!(f, "precision descriptor is missing field `{}`", field)
            }
            InstantiationError::UnknownPrecisionPrefix(prefix) => {
                write!(f, "no platform limits for prefix `{}`", prefix)
            }
            InstantiationError::UnsupportedOperationName(name) => {
                write!(f, "`{}` is not a generic operation name", name)
            }
            InstantiationError::DuplicateSymbol(name) => {
                write!(f, "symbol `{}` is already exported", name)
            }
            InstantiationError::UndefinedSymbol(name) => {
                write!(f, "symbol `{}` is not defined", name)
            }
            InstantiationError::MisdirectedSymbol(name) => {
                write!(f, "symbol `{}` does not refer to its canonical definition", name)
            }
        }
    }
}
