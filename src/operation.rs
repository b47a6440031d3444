//! Helper operations called by generic algorithms.
//!
//! Generic algorithms call a fixed set of helpers by their generic name. Each
//! helper resolves to a concrete symbol by applying the function suffix of a
//! precision to its base name. Thin wrappers use their public or internal
//! names (`__scalbn`, `fabs`), while the core kernels use the `__ieee754_`
//! prefix (`__ieee754_hypot`).

use alloc::string::{String, ToString};
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::{Float, InstantiationError};

const KERNEL_PREFIX: &str = "__ieee754_";

/// The fixed vocabulary of helper operations.
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operation {
    Copysign,
    Abs,
    Sincos,
    Scalbn,
    Log1p,
    Atan2,
    Cosh,
    Exp,
    Hypot,
    Log,
    Sinh,
    Sqrt,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::Copysign,
        Operation::Abs,
        Operation::Sincos,
        Operation::Scalbn,
        Operation::Log1p,
        Operation::Atan2,
        Operation::Cosh,
        Operation::Exp,
        Operation::Hypot,
        Operation::Log,
        Operation::Sinh,
        Operation::Sqrt,
    ];

    /// The generic name, e.g. `hypot`.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::Copysign => "copysign",
            Operation::Abs => "abs",
            Operation::Sincos => "sincos",
            Operation::Scalbn => "scalbn",
            Operation::Log1p => "log1p",
            Operation::Atan2 => "atan2",
            Operation::Cosh => "cosh",
            Operation::Exp => "exp",
            Operation::Hypot => "hypot",
            Operation::Log => "log",
            Operation::Sinh => "sinh",
            Operation::Sqrt => "sqrt",
        }
    }

    /// Returns `true` if the operation is a core kernel of a precision rather
    /// than a wrapper.
    pub const fn is_kernel(self) -> bool {
        matches!(
            self,
            Operation::Atan2
                | Operation::Cosh
                | Operation::Exp
                | Operation::Hypot
                | Operation::Log
                | Operation::Sinh
                | Operation::Sqrt
        )
    }

    /// The name of the implementation without a precision suffix.
    pub fn base_name(self) -> String {
        match self {
            Operation::Copysign => "__copysign".to_string(),
            Operation::Abs => "fabs".to_string(),
            Operation::Sincos => "__sincos".to_string(),
            Operation::Scalbn => "__scalbn".to_string(),
            Operation::Log1p => "__log1p".to_string(),
            kernel => {
                let mut name = String::from(KERNEL_PREFIX);
                name.push_str(kernel.name());
                name
            }
        }
    }

    /// The concrete symbol of the operation in a precision.
    pub fn symbol<T>(self, descriptor: &Descriptor<T>) -> String
    where
        T: Float,
    {
        descriptor.function_name(&self.base_name())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = InstantiationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == name)
            .ok_or_else(|| InstantiationError::UnsupportedOperationName(name.into()))
    }
}

/// Resolves a generic operation name to its symbol in a precision.
///
/// # Errors
///
/// Returns `UnsupportedOperationName` if `name` is not in the vocabulary of
/// [`Operation`].
///
/// [`Operation`]: crate::Operation
pub fn resolve<T>(name: &str, descriptor: &Descriptor<T>) -> Result<String, InstantiationError>
where
    T: Float,
{
    name.parse::<Operation>()
        .map(|operation| operation.symbol(descriptor))
}

/// The resolved symbols of every operation for one precision.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationTable {
    symbols: [String; 12],
}

impl OperationTable {
    pub fn resolve<T>(descriptor: &Descriptor<T>) -> Self
    where
        T: Float,
    {
        OperationTable {
            symbols: Operation::ALL.map(|operation| operation.symbol(descriptor)),
        }
    }

    pub fn symbol(&self, operation: Operation) -> &str {
        &self.symbols[operation as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, &str)> {
        Operation::ALL
            .into_iter()
            .zip(self.symbols.iter().map(String::as_str))
    }
}
