//! Per-precision instantiation of type-generic floating-point code.
//!
//! A generic numeric algorithm (an exponential, a hyperbolic function, `hypot`,
//! and so on) is written once and compiled for each supported floating-point
//! precision. This crate supplies what such an algorithm needs from the
//! precision it is compiled against: literals and math constants in that
//! precision, constants derived from the platform limits, the names of the
//! helper routines it calls, and the policy used to publish its symbols.
//!
//! # Precisions
//!
//! Each precision implements the [`Precision`] trait, which is the descriptor
//! contract. The following precisions are provided:
//!
//! | Type                     | Real type          | Limits prefix | Suffix | Mantissa digits |
//! |--------------------------|--------------------|---------------|--------|-----------------|
//! | [`Single`]               | `f32`              | `FLT`         | `f`    | 24              |
//! | [`Double`]               | `f64`              | `DBL`         |        | 53              |
//! | [`DoubleDoubleExtended`] | [`DoubleDouble`]   | `LDBL`        | `l`    | 106             |
//!
//! Descriptors can also be assembled at runtime with [`DescriptorBuilder`],
//! in which case a missing field is reported as an
//! [`InstantiationError::MissingDescriptorField`].
//!
//! # Derived Constants
//!
//! [`DerivedConstants`] are resolved from a descriptor and a
//! [`LimitsProvider`]. Epsilon is special: the double-double layout (106
//! mantissa digits) always uses $2^{-106}$, because the platform value for that
//! layout is the smallest subnormal and is useless as a convergence threshold.
//!
//! # Symbols
//!
//! [`Operation`] is the fixed vocabulary of helper routines and resolves to a
//! concrete symbol per precision. [`ExportPolicy`] decides which public names
//! an instantiated function is published under and whether a compatibility
//! symbol is produced. An [`Instantiation`] ties these together.
//!
//! ```rust
//! use mathtype::{instantiate, Double, Operation, PlatformLimits};
//!
//! let mut instance = instantiate::<Double, fn(f64, f64) -> f64>(&PlatformLimits).unwrap();
//! assert_eq!(instance.operations().symbol(Operation::Hypot), "__ieee754_hypot");
//!
//! let hypot = instance.define("__hypot", f64::hypot as fn(f64, f64) -> f64).unwrap();
//! instance.export_alias(&hypot, "hypot").unwrap();
//! let hypot = instance.surface().get("hypot").unwrap();
//! assert_eq!(hypot(3.0, 4.0), 5.0);
//! ```
//!
//! [`DerivedConstants`]: crate::DerivedConstants
//! [`DescriptorBuilder`]: crate::DescriptorBuilder
//! [`Double`]: crate::Double
//! [`DoubleDouble`]: crate::DoubleDouble
//! [`DoubleDoubleExtended`]: crate::DoubleDoubleExtended
//! [`ExportPolicy`]: crate::ExportPolicy
//! [`Instantiation`]: crate::Instantiation
//! [`InstantiationError::MissingDescriptorField`]: crate::InstantiationError::MissingDescriptorField
//! [`LimitsProvider`]: crate::LimitsProvider
//! [`Operation`]: crate::Operation
//! [`Precision`]: crate::Precision
//! [`Single`]: crate::Single

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod constants;
mod descriptor;
mod double_double;
mod error;
mod export;
mod instance;
mod limits;
pub mod nan;
mod operation;
mod precision;

use core::fmt::Debug;
use num_traits::{PrimInt, Unsigned};

pub use crate::constants::{ConstantSymbols, DerivedConstants, DOUBLE_DOUBLE_MANT_DIG};
pub use crate::descriptor::{
    ConstantSuffix, Descriptor, DescriptorBuilder, Field, FunctionSuffix, LiteralSuffix,
    MathConstant, NanParser,
};
pub use crate::double_double::DoubleDouble;
pub use crate::error::InstantiationError;
pub use crate::export::{
    AliasOverride, CompatOverride, CompatSymbol, ExportPolicy, ExportedSymbol, Linkage, Surface,
};
pub use crate::instance::{instantiate, Canonical, Instantiation};
pub use crate::limits::{Limit, Limits, LimitsProvider, LimitsTable, PlatformLimits};
pub use crate::operation::{resolve, Operation, OperationTable};
pub use crate::precision::{Double, DoubleDoubleExtended, Precision, Single};

pub type Result<T> = core::result::Result<T, InstantiationError>;

/// Scalar values of a precision.
///
/// Exposes the classification that derived constants are checked against and
/// the raw bit pattern of a value. Bit patterns are compared rather than values
/// when asserting that two results are identical, because `NaN`s are unequal to
/// themselves and `0.0 == -0.0`.
pub trait Float: Copy + Debug + PartialEq + PartialOrd {
    type Bits: Debug + PrimInt + Unsigned;

    const INFINITY: Self;
    const NEG_INFINITY: Self;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_sign_negative(self) -> bool;

    /// The raw bit pattern of the value.
    ///
    /// Unlike a canonical encoding, distinct `NaN` payloads and signed zeros
    /// have distinct bit patterns.
    fn to_bits(self) -> Self::Bits;

    /// Returns `true` if both values have exactly the same representation.
    fn is_identical(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// Implements `Float` for primitive types.
macro_rules! impl_primitive {
    (primitive => $t:ident, bits => $u:ident) => {
        impl Float for $t {
            type Bits = $u;

            const INFINITY: Self = <$t>::INFINITY;
            const NEG_INFINITY: Self = <$t>::NEG_INFINITY;

            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }

            fn is_infinite(self) -> bool {
                <$t>::is_infinite(self)
            }

            fn is_sign_negative(self) -> bool {
                <$t>::is_sign_negative(self)
            }

            fn to_bits(self) -> Self::Bits {
                <$t>::to_bits(self)
            }
        }
    };
}
impl_primitive!(primitive => f32, bits => u32);
impl_primitive!(primitive => f64, bits => u64);
