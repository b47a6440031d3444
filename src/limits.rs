//! Platform limits of floating-point precisions.
//!
//! Limits are looked up by the prefix of a precision (`FLT`, `DBL`, `LDBL`)
//! the same way `float.h` names them: `DBL_MANT_DIG`, `DBL_EPSILON`, and so on.

use alloc::collections::BTreeMap;
use alloc::string::String;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DoubleDouble, Float};

/// The limits of a precision that instantiation depends upon.
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Limit {
    MaxExp,
    Min,
    Max,
    MantDig,
    Epsilon,
}

impl Limit {
    pub const ALL: [Limit; 5] = [
        Limit::MaxExp,
        Limit::Min,
        Limit::Max,
        Limit::MantDig,
        Limit::Epsilon,
    ];

    pub const fn suffix(self) -> &'static str {
        match self {
            Limit::MaxExp => "_MAX_EXP",
            Limit::Min => "_MIN",
            Limit::Max => "_MAX",
            Limit::MantDig => "_MANT_DIG",
            Limit::Epsilon => "_EPSILON",
        }
    }

    /// The `float.h` name of the limit for a prefix, e.g. `FLT_MAX_EXP`.
    pub fn symbol(self, prefix: &str) -> String {
        let mut symbol = String::with_capacity(prefix.len() + self.suffix().len());
        symbol.push_str(prefix);
        symbol.push_str(self.suffix());
        symbol
    }
}

/// A snapshot of the limits of one precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits<T> {
    pub max_exp: i32,
    /// Smallest positive normal value.
    pub min: T,
    pub max: T,
    pub mant_dig: u32,
    pub epsilon: T,
}

/// Source of platform limits.
pub trait LimitsProvider<T>
where
    T: Float,
{
    /// Gets the limits for a prefix or `None` if the prefix is unknown.
    fn limits(&self, prefix: &str) -> Option<Limits<T>>;
}

impl<'a, T, P> LimitsProvider<T> for &'a P
where
    T: Float,
    P: LimitsProvider<T> + ?Sized,
{
    fn limits(&self, prefix: &str) -> Option<Limits<T>> {
        P::limits(self, prefix)
    }
}

/// The limits reported by the platform for the provided precisions.
///
/// For the double-double layout, `LDBL_EPSILON` is reported as the smallest
/// subnormal `f64`, which is what the platform headers define.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlatformLimits;

impl LimitsProvider<f32> for PlatformLimits {
    fn limits(&self, prefix: &str) -> Option<Limits<f32>> {
        (prefix == "FLT").then_some(Limits {
            max_exp: f32::MAX_EXP,
            min: f32::MIN_POSITIVE,
            max: f32::MAX,
            mant_dig: f32::MANTISSA_DIGITS,
            epsilon: f32::EPSILON,
        })
    }
}

impl LimitsProvider<f64> for PlatformLimits {
    fn limits(&self, prefix: &str) -> Option<Limits<f64>> {
        (prefix == "DBL").then_some(Limits {
            max_exp: f64::MAX_EXP,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
            mant_dig: f64::MANTISSA_DIGITS,
            epsilon: f64::EPSILON,
        })
    }
}

impl LimitsProvider<DoubleDouble> for PlatformLimits {
    fn limits(&self, prefix: &str) -> Option<Limits<DoubleDouble>> {
        // 0x1p-969
        const MIN: f64 = f64::from_bits(0x0360_0000_0000_0000);
        // 0x1.ffffffffffffep+969
        const MAX_LO: f64 = f64::from_bits(0x7c8f_ffff_ffff_fffe);

        (prefix == "LDBL").then_some(Limits {
            max_exp: f64::MAX_EXP,
            min: DoubleDouble::from_f64(MIN),
            max: DoubleDouble::new(f64::MAX, MAX_LO),
            mant_dig: 2 * f64::MANTISSA_DIGITS,
            epsilon: DoubleDouble::from_f64(f64::from_bits(1)),
        })
    }
}

/// Limits given explicitly per prefix.
///
/// Used where limits are not those of the host, such as when instantiating for
/// a target with different headers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LimitsTable<T> {
    entries: BTreeMap<String, Limits<T>>,
}

impl<T> LimitsTable<T>
where
    T: Float,
{
    pub fn new() -> Self {
        LimitsTable {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, prefix: impl Into<String>, limits: Limits<T>) -> Self {
        self.insert(prefix, limits);
        self
    }

    /// Inserts the limits for a prefix, returning the limits it replaces.
    pub fn insert(&mut self, prefix: impl Into<String>, limits: Limits<T>) -> Option<Limits<T>> {
        self.entries.insert(prefix.into(), limits)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<T> LimitsProvider<T> for LimitsTable<T>
where
    T: Float,
{
    fn limits(&self, prefix: &str) -> Option<Limits<T>> {
        self.entries.get(prefix).copied()
    }
}
