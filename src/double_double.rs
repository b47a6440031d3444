use core::cmp::Ordering;

use crate::Float;

/// IBM double-double extended precision value.
///
/// The value is the unevaluated sum `hi + lo` of two `f64`s where `|lo|` is at
/// most half an ulp of `hi`. This is the layout behind `long double` on
/// PowerPC targets: 106 mantissa digits, but the exponent range of `f64`.
///
/// Only the representation is provided here. Arithmetic belongs to the
/// algorithms that are instantiated for this precision.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

impl DoubleDouble {
    /// Creates a value from its high- and low-order words.
    ///
    /// The words are taken as given and are not renormalized.
    pub const fn new(hi: f64, lo: f64) -> Self {
        DoubleDouble { hi, lo }
    }

    pub const fn from_f64(value: f64) -> Self {
        DoubleDouble { hi: value, lo: 0.0 }
    }

    pub const fn hi(self) -> f64 {
        self.hi
    }

    pub const fn lo(self) -> f64 {
        self.lo
    }
}

impl From<f64> for DoubleDouble {
    fn from(value: f64) -> Self {
        DoubleDouble::from_f64(value)
    }
}

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi)? {
            Ordering::Equal => self.lo.partial_cmp(&other.lo),
            ordering => Some(ordering),
        }
    }
}

impl Float for DoubleDouble {
    type Bits = u128;

    const INFINITY: Self = DoubleDouble::from_f64(f64::INFINITY);
    const NEG_INFINITY: Self = DoubleDouble::from_f64(f64::NEG_INFINITY);

    // The high-order word determines the class of the value.
    fn is_nan(self) -> bool {
        self.hi.is_nan()
    }

    fn is_infinite(self) -> bool {
        self.hi.is_infinite()
    }

    fn is_sign_negative(self) -> bool {
        self.hi.is_sign_negative()
    }

    fn to_bits(self) -> Self::Bits {
        (u128::from(self.hi.to_bits()) << 64) | u128::from(self.lo.to_bits())
    }
}
