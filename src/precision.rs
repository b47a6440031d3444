use crate::descriptor::{Descriptor, MathConstant};
use crate::export::ExportPolicy;
use crate::{nan, DoubleDouble, Float};

/// Floating-point precisions that generic code is instantiated for.
///
/// This is the descriptor contract. Every item other than [`policy`] is
/// mandatory, so a precision type that compiles always yields a complete
/// [`Descriptor`]. Generic algorithms are bound by this trait and are
/// monomorphized once per precision.
///
/// [`Descriptor`]: crate::Descriptor
/// [`policy`]: crate::Precision::policy
pub trait Precision: Sized + 'static {
    type Real: Float;

    /// Prefix of the `float.h` limits, e.g. `FLT` as in `FLT_MANT_DIG`.
    const LIMITS_PREFIX: &'static str;
    /// Suffix of numeric literals, e.g. `f` as in `1.0f`.
    const LITERAL_SUFFIX: &'static str;
    /// Suffix of `math.h` constants, e.g. `l` as in `M_PIl`.
    const CONSTANT_SUFFIX: &'static str;
    /// Suffix of function names, e.g. `f` as in `expf`.
    const FUNCTION_SUFFIX: &'static str;
    const REAL_TYPE: &'static str;
    const COMPLEX_TYPE: &'static str;
    /// Name of the string-to-`NaN` routine.
    const NAN_FROM_STR: &'static str;

    fn literal(value: f64) -> Self::Real;

    fn constant(constant: MathConstant) -> Self::Real;

    fn nan_from_str(payload: &str) -> Self::Real;

    /// Overrides of the default export policy.
    fn policy() -> ExportPolicy {
        ExportPolicy::default()
    }

    fn descriptor() -> Descriptor<Self::Real> {
        Descriptor::of::<Self>()
    }
}

/// IEEE 754 binary32 (`float`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Single;

/// IEEE 754 binary64 (`double`).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Double;

/// IBM double-double extended precision (`long double` on PowerPC).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DoubleDoubleExtended;

/// Implements `Precision` for precisions with a primitive real type.
macro_rules! impl_primitive_precision {
    (
        precision => $p:ident,
        primitive => $t:ident,
        prefix => $prefix:literal,
        suffix => $suffix:literal,
        literal => $literal:literal,
        types => ($real:literal, $complex:literal),
        nan => ($nan_symbol:literal, $nan:ident) $(,)?
    ) => {
        impl Precision for $p {
            type Real = $t;

            const LIMITS_PREFIX: &'static str = $prefix;
            const LITERAL_SUFFIX: &'static str = $literal;
            const CONSTANT_SUFFIX: &'static str = $suffix;
            const FUNCTION_SUFFIX: &'static str = $suffix;
            const REAL_TYPE: &'static str = $real;
            const COMPLEX_TYPE: &'static str = $complex;
            const NAN_FROM_STR: &'static str = $nan_symbol;

            fn literal(value: f64) -> Self::Real {
                value as $t
            }

            fn constant(constant: MathConstant) -> Self::Real {
                constant.to_f64() as $t
            }

            fn nan_from_str(payload: &str) -> Self::Real {
                nan::$nan(payload)
            }
        }
    };
}
impl_primitive_precision!(
    precision => Single,
    primitive => f32,
    prefix => "FLT",
    suffix => "f",
    literal => "f",
    types => ("float", "_Complex float"),
    nan => ("__strtof_nan", f32_from_str),
);
impl_primitive_precision!(
    precision => Double,
    primitive => f64,
    prefix => "DBL",
    suffix => "",
    literal => "",
    types => ("double", "_Complex double"),
    nan => ("__strtod_nan", f64_from_str),
);

impl Precision for DoubleDoubleExtended {
    type Real = DoubleDouble;

    const LIMITS_PREFIX: &'static str = "LDBL";
    const LITERAL_SUFFIX: &'static str = "L";
    const CONSTANT_SUFFIX: &'static str = "l";
    const FUNCTION_SUFFIX: &'static str = "l";
    const REAL_TYPE: &'static str = "long double";
    const COMPLEX_TYPE: &'static str = "_Complex long double";
    const NAN_FROM_STR: &'static str = "__strtold_nan";

    fn literal(value: f64) -> Self::Real {
        DoubleDouble::from_f64(value)
    }

    // The low-order word is the rounding error of the `f64` constant.
    fn constant(constant: MathConstant) -> Self::Real {
        let lo = match constant {
            MathConstant::E => 1.4456468917292502e-16,
            MathConstant::Log2E => 2.0355273740931033e-17,
            MathConstant::Log10E => 1.0983196502167651e-17,
            MathConstant::Ln2 => 2.3190468138462996e-17,
            MathConstant::Ln10 => -2.1707562233822494e-16,
            MathConstant::Pi => 1.2246467991473532e-16,
            MathConstant::FracPi2 => 6.123233995736766e-17,
            MathConstant::FracPi4 => 3.061616997868383e-17,
            MathConstant::Frac1Pi => -1.9678676675182486e-17,
            MathConstant::Frac2Pi => -3.935735335036497e-17,
            MathConstant::Frac2SqrtPi => 1.533545961316588e-17,
            MathConstant::Sqrt2 => -9.667293313452913e-17,
            MathConstant::FracSqrt1_2 => -4.833646656726457e-17,
        };
        DoubleDouble::new(constant.to_f64(), lo)
    }

    fn nan_from_str(payload: &str) -> Self::Real {
        nan::double_double_from_str(payload)
    }
}
