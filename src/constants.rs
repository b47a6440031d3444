use alloc::format;
use alloc::string::String;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::descriptor::Descriptor;
use crate::limits::{Limit, LimitsProvider};
use crate::{Float, InstantiationError};

/// Mantissa digits of the IBM double-double layout.
pub const DOUBLE_DOUBLE_MANT_DIG: u32 = 106;

const DOUBLE_DOUBLE_EPSILON_LITERAL: &str = "0x1p-106";
// 0x1p-106
const DOUBLE_DOUBLE_EPSILON: f64 = f64::from_bits(0x3950_0000_0000_0000);

/// The expressions that derived constants are written as in a precision.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ConstantSymbols {
    pub nan: String,
    pub huge: String,
    pub max_exp: String,
    pub min: String,
    pub max: String,
    pub mant_dig: String,
    pub epsilon: String,
}

/// Constants of a precision derived from its descriptor and platform limits.
///
/// Derived constants are resolved once per instantiation and do not change
/// afterwards.
#[derive(Clone, Debug)]
pub struct DerivedConstants<T> {
    nan: T,
    huge: T,
    max_exp: i32,
    min: T,
    max: T,
    mant_dig: u32,
    epsilon: T,
    symbols: ConstantSymbols,
}

impl<T> DerivedConstants<T>
where
    T: Float,
{
    /// Resolves the constants of the precision described by `descriptor`.
    ///
    /// The result depends only on the descriptor and on the limits that the
    /// provider reports for the descriptor's prefix.
    ///
    /// Epsilon is taken from the limits provider, except for the double-double
    /// layout (106 mantissa digits), which uses the literal $2^{-106}$
    /// regardless of the reported value.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrecisionPrefix` if the provider has no limits for the
    /// prefix of the descriptor.
    pub fn resolve<L>(descriptor: &Descriptor<T>, limits: &L) -> Result<Self, InstantiationError>
    where
        L: LimitsProvider<T> + ?Sized,
    {
        let prefix = descriptor.limits_prefix();
        let platform = limits
            .limits(prefix)
            .ok_or_else(|| InstantiationError::UnknownPrecisionPrefix(prefix.into()))?;
        let literal = descriptor.literal();
        let (epsilon, epsilon_symbol) = if platform.mant_dig == DOUBLE_DOUBLE_MANT_DIG {
            log::debug!(
                "`{}` has {} mantissa digits; using epsilon {} instead of {:?}",
                prefix,
                DOUBLE_DOUBLE_MANT_DIG,
                DOUBLE_DOUBLE_EPSILON_LITERAL,
                platform.epsilon,
            );
            (
                literal.value(DOUBLE_DOUBLE_EPSILON),
                literal.render(DOUBLE_DOUBLE_EPSILON_LITERAL),
            )
        }
        else {
            (platform.epsilon, descriptor.limit_symbol(Limit::Epsilon))
        };
        let constants = DerivedConstants {
            nan: descriptor.nan().parse(""),
            huge: literal.value(f64::INFINITY),
            max_exp: platform.max_exp,
            min: platform.min,
            max: platform.max,
            mant_dig: platform.mant_dig,
            epsilon,
            symbols: ConstantSymbols {
                nan: format!("{} (\"\")", descriptor.function_name("__builtin_nan")),
                huge: format!("({} ())", descriptor.function_name("__builtin_huge_val")),
                max_exp: descriptor.limit_symbol(Limit::MaxExp),
                min: descriptor.limit_symbol(Limit::Min),
                max: descriptor.limit_symbol(Limit::Max),
                mant_dig: descriptor.limit_symbol(Limit::MantDig),
                epsilon: epsilon_symbol,
            },
        };
        log::debug!(
            "resolved constants for `{}`: mant_dig = {}, max_exp = {}, epsilon = {:?}",
            prefix,
            constants.mant_dig,
            constants.max_exp,
            constants.epsilon,
        );
        Ok(constants)
    }

    /// A quiet `NaN`.
    pub fn nan(&self) -> T {
        self.nan
    }

    /// The overflow value (positive infinity).
    pub fn huge(&self) -> T {
        self.huge
    }

    pub fn max_exp(&self) -> i32 {
        self.max_exp
    }

    /// The smallest positive normal value.
    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn mant_dig(&self) -> u32 {
        self.mant_dig
    }

    pub fn epsilon(&self) -> T {
        self.epsilon
    }

    pub fn symbols(&self) -> &ConstantSymbols {
        &self.symbols
    }

    /// Returns `true` if both sets of constants have the same bit patterns and
    /// symbols.
    pub fn is_identical(&self, other: &Self) -> bool {
        self.nan.is_identical(other.nan)
            && self.huge.is_identical(other.huge)
            && self.max_exp == other.max_exp
            && self.min.is_identical(other.min)
            && self.max.is_identical(other.max)
            && self.mant_dig == other.mant_dig
            && self.epsilon.is_identical(other.epsilon)
            && self.symbols == other.symbols
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use crate::{
        Descriptor, DerivedConstants, Double, DoubleDouble, DoubleDoubleExtended, Float,
        InstantiationError, Limits, LimitsTable, PlatformLimits, Precision, Single,
    };

    use super::DOUBLE_DOUBLE_EPSILON;

    fn double_limits(mant_dig: u32, epsilon: f64) -> LimitsTable<f64> {
        LimitsTable::new().with(
            "DBL",
            Limits {
                max_exp: 1024,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                mant_dig,
                epsilon,
            },
        )
    }

    #[rstest]
    #[case(53, 2.22e-16)]
    #[case(24, 1.1920929e-7)]
    #[case(64, 1.0842021724855044e-19)]
    #[case(113, 1.925929944387236e-34)]
    fn epsilon_from_provider(#[case] mant_dig: u32, #[case] reported: f64) {
        let constants =
            DerivedConstants::resolve(&Double::descriptor(), &double_limits(mant_dig, reported))
                .unwrap();
        assert_eq!(constants.epsilon(), reported);
        assert_eq!(constants.symbols().epsilon, "DBL_EPSILON");
    }

    #[test]
    fn epsilon_fixed_for_double_double_layout() {
        let mut rng = StdRng::seed_from_u64(0x6d67_656e);
        for _ in 0..1000 {
            let reported: f64 = rng.random();
            let constants = DerivedConstants::resolve(
                &Double::descriptor(),
                &double_limits(106, reported),
            )
            .unwrap();
            assert_eq!(constants.epsilon(), DOUBLE_DOUBLE_EPSILON);
            assert_eq!(constants.symbols().epsilon, "0x1p-106");
        }
        assert_eq!((0..106).fold(DOUBLE_DOUBLE_EPSILON, |x, _| x * 2.0), 1.0);
    }

    #[test]
    fn double_double_platform_epsilon_ignored() {
        let constants =
            DerivedConstants::resolve(&DoubleDoubleExtended::descriptor(), &PlatformLimits)
                .unwrap();
        assert_eq!(constants.mant_dig(), 106);
        assert!(constants
            .epsilon()
            .is_identical(DoubleDouble::from_f64(DOUBLE_DOUBLE_EPSILON)));
        assert_eq!(constants.symbols().epsilon, "0x1p-106L");
    }

    #[test]
    fn single_constants() {
        let constants = DerivedConstants::resolve(&Single::descriptor(), &PlatformLimits).unwrap();
        assert_eq!(constants.epsilon(), f32::EPSILON);
        assert_eq!(constants.max(), f32::MAX);
        assert_eq!(constants.min(), f32::MIN_POSITIVE);
        assert_eq!(constants.max_exp(), 128);
        assert_eq!(constants.mant_dig(), 24);
    }

    #[test]
    fn nan_is_unequal_to_itself() {
        fn check<P>()
        where
            P: Precision,
            PlatformLimits: crate::LimitsProvider<P::Real>,
        {
            let constants = DerivedConstants::resolve(&P::descriptor(), &PlatformLimits).unwrap();
            let nan = constants.nan();
            assert!(nan.is_nan());
            assert!(nan != nan);
            assert!(constants.huge().is_infinite());
            assert!(!constants.huge().is_sign_negative());
        }
        check::<Single>();
        check::<Double>();
        check::<DoubleDoubleExtended>();
    }

    #[test]
    fn symbols_per_precision() {
        let single = DerivedConstants::resolve(&Single::descriptor(), &PlatformLimits).unwrap();
        assert_eq!(single.symbols().nan, "__builtin_nanf (\"\")");
        assert_eq!(single.symbols().huge, "(__builtin_huge_valf ())");
        assert_eq!(single.symbols().mant_dig, "FLT_MANT_DIG");
        assert_eq!(single.symbols().epsilon, "FLT_EPSILON");

        let double = DerivedConstants::resolve(&Double::descriptor(), &PlatformLimits).unwrap();
        assert_eq!(double.symbols().nan, "__builtin_nan (\"\")");
        assert_eq!(double.symbols().max_exp, "DBL_MAX_EXP");
        assert_eq!(double.symbols().min, "DBL_MIN");
        assert_eq!(double.symbols().max, "DBL_MAX");
    }

    #[test]
    fn resolve_is_deterministic() {
        let descriptor = DoubleDoubleExtended::descriptor();
        let first = DerivedConstants::resolve(&descriptor, &PlatformLimits).unwrap();
        let second = DerivedConstants::resolve(&descriptor, &PlatformLimits).unwrap();
        assert!(first.is_identical(&second));
    }

    #[test]
    fn unknown_prefix() {
        let descriptor = Descriptor::<f64>::builder()
            .literal("", |x| x)
            .constant("", |c| c.to_f64())
            .limits_prefix("FLT64X")
            .function_suffix("f64x")
            .real_type("_Float64x")
            .complex_type("_Complex _Float64x")
            .nan_from_str("__strtof64x_nan", crate::nan::f64_from_str)
            .build()
            .unwrap();
        assert_eq!(
            DerivedConstants::resolve(&descriptor, &PlatformLimits).unwrap_err(),
            InstantiationError::UnknownPrecisionPrefix("FLT64X".into()),
        );
    }
}
