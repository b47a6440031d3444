//! Precision descriptors.
//!
//! A [`Descriptor`] is the configuration contract of one precision: how
//! literals and math constants are written in it, where its platform limits are
//! found, how its function names are formed, its type names and its
//! string-to-`NaN` routine. Descriptors of the provided precisions are built
//! from the [`Precision`] trait, which cannot omit a field. Descriptors
//! assembled at runtime go through [`DescriptorBuilder`], which rejects
//! incomplete descriptors.
//!
//! [`Precision`]: crate::Precision

use alloc::format;
use alloc::string::String;
use core::fmt::{self, Display, Formatter};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::export::ExportPolicy;
use crate::limits::Limit;
use crate::precision::Precision;
use crate::{Float, InstantiationError};

/// The named constants of `math.h`.
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MathConstant {
    E,
    Log2E,
    Log10E,
    Ln2,
    Ln10,
    Pi,
    FracPi2,
    FracPi4,
    Frac1Pi,
    Frac2Pi,
    Frac2SqrtPi,
    Sqrt2,
    FracSqrt1_2,
}

impl MathConstant {
    pub const ALL: [MathConstant; 13] = [
        MathConstant::E,
        MathConstant::Log2E,
        MathConstant::Log10E,
        MathConstant::Ln2,
        MathConstant::Ln10,
        MathConstant::Pi,
        MathConstant::FracPi2,
        MathConstant::FracPi4,
        MathConstant::Frac1Pi,
        MathConstant::Frac2Pi,
        MathConstant::Frac2SqrtPi,
        MathConstant::Sqrt2,
        MathConstant::FracSqrt1_2,
    ];

    /// The macro name without a precision suffix, e.g. `M_PI`.
    pub const fn name(self) -> &'static str {
        match self {
            MathConstant::E => "M_E",
            MathConstant::Log2E => "M_LOG2E",
            MathConstant::Log10E => "M_LOG10E",
            MathConstant::Ln2 => "M_LN2",
            MathConstant::Ln10 => "M_LN10",
            MathConstant::Pi => "M_PI",
            MathConstant::FracPi2 => "M_PI_2",
            MathConstant::FracPi4 => "M_PI_4",
            MathConstant::Frac1Pi => "M_1_PI",
            MathConstant::Frac2Pi => "M_2_PI",
            MathConstant::Frac2SqrtPi => "M_2_SQRTPI",
            MathConstant::Sqrt2 => "M_SQRT2",
            MathConstant::FracSqrt1_2 => "M_SQRT1_2",
        }
    }

    /// The constant rounded to `f64`.
    pub const fn to_f64(self) -> f64 {
        use core::f64::consts;

        match self {
            MathConstant::E => consts::E,
            MathConstant::Log2E => consts::LOG2_E,
            MathConstant::Log10E => consts::LOG10_E,
            MathConstant::Ln2 => consts::LN_2,
            MathConstant::Ln10 => consts::LN_10,
            MathConstant::Pi => consts::PI,
            MathConstant::FracPi2 => consts::FRAC_PI_2,
            MathConstant::FracPi4 => consts::FRAC_PI_4,
            MathConstant::Frac1Pi => consts::FRAC_1_PI,
            MathConstant::Frac2Pi => consts::FRAC_2_PI,
            MathConstant::Frac2SqrtPi => consts::FRAC_2_SQRT_PI,
            MathConstant::Sqrt2 => consts::SQRT_2,
            MathConstant::FracSqrt1_2 => consts::FRAC_1_SQRT_2,
        }
    }
}

/// Mandatory descriptor fields.
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    LiteralSuffix,
    ConstantSuffix,
    LimitsPrefix,
    FunctionSuffix,
    RealType,
    ComplexType,
    NanFromStr,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Field::LiteralSuffix => "literal-suffix",
            Field::ConstantSuffix => "math-constant-suffix",
            Field::LimitsPrefix => "limits-prefix",
            Field::FunctionSuffix => "function-suffix",
            Field::RealType => "real-type",
            Field::ComplexType => "complex-type",
            Field::NanFromStr => "nan-from-string",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Writes numeric literals in a precision.
#[derive(Clone, Copy, Debug)]
pub struct LiteralSuffix<T> {
    suffix: &'static str,
    value: fn(f64) -> T,
}

impl<T> LiteralSuffix<T>
where
    T: Float,
{
    pub const fn new(suffix: &'static str, value: fn(f64) -> T) -> Self {
        LiteralSuffix { suffix, value }
    }

    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// Appends the literal suffix, e.g. `0x1p-106` becomes `0x1p-106L`.
    pub fn render(&self, literal: &str) -> String {
        format!("{}{}", literal, self.suffix)
    }

    /// The literal as a value of the precision.
    pub fn value(&self, literal: f64) -> T {
        (self.value)(literal)
    }
}

/// Writes `math.h` constants in a precision.
#[derive(Clone, Copy, Debug)]
pub struct ConstantSuffix<T> {
    suffix: &'static str,
    value: fn(MathConstant) -> T,
}

impl<T> ConstantSuffix<T>
where
    T: Float,
{
    pub const fn new(suffix: &'static str, value: fn(MathConstant) -> T) -> Self {
        ConstantSuffix { suffix, value }
    }

    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// The macro name of the constant in this precision, e.g. `M_PIl`.
    pub fn render(&self, constant: MathConstant) -> String {
        format!("{}{}", constant.name(), self.suffix)
    }

    pub fn value(&self, constant: MathConstant) -> T {
        (self.value)(constant)
    }
}

/// Forms the concrete name of a function in a precision, e.g. `exp` becomes
/// `expf`.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FunctionSuffix(&'static str);

impl FunctionSuffix {
    pub const fn new(suffix: &'static str) -> Self {
        FunctionSuffix(suffix)
    }

    pub const fn suffix(&self) -> &'static str {
        self.0
    }

    pub fn apply(&self, name: &str) -> String {
        format!("{}{}", name, self.0)
    }
}

/// The string-to-`NaN` routine of a precision.
#[derive(Clone, Copy, Debug)]
pub struct NanParser<T> {
    symbol: &'static str,
    parse: fn(&str) -> T,
}

impl<T> NanParser<T>
where
    T: Float,
{
    pub const fn new(symbol: &'static str, parse: fn(&str) -> T) -> Self {
        NanParser { symbol, parse }
    }

    /// The name of the platform routine, e.g. `__strtod_nan`.
    pub const fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn parse(&self, payload: &str) -> T {
        (self.parse)(payload)
    }
}

/// A complete precision descriptor.
#[derive(Clone, Copy, Debug)]
pub struct Descriptor<T> {
    literal: LiteralSuffix<T>,
    constant: ConstantSuffix<T>,
    limits_prefix: &'static str,
    function: FunctionSuffix,
    real_type: &'static str,
    complex_type: &'static str,
    nan: NanParser<T>,
    policy: ExportPolicy,
}

impl<T> Descriptor<T>
where
    T: Float,
{
    pub fn builder() -> DescriptorBuilder<T> {
        DescriptorBuilder::default()
    }

    /// The descriptor of a precision type.
    pub fn of<P>() -> Self
    where
        P: Precision<Real = T>,
    {
        Descriptor {
            literal: LiteralSuffix::new(P::LITERAL_SUFFIX, P::literal),
            constant: ConstantSuffix::new(P::CONSTANT_SUFFIX, P::constant),
            limits_prefix: P::LIMITS_PREFIX,
            function: FunctionSuffix::new(P::FUNCTION_SUFFIX),
            real_type: P::REAL_TYPE,
            complex_type: P::COMPLEX_TYPE,
            nan: NanParser::new(P::NAN_FROM_STR, P::nan_from_str),
            policy: P::policy(),
        }
    }

    pub fn literal(&self) -> &LiteralSuffix<T> {
        &self.literal
    }

    pub fn constant(&self) -> &ConstantSuffix<T> {
        &self.constant
    }

    pub fn limits_prefix(&self) -> &'static str {
        self.limits_prefix
    }

    pub fn function_suffix(&self) -> FunctionSuffix {
        self.function
    }

    pub fn real_type(&self) -> &'static str {
        self.real_type
    }

    pub fn complex_type(&self) -> &'static str {
        self.complex_type
    }

    pub fn nan(&self) -> &NanParser<T> {
        &self.nan
    }

    pub fn policy(&self) -> &ExportPolicy {
        &self.policy
    }

    /// The concrete name of `name` in this precision.
    pub fn function_name(&self, name: &str) -> String {
        self.function.apply(name)
    }

    /// The platform name of a limit, e.g. `DBL_MANT_DIG`.
    pub fn limit_symbol(&self, limit: Limit) -> String {
        limit.symbol(self.limits_prefix)
    }

    /// The name an instantiated function `name` is declared under.
    ///
    /// This is the concrete function name unless the export policy overrides
    /// declarations.
    pub fn declare(&self, name: &str) -> String {
        match self.policy.declare {
            Some(declare) => declare(self.function, name),
            _ => self.function_name(name),
        }
    }
}

/// Assembles a [`Descriptor`] field by field.
///
/// Every mandatory field must be set before [`build`] succeeds. Export policy
/// is optional and defaults to [`ExportPolicy::default`].
///
/// [`build`]: crate::DescriptorBuilder::build
/// [`Descriptor`]: crate::Descriptor
/// [`ExportPolicy::default`]: crate::ExportPolicy
#[derive(Clone, Copy, Debug)]
pub struct DescriptorBuilder<T> {
    literal: Option<LiteralSuffix<T>>,
    constant: Option<ConstantSuffix<T>>,
    limits_prefix: Option<&'static str>,
    function: Option<FunctionSuffix>,
    real_type: Option<&'static str>,
    complex_type: Option<&'static str>,
    nan: Option<NanParser<T>>,
    policy: ExportPolicy,
}

impl<T> Default for DescriptorBuilder<T> {
    fn default() -> Self {
        DescriptorBuilder {
            literal: None,
            constant: None,
            limits_prefix: None,
            function: None,
            real_type: None,
            complex_type: None,
            nan: None,
            policy: ExportPolicy::default(),
        }
    }
}

impl<T> DescriptorBuilder<T>
where
    T: Float,
{
    pub fn literal(mut self, suffix: &'static str, value: fn(f64) -> T) -> Self {
        self.literal = Some(LiteralSuffix::new(suffix, value));
        self
    }

    pub fn constant(mut self, suffix: &'static str, value: fn(MathConstant) -> T) -> Self {
        self.constant = Some(ConstantSuffix::new(suffix, value));
        self
    }

    pub fn limits_prefix(mut self, prefix: &'static str) -> Self {
        self.limits_prefix = Some(prefix);
        self
    }

    pub fn function_suffix(mut self, suffix: &'static str) -> Self {
        self.function = Some(FunctionSuffix::new(suffix));
        self
    }

    pub fn real_type(mut self, name: &'static str) -> Self {
        self.real_type = Some(name);
        self
    }

    pub fn complex_type(mut self, name: &'static str) -> Self {
        self.complex_type = Some(name);
        self
    }

    pub fn nan_from_str(mut self, symbol: &'static str, parse: fn(&str) -> T) -> Self {
        self.nan = Some(NanParser::new(symbol, parse));
        self
    }

    pub fn policy(mut self, policy: ExportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns `MissingDescriptorField` naming the first mandatory field (in
    /// declaration order) that has not been set.
    pub fn build(self) -> Result<Descriptor<T>, InstantiationError> {
        let missing = InstantiationError::MissingDescriptorField;
        Ok(Descriptor {
            literal: self.literal.ok_or(missing(Field::LiteralSuffix))?,
            constant: self.constant.ok_or(missing(Field::ConstantSuffix))?,
            limits_prefix: self.limits_prefix.ok_or(missing(Field::LimitsPrefix))?,
            function: self.function.ok_or(missing(Field::FunctionSuffix))?,
            real_type: self.real_type.ok_or(missing(Field::RealType))?,
            complex_type: self.complex_type.ok_or(missing(Field::ComplexType))?,
            nan: self.nan.ok_or(missing(Field::NanFromStr))?,
            policy: self.policy,
        })
    }
}

impl<T> DescriptorBuilder<T>
where
    T: Float,
{
    /// A builder with every field taken from a precision type, so that
    /// individual fields can be replaced.
    pub fn from_precision<P>() -> Self
    where
        P: Precision<Real = T>,
    {
        let descriptor = Descriptor::of::<P>();
        DescriptorBuilder {
            literal: Some(descriptor.literal),
            constant: Some(descriptor.constant),
            limits_prefix: Some(descriptor.limits_prefix),
            function: Some(descriptor.function),
            real_type: Some(descriptor.real_type),
            complex_type: Some(descriptor.complex_type),
            nan: Some(descriptor.nan),
            policy: descriptor.policy,
        }
    }
}
