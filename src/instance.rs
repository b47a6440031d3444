use alloc::string::String;

use crate::constants::DerivedConstants;
use crate::descriptor::{Descriptor, DescriptorBuilder};
use crate::export::{CompatSymbol, ExportedSymbol, Surface};
use crate::limits::LimitsProvider;
use crate::operation::{Operation, OperationTable};
use crate::precision::Precision;
use crate::{Float, InstantiationError};

/// A function defined under its canonical symbol.
///
/// Returned by [`Instantiation::define`] and required to export aliases, so
/// that aliases can only be published once the definition they refer to
/// exists.
///
/// [`Instantiation::define`]: crate::Instantiation::define
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Canonical {
    name: String,
    symbol: String,
}

impl Canonical {
    /// The name the function was defined with, e.g. `__cexp`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical symbol, e.g. `__cexpf`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

/// The instantiation of generic code for one precision.
///
/// Creating an instantiation resolves the derived constants and the operation
/// table of the precision; if either fails, no instantiation exists. Functions
/// compiled against the precision are then defined and exported into the
/// instantiation's [`Surface`].
///
/// Instantiations share no state, so instantiations of different precisions
/// can be created and populated independently, including on different threads.
///
/// [`Surface`]: crate::Surface
#[derive(Clone, Debug)]
pub struct Instantiation<T, F> {
    descriptor: Descriptor<T>,
    constants: DerivedConstants<T>,
    operations: OperationTable,
    surface: Surface<F>,
}

impl<T, F> Instantiation<T, F>
where
    T: Float,
    F: Copy,
{
    /// # Errors
    ///
    /// Returns `UnknownPrecisionPrefix` if the limits provider has no limits
    /// for the descriptor.
    pub fn new<L>(descriptor: Descriptor<T>, limits: &L) -> Result<Self, InstantiationError>
    where
        L: LimitsProvider<T> + ?Sized,
    {
        let constants = DerivedConstants::resolve(&descriptor, limits)?;
        let operations = OperationTable::resolve(&descriptor);
        log::debug!(
            "instantiated `{}` (`{}`): {} operations",
            descriptor.real_type(),
            descriptor.limits_prefix(),
            Operation::ALL.len(),
        );
        Ok(Instantiation {
            descriptor,
            constants,
            operations,
            surface: Surface::new(),
        })
    }

    /// Builds the descriptor and instantiates it.
    ///
    /// # Errors
    ///
    /// Returns `MissingDescriptorField` if the descriptor is incomplete, before
    /// anything else is resolved, and otherwise fails like [`new`].
    ///
    /// [`new`]: crate::Instantiation::new
    pub fn from_builder<L>(
        builder: DescriptorBuilder<T>,
        limits: &L,
    ) -> Result<Self, InstantiationError>
    where
        L: LimitsProvider<T> + ?Sized,
    {
        Instantiation::new(builder.build()?, limits)
    }

    pub fn descriptor(&self) -> &Descriptor<T> {
        &self.descriptor
    }

    pub fn constants(&self) -> &DerivedConstants<T> {
        &self.constants
    }

    pub fn operations(&self) -> &OperationTable {
        &self.operations
    }

    pub fn surface(&self) -> &Surface<F> {
        &self.surface
    }

    pub fn into_surface(self) -> Surface<F> {
        self.surface
    }

    /// Resolves a generic operation name to its symbol in this precision.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperationName` if `name` is not a generic operation.
    pub fn resolve(&self, name: &str) -> Result<&str, InstantiationError> {
        name.parse()
            .map(|operation| self.operations.symbol(operation))
    }

    /// Defines the implementation of the function `name`.
    ///
    /// The function is bound under the name it is declared with in this
    /// precision, which is its canonical symbol.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSymbol` if the canonical symbol is already bound.
    pub fn define(&mut self, name: &str, implementation: F) -> Result<Canonical, InstantiationError> {
        let symbol = self.descriptor.declare(name);
        self.surface.bind(
            alloc::vec![ExportedSymbol::canonical(symbol.clone())],
            None,
            implementation,
        )?;
        Ok(Canonical {
            name: name.into(),
            symbol,
        })
    }

    /// Publishes a defined function under the additional name `to`.
    ///
    /// The export policy of the precision determines the alias symbols and
    /// whether a compatibility symbol is also produced.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedSymbol` if the canonical symbol is not bound in this
    /// instantiation, `MisdirectedSymbol` if the policy produces a symbol that
    /// is marked canonical or refers to anything but the canonical symbol and
    /// `DuplicateSymbol` if any published name is already bound. Nothing is
    /// published on error.
    pub fn export_alias(&mut self, canonical: &Canonical, to: &str) -> Result<(), InstantiationError> {
        let implementation = self.implementation(canonical)?;
        let policy = self.descriptor.policy();
        let suffix = self.descriptor.function_suffix();
        let symbols = policy.alias(suffix, canonical.name(), canonical.symbol(), to);
        let compat = policy.compat(suffix, canonical.name(), to);
        check_targets(canonical, &symbols, compat.as_ref())?;
        self.surface.bind(symbols, compat, implementation)
    }

    /// Publishes a defined function under the additional names `to` and `to2`.
    ///
    /// # Errors
    ///
    /// Fails like [`export_alias`].
    ///
    /// [`export_alias`]: crate::Instantiation::export_alias
    pub fn export_alias2(
        &mut self,
        canonical: &Canonical,
        to: &str,
        to2: &str,
    ) -> Result<(), InstantiationError> {
        let implementation = self.implementation(canonical)?;
        let policy = self.descriptor.policy();
        let suffix = self.descriptor.function_suffix();
        let symbols = policy.alias2(suffix, canonical.name(), canonical.symbol(), to, to2);
        let compat = policy.compat(suffix, canonical.name(), to);
        check_targets(canonical, &symbols, compat.as_ref())?;
        self.surface.bind(symbols, compat, implementation)
    }

    fn implementation(&self, canonical: &Canonical) -> Result<F, InstantiationError> {
        self.surface
            .canonical_of(canonical.symbol())
            .and_then(|_| self.surface.get(canonical.symbol()))
            .ok_or_else(|| InstantiationError::UndefinedSymbol(canonical.symbol().into()))
    }
}

// Aliases and compatibility symbols must refer to the canonical symbol and must
// not claim to be canonical themselves.
fn check_targets(
    canonical: &Canonical,
    symbols: &[ExportedSymbol],
    compat: Option<&CompatSymbol>,
) -> Result<(), InstantiationError> {
    let misdirected = symbols
        .iter()
        .find(|symbol| symbol.canonical || symbol.target != canonical.symbol())
        .map(|symbol| &symbol.name)
        .or_else(|| {
            compat
                .filter(|symbol| symbol.target != canonical.symbol())
                .map(|symbol| &symbol.name)
        });
    match misdirected {
        Some(name) => Err(InstantiationError::MisdirectedSymbol(name.clone())),
        _ => Ok(()),
    }
}

/// Instantiates generic code for the precision `P`.
///
/// This is the monomorphized entry point: the descriptor is taken from the
/// [`Precision`] implementation of `P` and is always complete.
///
/// # Errors
///
/// Returns `UnknownPrecisionPrefix` if the limits provider has no limits for
/// `P`.
///
/// [`Precision`]: crate::Precision
pub fn instantiate<P, F>(
    limits: &(impl LimitsProvider<P::Real> + ?Sized),
) -> Result<Instantiation<P::Real, F>, InstantiationError>
where
    P: Precision,
    F: Copy,
{
    Instantiation::new(P::descriptor(), limits)
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{
        instantiate, AliasOverride, CompatOverride, CompatSymbol, Descriptor, DescriptorBuilder,
        Double, DoubleDoubleExtended, ExportPolicy, ExportedSymbol, Field, Float, FunctionSuffix,
        Instantiation, InstantiationError, Linkage, LimitsTable, Operation, PlatformLimits,
        Precision, Single,
    };

    type Binary = fn(f64, f64) -> f64;

    // Stands in for an instantiated kernel; the result only needs to be
    // deterministic and sensitive to special values.
    fn kernel(x: f64, y: f64) -> f64 {
        if x.is_nan() || y.is_nan() {
            return x + y;
        }
        let (x, y) = (if x < 0.0 { -x } else { x }, if y < 0.0 { -y } else { y });
        let (large, small) = if x > y { (x, y) } else { (y, x) };
        if large == 0.0 || large.is_infinite() {
            return large + small;
        }
        let ratio = small / large;
        large * (1.0 + ratio * ratio / 2.0)
    }

    fn special_values() -> [f64; 8] {
        [
            0.0,
            -0.0,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
            f64::MIN_POSITIVE,
            f64::MAX,
            -1.5,
        ]
    }

    #[test]
    fn aliases_are_transparent() {
        let mut instance = instantiate::<Double, Binary>(&PlatformLimits).unwrap();
        let hypot = instance.define("__hypot", kernel).unwrap();
        instance.export_alias2(&hypot, "hypot", "hypotf64").unwrap();

        let surface = instance.surface();
        let names = ["__hypot", "hypot", "hypotf64"];
        let functions: Vec<Binary> = names.iter().map(|name| surface.get(name).unwrap()).collect();

        let mut rng = StdRng::seed_from_u64(7);
        let mut inputs: Vec<(f64, f64)> = Vec::new();
        for x in special_values() {
            for y in special_values() {
                inputs.push((x, y));
            }
        }
        inputs.extend((0..1000).map(|_| (rng.random::<f64>() * 1e3, rng.random::<f64>() * -1e-3)));

        for (x, y) in inputs {
            let expected = functions[0](x, y);
            for function in &functions[1..] {
                assert!(function(x, y).is_identical(expected));
            }
        }
    }

    #[test]
    fn exported_surface_has_one_canonical() {
        let mut instance = instantiate::<Single, fn(f32) -> f32>(&PlatformLimits).unwrap();
        let sinh = instance.define("__sinh", |x| x).unwrap();
        assert_eq!(sinh.symbol(), "__sinhf");
        instance.export_alias2(&sinh, "sinh", "sinhf32").unwrap();

        let symbols = instance.surface().symbols();
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols.iter().filter(|symbol| symbol.canonical).count(), 1);
        assert!(symbols.iter().all(|symbol| symbol.target == "__sinhf"));
        assert_eq!(symbols[1].name, "sinhf");
        assert_eq!(symbols[1].linkage, Linkage::Weak);
        assert_eq!(symbols[2].name, "sinhf32f");
        assert!(instance.surface().compat_symbols().is_empty());
    }

    #[test]
    fn no_compat_symbols_by_default() {
        let mut instance = instantiate::<DoubleDoubleExtended, fn()>(&PlatformLimits).unwrap();
        for operation in Operation::ALL {
            let canonical = instance
                .define(&alloc::format!("__w_{}", operation), || {})
                .unwrap();
            instance.export_alias(&canonical, operation.name()).unwrap();
            assert!(!instance.descriptor().policy().needs_compat(operation.name()));
        }
        assert!(instance.surface().compat_symbols().is_empty());
        assert!(instance
            .surface()
            .names()
            .all(|name| name.ends_with('l')));
    }

    fn needs_compat(function: &str) -> bool {
        function == "exp"
    }

    fn declare_compat(suffix: FunctionSuffix, from: &str, to: &str) -> CompatSymbol {
        CompatSymbol {
            name: to.to_string(),
            target: suffix.apply(from),
            version: "GLIBC_2_0".to_string(),
        }
    }

    #[test]
    fn compat_symbol_when_opted_in() {
        let descriptor = DescriptorBuilder::from_precision::<DoubleDoubleExtended>()
            .policy(ExportPolicy {
                compat: Some(CompatOverride {
                    needs_compat,
                    declare: declare_compat,
                }),
                ..Default::default()
            })
            .build()
            .unwrap();
        let mut instance = Instantiation::<_, fn()>::new(descriptor, &PlatformLimits).unwrap();
        let exp = instance.define("__exp", || {}).unwrap();
        instance.export_alias(&exp, "exp").unwrap();
        let log = instance.define("__log", || {}).unwrap();
        instance.export_alias(&log, "log").unwrap();

        let surface = instance.surface();
        assert_eq!(surface.compat_symbols().len(), 1);
        assert_eq!(surface.compat_symbols()[0].name, "exp");
        assert_eq!(surface.compat_symbols()[0].target, "__expl");
        assert!(surface.contains("expl"));
        assert_eq!(surface.canonical_of("exp").unwrap().name, "__expl");
    }

    fn internal_name(suffix: FunctionSuffix, name: &str) -> String {
        suffix.apply(&alloc::format!("__{}", name))
    }

    #[test]
    fn aliases_refer_to_declared_symbol() {
        let descriptor = DescriptorBuilder::from_precision::<Single>()
            .policy(ExportPolicy {
                declare: Some(internal_name),
                ..Default::default()
            })
            .build()
            .unwrap();
        let mut instance = Instantiation::<_, fn()>::new(descriptor, &PlatformLimits).unwrap();
        let cexp = instance.define("cexp", || {}).unwrap();
        assert_eq!(cexp.symbol(), "__cexpf");
        instance.export_alias(&cexp, "cexp").unwrap();
        instance.export_alias2(&cexp, "cexp2", "cexp3").unwrap();

        let surface = instance.surface();
        for name in ["cexpf", "cexp2f", "cexp3f"] {
            assert_eq!(surface.canonical_of(name).unwrap().name, "__cexpf");
        }
        assert!(surface.symbols().iter().all(|symbol| symbol.target == "__cexpf"));
    }

    fn claims_canonical(suffix: FunctionSuffix, _: &str, to: &str) -> Vec<ExportedSymbol> {
        vec![ExportedSymbol::canonical(suffix.apply(to))]
    }

    fn claims_canonical2(
        suffix: FunctionSuffix,
        from: &str,
        to: &str,
        to2: &str,
    ) -> Vec<ExportedSymbol> {
        let mut symbols = claims_canonical(suffix, from, to);
        symbols.extend(claims_canonical(suffix, from, to2));
        symbols
    }

    fn points_elsewhere(suffix: FunctionSuffix, _: &str, to: &str) -> Vec<ExportedSymbol> {
        vec![ExportedSymbol::weak_alias("nowhere".into(), suffix.apply(to))]
    }

    fn points_elsewhere2(
        suffix: FunctionSuffix,
        from: &str,
        to: &str,
        to2: &str,
    ) -> Vec<ExportedSymbol> {
        let mut symbols = points_elsewhere(suffix, from, to);
        symbols.extend(points_elsewhere(suffix, from, to2));
        symbols
    }

    fn always(_: &str) -> bool {
        true
    }

    fn compat_elsewhere(_: FunctionSuffix, _: &str, to: &str) -> CompatSymbol {
        CompatSymbol {
            name: to.to_string(),
            target: "nowhere".to_string(),
            version: "GLIBC_2_0".to_string(),
        }
    }

    #[rstest::rstest]
    #[case::canonical(
        ExportPolicy {
            alias: Some(AliasOverride { alias: claims_canonical, alias2: claims_canonical2 }),
            ..Default::default()
        },
        "expf"
    )]
    #[case::alias_target(
        ExportPolicy {
            alias: Some(AliasOverride { alias: points_elsewhere, alias2: points_elsewhere2 }),
            ..Default::default()
        },
        "expf"
    )]
    #[case::compat_target(
        ExportPolicy {
            compat: Some(CompatOverride { needs_compat: always, declare: compat_elsewhere }),
            ..Default::default()
        },
        "exp"
    )]
    fn reject_misdirected_policy_symbols(#[case] policy: ExportPolicy, #[case] name: &str) {
        let descriptor = DescriptorBuilder::from_precision::<Single>()
            .policy(policy)
            .build()
            .unwrap();
        let mut instance = Instantiation::<_, fn()>::new(descriptor, &PlatformLimits).unwrap();
        let exp = instance.define("__exp", || {}).unwrap();
        assert_eq!(
            instance.export_alias(&exp, "exp").unwrap_err(),
            InstantiationError::MisdirectedSymbol(name.into()),
        );
        assert_eq!(
            instance.export_alias2(&exp, "exp", "expf32").unwrap_err(),
            InstantiationError::MisdirectedSymbol(name.into()),
        );

        let surface = instance.surface();
        assert_eq!(surface.symbols().len(), 1);
        assert_eq!(surface.symbols().iter().filter(|symbol| symbol.canonical).count(), 1);
        assert!(surface.compat_symbols().is_empty());
        assert!(surface.names().eq(["__expf"]));
    }

    #[test]
    fn export_requires_definition_in_this_instance() {
        let mut single = instantiate::<Single, fn()>(&PlatformLimits).unwrap();
        let mut double = instantiate::<Double, fn()>(&PlatformLimits).unwrap();
        let exp = single.define("__exp", || {}).unwrap();
        assert_eq!(
            double.export_alias(&exp, "exp").unwrap_err(),
            InstantiationError::UndefinedSymbol("__expf".into()),
        );
        assert!(double.surface().symbols().is_empty());
    }

    #[test]
    fn duplicate_export_publishes_nothing() {
        let mut instance = instantiate::<Double, fn()>(&PlatformLimits).unwrap();
        let cosh = instance.define("__cosh", || {}).unwrap();
        instance.export_alias(&cosh, "cosh").unwrap();
        assert_eq!(
            instance.export_alias2(&cosh, "coshf64", "cosh").unwrap_err(),
            InstantiationError::DuplicateSymbol("cosh".into()),
        );
        assert!(!instance.surface().contains("coshf64"));
        assert_eq!(
            instance.define("__cosh", || {}).unwrap_err(),
            InstantiationError::DuplicateSymbol("__cosh".into()),
        );
    }

    #[test]
    fn missing_field_fails_before_resolution() {
        // The limits table is empty, so any resolution would fail with
        // `UnknownPrecisionPrefix` instead.
        let builder = Descriptor::<f64>::builder()
            .literal("", |x| x)
            .constant("", |c| c.to_f64())
            .limits_prefix("DBL")
            .function_suffix("")
            .real_type("double")
            .nan_from_str("__strtod_nan", crate::nan::f64_from_str);
        let error =
            Instantiation::<f64, fn()>::from_builder(builder, &LimitsTable::<f64>::new()).unwrap_err();
        assert_eq!(
            error,
            InstantiationError::MissingDescriptorField(Field::ComplexType)
        );
    }

    #[test]
    fn unknown_prefix_produces_nothing() {
        let builder = DescriptorBuilder::from_precision::<Double>().limits_prefix("DBL64");
        let error = Instantiation::<f64, fn()>::from_builder(builder, &PlatformLimits).unwrap_err();
        assert_eq!(error, InstantiationError::UnknownPrecisionPrefix("DBL64".into()));
    }

    #[test]
    fn resolve_through_instance() {
        let instance = instantiate::<Single, fn()>(&PlatformLimits).unwrap();
        assert_eq!(instance.resolve("hypot").unwrap(), "__ieee754_hypotf");
        assert_eq!(instance.resolve("scalbn").unwrap(), "__scalbnf");
        assert_eq!(
            instance.resolve("lgamma").unwrap_err(),
            InstantiationError::UnsupportedOperationName("lgamma".into()),
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn precisions_instantiate_in_parallel() {
        fn run<P>() -> (u32, usize)
        where
            P: Precision,
            PlatformLimits: crate::LimitsProvider<P::Real>,
        {
            let mut instance = instantiate::<P, fn()>(&PlatformLimits).unwrap();
            for operation in Operation::ALL {
                instance.define(&operation.base_name(), || {}).unwrap();
            }
            (
                instance.constants().mant_dig(),
                instance.surface().symbols().len(),
            )
        }

        let results = std::thread::scope(|scope| {
            let single = scope.spawn(run::<Single>);
            let double = scope.spawn(run::<Double>);
            let double_double = scope.spawn(run::<DoubleDoubleExtended>);
            [single, double, double_double].map(|handle| handle.join().unwrap())
        });
        assert_eq!(results, [(24, 12), (53, 12), (106, 12)]);
    }
}
