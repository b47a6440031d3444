//! Export policy and the exported surface of an instantiation.
//!
//! An instantiated function is defined once under a canonical symbol. The
//! export policy of its precision decides which additional public names refer
//! to that definition and whether a compatibility symbol is produced for an
//! older ABI. All names are bound to the same implementation, so every name
//! computes bit-identical results.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::descriptor::FunctionSuffix;
use crate::InstantiationError;

/// Linkage of an exported symbol.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Linkage {
    Strong,
    /// May be overridden by a strong definition of the same name.
    Weak,
}

/// A public name and the symbol it refers to.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExportedSymbol {
    pub name: String,
    /// The canonical symbol the name refers to. For the canonical symbol, this
    /// is its own name.
    pub target: String,
    pub linkage: Linkage,
    pub canonical: bool,
}

impl ExportedSymbol {
    pub fn canonical(name: String) -> Self {
        ExportedSymbol {
            target: name.clone(),
            name,
            linkage: Linkage::Strong,
            canonical: true,
        }
    }

    pub fn weak_alias(target: String, name: String) -> Self {
        ExportedSymbol {
            name,
            target,
            linkage: Linkage::Weak,
            canonical: false,
        }
    }

    pub fn strong_alias(target: String, name: String) -> Self {
        ExportedSymbol {
            name,
            target,
            linkage: Linkage::Strong,
            canonical: false,
        }
    }
}

/// A legacy name kept for binary compatibility.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompatSymbol {
    pub name: String,
    pub target: String,
    /// The symbol version the legacy name was introduced in, e.g. `GLIBC_2_0`.
    pub version: String,
}

/// Replaces the default alias policy.
///
/// Both the single and the two-target policies are replaced together, so that
/// a precision cannot publish names inconsistently between the two.
#[derive(Clone, Copy, Debug)]
pub struct AliasOverride {
    /// Aliases `to` for the function `from`.
    pub alias: fn(FunctionSuffix, &str, &str) -> Vec<ExportedSymbol>,
    /// Aliases `to` and `to2` for the function `from`.
    pub alias2: fn(FunctionSuffix, &str, &str, &str) -> Vec<ExportedSymbol>,
}

/// Opts a precision into compatibility symbols.
#[derive(Clone, Copy, Debug)]
pub struct CompatOverride {
    /// Determines whether the function with the given generic name needs a
    /// compatibility symbol.
    pub needs_compat: fn(&str) -> bool,
    /// Generates the compatibility symbol of `to` for the function `from`.
    pub declare: fn(FunctionSuffix, &str, &str) -> CompatSymbol,
}

/// Export policy of a precision.
///
/// Every field is optional. When absent, aliases are weak aliases of the
/// suffixed function name, no compatibility symbols are produced and functions
/// are declared under their suffixed name.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportPolicy {
    pub alias: Option<AliasOverride>,
    pub compat: Option<CompatOverride>,
    pub declare: Option<fn(FunctionSuffix, &str) -> String>,
}

impl ExportPolicy {
    /// The alias symbols publishing the function `from`, defined as `target`,
    /// as `to`.
    pub fn alias(
        &self,
        suffix: FunctionSuffix,
        from: &str,
        target: &str,
        to: &str,
    ) -> Vec<ExportedSymbol> {
        match self.alias {
            Some(policy) => (policy.alias)(suffix, from, to),
            _ => vec![ExportedSymbol::weak_alias(target.into(), suffix.apply(to))],
        }
    }

    /// The alias symbols publishing the function `from`, defined as `target`,
    /// as `to` and `to2`.
    pub fn alias2(
        &self,
        suffix: FunctionSuffix,
        from: &str,
        target: &str,
        to: &str,
        to2: &str,
    ) -> Vec<ExportedSymbol> {
        match self.alias {
            Some(policy) => (policy.alias2)(suffix, from, to, to2),
            _ => {
                let mut symbols = self.alias(suffix, from, target, to);
                symbols.extend(self.alias(suffix, from, target, to2));
                symbols
            }
        }
    }

    pub fn needs_compat(&self, function: &str) -> bool {
        self.compat
            .map_or(false, |policy| (policy.needs_compat)(function))
    }

    /// The compatibility symbol of `to` for the function `from`, if the policy
    /// requires one.
    pub fn compat(&self, suffix: FunctionSuffix, from: &str, to: &str) -> Option<CompatSymbol> {
        self.compat
            .filter(|policy| (policy.needs_compat)(to))
            .map(|policy| (policy.declare)(suffix, from, to))
    }
}

/// The public names of an instantiation and the implementation behind each.
///
/// Implementations are typically function pointers. A name is bound at most
/// once; binding a set of names either binds all of them or none.
#[derive(Clone, Debug)]
pub struct Surface<F> {
    symbols: Vec<ExportedSymbol>,
    compat: Vec<CompatSymbol>,
    bindings: BTreeMap<String, F>,
}

impl<F> Default for Surface<F> {
    fn default() -> Self {
        Surface {
            symbols: Vec::new(),
            compat: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }
}

impl<F> Surface<F>
where
    F: Copy,
{
    pub fn new() -> Self {
        Surface::default()
    }

    /// Gets the implementation bound to a name.
    pub fn get(&self, name: &str) -> Option<F> {
        self.bindings.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn symbols(&self) -> &[ExportedSymbol] {
        &self.symbols
    }

    pub fn compat_symbols(&self) -> &[CompatSymbol] {
        &self.compat
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// The canonical symbol that a name refers to.
    pub fn canonical_of(&self, name: &str) -> Option<&ExportedSymbol> {
        let target = self
            .symbols
            .iter()
            .find(|symbol| symbol.name == name)
            .map(|symbol| symbol.target.as_str())
            .or_else(|| {
                self.compat
                    .iter()
                    .find(|symbol| symbol.name == name)
                    .map(|symbol| symbol.target.as_str())
            })?;
        self.symbols
            .iter()
            .find(|symbol| symbol.canonical && symbol.name == target)
    }

    /// Binds exported symbols and an optional compatibility symbol to an
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSymbol` if any name is already bound or appears more
    /// than once, in which case nothing is bound.
    pub fn bind(
        &mut self,
        symbols: Vec<ExportedSymbol>,
        compat: Option<CompatSymbol>,
        implementation: F,
    ) -> Result<(), InstantiationError> {
        self.check_unbound(
            symbols
                .iter()
                .map(|symbol| symbol.name.as_str())
                .chain(compat.iter().map(|symbol| symbol.name.as_str())),
        )?;
        for symbol in symbols {
            log::trace!(
                "export `{}` -> `{}` ({:?}{})",
                symbol.name,
                symbol.target,
                symbol.linkage,
                if symbol.canonical { ", canonical" } else { "" },
            );
            self.bindings.insert(symbol.name.clone(), implementation);
            self.symbols.push(symbol);
        }
        if let Some(symbol) = compat {
            log::trace!(
                "export compat `{}@{}` -> `{}`",
                symbol.name,
                symbol.version,
                symbol.target,
            );
            self.bindings.insert(symbol.name.clone(), implementation);
            self.compat.push(symbol);
        }
        Ok(())
    }

    fn check_unbound<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), InstantiationError> {
        let mut pending: Vec<&str> = Vec::new();
        for name in names {
            if self.bindings.contains_key(name) || pending.contains(&name) {
                return Err(InstantiationError::DuplicateSymbol(name.into()));
            }
            pending.push(name);
        }
        Ok(())
    }
}
