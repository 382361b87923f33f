use crate::core::error::GeometryError;
use phf::{Map, phf_map};
use std::fmt;

/// The chemical elements this engine knows about.
///
/// Each element carries rough OPLS-style van der Waals parameters used by
/// the steric screen. `Dummy` represents a placeholder center (symbol "Q")
/// with zeroed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Carbon,
    Hydrogen,
    Nitrogen,
    Oxygen,
    Sulfur,
    Fluorine,
    Chlorine,
    Phosphorus,
    Bromine,
    Titanium,
    Dummy,
}

/// Symbol table, including the legacy aliases that appear in force-field
/// atom names (e.g. "CA" for an aromatic carbon, "HN" for an amide proton).
static ELEMENTS_BY_SYMBOL: Map<&'static str, Element> = phf_map! {
    "C" => Element::Carbon,
    "CA" => Element::Carbon,
    "H" => Element::Hydrogen,
    "HN" => Element::Hydrogen,
    "HS" => Element::Hydrogen,
    "HO" => Element::Hydrogen,
    "N" => Element::Nitrogen,
    "O" => Element::Oxygen,
    "O-" => Element::Oxygen,
    "OH" => Element::Oxygen,
    "S" => Element::Sulfur,
    "SH" => Element::Sulfur,
    "SS" => Element::Sulfur,
    "F" => Element::Fluorine,
    "Cl" => Element::Chlorine,
    "P" => Element::Phosphorus,
    "Br" => Element::Bromine,
    "Ti" => Element::Titanium,
    "Q" => Element::Dummy,
};

impl Element {
    /// Looks up an element by symbol, accepting legacy aliases.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::UnrecognizedSymbol` for unknown input.
    pub fn from_symbol(symbol: &str) -> Result<Self, GeometryError> {
        ELEMENTS_BY_SYMBOL
            .get(symbol)
            .copied()
            .ok_or_else(|| GeometryError::UnrecognizedSymbol {
                symbol: symbol.to_string(),
            })
    }

    /// The canonical atomic symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Carbon => "C",
            Element::Hydrogen => "H",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Sulfur => "S",
            Element::Fluorine => "F",
            Element::Chlorine => "Cl",
            Element::Phosphorus => "P",
            Element::Bromine => "Br",
            Element::Titanium => "Ti",
            Element::Dummy => "Q",
        }
    }

    /// Rough vdW sigma parameter in Angstroms.
    pub fn sigma(&self) -> f64 {
        match self {
            Element::Carbon => 3.75,
            Element::Hydrogen => 2.50,
            Element::Nitrogen => 3.25,
            Element::Oxygen => 2.96,
            Element::Sulfur => 3.60,
            Element::Fluorine => 2.94,
            Element::Chlorine => 3.40,
            Element::Phosphorus => 3.72,
            Element::Bromine => 3.15,
            Element::Titanium => 3.75,
            Element::Dummy => 0.0,
        }
    }

    /// Rough vdW well depth (epsilon) in kcal/mol.
    pub fn epsilon(&self) -> f64 {
        match self {
            Element::Carbon => 0.105,
            Element::Hydrogen => 0.03,
            Element::Nitrogen => 0.17,
            Element::Oxygen => 0.21,
            Element::Sulfur => 0.355,
            Element::Fluorine => 0.061,
            Element::Chlorine => 0.300,
            Element::Phosphorus => 0.20,
            Element::Bromine => 0.15,
            Element::Titanium => 0.105,
            Element::Dummy => 0.0,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} ({}, sigma={:.3}, epsilon={:.3})",
            self,
            self.symbol(),
            self.sigma(),
            self.epsilon()
        )
    }
}
