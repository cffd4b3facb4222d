//! Tonality tables: which note every button sounds on each bellows stroke.
//!
//! A [`Tonality`] is plain data. The engine never reads it directly; it is
//! turned into a [`Layout`] of [`Control`]s first, which is where the row
//! geometry is checked and chord symbols are looked up.

mod layout;
pub mod presets;

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use layout::{
    display_label, Chord, Control, ControlId, Layout, LayoutRow, Role, RowId, Voicing, BASS_KEYS,
};

/// Note pair lists for one melody row, in key order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RowNotes {
    /// Short name of the row's key (e.g. "Sol").
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    pub open: Vec<String>,
    pub close: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    pub outer: RowNotes,
    pub middle: RowNotes,
    pub inner: RowNotes,
}

impl Rows {
    pub fn get(&self, row: RowId) -> &RowNotes {
        match row {
            RowId::Outer => &self.outer,
            RowId::Middle => &self.middle,
            RowId::Inner => &self.inner,
        }
    }
}

/// Chord symbols a bass button plays on each stroke.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BassChords {
    pub open: String,
    pub close: String,
}

/// Chord symbol -> ordered note names.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChordDictionary(BTreeMap<String, Vec<String>>);

impl ChordDictionary {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, symbol: &str, notes: &[&str]) -> Self {
        self.insert(symbol, notes);
        self
    }

    pub fn insert(&mut self, symbol: &str, notes: &[&str]) {
        self.0
            .insert(symbol.to_string(), notes.iter().map(|n| n.to_string()).collect());
    }

    /// Notes for `symbol`; unknown symbols are an empty chord.
    pub fn notes(&self, symbol: &str) -> &[String] {
        self.0.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A complete key/scale configuration for the instrument.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tonality {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    pub rows: Rows,
    /// Bass key symbol -> chord pair.
    pub bass: BTreeMap<String, BassChords>,
    #[cfg_attr(feature = "serde", serde(default = "presets::chord_library"))]
    pub chords: ChordDictionary,
}

impl Tonality {
    /// Look up a built-in tonality by name (`"GCF"`, `"BbEbAb"`).
    pub fn builtin(name: &str) -> Option<Tonality> {
        presets::all().into_iter().find(|t| t.name == name)
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}
