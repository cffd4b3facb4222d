use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use crate::engine::Stroke;
use crate::error::{Error, Result};

use super::Tonality;

/*
Keyboard Geometry
=================

The melody side has three rows of buttons bound to three rows of a computer
keyboard. The bass side has eight buttons.

  inner   W  E  R  T  Y  U  I  O  P  ´        (10)
  middle  A  S  D  F  G  H  J  K  L  Ñ  {     (11)
  outer   Z  X  C  V  B  N  M  ,  .  -        (10)

  bass    F5 F6 F7 F8 7  8  9  0              (8)

A tonality supplies, per row, one open note and one close note for every
key in that row, and per bass key an open chord and a close chord.
*/

const OUTER_KEYS: [&str; 10] = ["z", "x", "c", "v", "b", "n", "m", ",", ".", "-"];
const MIDDLE_KEYS: [&str; 11] = ["a", "s", "d", "f", "g", "h", "j", "k", "l", "ñ", "{"];
const INNER_KEYS: [&str; 10] = ["w", "e", "r", "t", "y", "u", "i", "o", "p", "´"];

/// Bass key symbols in panel order.
pub const BASS_KEYS: [&str; 8] = ["f5", "f6", "f7", "f8", "7", "8", "9", "0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    Outer,
    Middle,
    Inner,
}

impl RowId {
    pub const ALL: [RowId; 3] = [RowId::Outer, RowId::Middle, RowId::Inner];

    pub fn keys(self) -> &'static [&'static str] {
        match self {
            RowId::Outer => &OUTER_KEYS,
            RowId::Middle => &MIDDLE_KEYS,
            RowId::Inner => &INNER_KEYS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RowId::Outer => "outer",
            RowId::Middle => "middle",
            RowId::Inner => "inner",
        }
    }
}

/// Normalized key symbol identifying one button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(String);

impl ControlId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ControlId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-cased key label for display (`ñ` -> `Ñ`, `f5` -> `F5`).
pub fn display_label(key: &str) -> String {
    key.to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Melody,
    Bass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    pub symbol: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Voicing {
    /// One reed per stroke.
    Reed { open: String, close: String },
    /// A chord per stroke, all notes sounding together.
    Chord { open: Chord, close: Chord },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: ControlId,
    pub row: Option<RowId>,
    pub label: String,
    pub voicing: Voicing,
}

impl Control {
    pub fn role(&self) -> Role {
        match self.voicing {
            Voicing::Reed { .. } => Role::Melody,
            Voicing::Chord { .. } => Role::Bass,
        }
    }

    /// Written note names this control sounds on `stroke`.
    pub fn notes(&self, stroke: Stroke) -> &[String] {
        match (&self.voicing, stroke) {
            (Voicing::Reed { open, .. }, Stroke::Open) => std::slice::from_ref(open),
            (Voicing::Reed { close, .. }, Stroke::Close) => std::slice::from_ref(close),
            (Voicing::Chord { open, .. }, Stroke::Open) => &open.notes,
            (Voicing::Chord { close, .. }, Stroke::Close) => &close.notes,
        }
    }

    /// Short label for `stroke`: the note for a reed, the chord symbol for a bass.
    pub fn stroke_label(&self, stroke: Stroke) -> &str {
        match (&self.voicing, stroke) {
            (Voicing::Reed { open, .. }, Stroke::Open) => open,
            (Voicing::Reed { close, .. }, Stroke::Close) => close,
            (Voicing::Chord { open, .. }, Stroke::Open) => &open.symbol,
            (Voicing::Chord { close, .. }, Stroke::Close) => &close.symbol,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow {
    pub id: RowId,
    pub title: String,
    pub controls: Vec<ControlId>,
}

/// Every control of one tonality, addressable by key symbol.
#[derive(Debug, Clone)]
pub struct Layout {
    rows: Vec<LayoutRow>,
    bass: Vec<ControlId>,
    controls: BTreeMap<ControlId, Control>,
}

impl Layout {
    /// Build the controls for `tonality`, checking it against the keyboard geometry.
    pub fn from_tonality(tonality: &Tonality) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTonality {
            tonality: tonality.name.clone(),
            reason,
        };

        let mut controls = BTreeMap::new();
        let mut rows = Vec::with_capacity(RowId::ALL.len());

        for row_id in RowId::ALL {
            let keys = row_id.keys();
            let notes = tonality.rows.get(row_id);
            if notes.open.len() != keys.len() || notes.close.len() != keys.len() {
                return Err(invalid(format!(
                    "{} row needs {} open and close notes, got {} and {}",
                    row_id.name(),
                    keys.len(),
                    notes.open.len(),
                    notes.close.len()
                )));
            }

            let mut ids = Vec::with_capacity(keys.len());
            for ((key, open), close) in keys.iter().zip(&notes.open).zip(&notes.close) {
                let id = ControlId::new(*key);
                controls.insert(
                    id.clone(),
                    Control {
                        id: id.clone(),
                        row: Some(row_id),
                        label: display_label(key),
                        voicing: Voicing::Reed {
                            open: open.clone(),
                            close: close.clone(),
                        },
                    },
                );
                ids.push(id);
            }

            rows.push(LayoutRow {
                id: row_id,
                title: notes.title.clone(),
                controls: ids,
            });
        }

        let mut bass = Vec::with_capacity(BASS_KEYS.len());
        for key in BASS_KEYS {
            let pair = tonality
                .bass
                .get(key)
                .ok_or_else(|| invalid(format!("missing bass button {key:?}")))?;
            let chord = |symbol: &str| Chord {
                symbol: symbol.to_string(),
                notes: tonality.chords.notes(symbol).to_vec(),
            };

            let id = ControlId::new(key);
            controls.insert(
                id.clone(),
                Control {
                    id: id.clone(),
                    row: None,
                    label: display_label(key),
                    voicing: Voicing::Chord {
                        open: chord(&pair.open),
                        close: chord(&pair.close),
                    },
                },
            );
            bass.push(id);
        }

        Ok(Self {
            rows,
            bass,
            controls,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Control> {
        self.controls.get(key)
    }

    /// Like [`Layout::get`], but an absent key is an [`Error::UnknownControl`].
    pub fn require(&self, key: &str) -> Result<&Control> {
        self.get(key)
            .ok_or_else(|| Error::UnknownControl(key.to_string()))
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    pub fn bass(&self) -> impl Iterator<Item = &Control> + '_ {
        self.bass.iter().filter_map(|id| self.controls.get(id))
    }

    pub fn row_controls<'a>(&'a self, row: &'a LayoutRow) -> impl Iterator<Item = &'a Control> + 'a {
        row.controls.iter().filter_map(|id| self.controls.get(id))
    }
}
