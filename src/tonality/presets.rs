//! Built-in tonalities and the shared chord dictionary.

use std::collections::BTreeMap;

use super::{BassChords, ChordDictionary, RowNotes, Rows, Tonality};

/// Triads used by the bass buttons. Upper-case suffix `M` marks the chord
/// voiced an octave up; the bare letter is the low root-fifth-octave voicing.
pub fn chord_library() -> ChordDictionary {
    ChordDictionary::new()
        .with("DM", &["D4", "F#4", "A4"])
        .with("D", &["D3", "A3", "D4"])
        .with("GM", &["G4", "B4", "D5"])
        .with("G", &["G3", "D4", "G4"])
        .with("CM", &["C4", "E4", "G4"])
        .with("C", &["C3", "G3", "C4"])
        .with("Am", &["A3", "C4", "E4"])
        .with("A", &["A3", "E4", "A4"])
        .with("Dm", &["D4", "F4", "A4"])
        .with("EM", &["E4", "G#4", "B4"])
        .with("E", &["E3", "B3", "E4"])
        .with("AM", &["A4", "C#5", "E5"])
        .with("F", &["F3", "C4", "F4"])
        .with("Bb", &["Bb3", "D4", "F4"])
        .with("Eb", &["Eb4", "G4", "Bb4"])
        .with("Ab", &["Ab3", "C4", "Eb4"])
        .with("Db", &["Db4", "F4", "Ab4"])
}

fn row(title: &str, open: &[&str], close: &[&str]) -> RowNotes {
    RowNotes {
        title: title.to_string(),
        open: open.iter().map(|n| n.to_string()).collect(),
        close: close.iter().map(|n| n.to_string()).collect(),
    }
}

fn bass(pairs: [(&str, &str, &str); 8]) -> BTreeMap<String, BassChords> {
    pairs
        .into_iter()
        .map(|(key, open, close)| {
            (
                key.to_string(),
                BassChords {
                    open: open.to_string(),
                    close: close.to_string(),
                },
            )
        })
        .collect()
}

/// G-C-F ("Sol-Do-Fa").
pub fn gcf() -> Tonality {
    Tonality {
        name: "GCF".to_string(),
        label: "GCF (Sol-Do-Fa)".to_string(),
        rows: Rows {
            outer: row(
                "Sol",
                &["Eb4", "A3", "C4", "E4", "F#4", "A4", "C5", "E5", "F#5", "A5"],
                &["C#4", "G3", "B3", "D4", "G4", "B4", "D5", "G5", "B5", "D6"],
            ),
            middle: row(
                "Do",
                &["G#3", "B3", "D4", "F4", "A4", "B4", "D5", "F5", "A5", "B5", "D6"],
                &["F#3", "G3", "C4", "E4", "G4", "C5", "E5", "G5", "C6", "E6", "G6"],
            ),
            inner: row(
                "Fa",
                &["C#5", "E4", "G4", "Bb4", "D5", "E5", "G5", "Bb5", "D6", "E6"],
                &["C#5", "C4", "F4", "A4", "C5", "F5", "A5", "C6", "F6", "A6"],
            ),
        },
        bass: bass([
            ("f5", "DM", "GM"),
            ("f6", "D", "G"),
            ("f7", "GM", "CM"),
            ("f8", "G", "C"),
            ("7", "Am", "EM"),
            ("8", "A", "E"),
            ("9", "Dm", "AM"),
            ("0", "D", "A"),
        ]),
        chords: chord_library(),
    }
}

/// B flat - E flat - A flat.
pub fn bb_eb_ab() -> Tonality {
    Tonality {
        name: "BbEbAb".to_string(),
        label: "Bb-Eb-Ab".to_string(),
        rows: Rows {
            outer: row(
                "Bb",
                &["Gb4", "C3", "Eb4", "G4", "A4", "C4", "Eb5", "G5", "A5", "C5"],
                &["E4", "Bb3", "D3", "F4", "Bb4", "D4", "F5", "Bb5", "D5", "F6"],
            ),
            middle: row(
                "Eb",
                &["B3", "D3", "F4", "Ab4", "C5", "D5", "F5", "Ab5", "C6", "D6", "F6"],
                &["A3", "Bb3", "Eb4", "G4", "Bb4", "Eb5", "G5", "Bb5", "Eb6", "G6", "Bb6"],
            ),
            inner: row(
                "Ab",
                &["E5", "G4", "Bb4", "Db4", "F5", "G5", "Bb5", "Db5", "F6", "G6"],
                &["Gb5", "Eb4", "Ab4", "C5", "Eb5", "Ab5", "C6", "Eb6", "Ab6", "C7"],
            ),
        },
        bass: bass([
            ("f5", "C", "G"),
            ("f6", "F", "C"),
            ("f7", "Db", "Db"),
            ("f8", "Db", "Db"),
            ("7", "F", "Bb"),
            ("8", "Bb", "Eb"),
            ("9", "Eb", "Ab"),
            ("0", "Eb", "Ab"),
        ]),
        chords: chord_library(),
    }
}

/// Every built-in tonality, in picker order.
pub fn all() -> Vec<Tonality> {
    vec![gcf(), bb_eb_ab()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch;
    use crate::tonality::Layout;

    #[test]
    fn presets_build_layouts() {
        for tonality in all() {
            let layout = Layout::from_tonality(&tonality).expect("preset should be valid");
            let melody: usize = layout.rows().iter().map(|row| row.controls.len()).sum();
            assert_eq!(melody, 31);
            assert_eq!(layout.bass().count(), 8);
        }
    }

    #[test]
    fn every_preset_note_resolves() {
        for tonality in all() {
            let rows = &tonality.rows;
            for notes in [&rows.outer, &rows.middle, &rows.inner] {
                for note in notes.open.iter().chain(&notes.close) {
                    assert!(pitch::resolve(note).is_ok(), "{} in {}", note, tonality.name);
                }
            }
            for chords in tonality.bass.values() {
                for symbol in [&chords.open, &chords.close] {
                    let notes = tonality.chords.notes(symbol);
                    assert_eq!(notes.len(), 3, "chord {symbol}");
                    assert!(notes.iter().all(|n| pitch::resolve(n).is_ok()));
                }
            }
        }
    }

    #[test]
    fn chord_library_has_all_symbols() {
        assert_eq!(chord_library().len(), 17);
    }
}
