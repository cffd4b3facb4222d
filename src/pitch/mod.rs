//! Note name to frequency resolution.
//!
//! [`resolve`] is the entry point used by the voice engine. Results are
//! memoized process-wide; the table is never invalidated since the
//! frequency of a note name is a constant.

mod note;

use std::collections::BTreeMap;

use parking_lot::{const_rwlock, RwLock};

use crate::error::Result;

pub use note::{Accidental, Letter, NoteName, REFERENCE_HZ};

static FREQUENCIES: RwLock<BTreeMap<String, f64>> = const_rwlock(BTreeMap::new());

/// Resolve a written note (`"D4"`, `"Bb3"`, `"F#5"`) to Hz.
///
/// Fails with [`crate::Error::UnresolvableNote`] for malformed input. Callers
/// in the engine treat that as "no sound" for the one note.
pub fn resolve(note: &str) -> Result<f64> {
    if let Some(&hz) = FREQUENCIES.read().get(note) {
        return Ok(hz);
    }

    let name: NoteName = note.parse()?;
    let hz = name
        .frequency()
        .ok_or_else(|| crate::Error::UnresolvableNote(note.to_string()))?;

    // Two threads may compute the same entry; the value is identical either way.
    FREQUENCIES.write().insert(note.to_string(), hz);
    Ok(hz)
}

/// Number of memoized note names.
pub fn cached_len() -> usize {
    FREQUENCIES.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn a4_is_exactly_the_reference() {
        assert_eq!(resolve("A4").unwrap(), 440.0);
        // Second lookup comes from the cache and must be identical.
        assert_eq!(resolve("A4").unwrap(), 440.0);
    }

    #[test]
    fn known_frequencies() {
        assert!(approx(resolve("D4").unwrap(), 293.66));
        assert!(approx(resolve("F#3").unwrap(), 185.00));
        assert!(approx(resolve("C4").unwrap(), 261.63));
        assert!(approx(resolve("A5").unwrap(), 880.0));
    }

    #[test]
    fn enharmonic_collapse() {
        assert_eq!(resolve("Cb4").unwrap(), resolve("B4").unwrap());
        assert_eq!(resolve("B#3").unwrap(), resolve("C3").unwrap());
        assert_eq!(resolve("Fb4").unwrap(), resolve("E4").unwrap());
        assert_eq!(resolve("E#4").unwrap(), resolve("F4").unwrap());
    }

    #[test]
    fn unresolvable_input_is_an_error_not_a_panic() {
        assert!(matches!(resolve("Z9"), Err(Error::UnresolvableNote(_))));
        assert!(matches!(resolve("C#"), Err(Error::UnresolvableNote(_))));
        assert!(resolve("").is_err());
        assert!(resolve("E♭4").is_err());
        assert!(resolve("C♯5").is_err());
    }

    #[test]
    fn failures_are_not_cached() {
        let _ = resolve("nope");
        assert!(FREQUENCIES.read().get("nope").is_none());
    }

    #[test]
    fn concurrent_lookups_agree() {
        let notes = ["C3", "Eb4", "G#5", "Bb2", "F#6", "D4"];
        let expected: Vec<f64> = notes
            .iter()
            .map(|n| n.parse::<NoteName>().unwrap().frequency().unwrap())
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for (note, hz) in notes.iter().zip(&expected) {
                        assert_eq!(resolve(note).unwrap(), *hz);
                    }
                });
            }
        });
        assert!(cached_len() >= notes.len());
    }
}
