use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/*
Note Names
==========

A note name is a letter, an optional accidental and a single octave digit:

  A4    D#5    Bb3    F#3

Octaves follow scientific pitch notation, so C4 is middle C and A4 is the
440 Hz tuning reference. Only one digit is accepted (octaves 0-9), which
covers every button the instrument has with a wide margin.

Enharmonic Collapse
-------------------

Four spellings have no entry of their own in the semitone table. They are
collapsed onto the natural letter a semitone away, keeping the written
octave:

  Cb -> B     Fb -> E     E# -> F     B# -> C

Keeping the octave means `Cb4` sounds as `B4` (an octave above the true Cb4)
and `B#3` sounds as `C3` (an octave below the true B#3). Tonality tables in
the wild are written against this behaviour, so it is kept as is.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// Semitone distance from A natural within the same octave.
const SEMITONE_OFFSETS: [(Letter, Accidental, i32); 17] = [
    (Letter::C, Accidental::Natural, -9),
    (Letter::C, Accidental::Sharp, -8),
    (Letter::D, Accidental::Flat, -8),
    (Letter::D, Accidental::Natural, -7),
    (Letter::D, Accidental::Sharp, -6),
    (Letter::E, Accidental::Flat, -6),
    (Letter::E, Accidental::Natural, -5),
    (Letter::F, Accidental::Natural, -4),
    (Letter::F, Accidental::Sharp, -3),
    (Letter::G, Accidental::Flat, -3),
    (Letter::G, Accidental::Natural, -2),
    (Letter::G, Accidental::Sharp, -1),
    (Letter::A, Accidental::Flat, -1),
    (Letter::A, Accidental::Natural, 0),
    (Letter::A, Accidental::Sharp, 1),
    (Letter::B, Accidental::Flat, 1),
    (Letter::B, Accidental::Natural, 2),
];

pub const REFERENCE_HZ: f64 = 440.0;
const REFERENCE_OCTAVE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: u8,
}

impl NoteName {
    pub fn new(letter: Letter, accidental: Accidental, octave: u8) -> Self {
        Self {
            letter,
            accidental,
            octave,
        }
    }

    /// Apply the enharmonic collapse (`Cb`, `Fb`, `E#`, `B#`), keeping the octave.
    pub fn normalized(self) -> Self {
        let (letter, accidental) = match (self.letter, self.accidental) {
            (Letter::C, Accidental::Flat) => (Letter::B, Accidental::Natural),
            (Letter::F, Accidental::Flat) => (Letter::E, Accidental::Natural),
            (Letter::E, Accidental::Sharp) => (Letter::F, Accidental::Natural),
            (Letter::B, Accidental::Sharp) => (Letter::C, Accidental::Natural),
            other => other,
        };
        Self {
            letter,
            accidental,
            octave: self.octave,
        }
    }

    /// Semitones from A4, or `None` when the spelling has no table entry.
    pub fn semitones_from_a4(self) -> Option<i32> {
        let note = self.normalized();
        SEMITONE_OFFSETS
            .iter()
            .find(|(letter, accidental, _)| *letter == note.letter && *accidental == note.accidental)
            .map(|(_, _, offset)| offset + (note.octave as i32 - REFERENCE_OCTAVE) * 12)
    }

    /// Equal-tempered frequency in Hz against A4 = 440 Hz.
    pub fn frequency(self) -> Option<f64> {
        let distance = self.semitones_from_a4()?;
        Some(REFERENCE_HZ * 2.0_f64.powf(distance as f64 / 12.0))
    }
}

impl FromStr for NoteName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unresolvable = || Error::UnresolvableNote(s.to_string());
        let mut chars = s.chars().peekable();

        let letter = match chars.next() {
            Some('C') => Letter::C,
            Some('D') => Letter::D,
            Some('E') => Letter::E,
            Some('F') => Letter::F,
            Some('G') => Letter::G,
            Some('A') => Letter::A,
            Some('B') => Letter::B,
            _ => return Err(unresolvable()),
        };

        let accidental = match chars.peek() {
            Some('#') => {
                chars.next();
                Accidental::Sharp
            }
            Some('b') => {
                chars.next();
                Accidental::Flat
            }
            _ => Accidental::Natural,
        };

        let octave = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(unresolvable)? as u8;

        if chars.next().is_some() {
            return Err(unresolvable());
        }

        Ok(Self::new(letter, accidental, octave))
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.accidental {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        };
        write!(f, "{:?}{}{}", self.letter, accidental, self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letter_accidental_octave() {
        let note: NoteName = "F#3".parse().unwrap();
        assert_eq!(note, NoteName::new(Letter::F, Accidental::Sharp, 3));

        let note: NoteName = "Bb4".parse().unwrap();
        assert_eq!(note, NoteName::new(Letter::B, Accidental::Flat, 4));

        let note: NoteName = "C0".parse().unwrap();
        assert_eq!(note.to_string(), "C0");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "H4", "a4", "A", "A10", "A#b4", "Ab", "4A", "A4 ", "E♭4", "C♯5"] {
            assert!(
                matches!(bad.parse::<NoteName>(), Err(Error::UnresolvableNote(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn enharmonic_collapse_keeps_octave() {
        let cases = [("Cb4", "B4"), ("Fb2", "E2"), ("E#5", "F5"), ("B#3", "C3")];
        for (written, sounding) in cases {
            let written: NoteName = written.parse().unwrap();
            let sounding: NoteName = sounding.parse().unwrap();
            assert_eq!(written.normalized(), sounding);
        }
    }

    #[test]
    fn semitone_distances() {
        let distance = |s: &str| s.parse::<NoteName>().unwrap().semitones_from_a4();
        assert_eq!(distance("A4"), Some(0));
        assert_eq!(distance("C4"), Some(-9));
        assert_eq!(distance("A5"), Some(12));
        assert_eq!(distance("Gb3"), distance("F#3"));
        assert_eq!(distance("F#3"), Some(-15));
    }
}
