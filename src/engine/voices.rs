use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    engine::{tracker::HeldControls, Stroke},
    pitch,
    synth::{ToneBackend, VoiceHandle},
    tonality::{Control, ControlId, Layout},
};

/// Extra time after a release ramp before the backend tears a voice down.
pub const TEARDOWN_MARGIN: f32 = 0.05;

/// Per-voice gain envelope. Times in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub gain: f32,
    pub attack: f32,
    pub release: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            gain: 0.38,
            attack: 0.02,
            release: 0.18,
        }
    }
}

/// The voices sounding for one held control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceEntry {
    pub stroke: Stroke,
    /// One handle per resolved note, in chord order.
    pub handles: Vec<VoiceHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No entry existed; a fresh one was created.
    Started,
    /// An entry for the other stroke was released and replaced.
    Switched,
    /// Already sounding this stroke; nothing happened.
    AlreadySounding,
    /// Nothing resolvable (or no backend); no entry is left behind.
    Silent,
}

/// Owner of every live voice, keyed by control.
///
/// This map is the only place voices are registered, so "one entry per
/// control" holds by construction. Releasing an entry removes it at once;
/// its fade and teardown are left to the backend.
///
/// Without a backend the manager is degraded: every start is
/// [`StartOutcome::Silent`] and no entries are ever made.
pub struct VoiceManager<B> {
    backend: Option<B>,
    shape: EnvelopeShape,
    live: BTreeMap<ControlId, VoiceEntry>,
}

impl<B: ToneBackend> VoiceManager<B> {
    pub fn new(backend: Option<B>, shape: EnvelopeShape) -> Self {
        Self {
            backend,
            shape,
            live: BTreeMap::new(),
        }
    }

    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn entry(&self, id: &str) -> Option<&VoiceEntry> {
        self.live.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ControlId, &VoiceEntry)> + '_ {
        self.live.iter()
    }

    /// Controls with a live entry.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Backend voices held by live entries (a chord counts each note).
    pub fn voice_count(&self) -> usize {
        self.live.values().map(|e| e.handles.len()).sum()
    }

    /// Make `control` sound its `stroke` notes, replacing a stale entry.
    ///
    /// The stale entry is released even when the new stroke turns out to have
    /// nothing resolvable, so a control never keeps sounding the wrong stroke.
    /// The release and every attack go out in one backend batch.
    pub fn start_or_switch(&mut self, control: &Control, stroke: Stroke) -> StartOutcome {
        let sounding = self.live.get(&control.id).map(|entry| entry.stroke);
        let stale = match sounding {
            Some(current) if current == stroke => return StartOutcome::AlreadySounding,
            Some(_) => self.live.remove(&control.id),
            None => None,
        };
        let switched = stale.is_some();

        let Some(backend) = self.backend.as_mut() else {
            trace!(control = %control.id, "no backend, control stays silent");
            return StartOutcome::Silent;
        };

        let mut notes = Vec::with_capacity(control.notes(stroke).len());
        for note in control.notes(stroke) {
            match pitch::resolve(note) {
                Ok(hz) => notes.push((note.as_str(), hz)),
                Err(err) => debug!(control = %control.id, %err, "skipping note"),
            }
        }

        let shape = self.shape;
        let mut handles = Vec::with_capacity(notes.len());
        backend.batch(&mut |tone: &mut dyn ToneBackend| {
            if let Some(entry) = &stale {
                release_entry(tone, control.id.as_str(), entry, shape.release);
            }
            for &(note, frequency) in &notes {
                match tone.create_voice(frequency) {
                    Ok(handle) => {
                        tone.ramp_gain(handle, 0.0, shape.gain, shape.attack);
                        trace!(control = %control.id, note = %note, frequency, handle = handle.raw(), "attack");
                        handles.push(handle);
                    }
                    Err(err) => warn!(control = %control.id, note = %note, %err, "voice allocation failed"),
                }
            }
        });

        if handles.is_empty() {
            debug!(control = %control.id, ?stroke, "nothing to sound");
            return StartOutcome::Silent;
        }

        self.live
            .insert(control.id.clone(), VoiceEntry { stroke, handles });
        if switched {
            StartOutcome::Switched
        } else {
            StartOutcome::Started
        }
    }

    /// Release the entry for `id`. Returns `false` if there was none.
    ///
    /// Each voice fades from its current gain, so a release during the
    /// attack does not jump to full level first.
    pub fn stop(&mut self, id: &str) -> bool {
        let Some(entry) = self.live.remove(id) else {
            return false;
        };

        if let Some(backend) = self.backend.as_mut() {
            let release = self.shape.release;
            backend.batch(&mut |tone: &mut dyn ToneBackend| {
                release_entry(tone, id, &entry, release)
            });
        }
        true
    }

    /// Call [`Self::start_or_switch`] for every held control. Controls that
    /// are not held are left alone. Returns the number of calls made.
    pub fn resynthesize_all(&mut self, layout: &Layout, held: &HeldControls, stroke: Stroke) -> usize {
        let mut calls = 0;
        for id in held.iter() {
            match layout.get(id.as_str()) {
                Some(control) => {
                    self.start_or_switch(control, stroke);
                    calls += 1;
                }
                None => debug!(control = %id, "held control missing from layout"),
            }
        }
        calls
    }

    /// Release every live entry in one backend batch. Returns how many were
    /// released.
    pub fn stop_all(&mut self) -> usize {
        let released = std::mem::take(&mut self.live);
        if let Some(backend) = self.backend.as_mut().filter(|_| !released.is_empty()) {
            let release = self.shape.release;
            backend.batch(&mut |tone: &mut dyn ToneBackend| {
                for (id, entry) in &released {
                    release_entry(tone, id.as_str(), entry, release);
                }
            });
        }
        released.len()
    }
}

fn release_entry(tone: &mut dyn ToneBackend, id: &str, entry: &VoiceEntry, release: f32) {
    for &handle in &entry.handles {
        let from = tone.current_gain(handle);
        tone.ramp_gain(handle, from, 0.0, release);
        tone.dispose_after(handle, release + TEARDOWN_MARGIN);
        trace!(control = id, handle = handle.raw(), from, "release");
    }
}
