// Purpose - the accordion core: bellows, held controls, live voices

pub mod bellows;
pub mod tracker;
pub mod voices;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use self::{
    bellows::{BellowsDirection, BellowsMachine, BellowsTransition, Handoff, Stroke},
    tracker::HeldControls,
    voices::{EnvelopeShape, StartOutcome, VoiceEntry, VoiceManager, TEARDOWN_MARGIN},
};
use crate::{
    error::Result,
    io::{Edge, InputEvent},
    synth::{SharedReedBank, ToneBackend},
    tonality::{ControlId, Layout, Tonality},
};

/// Keys bound to each bellows direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellowsBindings {
    pub open: Vec<String>,
    pub close: Vec<String>,
}

impl Default for BellowsBindings {
    fn default() -> Self {
        Self {
            open: vec!["q".into(), "f3".into()],
            close: vec!["<".into(), "f4".into()],
        }
    }
}

impl BellowsBindings {
    /// Stroke bound to `key`. A key bound to both directions opens.
    pub fn stroke_for(&self, key: &str) -> Option<Stroke> {
        if self.open.iter().any(|k| k == key) {
            Some(Stroke::Open)
        } else if self.close.iter().any(|k| k == key) {
            Some(Stroke::Close)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub shape: EnvelopeShape,
    pub bindings: BellowsBindings,
    pub handoff: Handoff,
}

/// What one input event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The bellows took `stroke`; `controls` held controls were resynthesized.
    Engaged { stroke: Stroke, controls: usize },
    /// The bellows came to rest; `released` voice entries were stopped.
    Released { released: usize },
    /// A control went down. `outcome` is `None` while the bellows are idle.
    Pressed {
        control: ControlId,
        outcome: Option<StartOutcome>,
    },
    /// A held control went up.
    Lifted { control: ControlId, released: bool },
    /// Repeats, unknown keys, duplicate edges and bellows keys that changed nothing.
    Ignored,
}

/// Read-only view of the instrument for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionSnapshot {
    pub tonality: String,
    pub bellows: BellowsDirection,
    pub bellows_owner: Option<String>,
    pub melody: Vec<ControlId>,
    pub bass: Vec<ControlId>,
    pub live_voices: usize,
    pub degraded: bool,
}

/// The instrument: routes input events to the bellows and the held set,
/// and keeps the voice manager in step with both.
///
/// Every event runs to completion before [`Accordion::handle`] returns.
pub struct Accordion<B = SharedReedBank> {
    tonality: Tonality,
    layout: Layout,
    bindings: BellowsBindings,
    bellows: BellowsMachine,
    held: HeldControls,
    voices: VoiceManager<B>,
}

impl<B: ToneBackend> Accordion<B> {
    pub fn new(tonality: Tonality, backend: B, settings: EngineSettings) -> Result<Self> {
        Self::build(tonality, Some(backend), settings)
    }

    /// An accordion with no audio. State tracking works as usual; nothing sounds.
    pub fn degraded(tonality: Tonality, settings: EngineSettings) -> Result<Self> {
        warn!(tonality = %tonality.name, "no audio backend, running degraded");
        Self::build(tonality, None, settings)
    }

    fn build(tonality: Tonality, backend: Option<B>, settings: EngineSettings) -> Result<Self> {
        let layout = Layout::from_tonality(&tonality)?;
        Ok(Self {
            tonality,
            layout,
            bindings: settings.bindings,
            bellows: BellowsMachine::new(settings.handoff),
            held: HeldControls::new(),
            voices: VoiceManager::new(backend, settings.shape),
        })
    }

    pub fn handle(&mut self, event: &InputEvent) -> Dispatch {
        if let Some(stroke) = self.bindings.stroke_for(&event.key) {
            let transition = match event.edge {
                Edge::Down => self.bellows.assert(&event.key, stroke, event.repeat),
                Edge::Up => self.bellows.release(&event.key),
            };
            return match transition {
                Some(transition) => self.apply(transition),
                None => {
                    debug!(key = %event.key, edge = ?event.edge, "bellows unchanged");
                    Dispatch::Ignored
                }
            };
        }

        let control = match self.layout.require(&event.key) {
            Ok(control) => control,
            Err(err) => {
                debug!(%err, "ignoring key");
                return Dispatch::Ignored;
            }
        };

        match event.edge {
            Edge::Down => {
                if event.repeat || !self.held.press(&control.id, control.role()) {
                    return Dispatch::Ignored;
                }
                let outcome = self
                    .bellows
                    .direction()
                    .stroke()
                    .map(|stroke| self.voices.start_or_switch(control, stroke));
                Dispatch::Pressed {
                    control: control.id.clone(),
                    outcome,
                }
            }
            Edge::Up => {
                if !self.held.release(&control.id, control.role()) {
                    return Dispatch::Ignored;
                }
                Dispatch::Lifted {
                    control: control.id.clone(),
                    released: self.voices.stop(control.id.as_str()),
                }
            }
        }
    }

    fn apply(&mut self, transition: BellowsTransition) -> Dispatch {
        match transition {
            BellowsTransition::Engaged(stroke) => {
                let controls = self.voices.resynthesize_all(&self.layout, &self.held, stroke);
                debug!(?stroke, controls, "bellows engaged");
                Dispatch::Engaged { stroke, controls }
            }
            BellowsTransition::Released => {
                let released = self.voices.stop_all();
                debug!(released, "bellows released");
                Dispatch::Released { released }
            }
        }
    }

    /// Swap in another tonality.
    ///
    /// Every voice is released and the held set cleared before the new
    /// table is used, even for keys still physically down. The bellows keep
    /// their direction. An invalid tonality is rejected with nothing changed.
    pub fn set_tonality(&mut self, tonality: Tonality) -> Result<()> {
        let layout = Layout::from_tonality(&tonality)?;
        let released = self.voices.stop_all();
        self.held.clear();
        self.layout = layout;
        info!(from = %self.tonality.name, to = %tonality.name, released, "tonality changed");
        self.tonality = tonality;
        Ok(())
    }

    pub fn snapshot(&self) -> AccordionSnapshot {
        AccordionSnapshot {
            tonality: self.tonality.name.clone(),
            bellows: self.bellows.direction(),
            bellows_owner: self.bellows.owner().map(str::to_string),
            melody: self.held.melody().cloned().collect(),
            bass: self.held.bass().cloned().collect(),
            live_voices: self.voices.live_count(),
            degraded: self.voices.is_degraded(),
        }
    }

    pub fn tonality(&self) -> &Tonality {
        &self.tonality
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn bindings(&self) -> &BellowsBindings {
        &self.bindings
    }

    pub fn direction(&self) -> BellowsDirection {
        self.bellows.direction()
    }

    pub fn bellows(&self) -> &BellowsMachine {
        &self.bellows
    }

    pub fn held(&self) -> &HeldControls {
        &self.held
    }

    pub fn voices(&self) -> &VoiceManager<B> {
        &self.voices
    }

    pub fn is_degraded(&self) -> bool {
        self.voices.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        synth::{ReedBank, VoiceHandle},
        tonality::presets,
    };

    /// Counts allocations; every voice reads as silent.
    #[derive(Default)]
    struct Counter {
        created: usize,
    }

    impl ToneBackend for Counter {
        fn create_voice(&mut self, _frequency: f64) -> Result<VoiceHandle> {
            self.created += 1;
            Ok(VoiceHandle::new(self.created as u64))
        }
        fn ramp_gain(&mut self, _: VoiceHandle, _: f32, _: f32, _: f32) {}
        fn current_gain(&self, _: VoiceHandle) -> f32 {
            0.0
        }
        fn dispose_after(&mut self, _: VoiceHandle, _: f32) {}
        fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend)) {
            calls(self)
        }
    }

    fn accordion(handoff: Handoff) -> Accordion<Counter> {
        let settings = EngineSettings {
            handoff,
            ..EngineSettings::default()
        };
        Accordion::new(presets::gcf(), Counter::default(), settings).unwrap()
    }

    #[test]
    fn open_binding_wins_over_close() {
        let bindings = BellowsBindings {
            open: vec!["x".into()],
            close: vec!["x".into()],
        };
        assert_eq!(bindings.stroke_for("x"), Some(Stroke::Open));
        assert_eq!(BellowsBindings::default().stroke_for("f4"), Some(Stroke::Close));
        assert_eq!(BellowsBindings::default().stroke_for("a"), None);
    }

    #[test]
    fn press_while_idle_is_silent() {
        let mut acc = accordion(Handoff::Hold);
        assert_eq!(
            acc.handle(&InputEvent::down("a")),
            Dispatch::Pressed {
                control: ControlId::new("a"),
                outcome: None
            }
        );
        assert_eq!(acc.voices().live_count(), 0);
        assert!(acc.held().is_held("a"));
    }

    #[test]
    fn bellows_engage_resynthesizes_held() {
        let mut acc = accordion(Handoff::Hold);
        acc.handle(&InputEvent::down("a"));
        acc.handle(&InputEvent::down("f5"));

        assert_eq!(
            acc.handle(&InputEvent::down("q")),
            Dispatch::Engaged {
                stroke: Stroke::Open,
                controls: 2
            }
        );
        assert_eq!(acc.voices().live_count(), 2);
        assert_eq!(acc.voices().voice_count(), 4);
    }

    #[test]
    fn repeats_never_dispatch() {
        let mut acc = accordion(Handoff::Hold);
        acc.handle(&InputEvent::down("q"));
        assert_eq!(acc.handle(&InputEvent::repeat("q")), Dispatch::Ignored);
        acc.handle(&InputEvent::down("s"));
        assert_eq!(acc.handle(&InputEvent::repeat("s")), Dispatch::Ignored);
        assert_eq!(acc.voices().backend().unwrap().created, 1);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut acc = accordion(Handoff::Hold);
        assert_eq!(acc.handle(&InputEvent::down("tab")), Dispatch::Ignored);
        assert_eq!(acc.handle(&InputEvent::up("1")), Dispatch::Ignored);
        assert!(acc.held().is_empty());
    }

    #[test]
    fn lifting_a_control_releases_its_voice() {
        let mut acc = accordion(Handoff::Hold);
        acc.handle(&InputEvent::down("f3"));
        acc.handle(&InputEvent::down("w"));
        assert_eq!(
            acc.handle(&InputEvent::up("w")),
            Dispatch::Lifted {
                control: ControlId::new("w"),
                released: true
            }
        );
        assert_eq!(acc.handle(&InputEvent::up("w")), Dispatch::Ignored);
        assert_eq!(acc.voices().live_count(), 0);
    }

    #[test]
    fn steal_switches_every_held_control() {
        let mut acc = accordion(Handoff::Steal);
        acc.handle(&InputEvent::down("q"));
        acc.handle(&InputEvent::down("a"));

        assert_eq!(
            acc.handle(&InputEvent::down("<")),
            Dispatch::Engaged {
                stroke: Stroke::Close,
                controls: 1
            }
        );
        assert_eq!(acc.voices().entry("a").unwrap().stroke, Stroke::Close);

        // The old owner no longer controls the bellows.
        assert_eq!(acc.handle(&InputEvent::up("q")), Dispatch::Ignored);
        assert_eq!(acc.direction(), BellowsDirection::Close);
    }

    #[test]
    fn invalid_tonality_changes_nothing() {
        let mut acc = accordion(Handoff::Hold);
        acc.handle(&InputEvent::down("q"));
        acc.handle(&InputEvent::down("a"));

        let mut broken = presets::bb_eb_ab();
        broken.rows.middle.close.clear();
        assert!(acc.set_tonality(broken).is_err());
        assert_eq!(acc.tonality().name, "GCF");
        assert_eq!(acc.voices().live_count(), 1);
    }

    #[test]
    fn snapshot_reports_state() {
        let mut acc = accordion(Handoff::Hold);
        acc.handle(&InputEvent::down("f4"));
        acc.handle(&InputEvent::down("z"));
        acc.handle(&InputEvent::down("8"));

        let snap = acc.snapshot();
        assert_eq!(snap.tonality, "GCF");
        assert_eq!(snap.bellows, BellowsDirection::Close);
        assert_eq!(snap.bellows_owner.as_deref(), Some("f4"));
        assert_eq!(snap.melody, vec![ControlId::new("z")]);
        assert_eq!(snap.bass, vec![ControlId::new("8")]);
        assert_eq!(snap.live_voices, 2);
        assert!(!snap.degraded);
    }

    #[test]
    fn degraded_accordion_still_tracks() {
        let mut acc: Accordion<ReedBank> =
            Accordion::degraded(presets::gcf(), EngineSettings::default()).unwrap();
        acc.handle(&InputEvent::down("a"));
        acc.handle(&InputEvent::down("q"));

        let snap = acc.snapshot();
        assert!(snap.degraded);
        assert_eq!(snap.bellows, BellowsDirection::Open);
        assert_eq!(snap.melody.len(), 1);
        assert_eq!(snap.live_voices, 0);
    }
}
