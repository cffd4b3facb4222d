//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! tonality = "BbEbAb"
//! master_gain = 0.7
//!
//! [envelope]
//! attack = 0.03
//!
//! [bellows]
//! open_keys = ["q"]
//! close_keys = ["<"]
//! handoff = "steal"
//! ```
//!
//! Extra tonalities go in `[[tonalities]]` tables shaped like the built-in
//! ones; they are offered after the presets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    engine::{BellowsBindings, EngineSettings, EnvelopeShape, Handoff},
    error::{Error, Result},
    synth::bank::{DEFAULT_MASTER_GAIN, DEFAULT_MAX_VOICES},
    tonality::{presets, Tonality},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BellowsConfig {
    pub open_keys: Vec<String>,
    pub close_keys: Vec<String>,
    pub handoff: Handoff,
}

impl Default for BellowsConfig {
    fn default() -> Self {
        let bindings = BellowsBindings::default();
        Self {
            open_keys: bindings.open,
            close_keys: bindings.close,
            handoff: Handoff::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccordionConfig {
    /// Name of the tonality to start in.
    pub tonality: String,
    pub envelope: EnvelopeShape,
    pub master_gain: f32,
    pub max_voices: usize,
    pub bellows: BellowsConfig,
    pub tonalities: Vec<Tonality>,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            tonality: "GCF".to_string(),
            envelope: EnvelopeShape::default(),
            master_gain: DEFAULT_MASTER_GAIN,
            max_voices: DEFAULT_MAX_VOICES,
            bellows: BellowsConfig::default(),
            tonalities: Vec::new(),
        }
    }
}

impl AccordionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            shape: self.envelope,
            bindings: BellowsBindings {
                open: self.bellows.open_keys.clone(),
                close: self.bellows.close_keys.clone(),
            },
            handoff: self.bellows.handoff,
        }
    }

    /// Built-in tonalities followed by the configured ones.
    pub fn all_tonalities(&self) -> Vec<Tonality> {
        let mut all = presets::all();
        all.extend(self.tonalities.iter().cloned());
        all
    }

    /// Look up `name` among [`Self::all_tonalities`].
    pub fn find_tonality(&self, name: &str) -> Result<Tonality> {
        self.all_tonalities()
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::InvalidTonality {
                tonality: name.to_string(),
                reason: "no such tonality".to_string(),
            })
    }

    /// The tonality named by [`Self::tonality`].
    pub fn starting_tonality(&self) -> Result<Tonality> {
        self.find_tonality(&self.tonality)
    }
}
