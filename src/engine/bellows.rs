#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Bellows State Machine
=====================

The bellows select which of a button's two reeds sounds. Pulling the
bellows open sounds the open reed, pushing them closed sounds the close
reed, and with the bellows at rest nothing sounds at all.

    ┌──────┐  assert(open)   ┌──────┐
    │ Idle │ ──────────────→ │ Open │
    │      │ ←────────────── │      │
    └──────┘  release(owner) └──────┘
       ↑ │
       │ │ assert(close)     ┌───────┐
       │ └─────────────────→ │ Close │
       └──────────────────── │       │
          release(owner)     └───────┘

Each direction can be bound to more than one physical key. The key that
asserted the current direction is its owner; only the owner releasing it
returns the machine to Idle. Releasing some other alias is a no-op, and
pressing another alias of the active direction does not take ownership.

Asserting the opposite direction while one is owned depends on the handoff
policy:

  Hold   the owner keeps the bellows; the new key is ignored until the owner
         lets go and it is pressed again.
  Steal  the new key becomes the owner and the direction flips in place.

Auto-repeat presses never cause a transition.

The machine only reports transitions. The caller turns a transition into
voice work (resynthesize every held control, or stop everything).
*/

/// A bellows stroke; the two directions that produce sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stroke {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BellowsDirection {
    #[default]
    Idle,
    Open,
    Close,
}

impl BellowsDirection {
    pub fn stroke(self) -> Option<Stroke> {
        match self {
            BellowsDirection::Idle => None,
            BellowsDirection::Open => Some(Stroke::Open),
            BellowsDirection::Close => Some(Stroke::Close),
        }
    }

    pub fn is_idle(self) -> bool {
        matches!(self, BellowsDirection::Idle)
    }
}

impl From<Stroke> for BellowsDirection {
    fn from(stroke: Stroke) -> Self {
        match stroke {
            Stroke::Open => BellowsDirection::Open,
            Stroke::Close => BellowsDirection::Close,
        }
    }
}

/// What happens when the other direction is asserted while one is owned.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Handoff {
    #[default]
    Hold,
    Steal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BellowsTransition {
    /// The bellows now move in this stroke; held controls must sound it.
    Engaged(Stroke),
    /// The bellows stopped; every voice must be released.
    Released,
}

#[derive(Debug, Clone, Default)]
pub struct BellowsMachine {
    direction: BellowsDirection,
    owner: Option<String>,
    handoff: Handoff,
}

impl BellowsMachine {
    pub fn new(handoff: Handoff) -> Self {
        Self {
            direction: BellowsDirection::Idle,
            owner: None,
            handoff,
        }
    }

    pub fn direction(&self) -> BellowsDirection {
        self.direction
    }

    /// Key currently driving the bellows, if any.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn handoff(&self) -> Handoff {
        self.handoff
    }

    /// A key bound to `stroke` went down.
    pub fn assert(&mut self, key: &str, stroke: Stroke, repeat: bool) -> Option<BellowsTransition> {
        if repeat {
            return None;
        }

        let wanted = BellowsDirection::from(stroke);
        match self.direction.stroke() {
            None => {}
            Some(current) if current == stroke => return None,
            Some(_) if self.handoff == Handoff::Hold => return None,
            Some(_) => {}
        }

        self.owner = Some(key.to_string());
        self.direction = wanted;
        Some(BellowsTransition::Engaged(stroke))
    }

    /// A bellows key went up. Only the owner can release the bellows.
    pub fn release(&mut self, key: &str) -> Option<BellowsTransition> {
        if self.owner.as_deref() != Some(key) {
            return None;
        }

        self.owner = None;
        self.direction = BellowsDirection::Idle;
        Some(BellowsTransition::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_from_idle_engages() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        assert_eq!(
            bellows.assert("q", Stroke::Open, false),
            Some(BellowsTransition::Engaged(Stroke::Open))
        );
        assert_eq!(bellows.direction(), BellowsDirection::Open);
        assert_eq!(bellows.owner(), Some("q"));
    }

    #[test]
    fn key_repeat_is_ignored() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        bellows.assert("q", Stroke::Open, false);
        assert_eq!(bellows.assert("q", Stroke::Open, true), None);
        assert_eq!(bellows.assert("q", Stroke::Open, false), None);
    }

    #[test]
    fn repeat_from_idle_does_not_engage() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        assert_eq!(bellows.assert("q", Stroke::Open, true), None);
        assert!(bellows.direction().is_idle());
    }

    #[test]
    fn only_owner_releases() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        bellows.assert("q", Stroke::Open, false);

        // Second alias of the same direction does not take ownership.
        assert_eq!(bellows.assert("f3", Stroke::Open, false), None);
        assert_eq!(bellows.release("f3"), None);
        assert_eq!(bellows.direction(), BellowsDirection::Open);

        assert_eq!(bellows.release("q"), Some(BellowsTransition::Released));
        assert!(bellows.direction().is_idle());
        assert_eq!(bellows.owner(), None);
    }

    #[test]
    fn alias_still_down_does_not_resurrect_direction() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        bellows.assert("q", Stroke::Open, false);
        bellows.assert("f3", Stroke::Open, false);
        bellows.release("q");
        assert!(bellows.direction().is_idle());

        // f3 is still physically down; only a fresh press re-engages.
        assert_eq!(bellows.release("f3"), None);
        assert!(bellows.direction().is_idle());
        assert_eq!(
            bellows.assert("f3", Stroke::Open, false),
            Some(BellowsTransition::Engaged(Stroke::Open))
        );
    }

    #[test]
    fn hold_ignores_opposite_direction() {
        let mut bellows = BellowsMachine::new(Handoff::Hold);
        bellows.assert("q", Stroke::Open, false);
        assert_eq!(bellows.assert("<", Stroke::Close, false), None);
        assert_eq!(bellows.direction(), BellowsDirection::Open);
        assert_eq!(bellows.release("<"), None);
        assert_eq!(bellows.release("q"), Some(BellowsTransition::Released));
    }

    #[test]
    fn steal_flips_direction_and_owner() {
        let mut bellows = BellowsMachine::new(Handoff::Steal);
        bellows.assert("q", Stroke::Open, false);
        assert_eq!(
            bellows.assert("<", Stroke::Close, false),
            Some(BellowsTransition::Engaged(Stroke::Close))
        );
        assert_eq!(bellows.owner(), Some("<"));

        // The previous owner lost the bellows; its release is a no-op.
        assert_eq!(bellows.release("q"), None);
        assert_eq!(bellows.direction(), BellowsDirection::Close);
    }
}
