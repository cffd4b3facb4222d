use std::collections::BTreeSet;

use crate::tonality::{ControlId, Role};

/// Controls currently held down, split by role.
///
/// Membership only: pressing twice or releasing twice changes nothing, and
/// the return value says whether anything did.
#[derive(Debug, Clone, Default)]
pub struct HeldControls {
    melody: BTreeSet<ControlId>,
    bass: BTreeSet<ControlId>,
}

impl HeldControls {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, role: Role) -> &mut BTreeSet<ControlId> {
        match role {
            Role::Melody => &mut self.melody,
            Role::Bass => &mut self.bass,
        }
    }

    /// Returns `true` if the control was not already held.
    pub fn press(&mut self, id: &ControlId, role: Role) -> bool {
        let set = self.set_mut(role);
        if set.contains(id) {
            return false;
        }
        set.insert(id.clone())
    }

    /// Returns `true` if the control was held.
    pub fn release(&mut self, id: &ControlId, role: Role) -> bool {
        self.set_mut(role).remove(id)
    }

    pub fn is_held(&self, id: &str) -> bool {
        self.melody.contains(id) || self.bass.contains(id)
    }

    pub fn melody(&self) -> impl Iterator<Item = &ControlId> + '_ {
        self.melody.iter()
    }

    pub fn bass(&self) -> impl Iterator<Item = &ControlId> + '_ {
        self.bass.iter()
    }

    /// Melody then bass.
    pub fn iter(&self) -> impl Iterator<Item = &ControlId> + '_ {
        self.melody.iter().chain(self.bass.iter())
    }

    pub fn len(&self) -> usize {
        self.melody.len() + self.bass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.melody.clear();
        self.bass.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_are_idempotent() {
        let mut held = HeldControls::new();
        let a = ControlId::new("a");

        assert!(held.press(&a, Role::Melody));
        assert!(!held.press(&a, Role::Melody));
        assert_eq!(held.len(), 1);

        assert!(held.release(&a, Role::Melody));
        assert!(!held.release(&a, Role::Melody));
        assert!(held.is_empty());
    }

    #[test]
    fn roles_are_tracked_separately() {
        let mut held = HeldControls::new();
        held.press(&ControlId::new("a"), Role::Melody);
        held.press(&ControlId::new("s"), Role::Melody);
        held.press(&ControlId::new("f5"), Role::Bass);

        assert_eq!(held.melody().count(), 2);
        assert_eq!(held.bass().map(ControlId::as_str).collect::<Vec<_>>(), ["f5"]);
        assert!(held.is_held("f5"));
        assert!(!held.is_held("d"));

        let order: Vec<&str> = held.iter().map(ControlId::as_str).collect();
        assert_eq!(order, ["a", "s", "f5"]);

        held.clear();
        assert!(held.is_empty());
    }
}
