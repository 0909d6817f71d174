// SPDX-License-Identifier: GPL-3.0-only

//! Availability state machine for the watched service.
//!
//! The original watcher folded this into a pair of booleans
//! (`initializing`/`available`); here the two states and the one-shot startup
//! branch are explicit, and every transition is expressed as the list of
//! actions the signal pump has to perform.

/// Whether the watched service currently owns its well-known name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unavailable,
    Available,
}

/// What the signal pump must do in response to a presence transition, in
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AnnounceAvailable,
    AnnounceUnavailable,
    /// Create the added/removed signal subscriptions.
    Subscribe,
    /// Drop the added/removed signal subscriptions.
    Unsubscribe,
    /// Synthesize an added event for every modem the daemon already manages.
    /// Emitted only on the startup transition.
    EnumerateExisting,
}

/// Tracks service availability across presence notifications.
///
/// Invariant: `Subscribe`/`Unsubscribe` actions are emitted such that
/// subscriptions exist iff the last observed transition indicated presence.
/// Re-entering the current state is a no-op, except for the very first call
/// (the synthetic startup evaluation), which always announces the starting
/// state.
#[derive(Debug)]
pub struct PresenceTracker {
    state: Availability,
    startup: bool,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self {
            state: Availability::Unavailable,
            startup: true,
        }
    }

    pub fn state(&self) -> Availability {
        self.state
    }

    pub fn owner_changed(&mut self, present: bool) -> Vec<Action> {
        let startup = std::mem::replace(&mut self.startup, false);

        let actions = match (self.state, present) {
            (Availability::Unavailable, true) => {
                let mut actions = vec![Action::AnnounceAvailable, Action::Subscribe];
                if startup {
                    actions.push(Action::EnumerateExisting);
                }
                actions
            }
            (Availability::Available, true) => Vec::new(),
            (Availability::Available, false) => {
                vec![Action::AnnounceUnavailable, Action::Unsubscribe]
            }
            (Availability::Unavailable, false) => {
                if startup {
                    vec![Action::AnnounceUnavailable]
                } else {
                    Vec::new()
                }
            }
        };

        self.state = if present {
            Availability::Available
        } else {
            Availability::Unavailable
        };
        actions
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a presence sequence and folds the emitted actions into the
    /// subscription flag the signal pump would maintain.
    fn replay(presences: &[bool]) -> (PresenceTracker, bool, Vec<Action>) {
        let mut tracker = PresenceTracker::new();
        let mut subscribed = false;
        let mut all_actions = Vec::new();
        for &present in presences {
            for action in tracker.owner_changed(present) {
                match action {
                    Action::Subscribe => {
                        assert!(!subscribed, "double subscribe");
                        subscribed = true;
                    }
                    Action::Unsubscribe => {
                        assert!(subscribed, "unsubscribe without subscription");
                        subscribed = false;
                    }
                    _ => {}
                }
                all_actions.push(action);
            }
        }
        (tracker, subscribed, all_actions)
    }

    #[test]
    fn startup_with_service_present_announces_subscribes_enumerates() {
        let mut tracker = PresenceTracker::new();
        assert_eq!(
            tracker.owner_changed(true),
            vec![
                Action::AnnounceAvailable,
                Action::Subscribe,
                Action::EnumerateExisting
            ]
        );
        assert_eq!(tracker.state(), Availability::Available);
    }

    #[test]
    fn startup_without_service_still_announces() {
        let mut tracker = PresenceTracker::new();
        assert_eq!(
            tracker.owner_changed(false),
            vec![Action::AnnounceUnavailable]
        );
        assert_eq!(tracker.state(), Availability::Unavailable);
    }

    #[test]
    fn reentering_available_is_a_noop() {
        let (_, _, actions) = replay(&[true, true, true]);
        let announcements = actions
            .iter()
            .filter(|a| **a == Action::AnnounceAvailable)
            .count();
        let subscribes = actions.iter().filter(|a| **a == Action::Subscribe).count();
        assert_eq!(announcements, 1);
        assert_eq!(subscribes, 1);
    }

    #[test]
    fn reentering_unavailable_after_startup_is_silent() {
        let mut tracker = PresenceTracker::new();
        tracker.owner_changed(false);
        assert!(tracker.owner_changed(false).is_empty());
    }

    #[test]
    fn subscriptions_track_presence_across_sequences() {
        for presences in [
            &[true, false, true, false][..],
            &[false, true, true, false, false, true][..],
            &[true, true, false, true][..],
            &[false, false][..],
        ] {
            let (_, subscribed, _) = replay(presences);
            assert_eq!(subscribed, *presences.last().unwrap());
        }
    }

    #[test]
    fn enumeration_happens_only_on_the_startup_transition() {
        let (_, _, actions) = replay(&[true, false, true, false, true]);
        let enumerations = actions
            .iter()
            .filter(|a| **a == Action::EnumerateExisting)
            .count();
        assert_eq!(enumerations, 1);
    }

    #[test]
    fn no_enumeration_when_service_appears_after_startup() {
        let (_, _, actions) = replay(&[false, true]);
        assert!(!actions.contains(&Action::EnumerateExisting));
        assert!(actions.contains(&Action::Subscribe));
    }

    #[test]
    fn losing_the_service_unsubscribes_and_announces() {
        let mut tracker = PresenceTracker::new();
        tracker.owner_changed(true);
        assert_eq!(
            tracker.owner_changed(false),
            vec![Action::AnnounceUnavailable, Action::Unsubscribe]
        );
    }
}
