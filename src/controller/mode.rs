//! Mode state machine
//!
//! `(mode, event) -> transition` is a pure table; applying a transition to
//! the session is separate so the table can be tested without a link.

use crate::model::{Dialect, Mode, Outbound, Session};
use crate::protocol::{AdvancedRequest, PollingMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    PresenceAsserted,
    PresenceLost,
    AdvancedRequested,
    SimpleRequested,
    /// First status response after requesting the advanced dialect.
    StatusReceived,
    /// Advanced-mode deadline missed with the grace budget exhausted.
    LinkLost,
}

impl ModeEvent {
    /// Events that move towards a simpler, more robust mode.
    pub fn is_demotion(self) -> bool {
        matches!(
            self,
            ModeEvent::PresenceLost | ModeEvent::SimpleRequested | ModeEvent::LinkLost
        )
    }
}

/// Side effects of a transition, applied in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Wipe the session back to its initial values.
    Reset,
    DiscardInput,
    ArmSimple,
    ArmAdvanced,
    Disarm,
    QueryStatus,
    ArmDeadline,
    DisarmDeadline,
    StartPolling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub effects: &'static [Effect],
}

pub fn transition(mode: Mode, event: ModeEvent) -> Option<Transition> {
    use Effect::*;
    use Mode::*;

    let (to, effects): (Mode, &'static [Effect]) = match (mode, event) {
        (Unknown, ModeEvent::PresenceAsserted) => (Simple, &[DiscardInput, ArmSimple]),
        (Simple, ModeEvent::PresenceLost) => (Unknown, &[Reset, Disarm]),
        (Simple, ModeEvent::AdvancedRequested) => {
            (SwitchingToAdvanced, &[ArmAdvanced, QueryStatus, ArmDeadline])
        }
        (SwitchingToAdvanced, ModeEvent::StatusReceived) => (Advanced, &[StartPolling]),
        (SwitchingToAdvanced | Advanced, ModeEvent::LinkLost) => (Unknown, &[Reset, Disarm]),
        (SwitchingToAdvanced | Advanced, ModeEvent::SimpleRequested) => {
            (Simple, &[DisarmDeadline, ArmSimple])
        }
        _ => return None,
    };

    Some(Transition { from: mode, to, effects })
}

/// Pick the transition for a set of simultaneous events: any applicable
/// demotion wins over a promotion.
pub fn resolve(mode: Mode, events: &[ModeEvent]) -> Option<Transition> {
    events
        .iter()
        .filter(|event| event.is_demotion())
        .chain(events.iter().filter(|event| !event.is_demotion()))
        .find_map(|&event| transition(mode, event))
}

impl Session {
    /// Apply a transition. Effects needing the transport are queued on the
    /// outbox, in order, behind any request already there.
    pub(crate) fn enter(&mut self, transition: Transition) {
        tracing::debug!(from = ?transition.from, to = ?transition.to, "Mode transition");
        self.mode = transition.to;

        for effect in transition.effects {
            match effect {
                Effect::Reset => self.reset(),
                Effect::DiscardInput => self.push(Outbound::DiscardInput),
                Effect::ArmSimple => self.push(Outbound::Arm(Dialect::Simple)),
                Effect::ArmAdvanced => self.push(Outbound::Arm(Dialect::Advanced)),
                Effect::Disarm => self.push(Outbound::Arm(Dialect::Disarmed)),
                Effect::QueryStatus => self.request(AdvancedRequest::TimeAndStatus),
                Effect::ArmDeadline => self.liveness.arm(self.now),
                Effect::DisarmDeadline => self.liveness.disarm(),
                Effect::StartPolling => self.request(AdvancedRequest::SetPolling(PollingMode::Start)),
            }
        }
    }
}
