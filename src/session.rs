//! Session state checked by the engine before any command is dispatched

/// The one answer that survives a fatal hazard.
pub const SAFETY_PHRASE: &str = "cycle airlock";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardCause {
    /// Too many unprotected turns inside the airlock.
    Exposure,
    /// Stepped out of the airlock into vacuum without a suit.
    OpenSpace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    Quit,
    Died,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Active,
    /// The next input line is the answer to the recovery prompt, not a command.
    AwaitingHazardResponse { cause: HazardCause },
    Ended(Ending),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn is_awaiting_hazard_response(&self) -> bool {
        matches!(self, SessionState::AwaitingHazardResponse { .. })
    }

    pub fn ending(&self) -> Option<Ending> {
        match self {
            SessionState::Ended(ending) => Some(*ending),
            _ => None,
        }
    }
}
