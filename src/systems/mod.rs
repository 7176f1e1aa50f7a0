mod airlock;
mod docking;
mod item_description;
mod items;
mod movement;
mod render;

pub use airlock::{AirlockSystem, ExposureCheck};
pub use docking::DockingSystem;
pub use item_description::ItemDescriptionSystem;
pub use items::ItemSystem;
pub use movement::MovementSystem;
pub use render::RenderSystem;

use crate::session::HazardCause;

/// Why an action was refused. The world is left untouched in every case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The action is only available somewhere else.
    InvalidLocation,
    /// An earlier step of the sequence has not happened yet, or already happened.
    Precondition,
    CapacityExceeded,
    /// No such item or direction here.
    UnknownTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Done,
    Rejected(Rejection),
    /// The session is now waiting for the recovery answer.
    Fatal(HazardCause),
}

/// Result of one player action: whether it happened, and what to print.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub lines: Vec<String>,
}

impl Outcome {
    pub fn done(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            status: Status::Done,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn rejected(rejection: Rejection, line: impl Into<String>) -> Self {
        Self {
            status: Status::Rejected(rejection),
            lines: vec![line.into()],
        }
    }

    pub fn fatal(cause: HazardCause, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            status: Status::Fatal(cause),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Status::Done
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self.status {
            Status::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
