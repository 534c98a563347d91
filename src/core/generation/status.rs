use tracing::{info, warn};

use super::types::ToolKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Idle => "idle",
            ToolStatus::InFlight => "in_flight",
            ToolStatus::Succeeded => "succeeded",
            ToolStatus::Failed(_) => "failed",
        }
    }
}

pub fn can_transition(from: &ToolStatus, to: &ToolStatus) -> bool {
    match (from, to) {
        (ToolStatus::InFlight, ToolStatus::InFlight) => false,
        (ToolStatus::Idle, ToolStatus::Idle) | (ToolStatus::Succeeded, ToolStatus::Succeeded) => {
            true
        }
        (ToolStatus::Idle, to) => matches!(to, ToolStatus::InFlight | ToolStatus::Succeeded),
        (ToolStatus::InFlight, to) => {
            matches!(to, ToolStatus::Succeeded | ToolStatus::Failed(_))
        }
        (ToolStatus::Succeeded, to) => matches!(
            to,
            ToolStatus::InFlight | ToolStatus::Idle | ToolStatus::Failed(_)
        ),
        (ToolStatus::Failed(_), _) => true,
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A required field is missing; nothing was sent to the service.
    #[error("{0}")]
    Validation(String),

    /// The tool already has a generation outstanding.
    #[error("{0} generation already in progress")]
    Busy(ToolKind),

    #[error("{message}")]
    Service { tool: ToolKind, message: String },
}

impl GenerationError {
    pub fn service(tool: ToolKind, err: &anyhow::Error) -> Self {
        GenerationError::Service {
            tool,
            message: err.to_string(),
        }
    }
}

/// Identity of one accepted submission, carried by everything the submission
/// spawns so late completions can be matched against the tool's current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub tool: ToolKind,
    pub request_id: u64,
}

/// Status and latest settled result of one tool-scope. Every mutation goes
/// through a checked transition.
#[derive(Debug, Clone)]
pub struct ToolScope<T> {
    kind: ToolKind,
    status: ToolStatus,
    result: Option<T>,
    request_id: u64,
}

impl<T> ToolScope<T> {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            status: ToolStatus::Idle,
            result: None,
            request_id: 0,
        }
    }

    pub fn status(&self) -> &ToolStatus {
        &self.status
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub(crate) fn result_mut(&mut self) -> Option<&mut T> {
        self.result.as_mut()
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == ToolStatus::InFlight
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ToolStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn transition(&mut self, to: ToolStatus) -> bool {
        if !can_transition(&self.status, &to) {
            warn!(
                "Rejected {} status transition {} -> {}",
                self.kind,
                self.status.as_str(),
                to.as_str()
            );
            return false;
        }
        if self.status != to {
            info!(
                "{} status: {} -> {}",
                self.kind,
                self.status.as_str(),
                to.as_str()
            );
        }
        self.status = to;
        true
    }

    /// Accept a new submission. Fails with `Busy` while one is outstanding.
    pub fn begin(&mut self) -> Result<Ticket, GenerationError> {
        if !self.transition(ToolStatus::InFlight) {
            return Err(GenerationError::Busy(self.kind));
        }
        self.request_id += 1;
        Ok(Ticket {
            tool: self.kind,
            request_id: self.request_id,
        })
    }

    fn owns(&self, ticket: Ticket) -> bool {
        ticket.tool == self.kind && ticket.request_id == self.request_id && self.is_in_flight()
    }

    pub fn succeed(&mut self, ticket: Ticket, result: T) -> bool {
        if !self.owns(ticket) {
            warn!(
                "Dropping {} result for request {} (current {})",
                self.kind, ticket.request_id, self.request_id
            );
            return false;
        }
        self.result = Some(result);
        self.transition(ToolStatus::Succeeded)
    }

    /// Settle the outstanding submission as failed. Any earlier result stays.
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.owns(ticket) {
            return false;
        }
        self.transition(ToolStatus::Failed(message.into()))
    }

    /// Failure of a sub-operation (regeneration, refinement) on the visible result.
    pub fn record_failure(&mut self, message: impl Into<String>) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.transition(ToolStatus::Failed(message.into()))
    }

    /// A sub-operation updated the visible result successfully.
    pub fn mark_succeeded(&mut self) -> bool {
        if self.result.is_none() || self.is_in_flight() {
            return false;
        }
        self.transition(ToolStatus::Succeeded)
    }

    pub fn dismiss_error(&mut self) {
        if self.error().is_some() {
            let to = if self.result.is_some() {
                ToolStatus::Succeeded
            } else {
                ToolStatus::Idle
            };
            self.transition(to);
        }
    }

    /// Show an existing result (history entry, resumed draft) as the current one.
    /// Counts as a new request identity so late merges aimed at the previous
    /// result are recognised as stale.
    pub fn replace_result(&mut self, result: T) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.request_id += 1;
        self.result = Some(result);
        self.transition(ToolStatus::Succeeded)
    }

    /// Drop the visible result. An outstanding submission keeps running.
    pub fn clear(&mut self) {
        self.result = None;
        if !self.is_in_flight() {
            self.transition(ToolStatus::Idle);
        }
    }
}
