//! Circulation events published to the notification sink

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Event kind. Serialized as dotted names so subscribers can filter on a
/// `kind` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum EventKind {
    #[serde(rename = "request.approved")]
    RequestApproved,
    #[serde(rename = "request.rejected")]
    RequestRejected,
    #[serde(rename = "loan.returned")]
    LoanReturned,
    #[serde(rename = "loan.lost")]
    LoanLost,
    #[serde(rename = "loan.overdue")]
    LoanOverdue,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RequestApproved => "request.approved",
            EventKind::RequestRejected => "request.rejected",
            EventKind::LoanReturned => "loan.returned",
            EventKind::LoanLost => "loan.lost",
            EventKind::LoanOverdue => "loan.overdue",
        }
    }
}

/// Fire-and-forget notification payload: a kind plus entity identifiers.
/// Delivery (email, push) is the subscriber's job.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CirculationEvent {
    pub kind: EventKind,
    pub user_id: i32,
    pub library_id: i32,
    pub title_id: i32,
    pub request_id: Option<i32>,
    pub record_id: Option<i32>,
    pub copy_id: Option<i32>,
    pub occurred_at: DateTime<Utc>,
}
