//! Borrow request workflow service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::event::{CirculationEvent, EventKind},
    models::record::BorrowRecord,
    models::request::{BorrowRequest, CreateRequest, DecideRequest, Decision, RequestDetails},
    repository::Repository,
    services::notifier::NotificationSink,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    notifier: Arc<dyn NotificationSink>,
}

impl RequestsService {
    pub fn new(repository: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { repository, notifier }
    }

    pub async fn get(&self, id: i32) -> AppResult<BorrowRequest> {
        self.repository.requests.get_by_id(id).await
    }

    /// Submit a request for a title at a branch
    pub async fn create(&self, user_id: i32, request: &CreateRequest) -> AppResult<BorrowRequest> {
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        self.repository.requests.create(user_id, request).await
    }

    /// Decide a pending request. Approval opens a loan; the approved request
    /// carries the allocated copy and record references.
    pub async fn decide(
        &self,
        request_id: i32,
        decider_id: i32,
        decision: &DecideRequest,
    ) -> AppResult<(BorrowRequest, Option<BorrowRecord>)> {
        let notes = decision.notes.as_deref();

        let (request, record, kind) = match decision.status {
            Decision::Approved => {
                let (request, record) = self
                    .repository
                    .requests
                    .approve(request_id, decider_id, notes)
                    .await?;
                (request, Some(record), EventKind::RequestApproved)
            }
            Decision::Rejected => {
                let request = self
                    .repository
                    .requests
                    .reject(request_id, decider_id, notes)
                    .await?;
                (request, None, EventKind::RequestRejected)
            }
        };

        self.notifier
            .publish(CirculationEvent {
                kind,
                user_id: request.user_id,
                library_id: request.library_id,
                title_id: request.title_id,
                request_id: Some(request.id),
                record_id: record.as_ref().map(|r| r.id),
                copy_id: request.copy_id,
                occurred_at: Utc::now(),
            })
            .await;

        Ok((request, record))
    }

    /// Withdraw one's own pending request
    pub async fn cancel(&self, request_id: i32, caller_id: i32) -> AppResult<BorrowRequest> {
        self.repository.requests.cancel(request_id, caller_id).await
    }

    pub async fn find_pending(&self, library_id: Option<i32>) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.find_pending(library_id).await
    }

    pub async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        // Verify user exists so an empty list is distinguishable from a typo
        self.repository.users.get_by_id(user_id).await?;
        self.repository.requests.find_by_user(user_id).await
    }

    pub async fn find_by_title(&self, title_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.find_by_title(title_id).await
    }
}
