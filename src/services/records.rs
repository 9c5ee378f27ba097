//! Loan ledger service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::event::{CirculationEvent, EventKind},
    models::record::{BorrowRecord, FeeAdjustment, RecordDetails},
    repository::Repository,
    services::notifier::NotificationSink,
};

#[derive(Clone)]
pub struct RecordsService {
    repository: Repository,
    notifier: Arc<dyn NotificationSink>,
}

impl RecordsService {
    pub fn new(repository: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { repository, notifier }
    }

    pub async fn get(&self, id: i32) -> AppResult<BorrowRecord> {
        self.repository.records.get_by_id(id).await
    }

    /// Check a copy back in, merging any staff-supplied fee adjustments
    pub async fn mark_returned(
        &self,
        record_id: i32,
        fees: &FeeAdjustment,
    ) -> AppResult<BorrowRecord> {
        fees.validate_non_negative().map_err(AppError::Validation)?;

        let record = self.repository.records.mark_returned(record_id, fees).await?;
        self.publish(EventKind::LoanReturned, &record).await;
        Ok(record)
    }

    /// Write a copy off as lost
    pub async fn mark_lost(&self, record_id: i32, fees: &FeeAdjustment) -> AppResult<BorrowRecord> {
        fees.validate_non_negative().map_err(AppError::Validation)?;

        let record = self.repository.records.mark_lost(record_id, fees).await?;
        self.publish(EventKind::LoanLost, &record).await;
        Ok(record)
    }

    pub async fn find_active(
        &self,
        user_id: Option<i32>,
        library_id: Option<i32>,
    ) -> AppResult<Vec<RecordDetails>> {
        self.repository.records.find_active(user_id, library_id).await
    }

    pub async fn find_overdue(&self, library_id: Option<i32>) -> AppResult<Vec<RecordDetails>> {
        self.repository.records.find_overdue(library_id).await
    }

    pub async fn find_by_user(&self, user_id: i32, limit: i64) -> AppResult<Vec<RecordDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.records.find_by_user(user_id, limit).await
    }

    /// Periodic sweep entry point: flips past-due loans and emits an event
    /// for each newly overdue one. Returns how many were flipped.
    pub async fn sweep_overdue(&self) -> AppResult<usize> {
        let flipped = self.repository.records.sweep_overdue().await?;

        for record in &flipped {
            self.publish(EventKind::LoanOverdue, record).await;
        }

        Ok(flipped.len())
    }

    async fn publish(&self, kind: EventKind, record: &BorrowRecord) {
        self.notifier
            .publish(CirculationEvent {
                kind,
                user_id: record.user_id,
                library_id: record.library_id,
                title_id: record.title_id,
                request_id: record.request_id,
                record_id: Some(record.id),
                copy_id: Some(record.copy_id),
                occurred_at: Utc::now(),
            })
            .await;
    }
}
