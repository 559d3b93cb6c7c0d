//! Component I — Admin Operations. The HTML-form admin console is the
//! collaborator; this is the narrow interface it calls into (so the
//! admin handler depends on this trait's surface, not on the issuer
//! struct directly — see the cyclic-reference design note in SPEC_FULL.md §1).

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::model::PersonStatus;
use crate::mutation::StatusMutationProtocol;
use crate::refresh::RefreshScheduler;
use crate::store::{StatusStore, SubjectIndex};

pub struct AdminOperations {
    subject_index: Arc<dyn SubjectIndex>,
    status_store: Arc<dyn StatusStore>,
    mutation: Arc<StatusMutationProtocol>,
    refresh: Arc<RefreshScheduler>,
}

impl AdminOperations {
    pub fn new(
        subject_index: Arc<dyn SubjectIndex>,
        status_store: Arc<dyn StatusStore>,
        mutation: Arc<StatusMutationProtocol>,
        refresh: Arc<RefreshScheduler>,
    ) -> Self {
        Self {
            subject_index,
            status_store,
            mutation,
            refresh,
        }
    }

    /// Joins each matching person record with its current status,
    /// best-effort: a person with no matching status row is still
    /// returned, with `status: None`.
    pub async fn search_person(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        date_of_birth: Option<&str>,
    ) -> Result<Vec<PersonStatus>> {
        let subjects = self
            .subject_index
            .search(first_name, last_name, date_of_birth)
            .await?;

        let mut results = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let status = self
                .status_store
                .find_one(subject.section, subject.index)
                .await?
                .map(|entry| entry.status);
            results.push(PersonStatus {
                first_name: subject.first_name,
                last_name: subject.last_name,
                date_of_birth: subject.date_of_birth,
                section: subject.section,
                index: subject.index,
                status,
            });
        }
        Ok(results)
    }

    /// Writes the status directly, then invalidates the section's cached
    /// tokens so the next served token reflects it. A cache-invalidation
    /// failure is logged, not fatal — per §7's propagation rule, the
    /// write itself already succeeded.
    pub async fn update_status(&self, section: i64, index: i64, status: u8) -> Result<()> {
        self.mutation.update_status(section, index, status).await?;
        if let Err(e) = self.refresh.invalidate_section(section).await {
            tracing::warn!(section, error = %e, "cache invalidation after admin update failed");
        } else {
            info!(section, index, status, "admin status update published");
        }
        Ok(())
    }
}
