use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::MedicalReport;

/// Session-keyed report storage.
///
/// One slot per session id, overwritten wholesale by each successful pipeline
/// run; readers receive clones, never a mutable handle. Keying by session
/// replaces the single global slot, so concurrent uploads under different
/// sessions cannot clobber each other's results.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, session_id: String, report: MedicalReport);
    async fn get(&self, session_id: &str) -> Option<MedicalReport>;
}

#[derive(Default)]
pub struct InMemoryReportStore {
    reports: DashMap<String, MedicalReport>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, session_id: String, report: MedicalReport) {
        self.reports.insert(session_id, report);
    }

    async fn get(&self, session_id: &str) -> Option<MedicalReport> {
        self.reports.get(session_id).map(|entry| entry.clone())
    }
}
