//! Last-known probe results, shown next to each profile.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::connections::{ProbeReport, ProfileId};

/// Transient map of the latest probe report per profile. Never persisted.
///
/// Overlapping probes for the same profile are not coordinated: whichever
/// finishes last is what gets shown.
#[derive(Default)]
pub struct ProbeStatusBoard {
    reports: RwLock<HashMap<ProfileId, ProbeReport>>,
}

impl ProbeStatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, report: ProbeReport) {
        self.reports.write().await.insert(report.profile_id, report);
    }

    pub async fn get(&self, id: ProfileId) -> Option<ProbeReport> {
        self.reports.read().await.get(&id).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<ProfileId, ProbeReport> {
        self.reports.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::{ConnectionProfile, ProbeOutcome};

    #[tokio::test]
    async fn latest_report_wins() {
        let board = ProbeStatusBoard::new();
        let profile = ConnectionProfile::new("https://github.com", "t");

        board
            .record(ProbeReport::new(&profile, ProbeOutcome::Reachable { status: 200 }))
            .await;
        board
            .record(ProbeReport::new(&profile, ProbeOutcome::Unreachable { status: 401 }))
            .await;

        let shown = board.get(profile.id).await.unwrap();
        assert_eq!(shown.outcome, ProbeOutcome::Unreachable { status: 401 });
        assert_eq!(board.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_profile_has_no_report() {
        let board = ProbeStatusBoard::new();
        assert!(board.get(ProfileId::new()).await.is_none());
    }
}
