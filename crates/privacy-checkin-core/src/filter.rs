use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::{CheckInRecord, Stats};

/// Number of own records kept for the "my check-ins" sidebar, in listing order.
pub const USER_HISTORY_LIMIT: usize = 5;

/// Search box and "verified only" toggle; persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    pub search: String,
    pub verified_only: bool,
}

impl RecordFilter {
    pub fn matches(&self, record: &CheckInRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = record.name.to_lowercase().contains(&needle);
        let matches_verified = !self.verified_only || record.is_verified;
        matches_search && matches_verified
    }

    pub fn apply<'a>(&self, records: &'a [CheckInRecord]) -> Vec<&'a CheckInRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

pub fn compute_stats(records: &[CheckInRecord], account: Option<&Address>) -> Stats {
    Stats {
        total: records.len(),
        verified: records.iter().filter(|r| r.is_verified).count(),
        user_total: account
            .map(|a| records.iter().filter(|r| r.created_by(a)).count())
            .unwrap_or(0),
    }
}

pub fn user_history(records: &[CheckInRecord], account: Option<&Address>) -> Vec<CheckInRecord> {
    match account {
        Some(a) => records
            .iter()
            .filter(|r| r.created_by(a))
            .take(USER_HISTORY_LIMIT)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}
