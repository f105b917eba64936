//! View state for the check-in dashboard.
//!
//! Every user action is split into `begin_*` and `finish_*` so the shell can
//! run the port calls off the UI thread. The in-flight flags double as the
//! only guard against concurrent actions: a second create or decrypt is
//! refused while one is running.

use std::collections::HashMap;

use alloy::primitives::Address;

use crate::domain::{
    from_micro_degrees, CheckInDraft, CheckInRecord, LatitudeView, RecordId, Stats, TimestampMs,
};
use crate::failure::{
    create_failure_message, decrypt_failure_message, MSG_ALREADY_ON_CHAIN, MSG_AVAILABILITY_FAILED,
    MSG_AVAILABLE, MSG_CONNECT_WALLET, MSG_CREATE_DONE, MSG_CREATE_PENDING, MSG_DECRYPT_DONE,
    MSG_FHE_INIT_FAILED, MSG_LOAD_FAILED, MSG_UNAVAILABLE,
};
use crate::filter::{compute_stats, user_history, RecordFilter};
use crate::ports::PortError;
use crate::service::{CreateOutcome, DecryptOutcome, LoadOutcome};
use crate::status::StatusToast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Busy,
    NotConnected,
    FheNotReady,
    AlreadyVerified,
    IncompleteForm,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub account: Option<Address>,
    pub fhe_ready: bool,
    /// True until the first load after connecting settles.
    pub initial_load: bool,
    pub filter: RecordFilter,
    pub toast: StatusToast,
    pub draft: CheckInDraft,
    pub show_create: bool,
    pub selected: Option<RecordId>,
    records: Vec<CheckInRecord>,
    stats: Stats,
    history: Vec<CheckInRecord>,
    local_decrypts: HashMap<RecordId, u32>,
    refreshing: bool,
    creating: bool,
    decrypting: bool,
}

impl Dashboard {
    pub fn with_toast(toast: StatusToast) -> Self {
        Self {
            toast,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[CheckInRecord] {
        &self.records
    }

    pub fn record(&self, id: &RecordId) -> Option<&CheckInRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn history(&self) -> &[CheckInRecord] {
        &self.history
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn is_decrypting(&self) -> bool {
        self.decrypting
    }

    pub fn can_open_create(&self) -> bool {
        self.is_connected() && self.fhe_ready
    }

    pub fn can_submit_create(&self) -> bool {
        !self.creating && self.fhe_ready && self.draft.is_complete()
    }

    pub fn can_decrypt(&self, id: &RecordId) -> bool {
        !self.decrypting && self.record(id).is_some_and(|r| !r.is_verified)
    }

    /// Filtered rows, recomputed on every call.
    pub fn visible_records(&self) -> Vec<&CheckInRecord> {
        self.filter.apply(&self.records)
    }

    pub fn latitude_view(&self, id: &RecordId) -> LatitudeView {
        let Some(record) = self.record(id) else {
            return LatitudeView::Redacted;
        };
        if record.is_verified {
            return match record.decrypted_value {
                Some(v) => LatitudeView::Verified(from_micro_degrees(v)),
                None => LatitudeView::Redacted,
            };
        }
        match self.local_decrypts.get(id) {
            Some(v) => LatitudeView::LocallyDecrypted(from_micro_degrees(*v)),
            None => LatitudeView::Redacted,
        }
    }

    pub fn tick(&mut self, now: TimestampMs) -> bool {
        self.toast.tick(now)
    }

    pub fn connected(&mut self, account: Address) {
        self.account = Some(account);
        self.initial_load = true;
        self.recompute();
    }

    pub fn connect_failed(&mut self, err: &PortError, now: TimestampMs) {
        self.toast.error(format!("Wallet connection failed: {err}"), now);
    }

    pub fn finish_init(&mut self, result: Result<(), PortError>, now: TimestampMs) {
        match result {
            Ok(()) => self.fhe_ready = true,
            Err(e) => {
                tracing::error!(error = %e, "FHE initialization failed");
                self.toast.error(MSG_FHE_INIT_FAILED, now);
            }
        }
    }

    pub fn begin_load(&mut self) -> Result<(), Refusal> {
        if self.account.is_none() {
            self.initial_load = false;
            return Err(Refusal::NotConnected);
        }
        self.refreshing = true;
        Ok(())
    }

    pub fn finish_load(&mut self, result: Result<LoadOutcome, PortError>, now: TimestampMs) {
        self.refreshing = false;
        self.initial_load = false;
        match result {
            Ok(outcome) => self.replace_records(outcome),
            Err(e) => {
                tracing::error!(error = %e, "failed to list check-ins");
                self.toast.error(MSG_LOAD_FAILED, now);
            }
        }
    }

    pub fn begin_create(&mut self, now: TimestampMs) -> Result<(), Refusal> {
        if self.creating {
            return Err(Refusal::Busy);
        }
        if self.account.is_none() {
            self.toast.error(MSG_CONNECT_WALLET, now);
            return Err(Refusal::NotConnected);
        }
        if !self.fhe_ready {
            self.toast.error(MSG_FHE_INIT_FAILED, now);
            return Err(Refusal::FheNotReady);
        }
        if !self.draft.is_complete() {
            return Err(Refusal::IncompleteForm);
        }
        self.creating = true;
        self.toast.pending(MSG_CREATE_PENDING);
        Ok(())
    }

    pub fn progress(&mut self, message: &str) {
        self.toast.pending(message);
    }

    pub fn finish_create(&mut self, result: Result<CreateOutcome, PortError>, now: TimestampMs) {
        self.creating = false;
        match result {
            Ok(outcome) => {
                self.toast.success(MSG_CREATE_DONE, now);
                self.replace_records(outcome.records);
                self.show_create = false;
                self.draft.clear();
            }
            Err(e) => {
                tracing::warn!(error = %e, "check-in creation failed");
                self.toast.error(create_failure_message(&e), now);
            }
        }
    }

    pub fn begin_decrypt(&mut self, id: &RecordId, now: TimestampMs) -> Result<(), Refusal> {
        if self.decrypting {
            return Err(Refusal::Busy);
        }
        if self.account.is_none() {
            self.toast.error(MSG_CONNECT_WALLET, now);
            return Err(Refusal::NotConnected);
        }
        if self.record(id).is_some_and(|r| r.is_verified) {
            return Err(Refusal::AlreadyVerified);
        }
        self.decrypting = true;
        Ok(())
    }

    /// Returns the latitude in micro-degrees when one became known.
    pub fn finish_decrypt(
        &mut self,
        id: &RecordId,
        result: Result<DecryptOutcome, PortError>,
        now: TimestampMs,
    ) -> Option<u32> {
        self.decrypting = false;
        match result {
            Ok(DecryptOutcome::AlreadyOnChain { value }) => {
                self.toast.success(MSG_ALREADY_ON_CHAIN, now);
                Some(value)
            }
            Ok(DecryptOutcome::Decrypted { value, records, .. }) => {
                self.local_decrypts.insert(id.clone(), value);
                self.replace_records(records);
                self.toast.success(MSG_DECRYPT_DONE, now);
                Some(value)
            }
            Ok(DecryptOutcome::VerifiedConcurrently { records }) => {
                self.replace_records(records);
                self.toast.success(MSG_ALREADY_ON_CHAIN, now);
                None
            }
            Err(e) => {
                tracing::warn!(record = %id, error = %e, "decryption failed");
                self.toast.error(decrypt_failure_message(&e), now);
                None
            }
        }
    }

    pub fn finish_availability(&mut self, result: Result<bool, PortError>, now: TimestampMs) {
        match result {
            Ok(true) => self.toast.success(MSG_AVAILABLE, now),
            Ok(false) => self.toast.error(MSG_UNAVAILABLE, now),
            Err(e) => {
                tracing::warn!(error = %e, "availability check failed");
                self.toast.error(MSG_AVAILABILITY_FAILED, now);
            }
        }
    }

    fn replace_records(&mut self, outcome: LoadOutcome) {
        self.records = outcome.records;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.stats = compute_stats(&self.records, self.account.as_ref());
        self.history = user_history(&self.records, self.account.as_ref());
    }
}
