pub mod controller;
pub mod dashboard;
pub mod domain;
pub mod failure;
pub mod filter;
pub mod ports;
pub mod service;
pub mod status;

pub use controller::CheckInController;
pub use dashboard::{Dashboard, Refusal};
pub use domain::{
    CheckInDraft, CheckInRecord, CreateRecordCall, DecryptionResult, DraftError, EncryptedInput,
    LatitudeView, OnChainRecord, RecordId, Stats, TimestampMs, TxReceipt, ValidatedCheckIn,
};
pub use failure::{classify, FailureKind};
pub use filter::{compute_stats, user_history, RecordFilter, USER_HISTORY_LIMIT};
pub use ports::{ClockPort, ContractPort, FhePort, PortError, ProviderPort, SubmitDecryption};
pub use service::{CheckInService, CreateOutcome, DecryptOutcome, LoadOutcome, Progress};
pub use status::{
    status_transition, StatusAction, StatusPhase, StatusToast, StatusTransitionError,
};
