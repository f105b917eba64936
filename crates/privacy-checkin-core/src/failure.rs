//! Maps port failures to the messages shown in the status toast.

use crate::ports::PortError;

pub const USER_REJECTED_MARKER: &str = "user rejected";
pub const ALREADY_VERIFIED_MARKER: &str = "Data already verified";

pub const MSG_CONNECT_WALLET: &str = "Please connect your wallet first";
pub const MSG_FHE_INIT_FAILED: &str = "FHE initialization failed";
pub const MSG_LOAD_FAILED: &str = "Failed to load check-ins";
pub const MSG_CREATE_CANCELLED: &str = "Transaction cancelled by user";
pub const MSG_CREATE_PENDING: &str = "Creating private check-in with FHE...";
pub const MSG_CREATE_CONFIRMING: &str = "Waiting for transaction confirmation...";
pub const MSG_CREATE_DONE: &str = "Private check-in created!";
pub const MSG_DECRYPT_VERIFYING: &str = "Verifying decryption on-chain...";
pub const MSG_DECRYPT_DONE: &str = "Data decrypted and verified!";
pub const MSG_ALREADY_ON_CHAIN: &str = "Data already verified on-chain";
pub const MSG_AVAILABLE: &str = "FHE system availability check passed!";
pub const MSG_UNAVAILABLE: &str = "Contract reports the FHE system is unavailable";
pub const MSG_AVAILABILITY_FAILED: &str = "Availability check failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UserRejected,
    AlreadyVerified,
    Other,
}

pub fn classify(err: &PortError) -> FailureKind {
    if matches!(err, PortError::Rejected(_)) {
        return FailureKind::UserRejected;
    }
    let text = err.to_string();
    if text.to_lowercase().contains(USER_REJECTED_MARKER) {
        FailureKind::UserRejected
    } else if text.contains(ALREADY_VERIFIED_MARKER) {
        FailureKind::AlreadyVerified
    } else {
        FailureKind::Other
    }
}

pub fn create_failure_message(err: &PortError) -> String {
    match classify(err) {
        FailureKind::UserRejected => MSG_CREATE_CANCELLED.to_owned(),
        _ => format!("Submission failed: {}", detail(err)),
    }
}

pub fn decrypt_failure_message(err: &PortError) -> String {
    format!("Decryption failed: {}", detail(err))
}

fn detail(err: &PortError) -> String {
    let text = err.to_string();
    if text.is_empty() {
        "unknown error".to_owned()
    } else {
        text
    }
}
