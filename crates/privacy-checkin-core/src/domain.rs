use std::fmt;

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinates are stored on-chain as integer micro-degrees.
pub const MICRO_DEGREES: f64 = 1_000_000.0;

/// Label attached to every record created from the dashboard.
pub const CHECK_IN_LABEL: &str = "Private location check-in";

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampMs(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn generate(now: TimestampMs) -> Self {
        Self(format!("checkin-{}", now.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Raw `getBusinessData` tuple as returned by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainRecord {
    pub name: String,
    pub public_value1: U256,
    pub public_value2: U256,
    pub description: String,
    pub creator: Address,
    pub timestamp: U256,
    pub is_verified: bool,
    pub decrypted_value: u32,
}

/// Cached view of one on-chain check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: RecordId,
    pub name: String,
    /// Latitude in micro-degrees as submitted alongside the ciphertext.
    pub public_value1: u64,
    /// Longitude in micro-degrees.
    pub public_value2: u64,
    pub description: String,
    /// Unix seconds.
    pub timestamp: u64,
    pub creator: Address,
    pub is_verified: bool,
    pub decrypted_value: Option<u32>,
}

impl CheckInRecord {
    pub fn from_chain(id: RecordId, raw: OnChainRecord) -> Self {
        let decrypted_value = raw.is_verified.then_some(raw.decrypted_value);
        Self {
            id,
            name: raw.name,
            public_value1: saturating_u64(raw.public_value1),
            public_value2: saturating_u64(raw.public_value2),
            description: raw.description,
            timestamp: saturating_u64(raw.timestamp),
            creator: raw.creator,
            is_verified: raw.is_verified,
            decrypted_value,
        }
    }

    pub fn longitude_degrees(&self) -> f64 {
        from_micro_degrees(self.public_value2)
    }

    pub fn created_by(&self, account: &Address) -> bool {
        // Address equality is byte-wise, so checksum casing never matters here.
        self.creator == *account
    }
}

fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

pub fn from_micro_degrees(value: impl Into<u64>) -> f64 {
    value.into() as f64 / MICRO_DEGREES
}

pub fn to_micro_degrees(degrees: f64, max: f64) -> Result<u32, DraftError> {
    if !degrees.is_finite() {
        return Err(DraftError::NotANumber);
    }
    if degrees < 0.0 {
        return Err(DraftError::Negative);
    }
    if degrees > max {
        return Err(DraftError::OutOfRange { max });
    }
    Ok((degrees * MICRO_DEGREES).round() as u32)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} is not a number: {value}")]
    Unparseable { field: &'static str, value: String },
    #[error("coordinate is not a finite number")]
    NotANumber,
    #[error("negative coordinates cannot be stored on-chain")]
    Negative,
    #[error("coordinate exceeds {max} degrees")]
    OutOfRange { max: f64 },
}

/// Create form contents as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInDraft {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}

impl CheckInDraft {
    /// Mirrors the submit button: every field must be filled in.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.latitude.trim().is_empty()
            && !self.longitude.trim().is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> Result<ValidatedCheckIn, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::Missing("name"));
        }
        let latitude = parse_coordinate("latitude", &self.latitude)?;
        let longitude = parse_coordinate("longitude", &self.longitude)?;
        Ok(ValidatedCheckIn {
            name: name.to_owned(),
            latitude_micro: to_micro_degrees(latitude, MAX_LATITUDE)?,
            longitude_micro: to_micro_degrees(longitude, MAX_LONGITUDE)?,
        })
    }
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, DraftError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DraftError::Missing(field));
    }
    trimmed.parse::<f64>().map_err(|_| DraftError::Unparseable {
        field,
        value: trimmed.to_owned(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckIn {
    pub name: String,
    pub latitude_micro: u32,
    pub longitude_micro: u32,
}

/// Arguments of `createBusinessData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordCall {
    pub id: RecordId,
    pub name: String,
    pub encrypted_value: B256,
    pub input_proof: Bytes,
    pub public_value1: u32,
    pub public_value2: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: B256,
    pub proof: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionResult {
    pub clear_values: Vec<(B256, U256)>,
    pub abi_encoded_clear_values: Bytes,
    pub decryption_proof: Bytes,
}

impl DecryptionResult {
    pub fn clear_value(&self, handle: &B256) -> Option<U256> {
        self.clear_values
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Aggregate counters shown in the stats cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub verified: usize,
    pub user_total: usize,
}

/// How the latitude of a record may be rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatitudeView {
    Redacted,
    Verified(f64),
    LocallyDecrypted(f64),
}

impl LatitudeView {
    pub fn degrees(&self) -> Option<f64> {
        match self {
            LatitudeView::Redacted => None,
            LatitudeView::Verified(v) | LatitudeView::LocallyDecrypted(v) => Some(*v),
        }
    }
}
