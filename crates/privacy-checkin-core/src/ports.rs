use alloy::primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::domain::{
    CreateRecordCall, DecryptionResult, EncryptedInput, OnChainRecord, RecordId, TxReceipt,
};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("user rejected transaction: {0}")]
    Rejected(String),
    #[error("contract error: {0}")]
    Contract(String),
    #[error("policy error: {0}")]
    Policy(String),
}

/// Submits the decryption result on-chain and returns the transaction hash.
pub type SubmitDecryption<'a> = dyn FnMut(Bytes, Bytes) -> Result<B256, PortError> + 'a;

pub trait ProviderPort {
    fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    fn chain_id(&self) -> Result<u64, PortError>;
}

pub trait ContractPort {
    fn contract_address(&self) -> Result<Address, PortError>;
    fn list_record_ids(&self) -> Result<Vec<RecordId>, PortError>;
    fn get_record(&self, id: &RecordId) -> Result<OnChainRecord, PortError>;
    fn get_encrypted_handle(&self, id: &RecordId) -> Result<B256, PortError>;
    fn is_available(&self) -> Result<bool, PortError>;
    fn submit_create(&self, from: Address, call: &CreateRecordCall) -> Result<B256, PortError>;
    fn submit_verify(
        &self,
        from: Address,
        id: &RecordId,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> Result<B256, PortError>;
    fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError>;
}

pub trait FhePort {
    fn initialize(&self) -> Result<(), PortError>;
    fn is_initialized(&self) -> bool;
    fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> Result<EncryptedInput, PortError>;
    fn verify_decryption(
        &self,
        handles: &[B256],
        contract: Address,
        submit: &mut SubmitDecryption<'_>,
    ) -> Result<DecryptionResult, PortError>;
}

pub trait ClockPort {
    fn now_ms(&self) -> Result<u64, PortError>;
}
