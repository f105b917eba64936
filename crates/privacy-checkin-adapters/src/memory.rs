use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use privacy_checkin_core::{
    ClockPort, CreateRecordCall, OnChainRecord, PortError, RecordId, TxReceipt,
};

use crate::clock::SystemClockAdapter;
use crate::deterministic::{decryption_proof, input_proof};

pub const MEMORY_CONTRACT_ADDRESS: Address = Address::new([
    0xC4, 0xEC, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x01,
]);

/// In-process registry that follows the check-in contract's rules.
#[derive(Debug, Clone, Default)]
pub struct MemoryContract {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    order: Vec<RecordId>,
    records: HashMap<RecordId, StoredRecord>,
    receipts: BTreeMap<B256, TxReceipt>,
    block: u64,
    unavailable: bool,
    fail_listing: bool,
    corrupted: Vec<RecordId>,
    reject_next: bool,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    data: OnChainRecord,
    handle: B256,
}

impl MemoryContract {
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("memory contract lock poisoned: {e}")))
    }

    pub fn debug_reject_next_transaction(&self) -> Result<(), PortError> {
        self.lock()?.reject_next = true;
        Ok(())
    }

    pub fn debug_set_available(&self, available: bool) -> Result<(), PortError> {
        self.lock()?.unavailable = !available;
        Ok(())
    }

    pub fn debug_fail_listing(&self, fail: bool) -> Result<(), PortError> {
        self.lock()?.fail_listing = fail;
        Ok(())
    }

    pub fn debug_corrupt_record(&self, id: &RecordId) -> Result<(), PortError> {
        self.lock()?.corrupted.push(id.clone());
        Ok(())
    }

    pub fn address(&self) -> Address {
        MEMORY_CONTRACT_ADDRESS
    }

    pub fn list_record_ids(&self) -> Result<Vec<RecordId>, PortError> {
        let g = self.lock()?;
        if g.fail_listing {
            return Err(PortError::Transport("memory contract listing disabled".to_owned()));
        }
        Ok(g.order.clone())
    }

    pub fn get_record(&self, id: &RecordId) -> Result<OnChainRecord, PortError> {
        let g = self.lock()?;
        if g.corrupted.contains(id) {
            return Err(PortError::Transport(format!("getBusinessData({id}) decode failed")));
        }
        g.records
            .get(id)
            .map(|r| r.data.clone())
            .ok_or_else(|| PortError::Contract("Business data does not exist".to_owned()))
    }

    pub fn get_encrypted_handle(&self, id: &RecordId) -> Result<B256, PortError> {
        self.lock()?
            .records
            .get(id)
            .map(|r| r.handle)
            .ok_or_else(|| PortError::Contract("Business data does not exist".to_owned()))
    }

    pub fn is_available(&self) -> Result<bool, PortError> {
        Ok(!self.lock()?.unavailable)
    }

    pub fn submit_create(&self, from: Address, call: &CreateRecordCall) -> Result<B256, PortError> {
        let mut g = self.lock()?;
        take_rejection(&mut g)?;
        if g.records.contains_key(&call.id) {
            return Err(PortError::Contract("Business data already exists".to_owned()));
        }
        if call.input_proof != input_proof(call.encrypted_value, MEMORY_CONTRACT_ADDRESS, from) {
            return Err(PortError::Contract("Invalid input proof".to_owned()));
        }
        let timestamp = SystemClockAdapter.now_ms()? / 1_000;
        g.order.push(call.id.clone());
        g.records.insert(
            call.id.clone(),
            StoredRecord {
                data: OnChainRecord {
                    name: call.name.clone(),
                    public_value1: U256::from(call.public_value1),
                    public_value2: U256::from(call.public_value2),
                    description: call.description.clone(),
                    creator: from,
                    timestamp: U256::from(timestamp),
                    is_verified: false,
                    decrypted_value: 0,
                },
                handle: call.encrypted_value,
            },
        );
        Ok(mine(&mut g, b"create", call.id.as_str()))
    }

    pub fn submit_verify(
        &self,
        _from: Address,
        id: &RecordId,
        abi_encoded_clear_values: Bytes,
        decryption_proof_bytes: Bytes,
    ) -> Result<B256, PortError> {
        let mut g = self.lock()?;
        take_rejection(&mut g)?;
        let record = g
            .records
            .get_mut(id)
            .ok_or_else(|| PortError::Contract("Business data does not exist".to_owned()))?;
        if record.data.is_verified {
            return Err(PortError::Contract("Data already verified".to_owned()));
        }
        let expected = decryption_proof(&[record.handle], &abi_encoded_clear_values);
        if decryption_proof_bytes != expected {
            return Err(PortError::Contract("Invalid decryption proof".to_owned()));
        }
        if abi_encoded_clear_values.len() != 32 {
            return Err(PortError::Contract("Malformed clear value".to_owned()));
        }
        let value = U256::from_be_slice(&abi_encoded_clear_values);
        record.data.decrypted_value = u32::try_from(value)
            .map_err(|_| PortError::Contract("Clear value exceeds uint32".to_owned()))?;
        record.data.is_verified = true;
        Ok(mine(&mut g, b"verify", id.as_str()))
    }

    pub fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        self.lock()?
            .receipts
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| PortError::NotFound(format!("receipt {tx_hash}")))
    }
}

fn take_rejection(g: &mut MemoryState) -> Result<(), PortError> {
    if std::mem::take(&mut g.reject_next) {
        return Err(PortError::Rejected(
            "user rejected transaction (code 4001)".to_owned(),
        ));
    }
    Ok(())
}

fn mine(g: &mut MemoryState, kind: &[u8], id: &str) -> B256 {
    g.block += 1;
    let mut seed = Vec::new();
    seed.extend_from_slice(kind);
    seed.extend_from_slice(id.as_bytes());
    seed.extend_from_slice(&g.block.to_be_bytes());
    let tx_hash = keccak256(seed);
    g.receipts.insert(
        tx_hash,
        TxReceipt {
            tx_hash,
            block_number: Some(g.block),
            success: true,
        },
    );
    tx_hash
}
