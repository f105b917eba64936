#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

use privacy_checkin_core::{
    CheckInController, CheckInService, ClockPort, ContractPort, CreateRecordCall, Dashboard,
    DecryptionResult, EncryptedInput, FhePort, OnChainRecord, PortError, ProviderPort, RecordId,
    SubmitDecryption, TxReceipt,
};

pub const START_MS: u64 = 1_739_750_400_000;

#[derive(Debug)]
pub struct TestClock {
    now: AtomicU64,
}

impl Default for TestClock {
    fn default() -> Self {
        Self {
            now: AtomicU64::new(START_MS),
        }
    }
}

impl TestClock {
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.now.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Default)]
pub struct FakeProvider {
    pub accounts: Vec<Address>,
}

impl ProviderPort for FakeProvider {
    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        Ok(self.accounts.clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        Ok(11155111)
    }
}

#[derive(Debug, Default)]
pub struct ContractState {
    pub records: Vec<(RecordId, OnChainRecord, B256)>,
    pub fail_listing: bool,
    pub broken: Vec<RecordId>,
    pub reject_next: bool,
    pub verify_error: Option<String>,
    pub tx_count: u64,
}

#[derive(Debug, Default)]
pub struct FakeContract {
    pub state: Mutex<ContractState>,
}

impl FakeContract {
    pub fn seed(&self, id: &str, name: &str, creator: Address, verified: Option<u32>) {
        let mut g = self.state.lock().expect("contract lock");
        let handle = keccak256(id.as_bytes());
        g.records.push((
            RecordId::from(id),
            OnChainRecord {
                name: name.to_owned(),
                public_value1: U256::from(39_904_200u64),
                public_value2: U256::from(116_407_400u64),
                description: "seed".to_owned(),
                creator,
                timestamp: U256::from(1_700_000_000u64),
                is_verified: verified.is_some(),
                decrypted_value: verified.unwrap_or_default(),
            },
            handle,
        ));
    }

    pub fn get_handle(&self, id: &RecordId) -> B256 {
        self.get_encrypted_handle(id).expect("seeded handle")
    }

    fn next_tx(g: &mut ContractState) -> B256 {
        g.tx_count += 1;
        keccak256(g.tx_count.to_be_bytes())
    }
}

impl ContractPort for FakeContract {
    fn contract_address(&self) -> Result<Address, PortError> {
        Ok(Address::repeat_byte(0xCC))
    }

    fn list_record_ids(&self) -> Result<Vec<RecordId>, PortError> {
        let g = self.state.lock().expect("contract lock");
        if g.fail_listing {
            return Err(PortError::Transport("rpc unreachable".to_owned()));
        }
        Ok(g.records.iter().map(|(id, _, _)| id.clone()).collect())
    }

    fn get_record(&self, id: &RecordId) -> Result<OnChainRecord, PortError> {
        let g = self.state.lock().expect("contract lock");
        if g.broken.contains(id) {
            return Err(PortError::Transport(format!("decode failed for {id}")));
        }
        g.records
            .iter()
            .find(|(rid, _, _)| rid == id)
            .map(|(_, r, _)| r.clone())
            .ok_or_else(|| PortError::NotFound(id.to_string()))
    }

    fn get_encrypted_handle(&self, id: &RecordId) -> Result<B256, PortError> {
        let g = self.state.lock().expect("contract lock");
        g.records
            .iter()
            .find(|(rid, _, _)| rid == id)
            .map(|(_, _, h)| *h)
            .ok_or_else(|| PortError::NotFound(id.to_string()))
    }

    fn is_available(&self) -> Result<bool, PortError> {
        Ok(true)
    }

    fn submit_create(&self, from: Address, call: &CreateRecordCall) -> Result<B256, PortError> {
        let mut g = self.state.lock().expect("contract lock");
        if g.reject_next {
            g.reject_next = false;
            return Err(PortError::Rejected(
                "user rejected transaction (code 4001)".to_owned(),
            ));
        }
        g.records.push((
            call.id.clone(),
            OnChainRecord {
                name: call.name.clone(),
                public_value1: U256::from(call.public_value1),
                public_value2: U256::from(call.public_value2),
                description: call.description.clone(),
                creator: from,
                timestamp: U256::from(1_700_000_100u64),
                is_verified: false,
                decrypted_value: 0,
            },
            call.encrypted_value,
        ));
        Ok(Self::next_tx(&mut g))
    }

    fn submit_verify(
        &self,
        _from: Address,
        id: &RecordId,
        abi_encoded_clear_values: Bytes,
        _decryption_proof: Bytes,
    ) -> Result<B256, PortError> {
        let mut g = self.state.lock().expect("contract lock");
        if let Some(msg) = g.verify_error.take() {
            return Err(PortError::Contract(msg));
        }
        let value = U256::from_be_slice(&abi_encoded_clear_values);
        let entry = g
            .records
            .iter_mut()
            .find(|(rid, _, _)| rid == id)
            .ok_or_else(|| PortError::NotFound(id.to_string()))?;
        entry.1.is_verified = true;
        entry.1.decrypted_value = value.to::<u32>();
        Ok(Self::next_tx(&mut g))
    }

    fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        Ok(TxReceipt {
            tx_hash,
            block_number: Some(1),
            success: true,
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeFhe {
    pub initialized: AtomicBool,
    pub fail_init: bool,
    pub encrypt_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub plaintexts: Mutex<HashMap<B256, u32>>,
}

impl FhePort for FakeFhe {
    fn initialize(&self) -> Result<(), PortError> {
        if self.fail_init {
            return Err(PortError::Transport("relayer offline".to_owned()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> Result<EncryptedInput, PortError> {
        let n = self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        let mut seed = Vec::new();
        seed.extend_from_slice(contract.as_slice());
        seed.extend_from_slice(user.as_slice());
        seed.extend_from_slice(&value.to_be_bytes());
        seed.extend_from_slice(&n.to_be_bytes());
        let handle = keccak256(seed);
        self.plaintexts
            .lock()
            .expect("fhe lock")
            .insert(handle, value);
        Ok(EncryptedInput {
            handle,
            proof: Bytes::from(handle.to_vec()),
        })
    }

    fn verify_decryption(
        &self,
        handles: &[B256],
        _contract: Address,
        submit: &mut SubmitDecryption<'_>,
    ) -> Result<DecryptionResult, PortError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let plaintexts = self.plaintexts.lock().expect("fhe lock").clone();
        let mut clear_values = Vec::new();
        let mut encoded = Vec::new();
        for handle in handles {
            let value = plaintexts
                .get(handle)
                .copied()
                .ok_or_else(|| PortError::NotFound(format!("handle {handle}")))?;
            encoded.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
            clear_values.push((*handle, U256::from(value)));
        }
        let encoded = Bytes::from(encoded);
        let proof = Bytes::from(vec![0xAB; 8]);
        submit(encoded.clone(), proof.clone())?;
        Ok(DecryptionResult {
            clear_values,
            abi_encoded_clear_values: encoded,
            decryption_proof: proof,
        })
    }
}

pub type TestController = CheckInController<FakeProvider, FakeContract, FakeFhe, TestClock>;

pub fn user() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid user address")
}

pub fn other_user() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("valid other address")
}

pub fn new_controller() -> TestController {
    CheckInController::new(
        CheckInService::new(
            FakeProvider {
                accounts: vec![user()],
            },
            FakeContract::default(),
            FakeFhe::default(),
            TestClock::default(),
        ),
        Dashboard::default(),
    )
}

pub fn fill_draft(controller: &mut TestController, name: &str, lat: &str, lng: &str) {
    controller.dashboard.draft.name = name.to_owned();
    controller.dashboard.draft.latitude = lat.to_owned();
    controller.dashboard.draft.longitude = lng.to_owned();
}
