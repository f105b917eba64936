use alloy::primitives::{Address, B256};
use tracing::{info, warn};

use crate::domain::{
    CheckInDraft, CheckInRecord, CreateRecordCall, RecordId, TimestampMs, TxReceipt,
    CHECK_IN_LABEL,
};
use crate::failure::{
    classify, FailureKind, MSG_CREATE_CONFIRMING, MSG_CREATE_PENDING, MSG_DECRYPT_VERIFYING,
};
use crate::ports::{ClockPort, ContractPort, FhePort, PortError, ProviderPort};

/// Receives "pending" status messages while an operation runs.
pub type Progress<'a> = dyn FnMut(&str) + 'a;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub records: Vec<CheckInRecord>,
    /// Records whose detail fetch failed, with the failure text.
    pub skipped: Vec<(RecordId, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub record_id: RecordId,
    pub tx_hash: B256,
    pub records: LoadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The record was verified before this call; value read from storage.
    AlreadyOnChain { value: u32 },
    Decrypted {
        value: u32,
        tx_hash: Option<B256>,
        records: LoadOutcome,
    },
    /// Another verification landed first and the contract refused ours.
    VerifiedConcurrently { records: LoadOutcome },
}

pub struct CheckInService<P, C, F, K>
where
    P: ProviderPort,
    C: ContractPort,
    F: FhePort,
    K: ClockPort,
{
    pub provider: P,
    pub contract: C,
    pub fhe: F,
    pub clock: K,
}

impl<P, C, F, K> CheckInService<P, C, F, K>
where
    P: ProviderPort,
    C: ContractPort,
    F: FhePort,
    K: ClockPort,
{
    pub fn new(provider: P, contract: C, fhe: F, clock: K) -> Self {
        Self {
            provider,
            contract,
            fhe,
            clock,
        }
    }

    pub fn connect_wallet(&self) -> Result<Address, PortError> {
        let account = self
            .provider
            .request_accounts()?
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()))?;
        let chain_id = self.provider.chain_id()?;
        info!(%account, chain_id, "wallet connected");
        Ok(account)
    }

    pub fn initialize_fhe(&self) -> Result<(), PortError> {
        if self.fhe.is_initialized() {
            return Ok(());
        }
        info!("initializing FHE client");
        self.fhe.initialize()
    }

    pub fn load_records(&self) -> Result<LoadOutcome, PortError> {
        let ids = self.contract.list_record_ids()?;
        let mut outcome = LoadOutcome::default();
        for id in ids {
            match self.contract.get_record(&id) {
                Ok(raw) => outcome.records.push(CheckInRecord::from_chain(id, raw)),
                Err(e) => {
                    warn!(record = %id, error = %e, "skipping check-in that failed to load");
                    outcome.skipped.push((id, e.to_string()));
                }
            }
        }
        info!(
            loaded = outcome.records.len(),
            skipped = outcome.skipped.len(),
            "check-ins loaded"
        );
        Ok(outcome)
    }

    pub fn create_check_in(
        &self,
        account: Option<Address>,
        draft: &CheckInDraft,
        progress: &mut Progress<'_>,
    ) -> Result<CreateOutcome, PortError> {
        let account = require_account(account)?;
        let checked = draft
            .validate()
            .map_err(|e| PortError::Validation(e.to_string()))?;

        progress(MSG_CREATE_PENDING);
        let contract_address = self.contract.contract_address()?;
        let record_id = RecordId::generate(TimestampMs(self.clock.now_ms()?));
        let encrypted = self
            .fhe
            .encrypt(contract_address, account, checked.latitude_micro)?;

        let call = CreateRecordCall {
            id: record_id.clone(),
            name: checked.name,
            encrypted_value: encrypted.handle,
            input_proof: encrypted.proof,
            public_value1: checked.latitude_micro,
            public_value2: checked.longitude_micro,
            description: CHECK_IN_LABEL.to_owned(),
        };
        let tx_hash = self.contract.submit_create(account, &call)?;
        info!(record = %record_id, %tx_hash, "check-in submitted");

        progress(MSG_CREATE_CONFIRMING);
        let receipt = self.contract.wait_for_receipt(tx_hash)?;
        ensure_success(&receipt)?;

        let records = self.load_records()?;
        Ok(CreateOutcome {
            record_id,
            tx_hash,
            records,
        })
    }

    pub fn decrypt_record(
        &self,
        account: Option<Address>,
        id: &RecordId,
        progress: &mut Progress<'_>,
    ) -> Result<DecryptOutcome, PortError> {
        let account = require_account(account)?;
        match self.verify_record(account, id, progress) {
            Err(e) if classify(&e) == FailureKind::AlreadyVerified => {
                info!(record = %id, "record verified concurrently, reloading");
                let records = self.load_records()?;
                Ok(DecryptOutcome::VerifiedConcurrently { records })
            }
            other => other,
        }
    }

    pub fn check_availability(&self) -> Result<bool, PortError> {
        self.contract.is_available()
    }

    fn verify_record(
        &self,
        account: Address,
        id: &RecordId,
        progress: &mut Progress<'_>,
    ) -> Result<DecryptOutcome, PortError> {
        let stored = self.contract.get_record(id)?;
        if stored.is_verified {
            return Ok(DecryptOutcome::AlreadyOnChain {
                value: stored.decrypted_value,
            });
        }

        let contract_address = self.contract.contract_address()?;
        let handle = self.contract.get_encrypted_handle(id)?;
        progress(MSG_DECRYPT_VERIFYING);

        let contract = &self.contract;
        let mut verify_tx = None;
        let result = self.fhe.verify_decryption(
            &[handle],
            contract_address,
            &mut |clear_values, proof| {
                let tx_hash = contract.submit_verify(account, id, clear_values, proof)?;
                ensure_success(&contract.wait_for_receipt(tx_hash)?)?;
                verify_tx = Some(tx_hash);
                Ok(tx_hash)
            },
        )?;

        let clear = result
            .clear_value(&handle)
            .ok_or_else(|| PortError::Validation(format!("no clear value for handle {handle}")))?;
        let value = u32::try_from(clear)
            .map_err(|_| PortError::Validation(format!("clear value out of range: {clear}")))?;
        info!(record = %id, "decryption verified");

        let records = self.load_records()?;
        Ok(DecryptOutcome::Decrypted {
            value,
            tx_hash: verify_tx,
            records,
        })
    }
}

fn require_account(account: Option<Address>) -> Result<Address, PortError> {
    account.ok_or_else(|| PortError::Policy("wallet not connected".to_owned()))
}

fn ensure_success(receipt: &TxReceipt) -> Result<(), PortError> {
    if receipt.success {
        Ok(())
    } else {
        Err(PortError::Contract(format!(
            "transaction {} reverted",
            receipt.tx_hash
        )))
    }
}
