use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use tracing::warn;

use privacy_checkin_core::{
    ContractPort, CreateRecordCall, OnChainRecord, PortError, RecordId, TxReceipt,
};

use crate::memory::MemoryContract;
use crate::rpc::{JsonRpcClient, RpcContract};
use crate::CheckInConfig;

#[derive(Debug, Clone)]
pub struct ContractAdapter {
    mode: ContractMode,
}

#[derive(Debug, Clone)]
enum ContractMode {
    Disabled(String),
    Memory(MemoryContract),
    Rpc(Arc<RpcContract>),
}

impl Default for ContractAdapter {
    fn default() -> Self {
        Self::with_config(&CheckInConfig::from_env())
    }
}

impl ContractAdapter {
    pub fn with_config(config: &CheckInConfig) -> Self {
        let mode = match (&config.rpc_url, config.contract_address) {
            (Some(url), Some(address)) => match JsonRpcClient::new(url, config.request_timeout_ms)
            {
                Ok(rpc) => ContractMode::Rpc(Arc::new(RpcContract::new(rpc, address, config))),
                Err(e) if config.strict_runtime_required() => ContractMode::Disabled(format!(
                    "failed to initialize contract rpc client in production profile: {e}"
                )),
                Err(e) => {
                    warn!(error = %e, "falling back to in-memory contract");
                    ContractMode::Memory(MemoryContract::default())
                }
            },
            _ if config.strict_runtime_required() => ContractMode::Disabled(
                "contract RPC URL and address required in production runtime profile".to_owned(),
            ),
            _ => ContractMode::Memory(MemoryContract::default()),
        };
        Self { mode }
    }

    pub fn in_memory() -> Self {
        Self {
            mode: ContractMode::Memory(MemoryContract::default()),
        }
    }

    /// The backing in-memory registry, for test hooks.
    pub fn memory(&self) -> Option<&MemoryContract> {
        match &self.mode {
            ContractMode::Memory(m) => Some(m),
            _ => None,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            ContractMode::Disabled(_) => "disabled",
            ContractMode::Memory(_) => "memory",
            ContractMode::Rpc(_) => "rpc",
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $target:ident => $call:expr) => {
        match &$self.mode {
            ContractMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            ContractMode::Memory($target) => $call,
            ContractMode::Rpc($target) => $call,
        }
    };
}

impl ContractPort for ContractAdapter {
    fn contract_address(&self) -> Result<Address, PortError> {
        dispatch!(self, c => Ok(c.address()))
    }

    fn list_record_ids(&self) -> Result<Vec<RecordId>, PortError> {
        dispatch!(self, c => c.list_record_ids())
    }

    fn get_record(&self, id: &RecordId) -> Result<OnChainRecord, PortError> {
        dispatch!(self, c => c.get_record(id))
    }

    fn get_encrypted_handle(&self, id: &RecordId) -> Result<B256, PortError> {
        dispatch!(self, c => c.get_encrypted_handle(id))
    }

    fn is_available(&self) -> Result<bool, PortError> {
        dispatch!(self, c => c.is_available())
    }

    fn submit_create(&self, from: Address, call: &CreateRecordCall) -> Result<B256, PortError> {
        dispatch!(self, c => c.submit_create(from, call))
    }

    fn submit_verify(
        &self,
        from: Address,
        id: &RecordId,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> Result<B256, PortError> {
        dispatch!(self, c => c.submit_verify(from, id, abi_encoded_clear_values, decryption_proof))
    }

    fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        dispatch!(self, c => c.wait_for_receipt(tx_hash))
    }
}
