use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use serde_json::{json, Value};
use tracing::{debug, info};

use privacy_checkin_core::{CreateRecordCall, OnChainRecord, PortError, RecordId, TxReceipt};

use crate::bindings::ICheckInRegistry;
use crate::CheckInConfig;

/// EIP-1193 code for a request the user refused.
const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug)]
pub struct JsonRpcClient {
    url: String,
    client: reqwest::blocking::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build rpc client: {e}")))?;
        Ok(Self {
            url: url.to_owned(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "json-rpc request");
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("{method} request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("{method} json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(rpc_error(method, err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!("{method} status {status}: {body}")));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport(format!("{method} response missing result")))
    }

    pub fn accounts(&self) -> Result<Vec<Address>, PortError> {
        let result = self.call("eth_requestAccounts", json!([]))?;
        let items = result.as_array().ok_or_else(|| {
            PortError::Transport("eth_requestAccounts result must be array".to_owned())
        })?;
        items
            .iter()
            .map(|item| {
                let raw = item.as_str().ok_or_else(|| {
                    PortError::Transport("eth_requestAccounts item must be string".to_owned())
                })?;
                raw.parse::<Address>()
                    .map_err(|e| PortError::Validation(format!("invalid account: {e}")))
            })
            .collect()
    }

    pub fn chain_id(&self) -> Result<u64, PortError> {
        let result = self.call("eth_chainId", json!([]))?;
        parse_quantity(&result, "eth_chainId")
    }
}

fn rpc_error(method: &str, err: &Value) -> PortError {
    let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_owned();
    if code == USER_REJECTED_CODE || message.to_lowercase().contains("user rejected") {
        PortError::Rejected(message)
    } else {
        PortError::Contract(format!("{method} failed ({code}): {message}"))
    }
}

fn parse_quantity(value: &Value, what: &str) -> Result<u64, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport(format!("{what} must be a hex string")))?;
    u64::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map_err(|e| PortError::Validation(format!("{what} is not a quantity: {e}")))
}

fn parse_hex<T: FromStr>(value: &Value, what: &str) -> Result<T, PortError>
where
    T::Err: std::fmt::Display,
{
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport(format!("{what} must be a hex string")))?;
    raw.parse::<T>()
        .map_err(|e| PortError::Validation(format!("{what} is not valid hex: {e}")))
}

/// Contract access through a JSON-RPC node that signs with the sender account.
#[derive(Debug)]
pub struct RpcContract {
    rpc: JsonRpcClient,
    address: Address,
    poll_interval: Duration,
    max_polls: u32,
}

impl RpcContract {
    pub fn new(rpc: JsonRpcClient, address: Address, config: &CheckInConfig) -> Self {
        Self {
            rpc,
            address,
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            max_polls: config.receipt_max_polls.max(1),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn eth_call<C: SolCall>(&self, call: &C) -> Result<C::Return, PortError> {
        let params = json!([
            { "to": self.address, "data": Bytes::from(call.abi_encode()) },
            "latest"
        ]);
        let result = self.rpc.call("eth_call", params)?;
        let data: Bytes = parse_hex(&result, "eth_call result")?;
        C::abi_decode_returns(&data, true)
            .map_err(|e| PortError::Transport(format!("{} decode failed: {e}", C::SIGNATURE)))
    }

    fn send<C: SolCall>(&self, from: Address, call: &C) -> Result<B256, PortError> {
        let params = json!([{
            "from": from,
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        }]);
        let result = self.rpc.call("eth_sendTransaction", params)?;
        let tx_hash: B256 = parse_hex(&result, "transaction hash")?;
        info!(%tx_hash, method = C::SIGNATURE, "transaction sent");
        Ok(tx_hash)
    }

    pub fn list_record_ids(&self) -> Result<Vec<RecordId>, PortError> {
        let ret = self.eth_call(&ICheckInRegistry::getAllBusinessIdsCall {})?;
        Ok(ret.ids.into_iter().map(RecordId).collect())
    }

    pub fn get_record(&self, id: &RecordId) -> Result<OnChainRecord, PortError> {
        let ret = self.eth_call(&ICheckInRegistry::getBusinessDataCall {
            businessId: id.0.clone(),
        })?;
        Ok(OnChainRecord {
            name: ret.name,
            public_value1: ret.publicValue1,
            public_value2: ret.publicValue2,
            description: ret.description,
            creator: ret.creator,
            timestamp: ret.timestamp,
            is_verified: ret.isVerified,
            decrypted_value: ret.decryptedValue,
        })
    }

    pub fn get_encrypted_handle(&self, id: &RecordId) -> Result<B256, PortError> {
        let ret = self.eth_call(&ICheckInRegistry::getEncryptedValueCall {
            businessId: id.0.clone(),
        })?;
        Ok(ret.handle)
    }

    pub fn is_available(&self) -> Result<bool, PortError> {
        Ok(self
            .eth_call(&ICheckInRegistry::isAvailableCall {})?
            .available)
    }

    pub fn submit_create(&self, from: Address, call: &CreateRecordCall) -> Result<B256, PortError> {
        self.send(
            from,
            &ICheckInRegistry::createBusinessDataCall {
                businessId: call.id.0.clone(),
                name: call.name.clone(),
                encryptedValue: call.encrypted_value,
                inputProof: call.input_proof.clone(),
                publicValue1: U256::from(call.public_value1),
                publicValue2: U256::from(call.public_value2),
                description: call.description.clone(),
            },
        )
    }

    pub fn submit_verify(
        &self,
        from: Address,
        id: &RecordId,
        abi_encoded_clear_values: Bytes,
        decryption_proof: Bytes,
    ) -> Result<B256, PortError> {
        self.send(
            from,
            &ICheckInRegistry::verifyDecryptionCall {
                businessId: id.0.clone(),
                abiEncodedClearValue: abi_encoded_clear_values,
                decryptionProof: decryption_proof,
            },
        )
    }

    pub fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, PortError> {
        for attempt in 0..self.max_polls {
            let result = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx_hash]))?;
            if !result.is_null() {
                let success = result
                    .get("status")
                    .filter(|s| !s.is_null())
                    .map(|s| parse_quantity(s, "receipt status"))
                    .transpose()?
                    .map(|s| s == 1)
                    .unwrap_or(false);
                let block_number = result
                    .get("blockNumber")
                    .filter(|b| !b.is_null())
                    .map(|b| parse_quantity(b, "receipt block number"))
                    .transpose()?;
                return Ok(TxReceipt {
                    tx_hash,
                    block_number,
                    success,
                });
            }
            debug!(%tx_hash, attempt, "receipt not yet available");
            std::thread::sleep(self.poll_interval);
        }
        Err(PortError::Transport(format!(
            "no receipt for {tx_hash} after {} polls",
            self.max_polls
        )))
    }
}
