use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use privacy_checkin_core::{DecryptionResult, EncryptedInput, PortError, SubmitDecryption};

/// HTTP client for an FHE relayer that mints input proofs and performs
/// public decryption on our behalf.
#[derive(Debug)]
pub struct RelayerClient {
    base_url: String,
    client: reqwest::blocking::Client,
    initialized: AtomicBool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest {
    contract_address: Address,
    user_address: Address,
    value: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProofResponse {
    handle: B256,
    input_proof: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptRequest<'a> {
    contract_address: Address,
    handles: &'a [B256],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptResponse {
    clear_values: BTreeMap<String, String>,
    abi_encoded_clear_values: Bytes,
    decryption_proof: Bytes,
}

impl RelayerClient {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| PortError::Transport(format!("failed to build relayer client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
            initialized: AtomicBool::new(false),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read<T: DeserializeOwned>(
        path: &str,
        response: reqwest::blocking::Response,
    ) -> Result<T, PortError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortError::Transport(format!(
                "relayer {path} status {status}: {body}"
            )));
        }
        response
            .json()
            .map_err(|e| PortError::Transport(format!("relayer {path} json decode failed: {e}")))
    }

    pub fn initialize(&self) -> Result<(), PortError> {
        let path = "/v1/keyurl";
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|e| PortError::Transport(format!("relayer {path} request failed: {e}")))?;
        let _: serde_json::Value = Self::read(path, response)?;
        self.initialized.store(true, Ordering::SeqCst);
        info!(relayer = %self.base_url, "FHE relayer ready");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn ensure_initialized(&self) -> Result<(), PortError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PortError::Policy("FHE client not initialized".to_owned()))
        }
    }

    pub fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> Result<EncryptedInput, PortError> {
        self.ensure_initialized()?;
        let path = "/v1/input-proof";
        let response = self
            .client
            .post(self.url(path))
            .json(&InputProofRequest {
                contract_address: contract,
                user_address: user,
                value,
            })
            .send()
            .map_err(|e| PortError::Transport(format!("relayer {path} request failed: {e}")))?;
        let body: InputProofResponse = Self::read(path, response)?;
        debug!(handle = %body.handle, "input proof received");
        Ok(EncryptedInput {
            handle: body.handle,
            proof: body.input_proof,
        })
    }

    pub fn verify_decryption(
        &self,
        handles: &[B256],
        contract: Address,
        submit: &mut SubmitDecryption<'_>,
    ) -> Result<DecryptionResult, PortError> {
        self.ensure_initialized()?;
        let path = "/v1/public-decrypt";
        let response = self
            .client
            .post(self.url(path))
            .json(&PublicDecryptRequest {
                contract_address: contract,
                handles,
            })
            .send()
            .map_err(|e| PortError::Transport(format!("relayer {path} request failed: {e}")))?;
        let body: PublicDecryptResponse = Self::read(path, response)?;

        let mut clear_values = Vec::with_capacity(handles.len());
        for handle in handles {
            let raw = body
                .clear_values
                .iter()
                .find(|(k, _)| k.parse::<B256>().is_ok_and(|k| k == *handle))
                .map(|(_, v)| v)
                .ok_or_else(|| {
                    PortError::Validation(format!("relayer returned no clear value for {handle}"))
                })?;
            let value: U256 = raw
                .parse()
                .map_err(|e| PortError::Validation(format!("bad clear value {raw}: {e}")))?;
            clear_values.push((*handle, value));
        }

        submit(
            body.abi_encoded_clear_values.clone(),
            body.decryption_proof.clone(),
        )?;
        Ok(DecryptionResult {
            clear_values,
            abi_encoded_clear_values: body.abi_encoded_clear_values,
            decryption_proof: body.decryption_proof,
        })
    }
}
