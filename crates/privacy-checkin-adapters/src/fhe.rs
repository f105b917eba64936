use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{Address, B256, U256};
use tracing::warn;

use privacy_checkin_core::{DecryptionResult, EncryptedInput, FhePort, PortError, SubmitDecryption};

use crate::deterministic::{ciphertext_handle, decryption_proof, encode_clear_values, input_proof};
use crate::relayer::RelayerClient;
use crate::CheckInConfig;

#[derive(Debug, Clone)]
pub struct FheAdapter {
    mode: FheMode,
}

#[derive(Debug, Clone)]
enum FheMode {
    Disabled(String),
    Deterministic(Arc<Mutex<DeterministicFhe>>),
    Relayer(Arc<RelayerClient>),
}

/// Stand-in client: handles are opaque hashes, plaintexts never leave the
/// process.
#[derive(Debug, Default)]
struct DeterministicFhe {
    initialized: bool,
    nonce: u64,
    plaintexts: HashMap<B256, u32>,
}

impl Default for FheAdapter {
    fn default() -> Self {
        Self::with_config(&CheckInConfig::from_env())
    }
}

impl FheAdapter {
    pub fn with_config(config: &CheckInConfig) -> Self {
        let mode = match &config.relayer_url {
            Some(url) => match RelayerClient::new(url, config.request_timeout_ms) {
                Ok(client) => FheMode::Relayer(Arc::new(client)),
                Err(e) if config.strict_runtime_required() => FheMode::Disabled(format!(
                    "failed to initialize FHE relayer client in production profile: {e}"
                )),
                Err(e) => {
                    warn!(error = %e, "falling back to deterministic FHE client");
                    FheMode::Deterministic(Arc::default())
                }
            },
            None if config.strict_runtime_required() => FheMode::Disabled(
                "FHE relayer URL not configured in production runtime profile".to_owned(),
            ),
            None => FheMode::Deterministic(Arc::default()),
        };
        Self { mode }
    }

    pub fn deterministic() -> Self {
        Self {
            mode: FheMode::Deterministic(Arc::default()),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            FheMode::Disabled(_) => "disabled",
            FheMode::Deterministic(_) => "deterministic",
            FheMode::Relayer(_) => "relayer",
        }
    }

    fn local(
        inner: &Mutex<DeterministicFhe>,
    ) -> Result<MutexGuard<'_, DeterministicFhe>, PortError> {
        inner
            .lock()
            .map_err(|e| PortError::Transport(format!("fhe lock poisoned: {e}")))
    }
}

impl FhePort for FheAdapter {
    fn initialize(&self) -> Result<(), PortError> {
        match &self.mode {
            FheMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            FheMode::Deterministic(inner) => {
                Self::local(inner)?.initialized = true;
                Ok(())
            }
            FheMode::Relayer(client) => client.initialize(),
        }
    }

    fn is_initialized(&self) -> bool {
        match &self.mode {
            FheMode::Disabled(_) => false,
            FheMode::Deterministic(inner) => Self::local(inner).is_ok_and(|g| g.initialized),
            FheMode::Relayer(client) => client.is_initialized(),
        }
    }

    fn encrypt(
        &self,
        contract: Address,
        user: Address,
        value: u32,
    ) -> Result<EncryptedInput, PortError> {
        match &self.mode {
            FheMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            FheMode::Deterministic(inner) => {
                let mut g = Self::local(inner)?;
                if !g.initialized {
                    return Err(PortError::Policy("FHE client not initialized".to_owned()));
                }
                g.nonce += 1;
                let handle = ciphertext_handle(contract, user, value, g.nonce);
                g.plaintexts.insert(handle, value);
                Ok(EncryptedInput {
                    handle,
                    proof: input_proof(handle, contract, user),
                })
            }
            FheMode::Relayer(client) => client.encrypt(contract, user, value),
        }
    }

    fn verify_decryption(
        &self,
        handles: &[B256],
        contract: Address,
        submit: &mut SubmitDecryption<'_>,
    ) -> Result<DecryptionResult, PortError> {
        match &self.mode {
            FheMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            FheMode::Deterministic(inner) => {
                let clear_values = {
                    let g = Self::local(inner)?;
                    if !g.initialized {
                        return Err(PortError::Policy("FHE client not initialized".to_owned()));
                    }
                    handles
                        .iter()
                        .map(|h| {
                            g.plaintexts
                                .get(h)
                                .map(|v| (*h, U256::from(*v)))
                                .ok_or_else(|| {
                                    PortError::NotFound(format!("unknown ciphertext handle {h}"))
                                })
                        })
                        .collect::<Result<Vec<_>, _>>()?
                };
                let words: Vec<U256> = clear_values.iter().map(|(_, v)| *v).collect();
                let encoded = encode_clear_values(&words);
                let proof = decryption_proof(handles, &encoded);
                // Lock released: the callback may block on the chain.
                submit(encoded.clone(), proof.clone())?;
                Ok(DecryptionResult {
                    clear_values,
                    abi_encoded_clear_values: encoded,
                    decryption_proof: proof,
                })
            }
            FheMode::Relayer(client) => client.verify_decryption(handles, contract, submit),
        }
    }
}
