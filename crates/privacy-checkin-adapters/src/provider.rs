use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{address, Address};
use tracing::warn;

use privacy_checkin_core::{PortError, ProviderPort};

use crate::rpc::JsonRpcClient;
use crate::CheckInConfig;

pub const DETERMINISTIC_ACCOUNT: Address = address!("1000000000000000000000000000000000000001");

/// Wallet access: a JSON-RPC node when configured, otherwise a fixed local
/// account.
#[derive(Debug, Clone)]
pub struct WalletAdapter {
    mode: WalletMode,
    state: Arc<Mutex<WalletState>>,
}

#[derive(Debug, Clone)]
enum WalletMode {
    Disabled(String),
    Deterministic,
    Rpc(Arc<JsonRpcClient>),
}

#[derive(Debug, Clone)]
struct WalletState {
    accounts: Vec<Address>,
    chain_id: u64,
    fallback_account: Option<Address>,
}

impl Default for WalletAdapter {
    fn default() -> Self {
        Self::with_config(&CheckInConfig::from_env())
    }
}

impl WalletAdapter {
    pub fn with_config(config: &CheckInConfig) -> Self {
        let mode = match &config.rpc_url {
            Some(url) => match JsonRpcClient::new(url, config.request_timeout_ms) {
                Ok(client) => WalletMode::Rpc(Arc::new(client)),
                Err(e) if config.strict_runtime_required() => WalletMode::Disabled(format!(
                    "failed to initialize wallet rpc client in production profile: {e}"
                )),
                Err(e) => {
                    warn!(error = %e, "falling back to deterministic wallet");
                    WalletMode::Deterministic
                }
            },
            None if config.strict_runtime_required() => WalletMode::Disabled(
                "wallet RPC URL not configured in production runtime profile".to_owned(),
            ),
            None => WalletMode::Deterministic,
        };
        Self {
            mode,
            state: Arc::new(Mutex::new(WalletState {
                accounts: vec![config.account.unwrap_or(DETERMINISTIC_ACCOUNT)],
                chain_id: config.chain_id,
                fallback_account: config.account,
            })),
        }
    }

    pub fn deterministic(chain_id: u64) -> Self {
        Self {
            mode: WalletMode::Deterministic,
            state: Arc::new(Mutex::new(WalletState {
                accounts: vec![DETERMINISTIC_ACCOUNT],
                chain_id,
                fallback_account: None,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("wallet lock poisoned: {e}")))
    }

    /// Replaces the accounts the deterministic wallet hands out.
    pub fn debug_set_accounts(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        self.lock()?.accounts = accounts;
        Ok(())
    }
}

impl ProviderPort for WalletAdapter {
    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        match &self.mode {
            WalletMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            WalletMode::Deterministic => Ok(self.lock()?.accounts.clone()),
            WalletMode::Rpc(rpc) => {
                let fallback = self.lock()?.fallback_account;
                match (rpc.accounts(), fallback) {
                    (Ok(accounts), Some(account)) if accounts.is_empty() => Ok(vec![account]),
                    (Err(PortError::Contract(e)), Some(account)) => {
                        warn!(
                            error = %e,
                            %account,
                            "eth_requestAccounts unsupported, using configured account"
                        );
                        Ok(vec![account])
                    }
                    (result, _) => result,
                }
            }
        }
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        match &self.mode {
            WalletMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
            WalletMode::Deterministic => Ok(self.lock()?.chain_id),
            WalletMode::Rpc(rpc) => rpc.chain_id(),
        }
    }
}
