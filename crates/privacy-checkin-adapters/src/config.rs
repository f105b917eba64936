use alloy::primitives::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeProfile {
    Development,
    Production,
}

impl RuntimeProfile {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckInConfig {
    pub runtime_profile: RuntimeProfile,
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: Option<String>,
    pub contract_address: Option<Address>,
    /// Account used for `eth_sendTransaction` when the node does not answer
    /// `eth_requestAccounts`.
    pub account: Option<Address>,
    pub relayer_url: Option<String>,
    pub request_timeout_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_max_polls: u32,
    pub success_toast_ms: u64,
    pub error_toast_ms: u64,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            chain_id: 11155111,
            chain_name: "sepolia".to_owned(),
            rpc_url: None,
            contract_address: None,
            account: None,
            relayer_url: None,
            request_timeout_ms: 15_000,
            receipt_poll_interval_ms: 1_000,
            receipt_max_polls: 120,
            success_toast_ms: 2_000,
            error_toast_ms: 3_000,
        }
    }
}

impl CheckInConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unknown or malformed values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, fallback: u64| {
            non_empty(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(fallback)
        };

        Self {
            runtime_profile: non_empty("CHECKIN_RUNTIME_PROFILE")
                .and_then(|v| RuntimeProfile::parse(&v))
                .unwrap_or(defaults.runtime_profile),
            chain_id: number("CHECKIN_CHAIN_ID", defaults.chain_id),
            chain_name: non_empty("CHECKIN_CHAIN_NAME").unwrap_or(defaults.chain_name),
            rpc_url: non_empty("CHECKIN_RPC_URL"),
            contract_address: non_empty("CHECKIN_CONTRACT_ADDRESS")
                .and_then(|v| v.trim().parse().ok()),
            account: non_empty("CHECKIN_ACCOUNT").and_then(|v| v.trim().parse().ok()),
            relayer_url: non_empty("CHECKIN_RELAYER_URL"),
            request_timeout_ms: number("CHECKIN_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            receipt_poll_interval_ms: number(
                "CHECKIN_RECEIPT_POLL_INTERVAL_MS",
                defaults.receipt_poll_interval_ms,
            ),
            receipt_max_polls: u32::try_from(number(
                "CHECKIN_RECEIPT_MAX_POLLS",
                u64::from(defaults.receipt_max_polls),
            ))
            .unwrap_or(defaults.receipt_max_polls),
            success_toast_ms: number("CHECKIN_SUCCESS_TOAST_MS", defaults.success_toast_ms),
            error_toast_ms: number("CHECKIN_ERROR_TOAST_MS", defaults.error_toast_ms),
        }
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn rpc_configured(&self) -> bool {
        self.rpc_url.is_some() && self.contract_address.is_some()
    }
}
