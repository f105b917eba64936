pub mod bindings;
pub mod clock;
pub mod config;
pub mod contract;
pub mod deterministic;
pub mod fhe;
pub mod memory;
pub mod provider;
pub mod relayer;
pub mod rpc;

pub use clock::SystemClockAdapter;
pub use config::{CheckInConfig, RuntimeProfile};
pub use contract::ContractAdapter;
pub use fhe::FheAdapter;
pub use memory::{MemoryContract, MEMORY_CONTRACT_ADDRESS};
pub use provider::{WalletAdapter, DETERMINISTIC_ACCOUNT};
pub use relayer::RelayerClient;
pub use rpc::{JsonRpcClient, RpcContract};

use privacy_checkin_core::CheckInService;
use tracing::info;

pub type CheckInRuntime =
    CheckInService<WalletAdapter, ContractAdapter, FheAdapter, SystemClockAdapter>;

/// Wires every port from one config. Without RPC settings the development
/// profile runs against the in-memory registry and the deterministic FHE
/// client.
pub fn build_service(config: &CheckInConfig) -> CheckInRuntime {
    let wallet = WalletAdapter::with_config(config);
    let contract = ContractAdapter::with_config(config);
    let fhe = FheAdapter::with_config(config);
    info!(
        profile = ?config.runtime_profile,
        contract = contract.mode_name(),
        fhe = fhe.mode_name(),
        "check-in runtime assembled"
    );
    CheckInService::new(wallet, contract, fhe, SystemClockAdapter)
}
