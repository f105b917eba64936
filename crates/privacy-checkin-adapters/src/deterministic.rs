//! Proof relations shared by the in-memory contract and the deterministic
//! FHE client. Neither side encrypts anything; the relations only let the
//! contract reject proofs minted for another handle, contract or signer.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

pub fn ciphertext_handle(contract: Address, user: Address, value: u32, nonce: u64) -> B256 {
    let mut seed = Vec::with_capacity(80);
    seed.extend_from_slice(b"checkin-handle");
    seed.extend_from_slice(contract.as_slice());
    seed.extend_from_slice(user.as_slice());
    seed.extend_from_slice(&value.to_be_bytes());
    seed.extend_from_slice(&nonce.to_be_bytes());
    keccak256(seed)
}

pub fn input_proof(handle: B256, contract: Address, user: Address) -> Bytes {
    let mut seed = Vec::with_capacity(72);
    seed.extend_from_slice(handle.as_slice());
    seed.extend_from_slice(contract.as_slice());
    seed.extend_from_slice(user.as_slice());
    Bytes::from(keccak256(seed).to_vec())
}

/// ABI encoding of a list of `uint256` words.
pub fn encode_clear_values(values: &[U256]) -> Bytes {
    let mut out = Vec::with_capacity(values.len() * 32);
    for v in values {
        out.extend_from_slice(&v.to_be_bytes::<32>());
    }
    Bytes::from(out)
}

pub fn decryption_proof(handles: &[B256], abi_encoded_clear_values: &[u8]) -> Bytes {
    let mut seed = Vec::with_capacity(handles.len() * 32 + abi_encoded_clear_values.len());
    for h in handles {
        seed.extend_from_slice(h.as_slice());
    }
    seed.extend_from_slice(abi_encoded_clear_values);
    Bytes::from(keccak256(seed).to_vec())
}
