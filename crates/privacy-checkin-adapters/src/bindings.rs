//! Solidity bindings for the check-in registry contract.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    interface ICheckInRegistry {
        function getAllBusinessIds() external view returns (string[] memory ids);

        function getBusinessData(string calldata businessId)
            external
            view
            returns (
                string memory name,
                uint256 publicValue1,
                uint256 publicValue2,
                string memory description,
                address creator,
                uint256 timestamp,
                bool isVerified,
                uint32 decryptedValue
            );

        function getEncryptedValue(string calldata businessId)
            external
            view
            returns (bytes32 handle);

        function isAvailable() external view returns (bool available);

        function createBusinessData(
            string calldata businessId,
            string calldata name,
            bytes32 encryptedValue,
            bytes calldata inputProof,
            uint256 publicValue1,
            uint256 publicValue2,
            string calldata description
        ) external;

        function verifyDecryption(
            string calldata businessId,
            bytes memory abiEncodedClearValue,
            bytes memory decryptionProof
        ) external;
    }
}
