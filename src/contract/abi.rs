//! Solidity interfaces of the contracts this client talks to
//!
//! Only the functions and events the client actually calls are declared.
//! Everything ABI-shaped stays inside the RPC adapter and the call encoders;
//! business logic works with the typed capability traits in the parent module.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ISafeMultiSigWallet {
        function nonce() external view returns (uint256);
        function signaturesRequired() external view returns (uint256);
        function chainId() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);
        function getTransactionHash(uint256 _nonce, address to, uint256 value, bytes data) external view returns (bytes32);
        function recover(bytes32 _hash, bytes _signature) external view returns (address);

        function addSigner(address newSigner, uint256 newSignaturesRequired) external;
        function removeSigner(address oldSigner, uint256 newSignaturesRequired) external;
        function updateSignaturesRequired(uint256 newSignaturesRequired) external;
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IOperatorDelegator {
        struct Withdrawal {
            address staker;
            address delegatedTo;
            address withdrawer;
            uint256 nonce;
            uint32 startBlock;
            address[] strategies;
            uint256[] shares;
        }

        function getOperator() external view returns (address);
        function delegate(address operator) external;
        function undelegate() external returns (bytes32[]);
        function queueWithdrawal() external returns (bytes32);
        function completeWithdrawal(Withdrawal withdrawal) external;

        event WithdrawQueued(
            bytes32 withdrawRoot,
            address staker,
            address delegatedTo,
            address withdrawer,
            uint256 nonce,
            uint256 startBlock,
            address[] strategies,
            uint256[] shares
        );

        event WithdrawalComplete(bytes32 withdrawalRoot, Withdrawal withdraw);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IDelegationManager {
        function minWithdrawalDelayBlocks() external view returns (uint256);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IRestakeManager {
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function getMintAmount(uint256 amount) external view returns (uint256);
        function getWithdrawAmount(uint256 amount) external view returns (uint256);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
