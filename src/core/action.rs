//! Administrative actions the multisig can be asked to perform
//!
//! Each action encodes to the raw `(to, value, data)` call a proposal
//! carries. Actions on the OperatorDelegator are delegated calls; the rest
//! target the multisig itself or move funds out of it.

use crate::contract::abi::{IOperatorDelegator, ISafeMultiSigWallet};
use crate::core::proposal::ProposalCall;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

/// Contracts actions are routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTargets {
    pub multisig: Address,
    pub operator_delegator: Address,
}

/// A proposable action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    /// Send native funds held by the multisig
    TransferFunds { recipient: Address, amount: U256 },
    AddSigner {
        signer: Address,
        signatures_required: U256,
    },
    RemoveSigner {
        signer: Address,
        signatures_required: U256,
    },
    UpdateSignaturesRequired { signatures_required: U256 },
    /// Delegate the vault's restaked funds to an operator
    Delegate { operator: Address },
    Undelegate,
    QueueWithdrawal,
    CompleteWithdrawal(IOperatorDelegator::Withdrawal),
}

impl AdminAction {
    /// Contract method name, as shown to users
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::TransferFunds { .. } => "transferFunds",
            AdminAction::AddSigner { .. } => "addSigner",
            AdminAction::RemoveSigner { .. } => "removeSigner",
            AdminAction::UpdateSignaturesRequired { .. } => "updateSignaturesRequired",
            AdminAction::Delegate { .. } => "delegate",
            AdminAction::Undelegate => "undelegate",
            AdminAction::QueueWithdrawal => "queueWithdrawal",
            AdminAction::CompleteWithdrawal(_) => "completeWithdrawal",
        }
    }

    /// Identity of the triggering control, used to refuse re-entry
    ///
    /// Completing two different withdrawals are different controls; every
    /// other action has a single trigger.
    pub fn key(&self) -> String {
        match self {
            AdminAction::CompleteWithdrawal(w) => format!("{}:{}", self.name(), w.nonce),
            _ => self.name().to_string(),
        }
    }

    /// Encode the raw call this action proposes
    pub fn to_call(&self, targets: &ActionTargets) -> ProposalCall {
        match self {
            AdminAction::TransferFunds { recipient, amount } => {
                ProposalCall::transfer(*recipient, *amount)
            }
            AdminAction::AddSigner {
                signer,
                signatures_required,
            } => ProposalCall::new(
                targets.multisig,
                ISafeMultiSigWallet::addSignerCall {
                    newSigner: *signer,
                    newSignaturesRequired: *signatures_required,
                }
                .abi_encode(),
            ),
            AdminAction::RemoveSigner {
                signer,
                signatures_required,
            } => ProposalCall::new(
                targets.multisig,
                ISafeMultiSigWallet::removeSignerCall {
                    oldSigner: *signer,
                    newSignaturesRequired: *signatures_required,
                }
                .abi_encode(),
            ),
            AdminAction::UpdateSignaturesRequired {
                signatures_required,
            } => ProposalCall::new(
                targets.multisig,
                ISafeMultiSigWallet::updateSignaturesRequiredCall {
                    newSignaturesRequired: *signatures_required,
                }
                .abi_encode(),
            ),
            AdminAction::Delegate { operator } => ProposalCall::new(
                targets.operator_delegator,
                IOperatorDelegator::delegateCall {
                    operator: *operator,
                }
                .abi_encode(),
            ),
            AdminAction::Undelegate => ProposalCall::new(
                targets.operator_delegator,
                IOperatorDelegator::undelegateCall {}.abi_encode(),
            ),
            AdminAction::QueueWithdrawal => ProposalCall::new(
                targets.operator_delegator,
                IOperatorDelegator::queueWithdrawalCall {}.abi_encode(),
            ),
            AdminAction::CompleteWithdrawal(withdrawal) => ProposalCall::new(
                targets.operator_delegator,
                IOperatorDelegator::completeWithdrawalCall {
                    withdrawal: withdrawal.clone(),
                }
                .abi_encode(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes};

    const TARGETS: ActionTargets = ActionTargets {
        multisig: address!("56d13eb21a625eda8438f55df2c31dc3632034f5"),
        operator_delegator: address!("e70f935c32da4db13e7876795f1e175465e6458e"),
    };

    #[test]
    fn test_transfer_is_plain_value_call() {
        let recipient = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let call = AdminAction::TransferFunds {
            recipient,
            amount: U256::from(1_000u64),
        }
        .to_call(&TARGETS);

        assert_eq!(call.to, recipient);
        assert_eq!(call.value, U256::from(1_000u64));
        assert_eq!(call.data, Bytes::new());
    }

    #[test]
    fn test_delegated_calls_target_operator_delegator() {
        let call = AdminAction::Undelegate.to_call(&TARGETS);
        assert_eq!(call.to, TARGETS.operator_delegator);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.data.as_ref(), &[0x92, 0xab, 0x89, 0xbb]);

        let operator = address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc");
        let call = AdminAction::Delegate { operator }.to_call(&TARGETS);
        assert_eq!(call.data.len(), 4 + 32);
        assert_eq!(&call.data[..4], &[0x5c, 0x19, 0xa9, 0x5c]);
        assert_eq!(&call.data[16..36], operator.as_slice());
    }

    #[test]
    fn test_signer_management_targets_multisig() {
        let call = AdminAction::AddSigner {
            signer: address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc"),
            signatures_required: U256::from(2),
        }
        .to_call(&TARGETS);

        assert_eq!(call.to, TARGETS.multisig);
        assert_eq!(&call.data[..4], &[0x65, 0xaf, 0x1b, 0xed]);
        assert_eq!(call.data.len(), 4 + 64);
        assert_eq!(call.data[67], 2);
    }

    #[test]
    fn test_complete_withdrawal_round_trips_through_abi() {
        let withdrawal = IOperatorDelegator::Withdrawal {
            staker: TARGETS.operator_delegator,
            delegatedTo: address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc"),
            withdrawer: TARGETS.operator_delegator,
            nonce: U256::from(5),
            startBlock: 1000,
            strategies: vec![address!("7d704507b76571a51d9cae8addabbfd0ba0e63d3")],
            shares: vec![U256::from(42)],
        };
        let action = AdminAction::CompleteWithdrawal(withdrawal.clone());
        let call = action.to_call(&TARGETS);

        let decoded =
            IOperatorDelegator::completeWithdrawalCall::abi_decode(&call.data, true).unwrap();
        assert_eq!(decoded.withdrawal, withdrawal);
        assert_eq!(action.key(), "completeWithdrawal:5");
    }

    #[test]
    fn test_keys_distinguish_controls() {
        assert_eq!(AdminAction::Undelegate.key(), "undelegate");
        assert_ne!(AdminAction::Undelegate.key(), AdminAction::QueueWithdrawal.key());
    }
}
