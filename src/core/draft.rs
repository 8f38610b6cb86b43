//! The saved multisig action form
//!
//! A draft keeps the fields of a self-administration proposal between
//! invocations. Fields hold the text as typed; they are only validated when
//! the draft is turned into an action.

use crate::core::action::AdminAction;
use alloy_primitives::{Address, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors validating a draft
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("{field} is not a valid address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{field} is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

/// Methods the draft form can propose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftMethod {
    #[default]
    TransferFunds,
    AddSigner,
    RemoveSigner,
    UpdateSignaturesRequired,
}

impl DraftMethod {
    pub const ALL: [DraftMethod; 4] = [
        DraftMethod::TransferFunds,
        DraftMethod::AddSigner,
        DraftMethod::RemoveSigner,
        DraftMethod::UpdateSignaturesRequired,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DraftMethod::TransferFunds => "transferFunds",
            DraftMethod::AddSigner => "addSigner",
            DraftMethod::RemoveSigner => "removeSigner",
            DraftMethod::UpdateSignaturesRequired => "updateSignaturesRequired",
        }
    }
}

impl fmt::Display for DraftMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftMethod {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftMethod::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| DraftError::UnknownMethod(s.to_string()))
    }
}

/// Draft of a self-administration proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub method_name: DraftMethod,
    /// Recipient for transfers, signer otherwise
    pub signer: String,
    pub new_signatures_number: String,
    /// Wei, as a decimal string
    pub amount: String,
    /// Encoded call of the last validated draft, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            method_name: DraftMethod::TransferFunds,
            signer: String::new(),
            new_signatures_number: String::new(),
            amount: "0".to_string(),
            call_data: None,
            saved_at: None,
        }
    }
}

impl Draft {
    /// True when nothing has been entered
    pub fn is_empty(&self) -> bool {
        let blank = Draft::default();
        self.method_name == blank.method_name
            && self.signer == blank.signer
            && self.new_signatures_number == blank.new_signatures_number
            && self.amount == blank.amount
    }

    /// Validate the fields and build the action they describe
    pub fn to_action(&self) -> Result<AdminAction, DraftError> {
        match self.method_name {
            DraftMethod::TransferFunds => Ok(AdminAction::TransferFunds {
                recipient: parse_address("recipient", &self.signer)?,
                amount: parse_number("amount", &self.amount)?,
            }),
            DraftMethod::AddSigner => Ok(AdminAction::AddSigner {
                signer: parse_address("signer", &self.signer)?,
                signatures_required: parse_number(
                    "newSignaturesNumber",
                    &self.new_signatures_number,
                )?,
            }),
            DraftMethod::RemoveSigner => Ok(AdminAction::RemoveSigner {
                signer: parse_address("signer", &self.signer)?,
                signatures_required: parse_number(
                    "newSignaturesNumber",
                    &self.new_signatures_number,
                )?,
            }),
            DraftMethod::UpdateSignaturesRequired => Ok(AdminAction::UpdateSignaturesRequired {
                signatures_required: parse_number(
                    "newSignaturesNumber",
                    &self.new_signatures_number,
                )?,
            }),
        }
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, DraftError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| DraftError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

fn parse_number(field: &'static str, value: &str) -> Result<U256, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DraftError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| DraftError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
