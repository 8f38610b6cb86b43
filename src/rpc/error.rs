//! Errors raised by the chain RPC surface

use alloy_transport::TransportError;
use thiserror::Error;

/// Failure of any blockchain read/write call
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid node URL {0}")]
    InvalidUrl(String),

    #[error("ABI decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Execution reverted: {0}")]
    Execution(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}
