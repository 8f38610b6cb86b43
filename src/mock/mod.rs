//! In-memory implementations of the capability traits
//!
//! Used by the unit and integration tests to run the proposal pipeline, the
//! withdrawal gate and the vault actions without a node or a pool server.
//! Only compiled for tests or with the `test-util` feature.

pub mod chain;
pub mod multisig;
pub mod store;
pub mod vault;

pub use chain::SimulatedChain;
pub use multisig::{SimulatedMultisig, HARDHAT_MULTISIG, HARDHAT_OWNER};
pub use store::{RecordingStore, RejectingSigner, StallingSigner};
pub use vault::SimulatedVault;

use std::sync::{Mutex, MutexGuard};

/// Lock, ignoring poisoning from a panicked test thread
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
