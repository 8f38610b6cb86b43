//! Off-chain multisig proposal protocol
//!
//! A proposal is built in four steps, each owned by one component:
//! - `DigestBuilder` asks the contract for the transaction digest at its
//!   current nonce
//! - `ProposalSigner` signs the digest and checks through the contract that
//!   the recovered signer is an owner
//! - `ProposalSubmitter` pushes the signed proposal to the pool server
//! - `ProposalPipeline` runs the steps in order and turns the result into a
//!   single notice
//!
//! # Example
//!
//! ```ignore
//! use restake_multisig::multisig::{LocalSigner, ProposalPipeline, ProposalSigner};
//!
//! let signer = ProposalSigner::new(Arc::new(LocalSigner::from_private_key_hex(key)?));
//! let pipeline = ProposalPipeline::new(multisig, signer, submitter, operator_delegator, 31337);
//!
//! let notice = pipeline.run(&AdminAction::Undelegate).await;
//! println!("{}", notice);
//! ```

pub mod digest;
pub mod error;
pub mod pipeline;
pub mod signer;
pub mod submitter;

pub use digest::{DigestBuilder, PreparedDigest};
pub use error::{ProposalError, LOADING, PROPOSE_FAILED};
pub use pipeline::{ProposalOutcome, ProposalPipeline, NOT_OWNER};
pub use signer::{
    LocalSigner, MessageSigner, ProposalSigner, SignedDigest, SignerError, Verification,
};
pub use submitter::{HttpProposalStore, ProposalStore, ProposalSubmitter, StoreError};
