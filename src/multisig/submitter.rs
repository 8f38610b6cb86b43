//! Submission of signed proposals to the pool server
//!
//! One POST per proposal. Failures are reported to the caller and logged;
//! nothing is retried or queued, and the saved draft stays in place so the
//! user can try again.

use crate::core::Proposal;
use crate::storage::DraftStore;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while submitting to the proposal store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Pool server rejected the proposal with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The off-chain store other owners co-sign from
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Where proposals end up, for display
    fn location(&self) -> String;

    async fn submit(&self, proposal: &Proposal) -> Result<(), StoreError>;
}

/// Pool server reached over HTTP
pub struct HttpProposalStore {
    url: String,
    http_client: reqwest::Client,
}

impl HttpProposalStore {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProposalStore for HttpProposalStore {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn submit(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let body = proposal.to_json()?;

        let res = self
            .http_client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Pushes proposals to the store and clears the draft they came from
pub struct ProposalSubmitter {
    store: Arc<dyn ProposalStore>,
    drafts: Option<DraftStore>,
}

impl ProposalSubmitter {
    pub fn new(store: Arc<dyn ProposalStore>) -> Self {
        Self {
            store,
            drafts: None,
        }
    }

    /// Draft store cleared by [`ProposalSubmitter::submit_draft`]
    pub fn with_drafts(mut self, drafts: DraftStore) -> Self {
        self.drafts = Some(drafts);
        self
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    pub async fn submit(&self, proposal: &Proposal) -> Result<(), StoreError> {
        if let Err(e) = self.store.submit(proposal).await {
            log::error!(
                "Submitting proposal for nonce {} to {} failed: {}",
                proposal.nonce(),
                self.store.location(),
                e
            );
            return Err(e);
        }

        log::info!(
            "Proposal {} (nonce {}) submitted to {}",
            proposal.digest(),
            proposal.nonce(),
            self.store.location()
        );
        Ok(())
    }

    /// Submit a proposal built from the saved draft, then clear the draft
    ///
    /// The draft is only cleared once the store accepted the proposal.
    pub async fn submit_draft(&self, proposal: &Proposal) -> Result<(), StoreError> {
        self.submit(proposal).await?;

        if let Some(drafts) = &self.drafts {
            if let Err(e) = drafts.clear() {
                log::warn!("Could not clear saved draft: {}", e);
            }
        }
        Ok(())
    }
}
