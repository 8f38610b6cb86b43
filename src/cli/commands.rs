//! CLI commands for the restake multisig client
//!
//! Each command is one user action. Action failures end in a single printed
//! notice; only start-up problems are returned as errors.

use crate::contract::{ChainReader, MultisigContract, OperatorDelegator, TokenReader};
use crate::core::{ActionTargets, AdminAction, Draft, DraftMethod, ErrorKind, Notice, ProposalCall};
use crate::crypto::KeyPair;
use crate::multisig::{
    DigestBuilder, HttpProposalStore, LocalSigner, MessageSigner, ProposalError,
    ProposalOutcome, ProposalPipeline, ProposalSigner, ProposalSubmitter, LOADING,
};
use crate::rpc::{EthRpc, RpcDelegationManager, RpcMultisig, RpcOperatorDelegator, RpcRestakeManager};
use crate::storage::{AppConfig, DraftStore};
use crate::vault::{Vault, VaultError, VaultOperation};
use crate::withdrawal::{GateReport, Readiness, WithdrawalGate};
use alloy_primitives::utils::format_ether;
use alloy_primitives::{Address, Bytes, U256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub rpc: Arc<EthRpc>,
    pub signer: Option<Arc<LocalSigner>>,
    pub drafts: DraftStore,
}

impl AppState {
    /// Load configuration and connect to the node
    pub fn new(
        data_dir: PathBuf,
        rpc_url: Option<String>,
        private_key: Option<String>,
    ) -> CliResult<Self> {
        let mut config = AppConfig::load_or_create(&data_dir)?;
        if let Some(url) = rpc_url {
            config.rpc_url = url;
        }

        let signer = match private_key {
            Some(key) => Some(Arc::new(LocalSigner::from_private_key_hex(&key)?)),
            None => None,
        };

        let rpc = Arc::new(EthRpc::new(&config.rpc_url, config.receipt_poll())?);
        log::debug!("Using node at {}", rpc.url());

        Ok(Self {
            drafts: DraftStore::new(&data_dir),
            config,
            data_dir,
            rpc,
            signer,
        })
    }

    fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    fn multisig(&self) -> Arc<RpcMultisig> {
        Arc::new(RpcMultisig::new(
            self.rpc.clone(),
            self.config.contracts.multisig,
        ))
    }

    fn operator_delegator(&self) -> Arc<RpcOperatorDelegator> {
        Arc::new(RpcOperatorDelegator::new(
            self.rpc.clone(),
            self.config.contracts.operator_delegator,
        ))
    }

    fn gate(&self) -> WithdrawalGate {
        WithdrawalGate::new(
            self.operator_delegator(),
            Arc::new(RpcDelegationManager::new(
                self.rpc.clone(),
                self.config.contracts.delegation_manager,
            )),
            self.rpc.clone(),
            self.config.events_from_block,
        )
    }

    fn pipeline(&self) -> Result<ProposalPipeline, ProposalError> {
        let signer = self.signer.clone().ok_or(ProposalError::NoWallet)?;
        let mut proposal_signer = ProposalSigner::new(signer);
        if let Some(timeout) = self.config.sign_timeout() {
            proposal_signer = proposal_signer.with_timeout(timeout);
        }

        let store = HttpProposalStore::new(self.config.pool_server_url(self.config.chain_id));
        let submitter = ProposalSubmitter::new(Arc::new(store)).with_drafts(self.drafts.clone());

        Ok(ProposalPipeline::new(
            self.multisig(),
            proposal_signer,
            submitter,
            self.config.contracts.operator_delegator,
            self.config.chain_id,
        ))
    }

    fn vault(&self) -> Result<Vault, VaultError> {
        let account = self.account().ok_or(VaultError::NoWallet)?;
        Ok(Vault::new(
            Arc::new(RpcRestakeManager::new(
                self.rpc.clone(),
                self.config.contracts.restake_manager,
            )),
            self.rpc.clone(),
            self.rpc.clone(),
            self.config.contracts.steth,
            self.config.contracts.yeth,
            account,
        ))
    }
}

fn show<T: std::fmt::Display, E: std::fmt::Display>(value: Result<T, E>) -> String {
    match value {
        Ok(v) => v.to_string(),
        Err(e) => {
            log::warn!("{}", e);
            "loading...".to_string()
        }
    }
}

/// Show the multisig, delegation and balance overview
pub async fn cmd_status(state: &AppState) -> CliResult<()> {
    let multisig = state.multisig();
    let delegator = state.operator_delegator();
    let contracts = &state.config.contracts;

    let (nonce, required, operator, height, pool_steth) = futures::join!(
        multisig.nonce(),
        multisig.signatures_required(),
        delegator.operator(),
        state.rpc.block_number(),
        state.rpc.balance_of(contracts.steth, contracts.operator_delegator),
    );

    println!("🔐 Multisig {}", contracts.multisig);
    println!("   ├─ Chain: {}", state.config.chain_id);
    println!("   ├─ Nonce: #{}", show(nonce));
    println!("   ├─ Signatures required: {}", show(required));
    println!("   └─ Block height: {}", show(height));

    println!("\n🏦 OperatorDelegator {}", contracts.operator_delegator);
    println!("   ├─ Operator: {}", show(operator));
    println!(
        "   └─ stETH balance: {}",
        show(pool_steth.map(format_ether))
    );

    match state.account() {
        Some(account) => {
            let (owner, steth, yeth) = futures::join!(
                multisig.is_owner(account),
                state.rpc.balance_of(contracts.steth, account),
                state.rpc.balance_of(contracts.yeth, account),
            );
            println!("\n👤 Account {}", account);
            println!("   ├─ Owner: {}", show(owner));
            println!("   ├─ stETH: {}", show(steth.map(format_ether)));
            println!("   └─ yETH: {}", show(yeth.map(format_ether)));
        }
        None => println!("\n👤 No signing key configured"),
    }

    Ok(())
}

/// Propose `action` and print the resulting notice
pub async fn cmd_propose(state: &AppState, action: &AdminAction) -> CliResult<()> {
    let pipeline = match state.pipeline() {
        Ok(p) => p,
        Err(e) => {
            println!("{}", e.notice());
            return Ok(());
        }
    };

    let result = pipeline.propose(action).await;
    print_outcome(&pipeline, action.name(), result);
    Ok(())
}

fn print_outcome(
    pipeline: &ProposalPipeline,
    name: &str,
    result: Result<ProposalOutcome, ProposalError>,
) {
    match result {
        Ok(outcome) => {
            println!("{}", outcome.notice());
            if let ProposalOutcome::Submitted(proposal) = &outcome {
                println!("   ├─ To: {}", proposal.to());
                println!("   ├─ Value: {} wei", proposal.value());
                println!(
                    "   ├─ Signatures: {}/{}",
                    proposal.signatures().len(),
                    proposal.required_approvals()
                );
                println!("   └─ Review it at {}", pipeline.store_location());
            }
        }
        Err(e) => {
            log::debug!("{} failed: {}", name, e);
            println!("{}", e.notice());
        }
    }
}

/// Propose a change that is entered as draft fields
pub async fn cmd_propose_fields(
    state: &AppState,
    method: DraftMethod,
    signer: &str,
    signatures: &str,
    amount: &str,
) -> CliResult<()> {
    let draft = Draft {
        method_name: method,
        signer: signer.to_string(),
        new_signatures_number: signatures.to_string(),
        amount: amount.to_string(),
        ..Default::default()
    };

    match draft.to_action() {
        Ok(action) => cmd_propose(state, &action).await,
        Err(e) => {
            println!("{}", ProposalError::from(e).notice());
            Ok(())
        }
    }
}

/// Delegate the vault to `operator`
pub async fn cmd_delegate(state: &AppState, operator: &str) -> CliResult<()> {
    match operator.trim().parse::<Address>() {
        Ok(operator) => cmd_propose(state, &AdminAction::Delegate { operator }).await,
        Err(_) => {
            println!("{}", ProposalError::InvalidAddress("operator").notice());
            Ok(())
        }
    }
}

/// Propose completing the withdrawal with `nonce` if it is Ready
pub async fn cmd_complete_withdrawal(state: &AppState, nonce: &str) -> CliResult<()> {
    let nonce = match nonce.trim().parse::<U256>() {
        Ok(n) => n,
        Err(_) => {
            println!("{}", Notice::Info(format!("Invalid withdrawal nonce: {}", nonce)));
            return Ok(());
        }
    };

    let report = state.gate().evaluate().await;
    match report.completion(nonce) {
        Ok(action) => cmd_propose(state, &action).await,
        Err(e) => {
            println!("{}", e.notice());
            Ok(())
        }
    }
}

fn or_dash(field: &str) -> &str {
    if field.is_empty() {
        "-"
    } else {
        field
    }
}

/// Show the saved draft
pub fn cmd_draft_show(state: &AppState) -> CliResult<()> {
    let draft = state.drafts.load()?;

    println!("📝 Draft ({})", state.drafts.path().display());
    println!("   ├─ Method: {}", draft.method_name);
    println!("   ├─ Signer: {}", or_dash(&draft.signer));
    println!(
        "   ├─ New signatures required: {}",
        or_dash(&draft.new_signatures_number)
    );
    println!("   ├─ Amount: {} wei", draft.amount);
    if let Some(data) = &draft.call_data {
        println!("   ├─ Call data: {}", data);
    }
    match draft.saved_at {
        Some(at) => println!("   └─ Saved: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("   └─ Not saved"),
    }

    Ok(())
}

/// Update fields of the saved draft
pub fn cmd_draft_set(
    state: &AppState,
    method: Option<DraftMethod>,
    signer: Option<String>,
    signatures: Option<String>,
    amount: Option<String>,
) -> CliResult<()> {
    let mut draft = state.drafts.load()?;
    if let Some(method) = method {
        draft.method_name = method;
    }
    if let Some(signer) = signer {
        draft.signer = signer;
    }
    if let Some(signatures) = signatures {
        draft.new_signatures_number = signatures;
    }
    if let Some(amount) = amount {
        draft.amount = amount;
    }

    let targets = ActionTargets {
        multisig: state.config.contracts.multisig,
        operator_delegator: state.config.contracts.operator_delegator,
    };
    draft.call_data = match draft.to_action() {
        Ok(action) => Some(action.to_call(&targets).data),
        Err(e) => {
            println!("⚠️  Draft is incomplete: {}", e);
            None
        }
    };

    state.drafts.save(&mut draft)?;
    println!("💾 Draft saved");
    Ok(())
}

/// Propose the saved draft and clear it once accepted
pub async fn cmd_draft_submit(state: &AppState) -> CliResult<()> {
    let draft = state.drafts.load()?;
    let pipeline = match state.pipeline() {
        Ok(p) => p,
        Err(e) => {
            println!("{}", e.notice());
            return Ok(());
        }
    };

    let result = pipeline.propose_draft(&draft).await;
    print_outcome(&pipeline, draft.method_name.name(), result);
    Ok(())
}

pub fn cmd_draft_clear(state: &AppState) -> CliResult<()> {
    state.drafts.clear()?;
    println!("🧹 Draft cleared");
    Ok(())
}

fn print_report(report: &GateReport) {
    if !report.loaded {
        println!("{}", Notice::Info(LOADING.to_string()));
        return;
    }

    let height = report
        .height
        .map(|h| h.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let delay = report
        .delay
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("📤 Withdrawals (height {}, delay {} blocks)", height, delay);

    if report.entries.is_empty() {
        println!("   No outstanding withdrawals");
        return;
    }

    for entry in report.entries.values() {
        let marker = match entry.readiness {
            Readiness::Ready => "🟢",
            Readiness::Queued => "⏳",
        };
        let ready_at = entry
            .ready_at
            .map(|b| format!("completable at block {}", b))
            .unwrap_or_else(|| "completion block unknown".to_string());
        println!(
            "   {} #{} {} | {} | {}",
            marker,
            entry.withdrawal.nonce,
            entry.withdrawal.short_root(),
            entry.readiness,
            ready_at
        );
    }
}

/// List outstanding withdrawals, optionally following new blocks
pub async fn cmd_withdrawals(state: &AppState, watch: bool) -> CliResult<()> {
    let gate = Arc::new(state.gate());

    if !watch {
        print_report(&gate.evaluate().await);
        return Ok(());
    }

    let (mut reports, handle) = gate.watch(state.config.poll_interval()).await;
    print_report(&reports.borrow_and_update());

    loop {
        let changed = tokio::select! {
            changed = reports.changed() => changed.is_ok(),
            _ = tokio::signal::ctrl_c() => false,
        };
        if !changed {
            break;
        }
        println!();
        print_report(&reports.borrow_and_update());
    }

    handle.abort();
    Ok(())
}

/// Deposit or withdraw through the restake manager
pub async fn cmd_vault(state: &AppState, operation: VaultOperation, amount: &str) -> CliResult<()> {
    let result = match state.vault() {
        Ok(vault) => match operation {
            VaultOperation::Deposit => vault.deposit(amount).await,
            VaultOperation::Withdraw => vault.withdraw(amount).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(receipt) => {
            let (sent, received) = match operation {
                VaultOperation::Deposit => ("stETH", "yETH"),
                VaultOperation::Withdraw => ("yETH", "stETH"),
            };
            let verb = match operation {
                VaultOperation::Deposit => "deposited",
                VaultOperation::Withdraw => "withdrew",
            };
            println!(
                "{}",
                Notice::Success(format!(
                    "Successfully {} {} {} for {}",
                    verb,
                    format_ether(receipt.amount),
                    sent,
                    received
                ))
            );
            if let Some(approval) = receipt.approval {
                println!("   ├─ Approval: {}", approval.transaction_hash);
            }
            println!("   └─ Transaction: {}", receipt.receipt.transaction_hash);
        }
        Err(e) => {
            match e.kind() {
                ErrorKind::Transport => log::error!("{} failed: {}", operation, e),
                _ => log::warn!("{} refused: {}", operation, e),
            }
            println!("{}", e.notice(operation));
        }
    }

    Ok(())
}

/// Show what a deposit or withdrawal would yield
pub async fn cmd_preview(state: &AppState, operation: VaultOperation, amount: &str) -> CliResult<()> {
    let result = match state.vault() {
        Ok(vault) => vault.preview(operation, amount).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(out) => {
            let unit = match operation {
                VaultOperation::Deposit => "yETH",
                VaultOperation::Withdraw => "stETH",
            };
            println!("🔮 {} {} returns {} {}", operation, amount, format_ether(out), unit);
        }
        Err(e) => println!("{}", e.notice(operation)),
    }

    Ok(())
}

/// Print the multisig digest of a raw call without signing it
pub async fn cmd_digest(
    state: &AppState,
    to: &str,
    value: &str,
    data: &str,
    nonce: Option<&str>,
) -> CliResult<()> {
    let to: Address = match to.trim().parse() {
        Ok(a) => a,
        Err(_) => {
            println!("{}", ProposalError::InvalidAddress("target").notice());
            return Ok(());
        }
    };
    let (value, data) = match (value.trim().parse::<U256>(), data.trim().parse::<Bytes>()) {
        (Ok(v), Ok(d)) => (v, d),
        _ => {
            println!("{}", Notice::Info("Invalid value or call data".to_string()));
            return Ok(());
        }
    };

    let builder = DigestBuilder::new(state.multisig());
    let call = ProposalCall { to, value, data };
    let prepared = match nonce.map(|n| n.trim().parse::<U256>()) {
        Some(Ok(n)) => builder.build_at(n, call).await,
        Some(Err(_)) => {
            println!("{}", Notice::Info("Invalid nonce".to_string()));
            return Ok(());
        }
        None => builder.build(call).await,
    };

    match prepared {
        Ok(p) => {
            println!("🧮 Digest for nonce #{}", p.nonce);
            println!("   └─ {}", p.digest);
        }
        Err(e) => {
            log::error!("Digest failed: {}", e);
            println!("{}", Notice::Error("Error while computing digest".to_string()));
        }
    }

    Ok(())
}

/// Generate a new signing key
pub fn cmd_keygen() -> CliResult<()> {
    let key = KeyPair::generate();

    println!("🔐 New key generated!");
    println!("   📍 Address: {}", key.address());
    println!("   🔑 Private key: {}", key.private_key_hex());
    println!("\n   ⚠️  Pass it with --private-key or RESTAKE_PRIVATE_KEY; it is not stored.");

    Ok(())
}

/// Show which pool server proposals go to
pub fn cmd_pool_url(config: &AppConfig, chain_id: Option<u64>) -> CliResult<()> {
    let chain_id = chain_id.unwrap_or(config.chain_id);
    println!("🌐 Chain {}: {}", chain_id, config.pool_server_url(chain_id));
    Ok(())
}

/// Load configuration only, for commands that never touch the node
pub fn load_config(data_dir: &Path) -> CliResult<AppConfig> {
    Ok(AppConfig::load_or_create(data_dir)?)
}
