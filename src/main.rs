//! Restake multisig CLI
//!
//! Proposes administrative actions to the treasury multisig, tracks vault
//! withdrawals and runs deposits and withdrawals.

use clap::{Parser, Subcommand};
use restake_multisig::cli::{self, AppState};
use restake_multisig::core::{AdminAction, DraftMethod};
use restake_multisig::vault::VaultOperation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restake")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Multisig proposal client for a liquid-restaking vault", long_about = None)]
struct Cli {
    /// Data directory for configuration and the saved draft
    #[arg(short, long, default_value = ".restake_data")]
    data_dir: PathBuf,

    /// JSON-RPC endpoint, overriding the configured one
    #[arg(long)]
    rpc_url: Option<String>,

    /// Hex private key of the connected account
    #[arg(long, env = "RESTAKE_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show multisig, delegation and balance overview
    Status,

    /// Propose an administrative action
    Propose {
        #[command(subcommand)]
        action: ProposeCommands,
    },

    /// Manage the saved action draft
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },

    /// List outstanding withdrawals and their readiness
    Withdrawals {
        /// Keep following new blocks
        #[arg(short, long)]
        watch: bool,
    },

    /// Deposit stETH for yETH
    Deposit {
        /// Amount in ether, e.g. 1.5
        #[arg(short, long)]
        amount: String,
    },

    /// Burn yETH for stETH
    Withdraw {
        /// Amount in ether, e.g. 1.5
        #[arg(short, long)]
        amount: String,
    },

    /// Preview a deposit or withdrawal
    Preview {
        #[command(subcommand)]
        action: PreviewCommands,
    },

    /// Compute the multisig digest of a raw call
    Digest {
        /// Call target
        #[arg(short, long)]
        to: String,

        /// Native value in wei
        #[arg(short, long, default_value = "0")]
        value: String,

        /// Hex calldata
        #[arg(long, default_value = "0x")]
        data: String,

        /// Nonce to compute for (defaults to the contract's current nonce)
        #[arg(short, long)]
        nonce: Option<String>,
    },

    /// Generate a new signing key
    Keygen,

    /// Show the pool server proposals are sent to
    PoolUrl {
        /// Chain id (defaults to the configured one)
        #[arg(short, long)]
        chain_id: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ProposeCommands {
    /// Transfer funds held by the multisig
    Transfer {
        /// Recipient address
        #[arg(short, long)]
        to: String,

        /// Amount in wei
        #[arg(short, long)]
        amount: String,
    },

    /// Add an owner
    AddSigner {
        #[arg(short, long)]
        signer: String,

        /// Signatures required afterwards
        #[arg(short = 'n', long)]
        signatures: String,
    },

    /// Remove an owner
    RemoveSigner {
        #[arg(short, long)]
        signer: String,

        /// Signatures required afterwards
        #[arg(short = 'n', long)]
        signatures: String,
    },

    /// Change the number of required signatures
    SetThreshold {
        #[arg(short = 'n', long)]
        signatures: String,
    },

    /// Delegate the vault to an operator
    Delegate {
        #[arg(short, long)]
        operator: String,
    },

    /// Undelegate the vault
    Undelegate,

    /// Queue a withdrawal of the delegated funds
    QueueWithdrawal,

    /// Complete a Ready withdrawal
    CompleteWithdrawal {
        #[arg(short, long)]
        nonce: String,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Show the saved draft
    Show,

    /// Update draft fields
    Set {
        /// transferFunds, addSigner, removeSigner or updateSignaturesRequired
        #[arg(short, long)]
        method: Option<DraftMethod>,

        #[arg(short, long)]
        signer: Option<String>,

        #[arg(short = 'n', long)]
        signatures: Option<String>,

        /// Amount in wei
        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Propose the saved draft
    Submit,

    /// Reset the draft
    Clear,
}

#[derive(Subcommand)]
enum PreviewCommands {
    /// yETH minted for a stETH deposit
    Deposit {
        /// Amount in ether
        #[arg(short, long)]
        amount: String,
    },

    /// stETH returned for a yETH withdrawal
    Withdraw {
        /// Amount in ether
        #[arg(short, long)]
        amount: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that never touch the node
    match &cli.command {
        Commands::Keygen => return cli::cmd_keygen(),
        Commands::PoolUrl { chain_id } => {
            let config = cli::load_config(&cli.data_dir)?;
            return cli::cmd_pool_url(&config, *chain_id);
        }
        _ => {}
    }

    let command = cli.command;
    let state = AppState::new(cli.data_dir, cli.rpc_url, cli.private_key)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match command {
            Commands::Keygen | Commands::PoolUrl { .. } => unreachable!(),

            Commands::Status => cli::cmd_status(&state).await,

            Commands::Propose { action } => match action {
                ProposeCommands::Transfer { to, amount } => {
                    cli::cmd_propose_fields(&state, DraftMethod::TransferFunds, &to, "", &amount)
                        .await
                }
                ProposeCommands::AddSigner { signer, signatures } => {
                    cli::cmd_propose_fields(&state, DraftMethod::AddSigner, &signer, &signatures, "0")
                        .await
                }
                ProposeCommands::RemoveSigner { signer, signatures } => {
                    cli::cmd_propose_fields(
                        &state,
                        DraftMethod::RemoveSigner,
                        &signer,
                        &signatures,
                        "0",
                    )
                    .await
                }
                ProposeCommands::SetThreshold { signatures } => {
                    cli::cmd_propose_fields(
                        &state,
                        DraftMethod::UpdateSignaturesRequired,
                        "",
                        &signatures,
                        "0",
                    )
                    .await
                }
                ProposeCommands::Delegate { operator } => cli::cmd_delegate(&state, &operator).await,
                ProposeCommands::Undelegate => {
                    cli::cmd_propose(&state, &AdminAction::Undelegate).await
                }
                ProposeCommands::QueueWithdrawal => {
                    cli::cmd_propose(&state, &AdminAction::QueueWithdrawal).await
                }
                ProposeCommands::CompleteWithdrawal { nonce } => {
                    cli::cmd_complete_withdrawal(&state, &nonce).await
                }
            },

            Commands::Draft { action } => match action {
                DraftCommands::Show => cli::cmd_draft_show(&state),
                DraftCommands::Set {
                    method,
                    signer,
                    signatures,
                    amount,
                } => cli::cmd_draft_set(&state, method, signer, signatures, amount),
                DraftCommands::Submit => cli::cmd_draft_submit(&state).await,
                DraftCommands::Clear => cli::cmd_draft_clear(&state),
            },

            Commands::Withdrawals { watch } => cli::cmd_withdrawals(&state, watch).await,

            Commands::Deposit { amount } => {
                cli::cmd_vault(&state, VaultOperation::Deposit, &amount).await
            }
            Commands::Withdraw { amount } => {
                cli::cmd_vault(&state, VaultOperation::Withdraw, &amount).await
            }

            Commands::Preview { action } => match action {
                PreviewCommands::Deposit { amount } => {
                    cli::cmd_preview(&state, VaultOperation::Deposit, &amount).await
                }
                PreviewCommands::Withdraw { amount } => {
                    cli::cmd_preview(&state, VaultOperation::Withdraw, &amount).await
                }
            },

            Commands::Digest {
                to,
                value,
                data,
                nonce,
            } => cli::cmd_digest(&state, &to, &value, &data, nonce.as_deref()).await,
        }
    })
}
