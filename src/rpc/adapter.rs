//! Capability traits implemented over Ethereum JSON-RPC
//!
//! Contract reads go through `eth_call` with `sol!`-encoded calldata; events
//! come from `eth_getLogs` filtered by signature topic. ABI types never leave
//! this module except as the plain records in [`crate::core`].

use crate::contract::abi::{
    IDelegationManager, IOperatorDelegator, IRestakeManager, ISafeMultiSigWallet, IERC20,
};
use crate::contract::{
    ChainReader, DelegationManager, MultisigContract, OperatorDelegator, RestakeManager,
    TokenReader, TransactionSender, WithdrawalEventSource,
};
use crate::core::{CompletedWithdrawal, QueuedWithdrawal, TxReceipt};
use crate::rpc::error::RpcError;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{Provider, ReqwestProvider};
use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, Filter, TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Shared node connection
pub struct EthRpc {
    provider: ReqwestProvider,
    url: String,
    receipt_poll: Duration,
}

impl EthRpc {
    pub fn new(url: &str, receipt_poll: Duration) -> Result<Self, RpcError> {
        let parsed = url
            .parse()
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {}", url, e)))?;

        Ok(Self {
            provider: ReqwestProvider::new_http(parsed),
            url: url.to_string(),
            receipt_poll,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read-only contract call against the latest block
    pub async fn call<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return, RpcError> {
        let request = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::both(Bytes::from(call.abi_encode())));

        log::debug!("eth_call {} on {}", C::SIGNATURE, to);
        let raw = self
            .provider
            .call(&request)
            .block(BlockId::latest())
            .await?;
        Ok(C::abi_decode_returns(&raw, true)?)
    }

    /// All events of type `E` emitted by `address` since `from_block`
    pub async fn events<E: SolEvent>(
        &self,
        address: Address,
        from_block: u64,
    ) -> Result<Vec<E>, RpcError> {
        let filter = Filter::new()
            .address(address)
            .event_signature(E::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(BlockNumberOrTag::Latest);

        let logs = self.provider.get_logs(&filter).await?;
        log::debug!("{} {} log(s) since block {}", logs.len(), E::SIGNATURE, from_block);

        logs.iter()
            .map(|log| {
                E::decode_log(&log.inner, true)
                    .map(|decoded| decoded.data)
                    .map_err(RpcError::from)
            })
            .collect()
    }
}

fn to_u64(value: U256, what: &str) -> Result<u64, RpcError> {
    if value > U256::from(u64::MAX) {
        return Err(RpcError::OutOfRange(format!("{} = {}", what, value)));
    }
    Ok(value.to::<u64>())
}

#[async_trait]
impl ChainReader for EthRpc {
    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.provider.get_block_number().await?)
    }
}

#[async_trait]
impl TokenReader for EthRpc {
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, RpcError> {
        Ok(self.call(token, &IERC20::balanceOfCall { account }).await?._0)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError> {
        Ok(self
            .call(token, &IERC20::allowanceCall { owner, spender })
            .await?
            ._0)
    }
}

#[async_trait]
impl TransactionSender for EthRpc {
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, RpcError> {
        let request = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(TransactionInput::both(data));

        let pending = self.provider.send_transaction(request).await?;
        let hash = *pending.tx_hash();
        log::info!("Sent transaction {}", hash);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt, RpcError> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(TxReceipt::from(&receipt));
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }
}

/// The multisig wallet reached over RPC
pub struct RpcMultisig {
    rpc: Arc<EthRpc>,
    address: Address,
}

impl RpcMultisig {
    pub fn new(rpc: Arc<EthRpc>, address: Address) -> Self {
        Self { rpc, address }
    }
}

#[async_trait]
impl MultisigContract for RpcMultisig {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        let id = self
            .rpc
            .call(self.address, &ISafeMultiSigWallet::chainIdCall {})
            .await?
            ._0;
        to_u64(id, "chainId")
    }

    async fn nonce(&self) -> Result<U256, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &ISafeMultiSigWallet::nonceCall {})
            .await?
            ._0)
    }

    async fn signatures_required(&self) -> Result<U256, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &ISafeMultiSigWallet::signaturesRequiredCall {})
            .await?
            ._0)
    }

    async fn is_owner(&self, account: Address) -> Result<bool, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &ISafeMultiSigWallet::isOwnerCall { owner: account })
            .await?
            ._0)
    }

    async fn get_transaction_hash(
        &self,
        nonce: U256,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<B256, RpcError> {
        let call = ISafeMultiSigWallet::getTransactionHashCall {
            _nonce: nonce,
            to,
            value,
            data,
        };
        Ok(self.rpc.call(self.address, &call).await?._0)
    }

    async fn recover(&self, digest: B256, signature: Bytes) -> Result<Address, RpcError> {
        let call = ISafeMultiSigWallet::recoverCall {
            _hash: digest,
            _signature: signature,
        };
        Ok(self.rpc.call(self.address, &call).await?._0)
    }
}

/// The vault's OperatorDelegator reached over RPC
pub struct RpcOperatorDelegator {
    rpc: Arc<EthRpc>,
    address: Address,
}

impl RpcOperatorDelegator {
    pub fn new(rpc: Arc<EthRpc>, address: Address) -> Self {
        Self { rpc, address }
    }
}

#[async_trait]
impl WithdrawalEventSource for RpcOperatorDelegator {
    async fn withdrawals_queued(&self, from_block: u64) -> Result<Vec<QueuedWithdrawal>, RpcError> {
        let events = self
            .rpc
            .events::<IOperatorDelegator::WithdrawQueued>(self.address, from_block)
            .await?;
        Ok(events.into_iter().map(QueuedWithdrawal::from).collect())
    }

    async fn withdrawals_completed(
        &self,
        from_block: u64,
    ) -> Result<Vec<CompletedWithdrawal>, RpcError> {
        let events = self
            .rpc
            .events::<IOperatorDelegator::WithdrawalComplete>(self.address, from_block)
            .await?;
        Ok(events.into_iter().map(CompletedWithdrawal::from).collect())
    }
}

#[async_trait]
impl OperatorDelegator for RpcOperatorDelegator {
    fn address(&self) -> Address {
        self.address
    }

    async fn operator(&self) -> Result<Address, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &IOperatorDelegator::getOperatorCall {})
            .await?
            ._0)
    }
}

pub struct RpcDelegationManager {
    rpc: Arc<EthRpc>,
    address: Address,
}

impl RpcDelegationManager {
    pub fn new(rpc: Arc<EthRpc>, address: Address) -> Self {
        Self { rpc, address }
    }
}

#[async_trait]
impl DelegationManager for RpcDelegationManager {
    async fn min_withdrawal_delay_blocks(&self) -> Result<U256, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &IDelegationManager::minWithdrawalDelayBlocksCall {})
            .await?
            ._0)
    }
}

pub struct RpcRestakeManager {
    rpc: Arc<EthRpc>,
    address: Address,
}

impl RpcRestakeManager {
    pub fn new(rpc: Arc<EthRpc>, address: Address) -> Self {
        Self { rpc, address }
    }
}

#[async_trait]
impl RestakeManager for RpcRestakeManager {
    fn address(&self) -> Address {
        self.address
    }

    async fn mint_amount(&self, amount: U256) -> Result<U256, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &IRestakeManager::getMintAmountCall { amount })
            .await?
            ._0)
    }

    async fn withdraw_amount(&self, amount: U256) -> Result<U256, RpcError> {
        Ok(self
            .rpc
            .call(self.address, &IRestakeManager::getWithdrawAmountCall { amount })
            .await?
            ._0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;
    use axum::extract::State;
    use axum::routing::post;
    use axum::Json;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU64, Ordering};

    const MULTISIG: Address = address!("56d13eb21a625eda8438f55df2c31dc3632034f5");

    fn receipt_json(hash: &Value) -> Value {
        json!({
            "type": "0x2",
            "status": "0x1",
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{}", "22".repeat(32)),
            "blockNumber": "0x2",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": "0x56d13eb21a625eda8438f55df2c31dc3632034f5",
            "contractAddress": null
        })
    }

    /// Node stub; `eth_getTransactionReceipt` answers null on its first poll
    async fn node() -> Arc<EthRpc> {
        async fn handler(
            State(polls): State<Arc<AtomicU64>>,
            Json(request): Json<Value>,
        ) -> Json<Value> {
            let id = request["id"].clone();
            let result = match request["method"].as_str().unwrap_or_default() {
                "eth_blockNumber" => json!("0x159d5e"),
                "eth_chainId" => json!("0x7a69"),
                "eth_call" => {
                    let tx = &request["params"][0];
                    let input = if tx["input"].is_string() { &tx["input"] } else { &tx["data"] };
                    let data: Bytes = serde_json::from_value(input.clone()).unwrap();
                    if data.starts_with(&ISafeMultiSigWallet::nonceCall::SELECTOR) {
                        json!(Bytes::from(U256::from(5).abi_encode()))
                    } else if data.starts_with(&ISafeMultiSigWallet::chainIdCall::SELECTOR) {
                        json!(Bytes::from(U256::MAX.abi_encode()))
                    } else {
                        return Json(json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": { "code": 3, "message": "execution reverted" }
                        }));
                    }
                }
                "eth_getTransactionReceipt" => {
                    if polls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Value::Null
                    } else {
                        receipt_json(&request["params"][0])
                    }
                }
                _ => Value::Null,
            };
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
        }

        let app = axum::Router::new()
            .route("/", post(handler))
            .with_state(Arc::new(AtomicU64::new(0)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Arc::new(EthRpc::new(&format!("http://{}/", addr), Duration::from_millis(10)).unwrap())
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            EthRpc::new("not a url", Duration::from_millis(10)),
            Err(RpcError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_block_number() {
        let rpc = node().await;
        assert_eq!(rpc.block_number().await.unwrap(), 1416542);
    }

    #[tokio::test]
    async fn test_contract_reads() {
        let multisig = RpcMultisig::new(node().await, MULTISIG);

        assert_eq!(multisig.nonce().await.unwrap(), U256::from(5));
        assert!(matches!(
            multisig.chain_id().await,
            Err(RpcError::OutOfRange(_))
        ));
        match multisig.signatures_required().await {
            Err(RpcError::Transport(alloy_transport::RpcError::ErrorResp(payload))) => {
                assert_eq!(payload.code, 3)
            }
            other => panic!("expected a node error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_receipt_polling() {
        let rpc = node().await;
        let hash = B256::repeat_byte(0x11);

        let receipt = rpc.wait_for_receipt(hash).await.unwrap();
        assert_eq!(receipt.transaction_hash, hash);
        assert_eq!(receipt.block_number, Some(2));
        assert!(receipt.succeeded());
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let rpc = EthRpc::new("http://127.0.0.1:1/", Duration::from_millis(10)).unwrap();
        assert!(matches!(
            rpc.block_number().await,
            Err(RpcError::Transport(_))
        ));
    }
}
