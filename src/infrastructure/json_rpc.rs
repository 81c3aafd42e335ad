use crate::config::Network;
use crate::domain::amount::BaseUnits;
use crate::domain::ports::{AddressCodec, LedgerConnector, LedgerSession, LedgerSessionRef};
use crate::domain::transaction::{Destination, TxId, TxStatus};
use crate::domain::wallet::SenderWallet;
use crate::error::{LedgerError, PayoutError, Result};
use crate::infrastructure::address::ClassicAddressCodec;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine result prefixes that mean the transaction was never applied.
const REJECTED_CLASSES: [&str; 3] = ["tem", "tef", "tel"];

/// Ledger session speaking rippled-style JSON-RPC over HTTP.
///
/// Signing happens server side: the sender's seed travels with each
/// `submit` call, so only use endpoints you trust.
pub struct JsonRpcLedger {
    client: reqwest::Client,
    endpoint: String,
    account: String,
}

impl JsonRpcLedger {
    pub fn new(endpoint: impl Into<String>, account: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PayoutError::ConnectionError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            account: account.into(),
        })
    }

    /// Calls `method` and returns the `result` object of the response.
    async fn call(&self, method: &str, params: Value) -> std::result::Result<Value, LedgerError> {
        let body = json!({ "method": method, "params": [params] });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "{method}: HTTP {}",
                response.status()
            )));
        }

        let mut payload: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(format!("{method}: unreadable response: {e}")))?;
        match payload.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(LedgerError::Transport(format!(
                "{method}: response has no result"
            ))),
        }
    }
}

/// Returns the error code of a failed call, if any.
fn rpc_error(result: &Value) -> Option<&str> {
    if result["status"].as_str() == Some("error") {
        Some(result["error"].as_str().unwrap_or("unknown error"))
    } else {
        None
    }
}

fn parse_balance(result: &Value) -> std::result::Result<BaseUnits, LedgerError> {
    if let Some(error) = rpc_error(result) {
        return Err(LedgerError::Rejected(error.to_string()));
    }
    result["account_data"]["Balance"]
        .as_str()
        .and_then(|drops| drops.parse::<u64>().ok())
        .map(BaseUnits)
        .ok_or_else(|| LedgerError::Transport("account_info: missing Balance".to_string()))
}

fn parse_submit(result: &Value) -> std::result::Result<TxId, LedgerError> {
    if let Some(error) = rpc_error(result) {
        let message = result["error_message"].as_str().unwrap_or(error);
        return Err(LedgerError::Rejected(message.to_string()));
    }
    let engine_result = result["engine_result"].as_str().unwrap_or_default();
    if REJECTED_CLASSES
        .iter()
        .any(|class| engine_result.starts_with(class))
    {
        let message = result["engine_result_message"].as_str().unwrap_or_default();
        return Err(LedgerError::Rejected(format!("{engine_result}: {message}")));
    }
    result["tx_json"]["hash"]
        .as_str()
        .map(TxId::new)
        .ok_or_else(|| LedgerError::Transport("submit: missing transaction hash".to_string()))
}

fn parse_status(result: &Value) -> std::result::Result<TxStatus, LedgerError> {
    match rpc_error(result) {
        Some("txnNotFound") => return Ok(TxStatus::Unknown),
        Some(error) => return Err(LedgerError::Transport(format!("tx: {error}"))),
        None => {}
    }
    if !result["validated"].as_bool().unwrap_or(false) {
        return Ok(TxStatus::Pending);
    }
    match result["meta"]["TransactionResult"].as_str() {
        Some("tesSUCCESS") => Ok(TxStatus::Succeeded),
        Some(_) => Ok(TxStatus::Failed),
        None => Ok(TxStatus::Unknown),
    }
}

fn payment_json(account: &str, amount: BaseUnits, destination: &Destination) -> Value {
    let mut tx = json!({
        "TransactionType": "Payment",
        "Account": account,
        "Destination": destination.address,
        "Amount": amount.value().to_string(),
    });
    if let Some(tag) = destination.tag {
        tx["DestinationTag"] = json!(tag);
    }
    tx
}

#[async_trait]
impl LedgerSession for JsonRpcLedger {
    async fn balance(&self) -> std::result::Result<BaseUnits, LedgerError> {
        let result = self
            .call(
                "account_info",
                json!({ "account": self.account, "ledger_index": "validated" }),
            )
            .await?;
        parse_balance(&result)
    }

    async fn submit(
        &self,
        amount: BaseUnits,
        destination: &Destination,
        wallet: &SenderWallet,
    ) -> std::result::Result<TxId, LedgerError> {
        let seed = wallet.seed().ok_or_else(|| {
            LedgerError::Malformed("sender wallet has no signing seed".to_string())
        })?;
        let params = json!({
            "tx_json": payment_json(&wallet.address, amount, destination),
            "secret": seed,
        });
        let result = self.call("submit", params).await?;
        parse_submit(&result)
    }

    async fn query_status(&self, tx_id: &TxId) -> std::result::Result<TxStatus, LedgerError> {
        let result = self
            .call("tx", json!({ "transaction": tx_id.as_str(), "binary": false }))
            .await?;
        parse_status(&result)
    }
}

/// Opens `JsonRpcLedger` sessions, checking connectivity with a balance query.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRpcConnector;

#[async_trait]
impl LedgerConnector for JsonRpcConnector {
    async fn connect(
        &self,
        endpoint: &str,
        network: Network,
        sender_address: &str,
    ) -> Result<LedgerSessionRef> {
        ClassicAddressCodec
            .encode(sender_address, None)
            .map_err(|e| PayoutError::ConnectionError(e.to_string()))?;

        let ledger = JsonRpcLedger::new(endpoint, sender_address)?;
        let balance = ledger
            .balance()
            .await
            .map_err(|e| PayoutError::ConnectionError(format!("{endpoint}: {e}")))?;
        tracing::info!(endpoint, %network, balance = balance.value(), "connected to ledger");
        Ok(Arc::new(ledger))
    }
}
