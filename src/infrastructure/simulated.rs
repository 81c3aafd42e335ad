use crate::config::Network;
use crate::domain::amount::BaseUnits;
use crate::domain::ports::{AddressCodec, LedgerConnector, LedgerSession, LedgerSessionRef};
use crate::domain::transaction::{Destination, TxId, TxStatus};
use crate::domain::wallet::SenderWallet;
use crate::error::{LedgerError, PayoutError, Result};
use crate::infrastructure::address::ClassicAddressCodec;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A payment the simulated ledger accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub tx_id: TxId,
    pub amount: BaseUnits,
    pub destination: Destination,
    pub sender: String,
}

#[derive(Debug)]
struct ScriptedTx {
    /// Statuses still to be reported; the last one repeats forever.
    statuses: VecDeque<TxStatus>,
    polls: usize,
}

impl ScriptedTx {
    fn new(script: Vec<TxStatus>) -> Self {
        Self {
            statuses: script.into(),
            polls: 0,
        }
    }

    fn next_status(&mut self) -> TxStatus {
        self.polls += 1;
        if self.statuses.len() > 1 {
            self.statuses.pop_front().unwrap_or(TxStatus::Unknown)
        } else {
            self.statuses.front().copied().unwrap_or(TxStatus::Unknown)
        }
    }
}

#[derive(Debug)]
struct LedgerState {
    balance: BaseUnits,
    next_id: u64,
    default_script: Vec<TxStatus>,
    scripts: HashMap<String, Vec<TxStatus>>,
    rejections: HashMap<String, String>,
    transactions: HashMap<TxId, ScriptedTx>,
    submissions: Vec<Submission>,
    attempts: usize,
    total_polls: usize,
    reachable: bool,
    polls_before_outage: Option<usize>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            balance: BaseUnits(u64::MAX),
            next_id: 1,
            default_script: vec![TxStatus::Succeeded],
            scripts: HashMap::new(),
            rejections: HashMap::new(),
            transactions: HashMap::new(),
            submissions: Vec::new(),
            attempts: 0,
            total_polls: 0,
            reachable: true,
            polls_before_outage: None,
        }
    }
}

/// In-process ledger with scripted behaviour, used for dry runs and tests.
///
/// Every transaction follows a status script chosen by its destination
/// address; once the script runs out its final status repeats, so a
/// succeeded transaction keeps reporting success. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct SimulatedLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl SimulatedLedger {
    /// A funded ledger that confirms every payment on the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_balance(self, balance: BaseUnits) -> Self {
        self.lock().balance = balance;
        self
    }

    /// Status script for payments to addresses without their own script.
    pub fn with_default_script(self, script: Vec<TxStatus>) -> Self {
        self.lock().default_script = script;
        self
    }

    /// Status script for every payment sent to `address`.
    pub fn script_for(self, address: &str, script: Vec<TxStatus>) -> Self {
        self.lock().scripts.insert(address.to_string(), script);
        self
    }

    /// Makes submissions to `address` fail with `reason`.
    pub fn reject_submissions_to(self, address: &str, reason: &str) -> Self {
        self.lock()
            .rejections
            .insert(address.to_string(), reason.to_string());
        self
    }

    pub async fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Answers `polls` more status queries, then becomes unreachable.
    pub async fn drop_connection_after_polls(&self, polls: usize) {
        self.lock().polls_before_outage = Some(polls);
    }

    /// Registers a transaction directly, bypassing submission.
    pub async fn inject_transaction(&self, script: Vec<TxStatus>) -> TxId {
        let mut state = self.lock();
        let tx_id = Self::allocate_id(&mut state);
        state
            .transactions
            .insert(tx_id.clone(), ScriptedTx::new(script));
        tx_id
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Submission calls received, accepted or not.
    pub async fn submission_attempts(&self) -> usize {
        self.lock().attempts
    }

    pub async fn poll_count(&self, tx_id: &TxId) -> usize {
        self.lock()
            .transactions
            .get(tx_id)
            .map(|tx| tx.polls)
            .unwrap_or(0)
    }

    pub async fn total_polls(&self) -> usize {
        self.lock().total_polls
    }

    fn allocate_id(state: &mut LedgerState) -> TxId {
        let id = TxId::new(format!("{:064X}", state.next_id));
        state.next_id += 1;
        id
    }

    fn ensure_reachable(state: &LedgerState) -> std::result::Result<(), LedgerError> {
        if state.reachable {
            Ok(())
        } else {
            Err(LedgerError::Transport("simulated ledger is offline".to_string()))
        }
    }
}

#[async_trait]
impl LedgerSession for SimulatedLedger {
    async fn balance(&self) -> std::result::Result<BaseUnits, LedgerError> {
        let state = self.lock();
        Self::ensure_reachable(&state)?;
        Ok(state.balance)
    }

    async fn submit(
        &self,
        amount: BaseUnits,
        destination: &Destination,
        wallet: &SenderWallet,
    ) -> std::result::Result<TxId, LedgerError> {
        let mut state = self.lock();
        Self::ensure_reachable(&state)?;
        state.attempts += 1;

        if let Some(reason) = state.rejections.get(&destination.address) {
            return Err(LedgerError::Rejected(reason.clone()));
        }
        if state.balance < amount {
            return Err(LedgerError::Rejected("tecUNFUNDED_PAYMENT".to_string()));
        }

        let script = state
            .scripts
            .get(&destination.address)
            .cloned()
            .unwrap_or_else(|| state.default_script.clone());
        let tx_id = Self::allocate_id(&mut state);
        state.balance = BaseUnits(state.balance.value() - amount.value());
        state
            .transactions
            .insert(tx_id.clone(), ScriptedTx::new(script));
        state.submissions.push(Submission {
            tx_id: tx_id.clone(),
            amount,
            destination: destination.clone(),
            sender: wallet.address.clone(),
        });
        Ok(tx_id)
    }

    async fn query_status(&self, tx_id: &TxId) -> std::result::Result<TxStatus, LedgerError> {
        let mut state = self.lock();
        Self::ensure_reachable(&state)?;
        if let Some(remaining) = state.polls_before_outage {
            if remaining == 0 {
                state.reachable = false;
                return Err(LedgerError::Transport("connection reset".to_string()));
            }
            state.polls_before_outage = Some(remaining - 1);
        }
        state.total_polls += 1;

        Ok(state
            .transactions
            .get_mut(tx_id)
            .map(ScriptedTx::next_status)
            .unwrap_or(TxStatus::Unknown))
    }
}

/// Hands out a shared `SimulatedLedger` as the session for any endpoint.
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    ledger: SimulatedLedger,
}

impl SimulatedConnector {
    pub fn new(ledger: SimulatedLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl LedgerConnector for SimulatedConnector {
    async fn connect(
        &self,
        endpoint: &str,
        network: Network,
        sender_address: &str,
    ) -> Result<LedgerSessionRef> {
        ClassicAddressCodec
            .encode(sender_address, None)
            .map_err(|e| PayoutError::ConnectionError(e.to_string()))?;
        self.ledger
            .balance()
            .await
            .map_err(|e| PayoutError::ConnectionError(format!("{endpoint}: {e}")))?;
        tracing::info!(
            endpoint,
            %network,
            sender = sender_address,
            "connected to simulated ledger"
        );
        Ok(Arc::new(self.ledger.clone()))
    }
}
