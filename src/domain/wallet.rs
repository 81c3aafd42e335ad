use std::fmt;

/// The paying identity. Shared read-only across every recipient of a run.
#[derive(Clone, PartialEq)]
pub struct SenderWallet {
    pub address: String,
    seed: Option<String>,
}

impl SenderWallet {
    pub fn new(address: impl Into<String>, seed: Option<String>) -> Self {
        Self {
            address: address.into(),
            seed,
        }
    }

    /// Signing secret handed to the ledger adapter. `None` for watch-only use.
    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }
}

impl fmt::Debug for SenderWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderWallet")
            .field("address", &self.address)
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
