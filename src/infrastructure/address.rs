use crate::domain::ports::AddressCodec;
use crate::domain::transaction::Destination;
use crate::error::SubmissionError;

/// Base58 alphabet used by ledger classic addresses.
const LEDGER_ALPHABET: &str = "rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

const MIN_LEN: usize = 25;
const MAX_LEN: usize = 35;

/// Validates classic `r...` addresses and carries the tag alongside.
///
/// This is a shape check only; checksum verification is left to the ledger,
/// which rejects a bad destination at submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicAddressCodec;

impl AddressCodec for ClassicAddressCodec {
    fn encode(&self, address: &str, tag: Option<u64>) -> Result<Destination, SubmissionError> {
        let invalid = |reason: &str| SubmissionError::InvalidDestination {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        if !address.starts_with('r') {
            return Err(invalid("classic addresses start with 'r'"));
        }
        if !(MIN_LEN..=MAX_LEN).contains(&address.len()) {
            return Err(invalid("unexpected address length"));
        }
        if let Some(c) = address.chars().find(|c| !LEDGER_ALPHABET.contains(*c)) {
            return Err(invalid(&format!("character {c:?} is not in the address alphabet")));
        }

        let tag = tag
            .map(u32::try_from)
            .transpose()
            .map_err(|_| invalid("destination tag exceeds 32 bits"))?;

        Ok(Destination {
            address: address.to_string(),
            tag,
        })
    }
}
