use crate::domain::amount::{BaseUnits, ExchangeRate, LedgerPrecision, NativeAmount};
use crate::domain::ports::{AddressCodecRef, LedgerSessionRef};
use crate::domain::recipient::RecipientInput;
use crate::domain::transaction::{Destination, SubmittedTransaction};
use crate::domain::wallet::SenderWallet;
use crate::error::SubmissionError;

/// Converts a recipient's USD request into a ledger payment and submits it.
///
/// Each call makes at most one submission attempt. Resubmitting is a batch
/// level decision, so nothing here retries.
pub struct TransactionSubmitter {
    session: LedgerSessionRef,
    codec: AddressCodecRef,
    precision: LedgerPrecision,
}

impl TransactionSubmitter {
    pub fn new(
        session: LedgerSessionRef,
        codec: AddressCodecRef,
        precision: LedgerPrecision,
    ) -> Self {
        Self {
            session,
            codec,
            precision,
        }
    }

    /// Amount in base units the recipient will receive at `rate`.
    pub fn quote(
        &self,
        recipient: &RecipientInput,
        rate: ExchangeRate,
    ) -> Result<BaseUnits, SubmissionError> {
        NativeAmount::from_usd(recipient.requested_usd, rate)?.to_base_units(self.precision)
    }

    pub fn encode_destination(
        &self,
        recipient: &RecipientInput,
    ) -> Result<Destination, SubmissionError> {
        self.codec
            .encode(&recipient.destination_address, recipient.destination_tag)
    }

    #[tracing::instrument(
        name = "submit",
        skip_all,
        fields(recipient = %recipient.display_name, destination = %recipient.destination_address)
    )]
    pub async fn submit(
        &self,
        wallet: &SenderWallet,
        recipient: &RecipientInput,
        rate: ExchangeRate,
    ) -> Result<SubmittedTransaction, SubmissionError> {
        let amount = self.quote(recipient, rate)?;
        let destination = self.encode_destination(recipient)?;

        tracing::info!(base_units = amount.value(), tag = ?destination.tag, "submitting payment");
        match self.session.submit(amount, &destination, wallet).await {
            Ok(tx_id) => {
                tracing::info!(tx_id = %tx_id, "payment submitted");
                Ok(SubmittedTransaction {
                    tx_id,
                    recipient: recipient.clone(),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed");
                Err(SubmissionError::Ledger(e))
            }
        }
    }
}
