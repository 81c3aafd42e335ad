use crate::error::{PayoutError, SubmissionError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A positive amount of US dollars requested for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UsdAmount(Decimal);

impl UsdAmount {
    pub fn new(value: Decimal) -> Result<Self, PayoutError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PayoutError::ValidationError(
                "USD amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for UsdAmount {
    type Error = PayoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UsdAmount> for Decimal {
    fn from(amount: UsdAmount) -> Self {
        amount.0
    }
}

/// USD per one unit of the ledger's native currency. Fixed for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    pub fn new(value: Decimal) -> Result<Self, PayoutError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PayoutError::ConfigError(
                "exchange rate must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for ExchangeRate {
    type Err = PayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| PayoutError::ConfigError(format!("invalid exchange rate {s:?}: {e}")))?;
        Self::new(value)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of decimal places between the native unit and the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPrecision {
    pub decimals: u32,
}

impl Default for LedgerPrecision {
    /// One native unit is 1,000,000 base units (XRP and drops).
    fn default() -> Self {
        Self { decimals: 6 }
    }
}

/// An amount expressed in the ledger's native currency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct NativeAmount(Decimal);

impl NativeAmount {
    pub fn from_usd(usd: UsdAmount, rate: ExchangeRate) -> Result<Self, SubmissionError> {
        usd.value()
            .checked_div(rate.value())
            .map(Self)
            .ok_or_else(|| {
                SubmissionError::InvalidAmount(format!(
                    "{} USD at rate {} overflows",
                    usd.value(),
                    rate
                ))
            })
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to indivisible base units, truncating any fraction so the
    /// recipient is never overpaid.
    pub fn to_base_units(self, precision: LedgerPrecision) -> Result<BaseUnits, SubmissionError> {
        let scale = 10u64
            .checked_pow(precision.decimals)
            .ok_or_else(|| {
                SubmissionError::InvalidAmount(format!(
                    "precision of {} decimals is unsupported",
                    precision.decimals
                ))
            })?;
        let units = self
            .0
            .checked_mul(Decimal::from(scale))
            .map(|scaled| scaled.floor())
            .and_then(|scaled| scaled.to_u64())
            .ok_or_else(|| {
                SubmissionError::InvalidAmount(format!("{} does not fit in base units", self.0))
            })?;
        if units == 0 {
            return Err(SubmissionError::InvalidAmount(format!(
                "{} rounds down to zero base units",
                self.0
            )));
        }
        Ok(BaseUnits(units))
    }
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A positive count of the ledger's smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BaseUnits(pub u64);

impl BaseUnits {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
