//! Domain layer: payout value types and the ports the core depends on.

pub mod amount;
pub mod ports;
pub mod recipient;
pub mod transaction;
pub mod wallet;
