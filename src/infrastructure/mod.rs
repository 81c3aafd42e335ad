//! Adapters implementing the domain ports.

pub mod address;
pub mod in_memory;
pub mod json_rpc;
pub mod simulated;
