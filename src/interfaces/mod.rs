//! Edges facing the operator: CSV files in and out, and the go/no-go prompt.

pub mod csv;
pub mod prompt;
