//! Time primitives shared by the ledger engine

pub mod time;
