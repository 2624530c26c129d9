pub mod error;
pub mod ledger;
pub mod participant;
pub mod transfer;
