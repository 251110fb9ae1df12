pub mod disputes;
pub mod inbox;
pub mod ledger;
mod settlement;
pub mod wallet;
