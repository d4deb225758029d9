pub mod client;
pub mod error;

pub use client::MoneypexClient;
pub use error::{Operation, TransferError};
