pub mod client;
pub mod types;

pub use client::TasmotaClient;
pub use types::Status;
