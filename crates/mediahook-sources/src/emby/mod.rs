pub mod api;
pub mod client;

pub use api::{normalize_host, EmbyHttpClient};
pub use client::EmbyClient;
