pub mod client;
pub mod error;

pub use client::{fetch, FetchCall, FetchMethod, RemoteFetch, RestClient};
pub use error::FetchError;
