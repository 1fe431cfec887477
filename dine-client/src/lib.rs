//! Dine Client - backend access for the dine-in order engine
//!
//! Provides the [`DineBackend`] contract and its HTTP implementation.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use backend::{DineBackend, HttpBackend};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;
