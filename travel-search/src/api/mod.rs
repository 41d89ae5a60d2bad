mod backend;
mod client;
mod dev_backend;
mod dto;
pub mod mock;

pub use backend::SearchBackend;
pub use client::{ApiClient, DEFAULT_API_URL, REQUEST_TIMEOUT};
pub use dev_backend::DevBackend;
pub use mock::MockBackend;
