pub mod error;
pub mod remote;

pub use error::ApiError;
pub use remote::{ApiClient, AuthApi, ClientConfig, FileSession, MemorySession, Session, SignalsApi};
