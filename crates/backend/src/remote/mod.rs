pub mod auth_api;
pub mod http_client;
pub mod session;
pub mod signals_api;

pub use auth_api::{AuthApi, TokenResponse};
pub use http_client::{ApiClient, ClientConfig, UnauthorizedHook};
pub use session::{FileSession, MemorySession, Session};
pub use signals_api::SignalsApi;
