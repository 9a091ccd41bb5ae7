pub mod api_client;
pub mod auth;
pub mod hr;
pub mod navigator;
pub mod session_store;

pub use api_client::{ApiClient, ApiRequest};
pub use auth::AuthService;
pub use hr::{HrApi, Resource};
pub use navigator::{Navigator, RecordingNavigator, TerminalNavigator};
pub use session_store::SessionStore;
