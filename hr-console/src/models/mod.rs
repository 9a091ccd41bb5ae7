pub mod session;
pub mod user;

pub use session::{PersistedSession, PersistedState, Session};
pub use user::{CurrentUser, LoginResponse, ProfileUpdate, ProfileUpdateOutcome, Role, User};
