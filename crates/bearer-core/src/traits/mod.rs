//! Seams between the client and its collaborators.

mod logout;
mod store;
mod transport;

pub use logout::{LogoutSignal, NoopLogout};
pub use store::CredentialStore;
pub use transport::Transport;
