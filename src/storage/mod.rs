//! Persistent session state module.
//!
//! Handles the per-device key-value store that survives between
//! invocations, the identity it is keyed by, and the typed session view.

pub mod identity;
pub mod session;
pub mod store;

// Re-export commonly used items
pub use identity::DeviceIdentity;
pub use session::SessionState;
pub use store::{FileStore, MemoryStore, SessionStore, default_store_dir};
