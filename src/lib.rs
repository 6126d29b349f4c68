//! Session lifecycle controller.
//!
//! Manages authentication state transitions, credential storage, stashed
//! account switching, and the real-time channel reauthorization handshake,
//! over injected collaborator seams (remote API, reactive store, transport,
//! navigation, embedding host shell).

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod integrations;
pub mod messages;
pub mod telemetry;
pub mod throttle;
pub mod validation;

pub mod models {
    pub mod account;
    pub mod credentials;
    pub mod session;
}

pub mod store {
    pub mod keys;
    pub mod memory;
    pub mod reactive;
}

pub mod api {
    pub mod client;
    pub mod codes;
    pub mod dispatch;
    pub mod queue;
    pub mod response;
}

pub mod services {
    pub mod pusher;
    pub mod sign_in;
    pub mod sign_out;
    pub mod stash;
}

pub use config::Config;
pub use context::SessionContext;
pub use controller::SessionController;
pub use error::{Result, SessionError};
pub use services::sign_out::SignOutOptions;
pub use store::keys::StoreKey;
pub use store::memory::MemoryStore;
pub use store::reactive::KeyValueStore;
