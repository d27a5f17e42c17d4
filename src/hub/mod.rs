// Public API - what other modules can use
pub use client::{ClientHandle, ClientId, ClientState, OUTBOUND_QUEUE_CAPACITY};
pub use dispatcher::{Deregistration, Hub, HubError, HubHandle};

// Internal modules
mod client;
mod dispatcher;
