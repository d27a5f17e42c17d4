// Public API - what other modules can use
pub use frame::{parse_frame, FrameError};
pub use handler::websocket_handler;
pub use pump::{read_pump, write_pump, KEEPALIVE_INTERVAL};

// Internal modules
mod frame;
mod handler;
mod pump;
