pub mod backend;
pub mod controller;
pub mod timer;
pub mod types;
pub mod websocket;

pub use backend::{MockVoiceBackend, UnconfiguredVoiceBackend, VoiceBackend, VoiceBackendError};
pub use controller::VoiceCallController;
pub use types::*;
pub use websocket::WebSocketVoiceBackend;
