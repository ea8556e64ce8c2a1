pub mod cancel;
pub mod download;
pub mod extract;
pub mod manifest;
pub mod progress;
pub mod resolve;
pub mod session;
