pub mod controller;
pub mod controls;
pub mod document;
pub mod message;
pub mod session;
pub mod state;
pub mod store;
pub mod streamer;

pub use controller::ChatController;
