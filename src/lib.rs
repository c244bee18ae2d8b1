//! A New Year greeting card for the terminal.
//!
//! The creator types a name and a message and gets a link. Whoever opens
//! that link is walked from a dark screen through decorations and a
//! countdown to a celebration with their name, the message in pages, and a
//! sky of fireworks they can click to add more.

pub mod app;
pub mod audio;
pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod effects;
pub mod error;
pub mod link;
pub mod message;
pub mod view;

pub use app::{App, AppStep, Control};
pub use error::{Result, WishError};
pub use link::WishData;
