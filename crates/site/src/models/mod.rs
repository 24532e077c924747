//! Types kept in the server session.

pub mod session;

pub use session::{Flash, FlashKind, LocalAdmin, keys, set_flash, take_flash};
