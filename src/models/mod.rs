pub mod application;
pub mod channel;

pub use application::*;
pub use channel::*;
