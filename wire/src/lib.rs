pub mod frame;
pub mod name;
pub mod wire;

pub use frame::{d_max, producer_base};
pub use name::{Component, Name, NameError};
pub use wire::{Request, Response};
