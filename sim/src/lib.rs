pub mod cli;
pub mod driver;
pub mod error;

pub use cli::Cli;
pub use driver::Driver;
pub use error::DriverError;

#[cfg(test)]
mod scenario;
