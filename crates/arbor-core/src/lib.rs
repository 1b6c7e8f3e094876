pub mod address;
pub mod config;
pub mod error;
pub mod packet;

pub use address::{Address, Segment};
pub use config::{ArborConfig, LoggingConfig, RoutingSettings};
pub use error::CoreError;
pub use packet::Packet;
