//! Port traits: the seams between the update engine and the outside world.

pub mod config_port;
pub mod http_port;
pub mod input_port;
pub mod provider_port;
pub mod store_port;
