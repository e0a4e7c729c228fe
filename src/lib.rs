pub mod config;
pub mod error;
pub mod db;
pub mod store;
pub mod graph;
pub mod http;

pub use config::Config;
pub use error::{BondgraphError, Result};
pub use graph::{derive_implicit_links, network_stats, Link, NetworkStats};
pub use store::{Bond, EndpointRef, Person};
