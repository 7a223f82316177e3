pub mod config;
mod error;
mod http_layers;
mod jobs;
pub mod server;
pub mod state;
mod tools;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::ServerState;
