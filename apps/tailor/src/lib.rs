//! Resume tailoring workflow client: drives the generation service and keeps
//! the session state a front end renders.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod process_log;
pub mod service_client;
pub mod skills;
pub mod state;
pub mod view;

pub use pipeline::Controller;
pub use state::Session;
