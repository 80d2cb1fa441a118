pub mod auth;
pub mod config_gen;
pub mod jobs;
pub mod queue;
pub mod status;
