pub mod caption;
pub mod completion;
pub mod config;
pub mod error;
pub mod host;
pub mod image;
pub mod page;
pub mod prompt;
pub mod routes;
pub mod selection;
pub mod vision;

pub use config::Config;
pub use routes::{app, AppState};
