//! Configuration
//!
//! Settings come from CLI flags with environment fallbacks; a `.env` file is
//! read first when present.

pub mod cart;
pub mod logging;

pub use cart::CartConfig;
pub use logging::{LogFormat, LoggingConfig};

/// Load a `.env` file into the environment if one exists.
pub fn load_dotenv() {
    // A missing .env file is expected outside development.
    _ = dotenvy::dotenv();
}
