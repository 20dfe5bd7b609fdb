mod config;
mod error;
mod status;
mod types;

pub use config::*;
pub use error::*;
pub use status::*;
pub use types::*;

pub use url::Url;
