pub mod constants;
pub mod error;
pub mod paths;
pub mod settings;

pub use constants::*;
pub use error::*;
pub use paths::*;
pub use settings::*;
