pub mod config;
pub mod error;
pub mod preview;
pub mod rig;
pub mod weights;

pub use error::{BoneToolsError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
