mod config;
mod dtype;
mod error;
mod problem;
mod swizzle;

pub use config::*;
pub use dtype::*;
pub use error::*;
pub use problem::*;
pub use swizzle::*;
