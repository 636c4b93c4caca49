pub mod branch;
pub mod error;
pub mod git;
pub mod orchestration;
pub mod store;
pub mod ui;

pub use error::{GitRelError, Result};
