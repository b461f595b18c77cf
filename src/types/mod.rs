//! Public request and result types.

pub mod input;
pub mod options;
pub mod results;

pub use input::{AudioInput, ImageInput};
pub use options::*;
pub use results::*;
