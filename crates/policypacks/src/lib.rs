pub mod apply;
pub mod error;
pub mod pack;

pub use apply::{apply, apply_named};
pub use error::PolicyPackError;
pub use pack::Pack;
