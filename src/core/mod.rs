pub mod constant;

mod error;
pub use error::Error;

mod result;
pub use result::ResultExt;
