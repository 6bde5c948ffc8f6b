pub mod errors;

pub use errors::{ParseError, RtspError};
