pub mod error;
pub mod types;
pub mod validate;

pub use error::{BoletimError, ErrorKind, Result};
pub use types::*;
pub use validate::{validate_request, YearRange};
