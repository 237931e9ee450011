pub mod config;
pub mod error;
pub mod key;
pub mod object;
pub mod types;
pub mod value;

pub use config::*;
pub use error::*;
pub use key::*;
pub use object::*;
pub use types::*;
pub use value::*;
