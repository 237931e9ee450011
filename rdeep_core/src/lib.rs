pub mod classifier;
pub mod equal;
pub mod equal_except;
pub mod omit;
pub mod rules;
mod visited;

#[cfg(feature = "formats")]
pub mod convert;

pub use classifier::{classify, is_atomic, Kind};
pub use equal::deep_equal;
pub use equal_except::deep_equal_except;
pub use omit::{deep_omit, OmitOptions};
pub use rules::IgnoreRules;
