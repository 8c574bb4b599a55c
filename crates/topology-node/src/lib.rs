pub mod runtime;

pub use runtime::Runtime;
pub use topology::{Announcement, Config, Registration, Registry, Timestamp};

/// Node version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
