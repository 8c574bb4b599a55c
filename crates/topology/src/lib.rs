//! Topology announcements exchanged between instances over connectors,
//! and the registry that caches, persists and expires them.
pub mod announcement;
pub mod cached;
pub mod cluster;
pub mod config;
#[cfg(feature = "logger")]
pub mod logger;
pub mod registry;
pub mod store;
pub mod time;

pub use announcement::Announcement;
pub use cached::CachedAnnouncement;
pub use cluster::{ClusterView, Descriptor, Instance};
pub use config::Config;
pub use registry::{Registration, Registry, Rejection};
pub use store::Store;
pub use time::Timestamp;

/// Announcement protocol version.
///
/// Announcements carrying any other version are never registered.
pub const PROTOCOL_VERSION: i32 = 1;

/// Assert that an expression matches a pattern.
#[macro_export]
macro_rules! assert_matches {
    ($left:expr, $( $pattern:pat_param )|+ $( if $guard: expr )? $(,)?) => {
        match $left {
            $( $pattern )|+ $( if $guard )? => {}
            ref left => panic!(
                "assertion failed: `{:?}` does not match `{}`",
                left,
                stringify!($($pattern)|+ $(if $guard)?)
            ),
        }
    };
    ($left:expr, $( $pattern:pat_param )|+ $( if $guard: expr )?, $($arg:tt)+) => {
        match $left {
            $( $pattern )|+ $( if $guard )? => {}
            ref left => panic!(
                "assertion failed: `{:?}` does not match `{}`: {}",
                left,
                stringify!($($pattern)|+ $(if $guard)?),
                format_args!($($arg)+)
            ),
        }
    };
}
