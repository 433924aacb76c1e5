//! Database access: TLS policies, connect options and the connection pool
//!
//! Everything here runs once at startup, except [`close_pool`] which runs
//! on shutdown.

mod options;
mod pool;
mod tls;

pub use options::connect_options;
pub use pool::{build_pool, close_pool};
pub use tls::{TlsMode, TlsPolicy, TlsRegistry, TrustAnchors};
