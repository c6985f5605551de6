//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging → Register routes → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received or ServerHandle::stop → Stop accepting → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - No process-wide server singleton: every server owns its shutdown channel
//! - Route registration errors are fatal before the listener is bound

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
