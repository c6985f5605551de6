//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Router::group(name)
//!     → RouteGroup::get/post/.../any(pattern, handler, middleware)
//!     → table.rs (reject duplicate pattern + method)
//!     → trie.rs (insert pattern segments)
//!
//! Incoming Request (method, path):
//!     → router.rs (select group by mount path)
//!     → trie.rs (path → canonical pattern + params)
//!     → table.rs (pattern + method → entry, ANY first)
//!     → handler.rs (compose group and route middleware)
//!     → Return: composed handler, NotFound or MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving
//! - No regex: literal, `:param`, `*` and `**` segments only
//! - Deterministic: same input always matches same route
//! - Literal segments win over parameters, parameters over catch-alls

pub mod error;
pub mod group;
pub mod handler;
pub mod method;
pub mod router;
pub mod table;
pub mod trie;

pub use error::{DispatchError, RouteError};
pub use group::RouteGroup;
pub use handler::{compose, Handler, HandlerError, HandlerResult, Middleware};
pub use method::RouteMethod;
pub use router::{GroupMatch, ResolvedRoute, Router};
pub use table::{RouteEntry, RouteTable};
pub use trie::{Params, PathTrie, RouteMatch, TrieNode};
