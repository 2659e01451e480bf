//! directory-search - user and group lookup against a remote directory service.
//!
//! Two operations, `search_users` and `search_groups`, dispatch one request to
//! a Jira-style directory service, normalize the returned records into
//! canonical `UserRecord` / `GroupRecord` values, and absorb failures into an
//! empty result while reporting them to an injected `DiagnosticSink`.
//!
//! ```text
//! caller ──→ [DirectorySearch] ──→ [RequestDispatcher] ──→ directory service
//!                  │      │
//!                  │      └──→ [normalize] ──→ Vec<UserRecord | GroupRecord>
//!                  └──→ [DiagnosticSink] (failures, malformed responses)
//! ```

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod search;
pub mod utils;

pub use diagnostics::{DiagnosticSink, NullSink, RecordingSink, TracingSink};
pub use dispatch::{HttpDispatcher, MockDispatcher, RequestDispatcher};
pub use error::{SearchError, SearchFailure, ShapeMismatch};
pub use normalize::{GroupRecord, RecordKind, UserRecord};
pub use search::{DirectorySearch, GroupSearchOptions, UserSearchOptions};
