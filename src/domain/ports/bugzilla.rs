//! Bugzilla port.
//!
//! The engine reads bugs and writes see-also links through this trait
//! only; the HTTP client lives outside the core.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::ServiceResult;
use crate::domain::models::bug::Bug;

/// Port for the Bugzilla REST API.
#[async_trait]
pub trait BugzillaService: Send + Sync {
    /// Fetch the current state of `bug`.
    ///
    /// Webhook payloads can be stale or trimmed; the runner refreshes the
    /// bug once before doing anything else.
    async fn refresh_bug_data(&self, bug: &Bug) -> ServiceResult<Bug>;

    /// Add `url` to the bug's see-also field.
    async fn add_see_also(&self, bug_id: u64, url: &str) -> ServiceResult<Value>;

    /// Browser URL of a bug.
    fn bug_url(&self, bug_id: u64) -> String;
}
