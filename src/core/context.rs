use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;
use crate::core::library::{CatalogError, CatalogResult};

// RequestContext travels with every service and repository call. Dropping the
// future of a call cancels the outstanding storage work; the deadline bounds it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub deadline: Option<Instant>,
}

impl RequestContext {
    pub fn background() -> Self {
        RequestContext {
            request_id: Uuid::new_v4().to_string(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        RequestContext {
            request_id: Uuid::new_v4().to_string(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    // within runs a storage future under the context deadline.
    pub async fn within<T, E, F>(&self, fut: F) -> CatalogResult<T>
        where F: Future<Output=Result<T, E>>, E: Into<CatalogError> {
        // an expired request never starts new storage work
        if self.is_expired() {
            return Err(self.deadline_exceeded());
        }
        match self.deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, fut).await {
                    Ok(res) => res.map_err(Into::into),
                    Err(_) => Err(self.deadline_exceeded()),
                }
            }
            None => fut.await.map_err(Into::into),
        }
    }

    fn deadline_exceeded(&self) -> CatalogError {
        CatalogError::unavailable(
            format!("deadline exceeded for request {}", self.request_id).as_str(),
            Some("deadline_exceeded".to_string()), true)
    }
}
