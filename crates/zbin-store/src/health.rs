//! Backend reachability probe, used at daemon startup and by `/readyz`.

use opendal::{ErrorKind, Operator};

use crate::StoreError;

/// List the operator root. A root that does not exist yet is reachable:
/// fs and S3 prefixes only appear after the first write.
pub async fn check_health(op: &Operator) -> Result<(), StoreError> {
    match op.list("/").await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            Err(e.into())
        }
    }
}
