//! Role gate and per-resource ownership guard

use super::{AuthError, Identity, Role};
use crate::database::StoreError;
use std::future::Future;
use tracing::{error, warn};

/// A resource with an owning identity
pub trait Owned {
    fn owner_id(&self) -> &str;
}

/// Check a resolved identity against a route's required role set.
///
/// Pure predicate; no I/O.
pub fn authorize(identity: Option<&Identity>, required: &[Role]) -> Result<(), AuthError> {
    let identity = identity.ok_or(AuthError::Unauthenticated)?;

    if required.contains(&identity.role) {
        Ok(())
    } else {
        warn!(
            user = %identity.id,
            role = %identity.role,
            "role gate rejected request"
        );
        Err(AuthError::Forbidden)
    }
}

/// Load a resource through the supplied loader and confirm the caller owns
/// it, or holds the admin override.
///
/// On success the loaded resource is returned so the handler and the check
/// share a single store round trip. Loader failures propagate as
/// `StoreUnavailable` without diagnostic detail.
pub async fn check_ownership<'a, R, F, Fut>(
    resource_id: &'a str,
    identity: &Identity,
    loader: F,
) -> Result<R, AuthError>
where
    R: Owned,
    F: FnOnce(&'a str) -> Fut,
    Fut: Future<Output = Result<Option<R>, StoreError>>,
{
    let resource = loader(resource_id)
        .await
        .map_err(|err| {
            error!(
                resource = resource_id,
                error = %err,
                "resource load failed during ownership check"
            );
            AuthError::StoreUnavailable { detail: None }
        })?
        .ok_or(AuthError::NotFound)?;

    if resource.owner_id() != identity.id && identity.role != Role::Admin {
        warn!(
            resource = resource_id,
            user = %identity.id,
            "ownership check rejected request"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(resource)
}
