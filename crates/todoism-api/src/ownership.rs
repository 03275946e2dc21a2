use tracing::warn;

use todoism_db::models::ItemRow;

use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// A resource with a single author.
pub trait Authored {
    fn author_id(&self) -> i64;
}

impl Authored for ItemRow {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Only the author may read or change a resource.
pub fn authorize<R: Authored>(user: &CurrentUser, resource: &R) -> Result<(), ApiError> {
    if resource.author_id() != user.id {
        warn!(
            "User {} denied access to a resource of user {}",
            user.id,
            resource.author_id()
        );
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
