use sea_orm::{DatabaseConnection, DbErr};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::DEFAULT_ID_MAX_ATTEMPTS;
use crate::errors::{is_foreign_key_violation, is_unique_violation, ServiceError};
use crate::ids;

pub mod line_item_repository;
pub mod order_detail_repository;

pub use line_item_repository::LineItemRepository;
pub use order_detail_repository::OrderDetailRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

/// Produces a fresh id for a prefix.
pub type IdGenerator = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub fn default_id_generator() -> IdGenerator {
    Arc::new(ids::new_entity_id)
}

/// Shared connection handle plus id generation settings.
#[derive(Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
    id_generator: IdGenerator,
    max_id_attempts: u32,
}

impl std::fmt::Debug for BaseRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseRepository")
            .field("max_id_attempts", &self.max_id_attempts)
            .finish_non_exhaustive()
    }
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_generator: default_id_generator(),
            max_id_attempts: DEFAULT_ID_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    pub fn with_id_generator(mut self, generator: IdGenerator) -> Self {
        self.id_generator = generator;
        self
    }

    /// Inserts a record whose primary key is a prefixed id.
    ///
    /// A caller-supplied id is used as-is and a clash with it is reported
    /// straight away. Without one, a fresh id is generated for every attempt
    /// until the insert is accepted or `max_id_attempts` is used up.
    pub async fn insert_with_id_retry<M, F, Fut>(
        &self,
        prefix: &str,
        existing_id: &str,
        mut insert: F,
    ) -> Result<M, ServiceError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<M, DbErr>>,
    {
        if !existing_id.is_empty() {
            return insert(existing_id.to_string()).await.map_err(|err| {
                if is_unique_violation(&err) {
                    warn!(id = %existing_id, "supplied id already exists");
                    ServiceError::IdentifierCollision {
                        prefix: prefix.to_string(),
                        attempts: 1,
                    }
                } else {
                    map_write_error(err)
                }
            });
        }

        for attempt in 1..=self.max_id_attempts {
            let id = (self.id_generator)(prefix);
            match insert(id.clone()).await {
                Ok(model) => return Ok(model),
                Err(err) if is_unique_violation(&err) => {
                    warn!(%id, attempt, "generated '{}' id collided, regenerating", prefix);
                }
                Err(err) => return Err(map_write_error(err)),
            }
        }

        error!(
            "gave up inserting '{}' record after {} id collisions",
            prefix, self.max_id_attempts
        );
        Err(ServiceError::IdentifierCollision {
            prefix: prefix.to_string(),
            attempts: self.max_id_attempts,
        })
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Maps a failed insert or update; a missing parent row is a validation error.
pub(crate) fn map_write_error(err: DbErr) -> ServiceError {
    if is_foreign_key_violation(&err) {
        ServiceError::ValidationError(format!("referenced parent record does not exist: {}", err))
    } else {
        ServiceError::DatabaseError(err)
    }
}
