//! Document store for schedules, routes and users.
//!
//! Each collection keeps storage order (insertion order). Every write
//! touches a single collection; the only multi-record write is the bulk
//! user delete, which reports how many records it removed.
//!
//! With a snapshot file configured, each successful mutation is written to
//! disk before it becomes visible. A failed write leaves the in-memory state
//! unchanged.

mod error;
mod snapshot;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{RecordId, Role, Route, RouteDraft, Schedule, ScheduleDraft, User};

pub use error::StoreError;
use snapshot::{Collections, SnapshotFile};

/// Shared handle to the store. Clones refer to the same data.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<Collections>>,
    snapshot: Option<Arc<SnapshotFile>>,
}

impl Store {
    /// Create an empty store that lives only in memory.
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            snapshot: None,
        }
    }

    /// Open a store backed by a JSON snapshot file.
    ///
    /// The file is created on the first write if it doesn't exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file = SnapshotFile::new(path);
        let collections = file.load().await?;

        info!(
            path = %file.path().display(),
            schedules = collections.schedules.len(),
            routes = collections.routes.len(),
            users = collections.users.len(),
            "opened store snapshot"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(collections)),
            snapshot: Some(Arc::new(file)),
        })
    }

    /// Path of the backing snapshot, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref().map(SnapshotFile::path)
    }

    /// Apply a mutation to a copy of the collections, persist it, then
    /// publish it.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;

        if let Some(file) = &self.snapshot {
            file.save(&next).await?;
        }

        *guard = next;
        Ok(out)
    }

    // ---- schedules ----

    pub async fn insert_schedule(&self, draft: ScheduleDraft) -> Result<Schedule, StoreError> {
        let schedule = Schedule::from_draft(RecordId::generate(), draft);
        let stored = schedule.clone();
        self.mutate(move |c| {
            c.schedules.push(stored);
            Ok(())
        })
        .await?;
        Ok(schedule)
    }

    /// All schedules, in storage order.
    pub async fn schedules(&self) -> Vec<Schedule> {
        self.inner.read().await.schedules.clone()
    }

    pub async fn schedule(&self, id: &RecordId) -> Option<Schedule> {
        self.inner
            .read()
            .await
            .schedules
            .iter()
            .find(|s| &s.id == id)
            .cloned()
    }

    /// Schedules whose start, end and date equal the arguments exactly.
    pub async fn find_schedules(&self, from: &str, to: &str, date: &str) -> Vec<Schedule> {
        self.inner
            .read()
            .await
            .schedules
            .iter()
            .filter(|s| s.bus_start_location == from && s.bus_end_location == to && s.bus_date == date)
            .cloned()
            .collect()
    }

    /// Remove a schedule, returning it if it existed.
    pub async fn delete_schedule(&self, id: &RecordId) -> Result<Option<Schedule>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.schedules, |s| &s.id == id)))
            .await
    }

    // ---- routes ----

    pub async fn insert_route(&self, draft: RouteDraft) -> Result<Route, StoreError> {
        let route = Route::from_draft(RecordId::generate(), draft);
        let stored = route.clone();
        self.mutate(move |c| {
            c.routes.push(stored);
            Ok(())
        })
        .await?;
        Ok(route)
    }

    /// All routes, in storage order.
    pub async fn routes(&self) -> Vec<Route> {
        self.inner.read().await.routes.clone()
    }

    pub async fn delete_route(&self, id: &RecordId) -> Result<Option<Route>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.routes, |r| &r.id == id)))
            .await
    }

    // ---- users ----

    /// Insert a user with a fresh id.
    ///
    /// Email uniqueness is checked under the same write lock as the insert.
    pub async fn insert_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Result<User, StoreError> {
        let user = User {
            id: RecordId::generate(),
            name,
            email,
            password_hash,
            role,
        };
        let stored = user.clone();
        self.mutate(move |c| {
            if c.users.iter().any(|u| u.email == stored.email) {
                return Err(StoreError::DuplicateEmail);
            }
            c.users.push(stored);
            Ok(())
        })
        .await?;
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Users in storage order, optionally restricted to one role.
    pub async fn users(&self, role: Option<Role>) -> Vec<User> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect()
    }

    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn delete_user(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        self.mutate(|c| Ok(take_where(&mut c.users, |u| &u.id == id)))
            .await
    }

    /// Remove every user whose id is in `ids`. Unknown ids are ignored.
    ///
    /// Returns the number of users removed.
    pub async fn delete_users(&self, ids: &[RecordId]) -> Result<usize, StoreError> {
        let ids: HashSet<&RecordId> = ids.iter().collect();
        self.mutate(|c| {
            let before = c.users.len();
            c.users.retain(|u| !ids.contains(&u.id));
            Ok(before - c.users.len())
        })
        .await
    }
}

/// Remove and return the first element matching `pred`.
fn take_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let idx = items.iter().position(pred)?;
    Some(items.remove(idx))
}
