//! Ordering Engine
//!
//! Append, insert-at-head, remove with compaction and bulk reorder over one
//! [`PositionStore`]. Each mutating call runs in its own
//! [`ContainerScope`](crate::ContainerScope) and either commits whole or
//! leaves the container untouched.
//!
//! After every call the container's positions are exactly `1..=N`.

use crate::coordinator::Coordinator;
use crate::error::{Result as StorageResult, StorageError};
use crate::positions::PositionStore;
use encore_core::{EncoreError, EntryId, MemberRef, MembershipRow, Placement, Result};
use sqlx::SqliteConnection;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// Dense 1-based ordering over one relation
pub struct OrderingEngine<S> {
    store: S,
    coordinator: Coordinator,
}

impl<S: PositionStore> OrderingEngine<S> {
    pub fn new(store: S, coordinator: Coordinator) -> Self {
        Self { store, coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Current rows, position ascending
    ///
    /// Reads a committed snapshot without taking the container lock.
    pub async fn list(&self, container_id: i64) -> Result<Vec<MembershipRow<S::Member>>> {
        let mut conn = self
            .coordinator
            .pool()
            .acquire()
            .await
            .map_err(StorageError::from)?;
        Ok(self.store.list_by_container(&mut *conn, container_id).await?)
    }

    /// Place `member` after the current last row
    pub async fn append(&self, container_id: i64, member: &S::Member) -> Result<Placement> {
        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = self.append_locked(scope.conn(), container_id, member).await;
        let placement = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            member = %member,
            position = placement.position,
            "appended"
        );
        Ok(placement)
    }

    /// Append several members in request order, all or none
    pub async fn append_many(
        &self,
        container_id: i64,
        members: &[S::Member],
    ) -> Result<Vec<Placement>> {
        if members.is_empty() {
            return Ok(Vec::new());
        }
        if self.store.unique_members() {
            let duplicates = duplicate_keys(members);
            if !duplicates.is_empty() {
                return Err(EncoreError::Validation {
                    message: "request lists the same member more than once".to_string(),
                    invalid: Vec::new(),
                    missing: Vec::new(),
                    duplicates,
                });
            }
        }

        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = async {
            let mut placements = Vec::with_capacity(members.len());
            for member in members {
                placements.push(self.append_locked(scope.conn(), container_id, member).await?);
            }
            Ok::<_, EncoreError>(placements)
        }
        .await;
        let placements = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            count = placements.len(),
            "appended batch"
        );
        Ok(placements)
    }

    /// Place `member` at position 1, moving every existing row down one slot
    pub async fn insert_at_head(&self, container_id: i64, member: &S::Member) -> Result<Placement> {
        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = self.insert_at_head_locked(scope.conn(), container_id, member).await;
        let placement = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            member = %member,
            "inserted at head"
        );
        Ok(placement)
    }

    /// Delete one row and close the gap it leaves
    ///
    /// Returns the removed row's former position.
    pub async fn remove(&self, container_id: i64, target: &MemberRef<S::Member>) -> Result<i64> {
        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = self.remove_locked(scope.conn(), container_id, target).await;
        let position = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            position,
            "removed"
        );
        Ok(position)
    }

    /// Replace the order with `ordered`, a permutation of the current members
    ///
    /// Only meaningful where a member appears at most once per container;
    /// other relations reorder by entry id.
    pub async fn bulk_reorder(&self, container_id: i64, ordered: &[S::Member]) -> Result<()> {
        if !self.store.unique_members() {
            return Err(EncoreError::validation(format!(
                "{} may hold a member more than once; reorder by entry id",
                self.store.kind().container_entity()
            )));
        }
        self.reorder_by(container_id, ordered, |row| row.member.clone())
            .await
    }

    /// Replace the order with `ordered`, a permutation of the current entry ids
    pub async fn bulk_reorder_entries(&self, container_id: i64, ordered: &[EntryId]) -> Result<()> {
        self.reorder_by(container_id, ordered, |row| row.entry_id).await
    }

    /// Delete every row of the container; returns how many went
    pub async fn clear(&self, container_id: i64) -> Result<u64> {
        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = self
            .store
            .delete_all(scope.conn(), container_id)
            .await
            .map_err(EncoreError::from);
        let removed = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            removed,
            "cleared"
        );
        Ok(removed)
    }

    async fn append_locked(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &S::Member,
    ) -> Result<Placement> {
        self.reject_present(conn, container_id, member).await?;

        let position = self.store.max_position(conn, container_id).await? + 1;
        let entry_id = match self.store.insert(conn, container_id, member, position).await {
            Ok(entry_id) => entry_id,
            Err(err) => return Err(self.insert_error(conn, err, container_id, member).await),
        };

        Ok(Placement { entry_id, position })
    }

    async fn insert_at_head_locked(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &S::Member,
    ) -> Result<Placement> {
        self.reject_present(conn, container_id, member).await?;

        let rows = self.store.list_by_container(conn, container_id).await?;
        // Highest first, so each row moves into a slot that is already free
        for row in rows.iter().rev() {
            self.store
                .set_position(conn, row.entry_id, row.position + 1)
                .await?;
        }

        let entry_id = match self.store.insert(conn, container_id, member, 1).await {
            Ok(entry_id) => entry_id,
            Err(err) => return Err(self.insert_error(conn, err, container_id, member).await),
        };

        Ok(Placement {
            entry_id,
            position: 1,
        })
    }

    async fn remove_locked(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        target: &MemberRef<S::Member>,
    ) -> Result<i64> {
        let removed = match target {
            MemberRef::Member(member) => {
                self.store
                    .delete_by_member(conn, container_id, member)
                    .await?
            }
            MemberRef::Entry(entry_id) => {
                self.store
                    .delete_by_entry_id(conn, container_id, *entry_id)
                    .await?
            }
        };

        let position = removed.ok_or_else(|| {
            let key = match target {
                MemberRef::Member(member) => member.to_string(),
                MemberRef::Entry(entry_id) => entry_id.to_string(),
            };
            EncoreError::not_found(self.store.kind().member_entity(), key)
        })?;

        self.store.shift_after(conn, container_id, position, -1).await?;
        Ok(position)
    }

    async fn reorder_by<K>(
        &self,
        container_id: i64,
        ordered: &[K],
        key_of: fn(&MembershipRow<S::Member>) -> K,
    ) -> Result<()>
    where
        K: Clone + Eq + Hash + Display + Send + Sync,
    {
        // Rejected before taking the lock
        let duplicates = duplicate_keys(ordered);
        if !duplicates.is_empty() {
            return Err(permutation_error(Vec::new(), Vec::new(), duplicates));
        }

        let mut scope = self.coordinator.lock(self.store.kind(), container_id).await?;
        let outcome = self
            .reorder_locked(scope.conn(), container_id, ordered, key_of)
            .await;
        let changed = scope.finish(outcome).await?;

        tracing::debug!(
            relation = %self.store.kind(),
            container_id,
            len = ordered.len(),
            changed,
            "reordered"
        );
        Ok(())
    }

    async fn reorder_locked<K>(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        ordered: &[K],
        key_of: fn(&MembershipRow<S::Member>) -> K,
    ) -> Result<usize>
    where
        K: Clone + Eq + Hash + Display + Send + Sync,
    {
        let rows = self.store.list_by_container(conn, container_id).await?;
        let current: Vec<K> = rows.iter().map(key_of).collect();
        validate_permutation(&current, ordered)?;

        let by_key: HashMap<K, &MembershipRow<S::Member>> =
            current.into_iter().zip(rows.iter()).collect();

        let moves: Vec<(EntryId, i64)> = ordered
            .iter()
            .zip(1_i64..)
            .filter_map(|(key, position)| {
                let row = by_key[key];
                (row.position != position).then_some((row.entry_id, position))
            })
            .collect();

        // Park moved rows on negative slots first so no intermediate write
        // lands on a position another row still holds
        for &(entry_id, position) in &moves {
            self.store.set_position(conn, entry_id, -position).await?;
        }
        for &(entry_id, position) in &moves {
            self.store.set_position(conn, entry_id, position).await?;
        }

        Ok(moves.len())
    }

    async fn reject_present(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &S::Member,
    ) -> Result<()> {
        if self.store.unique_members()
            && self.store.contains_member(conn, container_id, member).await?
        {
            return Err(self.duplicate(container_id, member));
        }
        Ok(())
    }

    fn duplicate(&self, container_id: i64, member: &S::Member) -> EncoreError {
        EncoreError::duplicate_member(
            format!("{} {}", self.store.kind().container_entity(), container_id),
            member,
        )
    }

    /// A unique violation names whichever container holds the member, which
    /// differs from `container_id` when the index spans containers
    async fn insert_error(
        &self,
        conn: &mut SqliteConnection,
        err: StorageError,
        container_id: i64,
        member: &S::Member,
    ) -> EncoreError {
        if !err.is_unique_violation() {
            return err.into();
        }
        match self.holder(conn, container_id, member).await {
            Ok(holder) => self.duplicate(holder, member),
            Err(lookup_err) => lookup_err.into(),
        }
    }

    async fn holder(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &S::Member,
    ) -> StorageResult<i64> {
        if self.store.contains_member(conn, container_id, member).await? {
            return Ok(container_id);
        }
        Ok(self
            .store
            .holder_of(conn, member)
            .await?
            .unwrap_or(container_id))
    }
}

/// Keys that occur more than once, each reported once, in first-seen order
fn duplicate_keys<K: Eq + Hash + Display>(keys: &[K]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(keys.len());
    let mut reported = HashSet::new();
    keys.iter()
        .filter(|key| !seen.insert(*key) && reported.insert(*key))
        .map(ToString::to_string)
        .collect()
}

/// Check that `requested` is exactly a permutation of `current`
///
/// # Errors
///
/// `Validation` naming every invalid, missing and duplicated key.
pub fn validate_permutation<K: Eq + Hash + Display>(current: &[K], requested: &[K]) -> Result<()> {
    let current_set: HashSet<&K> = current.iter().collect();
    let requested_set: HashSet<&K> = requested.iter().collect();

    let invalid: Vec<String> = requested
        .iter()
        .filter(|key| !current_set.contains(key))
        .map(ToString::to_string)
        .collect();
    let missing: Vec<String> = current
        .iter()
        .filter(|key| !requested_set.contains(key))
        .map(ToString::to_string)
        .collect();
    let duplicates = duplicate_keys(requested);

    if invalid.is_empty()
        && missing.is_empty()
        && duplicates.is_empty()
        && requested.len() == current.len()
    {
        return Ok(());
    }

    Err(permutation_error(invalid, missing, duplicates))
}

fn permutation_error(
    invalid: Vec<String>,
    missing: Vec<String>,
    duplicates: Vec<String>,
) -> EncoreError {
    let mut problems = Vec::new();
    if !invalid.is_empty() {
        problems.push(format!("not in container: {}", invalid.join(", ")));
    }
    if !missing.is_empty() {
        problems.push(format!("missing: {}", missing.join(", ")));
    }
    if !duplicates.is_empty() {
        problems.push(format!("duplicated: {}", duplicates.join(", ")));
    }

    EncoreError::Validation {
        message: format!(
            "order must list every current member exactly once ({})",
            problems.join("; ")
        ),
        invalid,
        missing,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(err: EncoreError) -> (Vec<String>, Vec<String>, Vec<String>) {
        match err {
            EncoreError::Validation {
                invalid,
                missing,
                duplicates,
                ..
            } => (invalid, missing, duplicates),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn permutation_in_any_order_is_accepted() {
        assert!(validate_permutation(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_permutation(&[1, 2, 3], &[1, 2, 3]).is_ok());
        assert!(validate_permutation::<i64>(&[], &[]).is_ok());
    }

    #[test]
    fn missing_member_is_named() {
        let err = validate_permutation(&[1, 2, 3], &[1, 2]).unwrap_err();
        let (invalid, missing, duplicates) = details(err);
        assert!(invalid.is_empty());
        assert_eq!(missing, vec!["3"]);
        assert!(duplicates.is_empty());
    }

    #[test]
    fn duplicate_member_is_named_once() {
        let err = validate_permutation(&[1, 2, 3], &[1, 2, 3, 3, 3]).unwrap_err();
        let (invalid, missing, duplicates) = details(err);
        assert!(invalid.is_empty());
        assert!(missing.is_empty());
        assert_eq!(duplicates, vec!["3"]);
    }

    #[test]
    fn extraneous_member_is_invalid() {
        let err = validate_permutation(&[1, 2], &[1, 2, 9]).unwrap_err();
        let (invalid, _, _) = details(err);
        assert_eq!(invalid, vec!["9"]);
    }

    #[test]
    fn swapped_member_reports_both_sides() {
        let err = validate_permutation(&[1, 2, 3], &[1, 2, 4]).unwrap_err();
        let (invalid, missing, _) = details(err);
        assert_eq!(invalid, vec!["4"]);
        assert_eq!(missing, vec!["3"]);
    }

    #[test]
    fn empty_request_against_members_lists_them_all() {
        let err = validate_permutation(&[5, 6], &[]).unwrap_err();
        let (_, missing, _) = details(err);
        assert_eq!(missing, vec!["5", "6"]);
    }

    #[test]
    fn message_summarizes_problems() {
        let err = validate_permutation(&[1, 2], &[2, 2]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing: 1"), "{message}");
        assert!(message.contains("duplicated: 2"), "{message}");
    }
}
