//! Position Store
//!
//! Row access for one ordered relation. No business rules live here: the
//! ordering engine decides which positions to write, this module writes them.
//! Every method runs on a caller-supplied connection (normally the open
//! transaction of a [`ContainerScope`](crate::ContainerScope)); none opens a
//! transaction of its own.

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use encore_core::types::{EntryId, MembershipRow, QueueMember, RelationKind, SongId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::marker::PhantomData;

/// Static description of one membership table
pub trait Relation: Send + Sync + 'static {
    /// What a row points at
    type Member: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    const KIND: RelationKind;
    const TABLE: &'static str;
    const CONTAINER_COLUMN: &'static str;
    /// Columns that together hold the member; one value per column
    const MEMBER_COLUMNS: &'static [&'static str];
    /// Whether a member may appear at most once per container
    const UNIQUE_MEMBERS: bool;

    /// Values for [`Self::MEMBER_COLUMNS`], in the same order
    fn member_values(member: &Self::Member) -> Vec<Option<i64>>;

    fn decode_member(row: &SqliteRow) -> Result<Self::Member>;
}

/// playlist_songs: (playlist, song), unique per playlist
pub struct PlaylistSongs;

impl Relation for PlaylistSongs {
    type Member = SongId;

    const KIND: RelationKind = RelationKind::PlaylistSongs;
    const TABLE: &'static str = "playlist_songs";
    const CONTAINER_COLUMN: &'static str = "playlist_id";
    const MEMBER_COLUMNS: &'static [&'static str] = &["song_id"];
    const UNIQUE_MEMBERS: bool = true;

    fn member_values(member: &SongId) -> Vec<Option<i64>> {
        vec![Some(*member)]
    }

    fn decode_member(row: &SqliteRow) -> Result<SongId> {
        Ok(row.try_get("song_id")?)
    }
}

/// album_tracks: (album, song), unique per album and across albums
pub struct AlbumTracks;

impl Relation for AlbumTracks {
    type Member = SongId;

    const KIND: RelationKind = RelationKind::AlbumTracks;
    const TABLE: &'static str = "album_tracks";
    const CONTAINER_COLUMN: &'static str = "album_id";
    const MEMBER_COLUMNS: &'static [&'static str] = &["song_id"];
    const UNIQUE_MEMBERS: bool = true;

    fn member_values(member: &SongId) -> Vec<Option<i64>> {
        vec![Some(*member)]
    }

    fn decode_member(row: &SqliteRow) -> Result<SongId> {
        Ok(row.try_get("song_id")?)
    }
}

/// play_queue: (user, song | podcast), repeats allowed
pub struct PlayQueue;

impl Relation for PlayQueue {
    type Member = QueueMember;

    const KIND: RelationKind = RelationKind::PlayQueue;
    const TABLE: &'static str = "play_queue";
    const CONTAINER_COLUMN: &'static str = "user_id";
    const MEMBER_COLUMNS: &'static [&'static str] = &["song_id", "podcast_id"];
    const UNIQUE_MEMBERS: bool = false;

    fn member_values(member: &QueueMember) -> Vec<Option<i64>> {
        vec![member.song_id(), member.podcast_id()]
    }

    fn decode_member(row: &SqliteRow) -> Result<QueueMember> {
        let song_id: Option<i64> = row.try_get("song_id")?;
        let podcast_id: Option<i64> = row.try_get("podcast_id")?;
        QueueMember::from_parts(song_id, podcast_id)
            .map_err(|e| StorageError::corrupt(Self::TABLE, e.to_string()))
    }
}

/// Row access for one relation, always inside the caller's transaction
#[async_trait]
pub trait PositionStore: Send + Sync {
    type Member: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn kind(&self) -> RelationKind;

    fn unique_members(&self) -> bool;

    /// All rows of a container, position ascending
    async fn list_by_container(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
    ) -> Result<Vec<MembershipRow<Self::Member>>>;

    /// Highest position in the container, 0 if empty
    async fn max_position(&self, conn: &mut SqliteConnection, container_id: i64) -> Result<i64>;

    async fn contains_member(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &Self::Member,
    ) -> Result<bool>;

    /// Container currently holding `member`, searched across all containers
    async fn holder_of(
        &self,
        conn: &mut SqliteConnection,
        member: &Self::Member,
    ) -> Result<Option<i64>>;

    async fn insert(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &Self::Member,
        position: i64,
    ) -> Result<EntryId>;

    /// Delete the row holding `member`; returns the position it occupied
    async fn delete_by_member(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &Self::Member,
    ) -> Result<Option<i64>>;

    /// Delete one row by identity; returns the position it occupied
    async fn delete_by_entry_id(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        entry_id: EntryId,
    ) -> Result<Option<i64>>;

    /// Delete every row of the container; returns how many went
    async fn delete_all(&self, conn: &mut SqliteConnection, container_id: i64) -> Result<u64>;

    async fn set_position(
        &self,
        conn: &mut SqliteConnection,
        entry_id: EntryId,
        position: i64,
    ) -> Result<()>;

    /// Add `delta` to every position greater than `after`
    async fn shift_after(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        after: i64,
        delta: i64,
    ) -> Result<u64>;
}

/// `SQLite`-backed [`PositionStore`] for any [`Relation`]
pub struct SqlPositionStore<R> {
    _relation: PhantomData<fn() -> R>,
}

impl<R: Relation> SqlPositionStore<R> {
    pub fn new() -> Self {
        Self {
            _relation: PhantomData,
        }
    }

    fn member_select() -> String {
        R::MEMBER_COLUMNS.join(", ")
    }

    /// `song_id IS ? AND podcast_id IS ?`; `IS` so NULL columns match NULL binds
    fn member_predicate() -> String {
        R::MEMBER_COLUMNS
            .iter()
            .map(|column| format!("{column} IS ?"))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn decode_row(row: &SqliteRow) -> Result<MembershipRow<R::Member>> {
        Ok(MembershipRow {
            entry_id: row.try_get("id")?,
            container_id: row.try_get(R::CONTAINER_COLUMN)?,
            member: R::decode_member(row)?,
            position: row.try_get("position")?,
            inserted_at: row.try_get("added_at")?,
        })
    }
}

impl<R: Relation> Default for SqlPositionStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Relation> PositionStore for SqlPositionStore<R> {
    type Member = R::Member;

    fn kind(&self) -> RelationKind {
        R::KIND
    }

    fn unique_members(&self) -> bool {
        R::UNIQUE_MEMBERS
    }

    async fn list_by_container(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
    ) -> Result<Vec<MembershipRow<R::Member>>> {
        let sql = format!(
            "SELECT id, {container}, {members}, position, added_at
             FROM {table}
             WHERE {container} = ?
             ORDER BY position",
            container = R::CONTAINER_COLUMN,
            members = Self::member_select(),
            table = R::TABLE,
        );

        let rows = sqlx::query(&sql)
            .bind(container_id)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::decode_row).collect()
    }

    async fn max_position(&self, conn: &mut SqliteConnection, container_id: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX(position), 0) FROM {table} WHERE {container} = ?",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
        );

        let max: i64 = sqlx::query_scalar(&sql)
            .bind(container_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(max)
    }

    async fn contains_member(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &R::Member,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {container} = ? AND {predicate})",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
            predicate = Self::member_predicate(),
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(container_id);
        for value in R::member_values(member) {
            query = query.bind(value);
        }

        Ok(query.fetch_one(&mut *conn).await? != 0)
    }

    async fn holder_of(
        &self,
        conn: &mut SqliteConnection,
        member: &R::Member,
    ) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT {container} FROM {table} WHERE {predicate} ORDER BY id LIMIT 1",
            container = R::CONTAINER_COLUMN,
            table = R::TABLE,
            predicate = Self::member_predicate(),
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in R::member_values(member) {
            query = query.bind(value);
        }

        Ok(query.fetch_optional(&mut *conn).await?)
    }

    async fn insert(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &R::Member,
        position: i64,
    ) -> Result<EntryId> {
        let placeholders = vec!["?"; R::MEMBER_COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {table} ({container}, {members}, position, added_at)
             VALUES (?, {placeholders}, ?, ?)",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
            members = Self::member_select(),
        );

        let mut query = sqlx::query(&sql).bind(container_id);
        for value in R::member_values(member) {
            query = query.bind(value);
        }

        let result = query
            .bind(position)
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *conn)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn delete_by_member(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        member: &R::Member,
    ) -> Result<Option<i64>> {
        let sql = format!(
            "DELETE FROM {table}
             WHERE id = (
                SELECT id FROM {table}
                WHERE {container} = ? AND {predicate}
                ORDER BY position
                LIMIT 1
             )
             RETURNING position",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
            predicate = Self::member_predicate(),
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(container_id);
        for value in R::member_values(member) {
            query = query.bind(value);
        }

        Ok(query.fetch_optional(&mut *conn).await?)
    }

    async fn delete_by_entry_id(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        entry_id: EntryId,
    ) -> Result<Option<i64>> {
        let sql = format!(
            "DELETE FROM {table} WHERE id = ? AND {container} = ? RETURNING position",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
        );

        let position = sqlx::query_scalar::<_, i64>(&sql)
            .bind(entry_id)
            .bind(container_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(position)
    }

    async fn delete_all(&self, conn: &mut SqliteConnection, container_id: i64) -> Result<u64> {
        let sql = format!(
            "DELETE FROM {table} WHERE {container} = ?",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
        );

        let result = sqlx::query(&sql)
            .bind(container_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn set_position(
        &self,
        conn: &mut SqliteConnection,
        entry_id: EntryId,
        position: i64,
    ) -> Result<()> {
        let sql = format!("UPDATE {table} SET position = ? WHERE id = ?", table = R::TABLE);

        sqlx::query(&sql)
            .bind(position)
            .bind(entry_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn shift_after(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        after: i64,
        delta: i64,
    ) -> Result<u64> {
        // Park the shifted rows on negative positions, then flip them back.
        // Neither statement can hit the (container, position) unique index
        // whatever order SQLite visits the rows in.
        let park = format!(
            "UPDATE {table} SET position = -(position + ?) WHERE {container} = ? AND position > ?",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
        );
        let flip = format!(
            "UPDATE {table} SET position = -position WHERE {container} = ? AND position < 0",
            table = R::TABLE,
            container = R::CONTAINER_COLUMN,
        );

        let shifted = sqlx::query(&park)
            .bind(delta)
            .bind(container_id)
            .bind(after)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        sqlx::query(&flip)
            .bind(container_id)
            .execute(&mut *conn)
            .await?;

        Ok(shifted)
    }
}
