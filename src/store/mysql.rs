use std::collections::BTreeSet;

use futures_util::{StreamExt as _, TryStreamExt as _};
use sqlx::Row as _;
use sqlx::mysql::MySqlRow;

use super::{PrivilegeStore, RowFilter, StoreError};
use crate::database::{DatabaseError, Pool, QueryBuilder};
use crate::forums::{ForumId, ForumProvider};
use crate::privileges::{Owner, PrivilegeId, PrivilegeRow, Privileges};
use crate::users::{GroupId, UserId};

/// A [`PrivilegeStore`] backed by the `ForumPrivileges` table.
///
/// It also serves as the [`ForumProvider`] (`Forums` table) and can look up a
/// user's group memberships (`UserGroups` table).
#[derive(Debug, Clone)]
pub struct MySqlStore
{
	pool: Pool,
}

impl MySqlStore
{
	pub fn new(pool: Pool) -> Self
	{
		Self { pool }
	}

	pub fn pool(&self) -> &Pool
	{
		&self.pool
	}

	/// Returns the groups `user_id` is a member of.
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn groups_of(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError>
	{
		sqlx::query_scalar("SELECT group_id FROM UserGroups WHERE user_id = ? ORDER BY group_id")
			.bind(user_id)
			.fetch_all(&self.pool)
			.await
			.map_err(StoreError::from)
	}
}

fn decode_row(row: &MySqlRow) -> Result<PrivilegeRow, sqlx::Error>
{
	Ok(PrivilegeRow {
		forum_id: row.try_get("forum_id")?,
		user_id: row.try_get("user_id")?,
		group_id: row.try_get("group_id")?,
		positive: row.try_get("positive")?,
		negative: row.try_get("negative")?,
	})
}

impl PrivilegeStore for MySqlStore
{
	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn fetch(&self, filter: &RowFilter) -> Result<Vec<PrivilegeRow>, StoreError>
	{
		let mut query = QueryBuilder::new(
			"SELECT forum_id, user_id, group_id, positive, negative
			 FROM ForumPrivileges
			 WHERE (user_id = ",
		);

		query.push_bind(filter.user_id);

		if !filter.group_ids.is_empty() {
			query.push(" OR group_id IN (");

			let mut separated = query.separated(", ");

			for &group_id in &filter.group_ids {
				separated.push_bind(group_id);
			}

			separated.push_unseparated(")");
		}

		query.push(")");

		if let Some(forum_ids) = &filter.forum_ids {
			if forum_ids.is_empty() {
				return Ok(Vec::new());
			}

			query.push(" AND forum_id IN (");

			let mut separated = query.separated(", ");

			for &forum_id in forum_ids {
				separated.push_bind(forum_id);
			}

			separated.push_unseparated(")");
		}

		let rows = query
			.build()
			.fetch(&self.pool)
			.map(|row| row.and_then(|row| decode_row(&row)))
			.try_collect::<Vec<_>>()
			.await?;

		tracing::trace!(count = rows.len(), "fetched privilege rows");

		Ok(rows)
	}

	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn get(&self, id: PrivilegeId) -> Result<Option<PrivilegeRow>, StoreError>
	{
		let row = sqlx::query(
			"SELECT forum_id, user_id, group_id, positive, negative
			 FROM ForumPrivileges
			 WHERE id = ?",
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(decode_row).transpose().map_err(StoreError::from)
	}

	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn find(&self, forum_id: ForumId, owner: Owner) -> Result<Option<PrivilegeId>, StoreError>
	{
		let query = match owner {
			Owner::User(user_id) => sqlx::query_scalar(
				"SELECT id FROM ForumPrivileges WHERE forum_id = ? AND user_id = ? LIMIT 1",
			)
			.bind(forum_id)
			.bind(user_id),
			Owner::Group(group_id) => sqlx::query_scalar(
				"SELECT id FROM ForumPrivileges
				 WHERE forum_id = ? AND group_id = ? AND user_id IS NULL
				 LIMIT 1",
			)
			.bind(forum_id)
			.bind(group_id),
		};

		query.fetch_optional(&self.pool).await.map_err(StoreError::from)
	}

	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn insert(&self, row: &PrivilegeRow) -> Result<PrivilegeId, StoreError>
	{
		let result = sqlx::query(
			"INSERT INTO ForumPrivileges (forum_id, user_id, group_id, positive, negative)
			 VALUES (?, ?, ?, ?, ?)",
		)
		.bind(row.forum_id)
		.bind(row.user_id)
		.bind(row.group_id)
		.bind(row.positive)
		.bind(row.negative)
		.execute(&self.pool)
		.await?;

		u32::try_from(result.last_insert_id())
			.map(PrivilegeId)
			.map_err(|error| DatabaseError::decode_column("id", error).into())
	}

	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn update(
		&self,
		id: PrivilegeId,
		positive: Privileges,
		negative: Privileges,
	) -> Result<bool, StoreError>
	{
		let result = sqlx::query(
			"UPDATE ForumPrivileges
			 SET positive = ?, negative = ?
			 WHERE id = ?",
		)
		.bind(positive)
		.bind(negative)
		.bind(id)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn delete(&self, id: PrivilegeId) -> Result<bool, StoreError>
	{
		let result = sqlx::query("DELETE FROM ForumPrivileges WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

impl ForumProvider for MySqlStore
{
	#[tracing::instrument(level = "debug", skip(self), err)]
	async fn all_forum_ids(&self) -> Result<BTreeSet<ForumId>, StoreError>
	{
		sqlx::query_scalar::<_, ForumId>("SELECT id FROM Forums")
			.fetch(&self.pool)
			.try_collect()
			.await
			.map_err(StoreError::from)
	}
}
