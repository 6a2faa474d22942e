//! Privilege row storage.
//!
//! [`PrivilegeStore`] is the seam between the engine and wherever privilege
//! rows live. [`MySqlStore`] reads and writes the `ForumPrivileges` table;
//! [`MemoryStore`] keeps everything in process.

use std::error::Error;

use crate::database::DatabaseError;
use crate::forums::ForumId;
use crate::privileges::{Owner, PrivilegeId, PrivilegeRow, Privileges};
use crate::users::{GroupId, UserId};

mod memory;
pub use memory::MemoryStore;

mod mysql;
pub use mysql::MySqlStore;

/// An error returned by a [`PrivilegeStore`].
#[derive(Debug, Display, Error, From)]
pub enum StoreError
{
	#[display("{_0}")]
	Database(DatabaseError),

	#[from(ignore)]
	#[display("privilege store unavailable: {reason}")]
	Unavailable
	{
		reason: Box<dyn Error + Send + Sync>,
	},
}

impl From<sqlx::Error> for StoreError
{
	fn from(error: sqlx::Error) -> Self
	{
		Self::Database(DatabaseError::from(error))
	}
}

/// Selects the privilege rows that apply to one user.
///
/// A row matches if it belongs to `user_id` or to any of `group_ids`. If
/// `forum_ids` is set, only rows for those forums match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter
{
	pub user_id: UserId,
	pub group_ids: Vec<GroupId>,
	pub forum_ids: Option<Vec<ForumId>>,
}

impl RowFilter
{
	pub fn new(user_id: UserId, group_ids: impl IntoIterator<Item = GroupId>) -> Self
	{
		Self { user_id, group_ids: group_ids.into_iter().collect(), forum_ids: None }
	}

	/// Restricts the filter to rows for `forum_ids`.
	#[must_use]
	pub fn in_forums(mut self, forum_ids: impl IntoIterator<Item = ForumId>) -> Self
	{
		self.forum_ids = Some(forum_ids.into_iter().collect());
		self
	}

	/// Checks whether `row` is selected by this filter.
	pub fn matches(&self, row: &PrivilegeRow) -> bool
	{
		let owner_matches = row.user_id == Some(self.user_id)
			|| row
				.group_id
				.is_some_and(|group_id| self.group_ids.contains(&group_id));

		let forum_matches = self
			.forum_ids
			.as_ref()
			.is_none_or(|forum_ids| forum_ids.contains(&row.forum_id));

		owner_matches && forum_matches
	}
}

/// Persistent storage for privilege rows.
///
/// Implementations are not responsible for cache invalidation; writes should
/// go through [`PrivilegeEngine`] so the anonymous snapshot is purged.
///
/// [`PrivilegeEngine`]: crate::PrivilegeEngine
pub trait PrivilegeStore
{
	/// Returns every row selected by `filter`.
	async fn fetch(&self, filter: &RowFilter) -> Result<Vec<PrivilegeRow>, StoreError>;

	/// Returns the row with the given ID.
	async fn get(&self, id: PrivilegeId) -> Result<Option<PrivilegeRow>, StoreError>;

	/// Returns the ID of the row `owner` has for `forum_id`, if any.
	async fn find(&self, forum_id: ForumId, owner: Owner) -> Result<Option<PrivilegeId>, StoreError>;

	/// Stores a new row.
	async fn insert(&self, row: &PrivilegeRow) -> Result<PrivilegeId, StoreError>;

	/// Replaces the masks of an existing row.
	///
	/// Returns whether the row existed.
	async fn update(
		&self,
		id: PrivilegeId,
		positive: Privileges,
		negative: Privileges,
	) -> Result<bool, StoreError>;

	/// Deletes a row.
	///
	/// Returns whether the row existed.
	async fn delete(&self, id: PrivilegeId) -> Result<bool, StoreError>;
}

impl<S> PrivilegeStore for &S
where
	S: ?Sized + PrivilegeStore,
{
	async fn fetch(&self, filter: &RowFilter) -> Result<Vec<PrivilegeRow>, StoreError>
	{
		S::fetch(*self, filter).await
	}

	async fn get(&self, id: PrivilegeId) -> Result<Option<PrivilegeRow>, StoreError>
	{
		S::get(*self, id).await
	}

	async fn find(&self, forum_id: ForumId, owner: Owner) -> Result<Option<PrivilegeId>, StoreError>
	{
		S::find(*self, forum_id, owner).await
	}

	async fn insert(&self, row: &PrivilegeRow) -> Result<PrivilegeId, StoreError>
	{
		S::insert(*self, row).await
	}

	async fn update(
		&self,
		id: PrivilegeId,
		positive: Privileges,
		negative: Privileges,
	) -> Result<bool, StoreError>
	{
		S::update(*self, id, positive, negative).await
	}

	async fn delete(&self, id: PrivilegeId) -> Result<bool, StoreError>
	{
		S::delete(*self, id).await
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::privileges::{DISALLOW_ALL, Privilege};

	#[test]
	fn filter_matches_user_or_group()
	{
		let filter = RowFilter::new(UserId(7), [GroupId(1), GroupId(2)]);

		let own = PrivilegeRow::for_user(ForumId(1), UserId(7), Privilege::Read, DISALLOW_ALL);
		let foreign = PrivilegeRow::for_user(ForumId(1), UserId(8), Privilege::Read, DISALLOW_ALL);
		let group = PrivilegeRow::for_group(ForumId(1), GroupId(2), Privilege::Read, DISALLOW_ALL);
		let other_group = PrivilegeRow::for_group(ForumId(1), GroupId(3), Privilege::Read, DISALLOW_ALL);

		assert!(filter.matches(&own));
		assert!(!filter.matches(&foreign));
		assert!(filter.matches(&group));
		assert!(!filter.matches(&other_group));
	}

	#[test]
	fn filter_restricts_forums()
	{
		let filter = RowFilter::new(UserId(7), []).in_forums([ForumId(2)]);

		let inside = PrivilegeRow::for_user(ForumId(2), UserId(7), Privilege::Read, DISALLOW_ALL);
		let outside = PrivilegeRow::for_user(ForumId(3), UserId(7), Privilege::Read, DISALLOW_ALL);

		assert!(filter.matches(&inside));
		assert!(!filter.matches(&outside));
	}
}
