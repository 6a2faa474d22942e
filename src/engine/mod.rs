//! Privilege resolution.
//!
//! [`PrivilegeEngine`] turns a user and a set of forums into one
//! [`Privileges`] mask per forum. Rows owned by the user's groups are merged
//! first; rows owned by the user are layered on top, so a user row can both
//! re-grant what a group revoked and revoke what a group granted.
//!
//! The rows of the anonymous user are the same for every guest and are read
//! far more often than they change, so they are cached under a single key
//! (see [`EngineConfig::anonymous_cache_key`]). Rows of authenticated users
//! are never cached. Every write that touches an anonymous row goes through
//! the engine and purges that key.

use std::collections::BTreeSet;

use crate::cache::Cache;
use crate::forums::{AsForumId, ForumId, ForumProvider, HasForum};
use crate::privileges::{
	DISALLOW_ALL,
	Owner,
	PrivilegeId,
	PrivilegeMap,
	PrivilegeRef,
	PrivilegeRow,
	Privileges,
	join_bits,
	split_negative_positive,
};
use crate::store::{PrivilegeStore, RowFilter};
use crate::users::{GroupId, User, UserId};

mod config;
pub use config::{ANONYMOUS_CACHE_KEY, ANONYMOUS_CACHE_TTL, EngineConfig};

mod error;
pub use error::EngineError;

mod filter;
pub use filter::{FilterOperator, filter_forums};

/// Resolves, caches and edits forum privileges.
#[derive(Debug)]
pub struct PrivilegeEngine<S, C, F>
{
	store: S,
	cache: C,
	forums: F,
	config: EngineConfig,
}

impl<S, C, F> PrivilegeEngine<S, C, F>
where
	S: PrivilegeStore,
	C: Cache<Vec<PrivilegeRow>>,
	F: ForumProvider,
{
	pub fn new(store: S, cache: C, forums: F, config: EngineConfig) -> Self
	{
		Self { store, cache, forums, config }
	}

	pub fn store(&self) -> &S
	{
		&self.store
	}

	pub fn cache(&self) -> &C
	{
		&self.cache
	}

	pub fn forums(&self) -> &F
	{
		&self.forums
	}

	pub fn config(&self) -> &EngineConfig
	{
		&self.config
	}

	/// The identity guests are resolved as.
	pub fn anonymous_user(&self) -> User
	{
		User::anonymous(self.config.anonymous_user_id)
			.with_groups(self.config.anonymous_group_ids.iter().copied())
	}

	/// Resolves the privileges `user` has in each of `forums`.
	///
	/// The returned map has exactly one entry per distinct forum. Forums
	/// without any applicable rows map to [`DISALLOW_ALL`]. If `forums` is
	/// empty, neither the store nor the cache is accessed.
	#[tracing::instrument(
		level = "debug",
		skip_all,
		fields(user.id = %user.id(), user.authenticated = user.is_authenticated()),
		err
	)]
	pub async fn get_privileges<I>(&self, user: &User, forums: I) -> Result<PrivilegeMap, EngineError>
	where
		I: IntoIterator,
		I::Item: AsForumId,
	{
		let forum_ids = forums
			.into_iter()
			.map(|forum| forum.forum_id())
			.collect::<BTreeSet<_>>();

		if forum_ids.is_empty() {
			return Ok(PrivilegeMap::new());
		}

		let rows = if user.is_anonymous() {
			self.anonymous_rows(&forum_ids).await?
		} else {
			self.authenticated_rows(user, &forum_ids).await?
		};

		let forum_ids = Vec::from_iter(forum_ids);

		Ok(resolve(&forum_ids, &rows))
	}

	/// Resolves the privileges `user` has in a single forum.
	pub async fn get_forum_privileges(
		&self,
		user: &User,
		forum: impl AsForumId,
	) -> Result<Privileges, EngineError>
	{
		let forum_id = forum.forum_id();
		let privileges = self.get_privileges(user, [forum_id]).await?;

		Ok(privileges.get(&forum_id).copied().unwrap_or(DISALLOW_ALL))
	}

	/// Checks whether `user` has `privilege` in the forum `object` belongs to.
	///
	/// # Errors
	///
	/// Unknown privilege names are rejected before any I/O happens.
	#[tracing::instrument(level = "debug", skip_all, ret(level = "debug"), err)]
	pub async fn have_privilege(
		&self,
		user: &User,
		object: &impl HasForum,
		privilege: impl Into<PrivilegeRef>,
	) -> Result<bool, EngineError>
	{
		let wanted = privilege.into().resolve()?;
		let mask = self.get_forum_privileges(user, object.forum()).await?;

		Ok(mask.intersects(wanted))
	}

	/// Selects the `forums` for which `operator` holds for `privilege`.
	///
	/// If `privileges` is [`None`], they are resolved with
	/// [`get_privileges()`] first.
	///
	/// [`get_privileges()`]: PrivilegeEngine::get_privileges
	pub async fn filter<'f, T>(
		&self,
		user: &User,
		forums: &'f [T],
		privilege: impl Into<PrivilegeRef>,
		privileges: Option<&PrivilegeMap>,
		operator: FilterOperator,
	) -> Result<Vec<&'f T>, EngineError>
	where
		T: AsForumId,
	{
		let wanted = privilege.into().resolve()?;

		let filtered = match privileges {
			Some(privileges) => filter_forums(privileges, forums, wanted, operator),
			None => {
				let privileges = self.get_privileges(user, forums).await?;
				filter_forums(&privileges, forums, wanted, operator)
			},
		};

		Ok(filtered)
	}

	/// Selects the `forums` in which `user` has `privilege`.
	pub async fn filter_visible<'f, T>(
		&self,
		user: &User,
		forums: &'f [T],
		privilege: impl Into<PrivilegeRef>,
		privileges: Option<&PrivilegeMap>,
	) -> Result<Vec<&'f T>, EngineError>
	where
		T: AsForumId,
	{
		self.filter(user, forums, privilege, privileges, FilterOperator::Visible)
			.await
	}

	/// Selects the `forums` in which `user` lacks `privilege`.
	pub async fn filter_invisible<'f, T>(
		&self,
		user: &User,
		forums: &'f [T],
		privilege: impl Into<PrivilegeRef>,
		privileges: Option<&PrivilegeMap>,
	) -> Result<Vec<&'f T>, EngineError>
	where
		T: AsForumId,
	{
		self.filter(user, forums, privilege, privileges, FilterOperator::Invisible)
			.await
	}

	/// Stores a new privilege row.
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn create_privilege(&self, row: PrivilegeRow) -> Result<PrivilegeId, EngineError>
	{
		if row.owner().is_none() {
			return Err(EngineError::InvalidOwner);
		}

		let id = self.store.insert(&row).await?;

		tracing::debug!(%id, forum.id = %row.forum_id, "created privilege row");
		self.invalidate_if_anonymous(&row).await?;

		Ok(id)
	}

	/// Replaces the masks of an existing privilege row.
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn update_privilege(
		&self,
		id: PrivilegeId,
		positive: Privileges,
		negative: Privileges,
	) -> Result<(), EngineError>
	{
		let row = self
			.store
			.get(id)
			.await?
			.ok_or(EngineError::RowNotFound { id })?;

		if !self.store.update(id, positive, negative).await? {
			return Err(EngineError::RowNotFound { id });
		}

		tracing::debug!(%id, "updated privilege row");
		self.invalidate_if_anonymous(&row).await?;

		Ok(())
	}

	/// Deletes a privilege row and returns it.
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn delete_privilege(&self, id: PrivilegeId) -> Result<PrivilegeRow, EngineError>
	{
		let row = self
			.store
			.get(id)
			.await?
			.ok_or(EngineError::RowNotFound { id })?;

		if !self.store.delete(id).await? {
			return Err(EngineError::RowNotFound { id });
		}

		tracing::debug!(%id, "deleted privilege row");
		self.invalidate_if_anonymous(&row).await?;

		Ok(row)
	}

	/// Sets `owner`'s privileges in `forum_id` from the admin wire format.
	///
	/// `value` is a comma separated list of privilege bits; negative entries
	/// revoke, the rest grant (e.g. `"2,16,-256"`). The owner's row is created
	/// or updated accordingly, or deleted if nothing is left in it.
	///
	/// Returns the ID of the row, unless it was deleted (or never existed).
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn set_privilege(
		&self,
		forum_id: ForumId,
		owner: Owner,
		value: &str,
	) -> Result<Option<PrivilegeId>, EngineError>
	{
		let (negative, positive) = split_negative_positive(value);
		let existing = self.store.find(forum_id, owner).await?;

		match existing {
			None if positive.is_empty() && negative.is_empty() => Ok(None),
			None => {
				let row = PrivilegeRow::new(forum_id, owner, positive, negative);
				self.create_privilege(row).await.map(Some)
			},
			Some(id) if positive.is_empty() && negative.is_empty() => {
				self.delete_privilege(id).await?;
				Ok(None)
			},
			Some(id) => {
				self.update_privilege(id, positive, negative).await?;
				Ok(Some(id))
			},
		}
	}

	/// Purges the cached rows of the anonymous user.
	#[tracing::instrument(level = "debug", skip(self), err)]
	pub async fn invalidate_anonymous(&self) -> Result<(), EngineError>
	{
		self.cache.delete(&self.config.anonymous_cache_key).await?;
		tracing::debug!(key = &*self.config.anonymous_cache_key, "purged anonymous privileges");

		Ok(())
	}

	async fn invalidate_if_anonymous(&self, row: &PrivilegeRow) -> Result<(), EngineError>
	{
		if row.user_id == Some(self.config.anonymous_user_id) {
			self.invalidate_anonymous().await?;
		}

		Ok(())
	}

	/// Rows of the anonymous user for every forum, served from the cache.
	///
	/// The snapshot is always fetched for the configured anonymous identity,
	/// whichever guest asked for it. Whether the rows came from the cache or the
	/// store, only rows for `forum_ids` are returned.
	async fn anonymous_rows(
		&self,
		forum_ids: &BTreeSet<ForumId>,
	) -> Result<Vec<PrivilegeRow>, EngineError>
	{
		let key = &*self.config.anonymous_cache_key;

		let mut rows = match self.cache.get(key).await? {
			Some(rows) => {
				tracing::trace!(key, "anonymous privileges cache hit");
				rows
			},
			None => {
				tracing::debug!(key, "anonymous privileges cache miss");

				let filter = RowFilter::new(
					self.config.anonymous_user_id,
					self.config.anonymous_group_ids.iter().copied(),
				);
				let rows = self.store.fetch(&filter).await?;

				self.cache
					.set(key, rows.clone(), self.config.anonymous_cache_ttl)
					.await?;

				rows
			},
		};

		rows.retain(|row| forum_ids.contains(&row.forum_id));

		Ok(rows)
	}

	/// Rows of an authenticated user, straight from the store.
	///
	/// The forum filter is left out if every known forum was requested.
	async fn authenticated_rows(
		&self,
		user: &User,
		forum_ids: &BTreeSet<ForumId>,
	) -> Result<Vec<PrivilegeRow>, EngineError>
	{
		let group_ids = self.group_ids(user);
		let mut filter = RowFilter::new(user.id(), group_ids);

		if *forum_ids == self.forums.all_forum_ids().await? {
			tracing::trace!("all forums requested; skipping forum filter");
		} else {
			filter = filter.in_forums(forum_ids.iter().copied());
		}

		Ok(self.store.fetch(&filter).await?)
	}

	/// The user's groups, plus the registered group if they are logged in.
	fn group_ids(&self, user: &User) -> BTreeSet<GroupId>
	{
		let mut group_ids = user.groups().collect::<BTreeSet<_>>();

		if user.is_authenticated() {
			group_ids.insert(self.config.registered_group_id);
		}

		group_ids
	}

	/// Whether `user_id` is the identity guests are resolved as.
	pub fn is_anonymous_user(&self, user_id: UserId) -> bool
	{
		user_id == self.config.anonymous_user_id
	}
}

/// Merges group rows, then user rows on top of them, for `forum_ids`.
fn resolve(forum_ids: &[ForumId], rows: &[PrivilegeRow]) -> PrivilegeMap
{
	let seed = forum_ids
		.iter()
		.map(|&forum_id| (forum_id, DISALLOW_ALL))
		.collect::<PrivilegeMap>();

	let (user_rows, group_rows) = rows
		.iter()
		.partition::<Vec<_>, _>(|row| row.is_user_row());

	let privileges = join_bits(seed, forum_ids, group_rows);

	join_bits(privileges, forum_ids, user_rows)
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::privileges::Privilege;

	const FORUM: ForumId = ForumId(1);

	#[test]
	fn user_rows_override_group_rows()
	{
		let rows = [
			PrivilegeRow::for_group(FORUM, GroupId(1), Privilege::Read | Privilege::Reply, Privilege::Moderate),
			PrivilegeRow::for_user(FORUM, UserId(5), Privilege::Moderate, Privilege::Reply),
		];

		let privileges = resolve(&[FORUM], &rows);

		assert_eq!(privileges[&FORUM], Privilege::Read | Privilege::Moderate);
	}

	#[test]
	fn every_requested_forum_is_present()
	{
		let privileges = resolve(&[ForumId(1), ForumId(2)], &[]);

		assert_eq!(privileges.len(), 2);
		assert!(privileges.values().all(|privileges| privileges.is_empty()));
	}

	#[test]
	fn group_ids_include_registered_group()
	{
		let engine = PrivilegeEngine::new(
			crate::store::MemoryStore::new(),
			crate::cache::MemoryCache::new(),
			crate::forums::StaticForums::default(),
			EngineConfig::builder().registered_group_id(GroupId(9)).build(),
		);

		let member = User::authenticated(UserId(5), [GroupId(3)]);
		let guest = User::anonymous(UserId(1)).with_groups([GroupId(4)]);

		assert_eq!(engine.group_ids(&member), BTreeSet::from([GroupId(3), GroupId(9)]));
		assert_eq!(engine.group_ids(&guest), BTreeSet::from([GroupId(4)]));
		assert!(engine.is_anonymous_user(UserId(1)));
	}
}
