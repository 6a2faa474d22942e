use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{PrivilegeStore, RowFilter, StoreError};
use crate::forums::ForumId;
use crate::privileges::{Owner, PrivilegeId, PrivilegeRow, Privileges};

/// A [`PrivilegeStore`] that keeps all rows in memory.
///
/// Besides embedding, it records how it was queried, which makes it useful for
/// asserting on the engine's access patterns.
#[derive(Debug, Default)]
pub struct MemoryStore
{
	rows: Mutex<BTreeMap<PrivilegeId, PrivilegeRow>>,
	last_filter: Mutex<Option<RowFilter>>,
	fetches: AtomicUsize,
	offline: AtomicBool,
}

impl MemoryStore
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Creates a store pre-filled with `rows`.
	pub fn with_rows(rows: impl IntoIterator<Item = PrivilegeRow>) -> Self
	{
		let rows = rows
			.into_iter()
			.zip(1..)
			.map(|(row, id)| (PrivilegeId(id), row))
			.collect();

		Self { rows: Mutex::new(rows), ..Self::default() }
	}

	/// How many times [`PrivilegeStore::fetch()`] was called.
	pub fn fetch_count(&self) -> usize
	{
		self.fetches.load(Ordering::Relaxed)
	}

	/// The filter passed to the most recent [`PrivilegeStore::fetch()`].
	pub fn last_filter(&self) -> Option<RowFilter>
	{
		self.last_filter
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Makes every subsequent operation fail until the store is brought back
	/// online.
	pub fn set_offline(&self, offline: bool)
	{
		self.offline.store(offline, Ordering::Relaxed);
	}

	fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<PrivilegeId, PrivilegeRow>>, StoreError>
	{
		if self.offline.load(Ordering::Relaxed) {
			return Err(StoreError::Unavailable { reason: "memory store is offline".into() });
		}

		Ok(self.rows.lock().unwrap_or_else(PoisonError::into_inner))
	}
}

impl PrivilegeStore for MemoryStore
{
	#[tracing::instrument(level = "trace", skip(self), err)]
	async fn fetch(&self, filter: &RowFilter) -> Result<Vec<PrivilegeRow>, StoreError>
	{
		self.fetches.fetch_add(1, Ordering::Relaxed);
		*self.last_filter.lock().unwrap_or_else(PoisonError::into_inner) = Some(filter.clone());

		let rows = self
			.rows()?
			.values()
			.filter(|row| filter.matches(row))
			.cloned()
			.collect();

		Ok(rows)
	}

	async fn get(&self, id: PrivilegeId) -> Result<Option<PrivilegeRow>, StoreError>
	{
		Ok(self.rows()?.get(&id).cloned())
	}

	async fn find(&self, forum_id: ForumId, owner: Owner) -> Result<Option<PrivilegeId>, StoreError>
	{
		let id = self
			.rows()?
			.iter()
			.find(|(_, row)| row.forum_id == forum_id && row.owner() == Some(owner))
			.map(|(&id, _)| id);

		Ok(id)
	}

	async fn insert(&self, row: &PrivilegeRow) -> Result<PrivilegeId, StoreError>
	{
		let mut rows = self.rows()?;
		let id = rows
			.last_key_value()
			.map_or(PrivilegeId(1), |(&PrivilegeId(last), _)| PrivilegeId(last + 1));

		rows.insert(id, row.clone());

		Ok(id)
	}

	async fn update(
		&self,
		id: PrivilegeId,
		positive: Privileges,
		negative: Privileges,
	) -> Result<bool, StoreError>
	{
		let mut rows = self.rows()?;
		let Some(row) = rows.get_mut(&id) else {
			return Ok(false);
		};

		row.positive = positive;
		row.negative = negative;

		Ok(true)
	}

	async fn delete(&self, id: PrivilegeId) -> Result<bool, StoreError>
	{
		Ok(self.rows()?.remove(&id).is_some())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::privileges::{DISALLOW_ALL, Privilege};
	use crate::users::{GroupId, UserId};

	#[tokio::test]
	async fn insert_find_update_delete()
	{
		let store = MemoryStore::new();
		let row = PrivilegeRow::for_group(ForumId(1), GroupId(2), Privilege::Read, DISALLOW_ALL);

		let Ok(id) = store.insert(&row).await else {
			panic!("insert failed");
		};

		assert_eq!(id, PrivilegeId(1));
		assert_eq!(store.find(ForumId(1), Owner::Group(GroupId(2))).await.ok(), Some(Some(id)));
		assert_eq!(store.find(ForumId(1), Owner::User(UserId(2))).await.ok(), Some(None));

		assert_eq!(store.update(id, DISALLOW_ALL, Privilege::Read.into()).await.ok(), Some(true));
		assert_eq!(
			store.get(id).await.ok().flatten().map(|row| row.negative),
			Some(Privileges::from(Privilege::Read)),
		);

		assert_eq!(store.delete(id).await.ok(), Some(true));
		assert_eq!(store.delete(id).await.ok(), Some(false));
	}

	#[tokio::test]
	async fn fetch_is_recorded()
	{
		let store = MemoryStore::with_rows([
			PrivilegeRow::for_user(ForumId(1), UserId(1), Privilege::Read, DISALLOW_ALL),
			PrivilegeRow::for_user(ForumId(2), UserId(2), Privilege::Read, DISALLOW_ALL),
		]);

		let filter = RowFilter::new(UserId(1), []);
		let rows = store.fetch(&filter).await.ok().unwrap_or_default();

		assert_eq!(rows.len(), 1);
		assert_eq!(store.fetch_count(), 1);
		assert_eq!(store.last_filter(), Some(filter));
	}

	#[tokio::test]
	async fn offline_store_fails()
	{
		let store = MemoryStore::new();
		store.set_offline(true);

		assert!(matches!(
			store.fetch(&RowFilter::new(UserId(1), [])).await,
			Err(StoreError::Unavailable { .. }),
		));
	}
}
