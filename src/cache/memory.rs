use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{Cache, CacheError};

#[derive(Debug)]
struct Entry<V>
{
	value: V,
	expires_at: Instant,
}

/// An in-process [`Cache`].
///
/// Expired entries are dropped lazily when they are read.
#[derive(Debug)]
pub struct MemoryCache<V>
{
	entries: Mutex<HashMap<Box<str>, Entry<V>>>,
	reads: AtomicUsize,
	writes: AtomicUsize,
	offline: AtomicBool,
}

impl<V> Default for MemoryCache<V>
{
	fn default() -> Self
	{
		Self {
			entries: Mutex::default(),
			reads: AtomicUsize::new(0),
			writes: AtomicUsize::new(0),
			offline: AtomicBool::new(false),
		}
	}
}

impl<V> MemoryCache<V>
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Whether a live entry exists for `key`.
	pub fn contains(&self, key: &str) -> bool
	{
		self.lock()
			.get(key)
			.is_some_and(|entry| entry.expires_at > Instant::now())
	}

	/// How many times [`Cache::get()`] was called.
	pub fn read_count(&self) -> usize
	{
		self.reads.load(Ordering::Relaxed)
	}

	/// How many times [`Cache::set()`] was called.
	pub fn write_count(&self) -> usize
	{
		self.writes.load(Ordering::Relaxed)
	}

	/// Makes every subsequent operation fail until the cache is brought back
	/// online.
	pub fn set_offline(&self, offline: bool)
	{
		self.offline.store(offline, Ordering::Relaxed);
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<Box<str>, Entry<V>>>
	{
		self.entries.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn entries(&self) -> Result<MutexGuard<'_, HashMap<Box<str>, Entry<V>>>, CacheError>
	{
		if self.offline.load(Ordering::Relaxed) {
			return Err(CacheError::new("memory cache is offline"));
		}

		Ok(self.lock())
	}
}

impl<V> Cache<V> for MemoryCache<V>
where
	V: Clone,
{
	async fn get(&self, key: &str) -> Result<Option<V>, CacheError>
	{
		self.reads.fetch_add(1, Ordering::Relaxed);

		let mut entries = self.entries()?;
		let Some(entry) = entries.get(key) else {
			return Ok(None);
		};

		if entry.expires_at <= Instant::now() {
			tracing::trace!(key, "dropping expired cache entry");
			entries.remove(key);
			return Ok(None);
		}

		Ok(Some(entry.value.clone()))
	}

	async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError>
	{
		self.writes.fetch_add(1, Ordering::Relaxed);

		let expires_at = Instant::now()
			.checked_add(ttl)
			.ok_or_else(|| CacheError::new("cache TTL out of range"))?;

		self.entries()?.insert(key.into(), Entry { value, expires_at });

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), CacheError>
	{
		self.entries()?.remove(key);

		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	const HOUR: Duration = Duration::from_secs(3600);

	#[tokio::test]
	async fn set_get_delete()
	{
		let cache = MemoryCache::new();

		assert_eq!(cache.get("key").await.ok(), Some(None));
		assert!(cache.set("key", 42_u32, HOUR).await.is_ok());
		assert_eq!(cache.get("key").await.ok(), Some(Some(42)));
		assert!(cache.contains("key"));

		assert!(cache.delete("key").await.is_ok());
		assert!(!cache.contains("key"));
		assert!(cache.delete("key").await.is_ok());

		assert_eq!(cache.read_count(), 2);
		assert_eq!(cache.write_count(), 1);
	}

	#[tokio::test]
	async fn entries_expire()
	{
		let cache = MemoryCache::new();

		assert!(cache.set("key", "value", Duration::ZERO).await.is_ok());
		assert!(!cache.contains("key"));
		assert_eq!(cache.get("key").await.ok(), Some(None));
	}

	#[tokio::test]
	async fn offline_cache_fails()
	{
		let cache = MemoryCache::<u32>::new();
		cache.set_offline(true);

		assert!(cache.get("key").await.is_err());
		assert!(cache.set("key", 1, HOUR).await.is_err());

		cache.set_offline(false);
		assert!(cache.set("key", 1, HOUR).await.is_ok());
	}
}
