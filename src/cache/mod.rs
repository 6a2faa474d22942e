//! Key/value caching with expiry.
//!
//! The engine only caches one thing (the privilege rows of the anonymous user),
//! but it does so through the [`Cache`] trait so deployments can share that
//! entry between processes.

use std::error::Error;
use std::time::Duration;

mod memory;
pub use memory::MemoryCache;

/// An error returned by a [`Cache`].
#[derive(Debug, Display, Error)]
#[display("cache unavailable: {reason}")]
pub struct CacheError
{
	reason: Box<dyn Error + Send + Sync>,
}

impl CacheError
{
	pub fn new(reason: impl Into<Box<dyn Error + Send + Sync>>) -> Self
	{
		Self { reason: reason.into() }
	}
}

/// A cache storing values of type `V` under string keys.
pub trait Cache<V>
{
	/// Returns the value stored under `key`, unless it is missing or expired.
	async fn get(&self, key: &str) -> Result<Option<V>, CacheError>;

	/// Stores `value` under `key` for `ttl`.
	async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError>;

	/// Removes `key`. Removing a missing key is not an error.
	async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

impl<C, V> Cache<V> for &C
where
	C: ?Sized + Cache<V>,
{
	async fn get(&self, key: &str) -> Result<Option<V>, CacheError>
	{
		C::get(*self, key).await
	}

	async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError>
	{
		C::set(*self, key, value, ttl).await
	}

	async fn delete(&self, key: &str) -> Result<(), CacheError>
	{
		C::delete(*self, key).await
	}
}
