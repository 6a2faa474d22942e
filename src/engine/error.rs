use crate::cache::CacheError;
use crate::privileges::{PrivilegeId, UnknownPrivilege};
use crate::store::StoreError;

/// Errors returned by the [`PrivilegeEngine`].
///
/// Failures of the store or the cache are passed through as-is; the engine
/// never turns them into a denial.
///
/// [`PrivilegeEngine`]: super::PrivilegeEngine
#[derive(Debug, Display, Error, From)]
pub enum EngineError
{
	#[display("{_0}")]
	Store(StoreError),

	#[display("{_0}")]
	Cache(CacheError),

	#[display("{_0}")]
	UnknownPrivilege(UnknownPrivilege),

	#[from(ignore)]
	#[display("privilege row {id} does not exist")]
	RowNotFound
	{
		id: PrivilegeId
	},

	#[from(ignore)]
	#[display("privilege row must belong to either a user or a group")]
	InvalidOwner,
}
