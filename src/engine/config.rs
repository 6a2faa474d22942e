use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::users::{GroupId, UserId};

/// The cache key under which the anonymous user's privilege rows are stored.
pub const ANONYMOUS_CACHE_KEY: &str = "forum/acls/anonymous";

/// How long the anonymous user's privilege rows are cached for (24 hours).
pub const ANONYMOUS_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Site specific identities the engine needs to know about.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EngineConfig
{
	/// The user every guest is resolved as.
	#[builder(default = UserId(1))]
	pub anonymous_user_id: UserId,

	/// The groups the anonymous user is a member of.
	#[builder(into, default)]
	pub anonymous_group_ids: Vec<GroupId>,

	/// The group every authenticated user is implicitly a member of.
	#[builder(default = GroupId(1))]
	pub registered_group_id: GroupId,

	#[builder(into, default = Box::from(ANONYMOUS_CACHE_KEY))]
	pub anonymous_cache_key: Box<str>,

	#[builder(default = ANONYMOUS_CACHE_TTL)]
	#[serde(with = "seconds")]
	pub anonymous_cache_ttl: Duration,
}

impl Default for EngineConfig
{
	fn default() -> Self
	{
		Self::builder().build()
	}
}

/// TTLs are written as a number of seconds.
mod seconds
{
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub(super) fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(ttl.as_secs())
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}
