//! Forum privilege engine.
//!
//! Computes, caches and evaluates per-user, per-forum access rights from a
//! sparse table of privilege rows. Each row grants (`positive`) and revokes
//! (`negative`) a set of [`Privilege`] bits for one forum, either for a single
//! user or for a whole group. Resolving a user against a set of forums yields
//! one [`Privileges`] mask per forum, which callers then test against the
//! capability they need.
//!
//! The entry point is [`PrivilegeEngine`]. It is generic over the row store
//! ([`store::PrivilegeStore`]), the cache ([`cache::Cache`]) and the forum
//! provider ([`forums::ForumProvider`]), so the same resolution logic runs
//! against MySQL in production and against in-memory collaborators in tests.

#[macro_use]
extern crate derive_more;

#[macro_use]
extern crate bon;

mod macros;

pub mod privileges;
pub use privileges::{
	DISALLOW_ALL,
	Privilege,
	PrivilegeMap,
	PrivilegeRef,
	PrivilegeRow,
	Privileges,
	UnknownPrivilege,
};

pub mod users;
pub use users::{GroupId, User, UserId};

pub mod forums;
pub use forums::{Forum, ForumId, HasForum, Topic};

pub mod cache;
pub mod database;
pub mod store;

pub mod engine;
pub use engine::{EngineConfig, EngineError, FilterOperator, PrivilegeEngine};
