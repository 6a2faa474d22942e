//! Users and the groups they belong to.
//!
//! The engine does not own users; it only needs to know who is asking, whether
//! they are logged in, and which groups they are a member of.

use std::collections::BTreeSet;

use crate::macros::make_id;

make_id! {
	/// A unique identifier for a user.
	UserId as u32
}

make_id! {
	/// A unique identifier for a group.
	GroupId as u32
}

/// The identity privileges are resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User
{
	id: UserId,
	authenticated: bool,
	groups: BTreeSet<GroupId>,
}

impl User
{
	/// The guest identity.
	///
	/// Every visitor who is not logged in shares this identity, so its
	/// privilege rows are cached globally.
	pub fn anonymous(id: UserId) -> Self
	{
		Self { id, authenticated: false, groups: BTreeSet::new() }
	}

	/// A logged in user that is a member of `groups`.
	pub fn authenticated(id: UserId, groups: impl IntoIterator<Item = GroupId>) -> Self
	{
		Self { id, authenticated: true, groups: groups.into_iter().collect() }
	}

	/// Adds extra group memberships to the user.
	#[must_use]
	pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self
	{
		self.groups.extend(groups);
		self
	}

	pub fn id(&self) -> UserId
	{
		self.id
	}

	pub fn is_authenticated(&self) -> bool
	{
		self.authenticated
	}

	pub fn is_anonymous(&self) -> bool
	{
		!self.authenticated
	}

	/// The groups this user is an explicit member of.
	pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_
	{
		self.groups.iter().copied()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn anonymous_has_no_groups()
	{
		let user = User::anonymous(UserId(1));

		assert!(user.is_anonymous());
		assert_eq!(user.groups().count(), 0);
	}

	#[test]
	fn groups_are_deduplicated()
	{
		let user = User::authenticated(UserId(7), [GroupId(3), GroupId(2), GroupId(3)]);

		assert!(user.is_authenticated());
		assert_eq!(user.groups().collect::<Vec<_>>(), [GroupId(2), GroupId(3)]);
	}

	#[test]
	fn ids_parse_from_strings()
	{
		assert_eq!("42".parse::<UserId>(), Ok(UserId(42)));
		assert!("forty-two".parse::<GroupId>().is_err());
	}
}
