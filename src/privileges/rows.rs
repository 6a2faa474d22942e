//! Privilege rows.
//!
//! A row overrides the privileges of one user or one group inside one forum.
//! `positive` bits are granted, `negative` bits are revoked. Both masks are
//! always non-negative; a revocation is expressed by setting bits in
//! `negative`, never by a negative number.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{DISALLOW_ALL, PrivilegeMap, Privileges};
use crate::forums::ForumId;
use crate::macros::make_id;
use crate::users::{GroupId, UserId};

make_id! {
	/// A unique identifier for a privilege row.
	PrivilegeId as u32
}

/// Who a privilege row applies to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner
{
	#[display("user {_0}")]
	User(UserId),

	#[display("group {_0}")]
	Group(GroupId),
}

/// One `(forum, user-or-group, positive, negative)` override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeRow
{
	pub forum_id: ForumId,
	pub user_id: Option<UserId>,
	pub group_id: Option<GroupId>,
	pub positive: Privileges,
	pub negative: Privileges,
}

impl PrivilegeRow
{
	pub fn new(forum_id: ForumId, owner: Owner, positive: Privileges, negative: Privileges) -> Self
	{
		let (user_id, group_id) = match owner {
			Owner::User(user_id) => (Some(user_id), None),
			Owner::Group(group_id) => (None, Some(group_id)),
		};

		Self { forum_id, user_id, group_id, positive, negative }
	}

	/// A user specific rule.
	pub fn for_user(
		forum_id: ForumId,
		user_id: UserId,
		positive: impl Into<Privileges>,
		negative: impl Into<Privileges>,
	) -> Self
	{
		Self::new(forum_id, Owner::User(user_id), positive.into(), negative.into())
	}

	/// A group wide rule.
	pub fn for_group(
		forum_id: ForumId,
		group_id: GroupId,
		positive: impl Into<Privileges>,
		negative: impl Into<Privileges>,
	) -> Self
	{
		Self::new(forum_id, Owner::Group(group_id), positive.into(), negative.into())
	}

	/// Returns who this row applies to.
	///
	/// Storage does not guarantee that exactly one of `user_id` and `group_id`
	/// is set. A row with a user wins; a row with neither has no owner.
	pub fn owner(&self) -> Option<Owner>
	{
		match (self.user_id, self.group_id) {
			(Some(user_id), _) => Some(Owner::User(user_id)),
			(None, Some(group_id)) => Some(Owner::Group(group_id)),
			(None, None) => None,
		}
	}

	/// Whether this row overrides a single user rather than a group.
	pub fn is_user_row(&self) -> bool
	{
		self.user_id.is_some()
	}
}

/// Merges `rows` into `acc`.
///
/// `acc` must already contain an entry for every forum in `forum_ids`. Every
/// row's positive bits are added to its forum first; afterwards, the union of
/// all negative bits of each forum's rows is removed from that forum once.
/// A negative bit therefore revokes a privilege even if another row in the same
/// batch grants it. Rows for forums outside of `forum_ids` are ignored.
pub fn join_bits<'r, I>(mut acc: PrivilegeMap, forum_ids: &[ForumId], rows: I) -> PrivilegeMap
where
	I: IntoIterator<Item = &'r PrivilegeRow>,
{
	let mut negative = forum_ids
		.iter()
		.map(|&forum_id| (forum_id, DISALLOW_ALL))
		.collect::<HashMap<_, _>>();

	for row in rows {
		let (Some(granted), Some(revoked)) =
			(acc.get_mut(&row.forum_id), negative.get_mut(&row.forum_id))
		else {
			continue;
		};

		*granted |= row.positive;
		*revoked |= row.negative;
	}

	for (forum_id, revoked) in negative {
		if let Some(granted) = acc.get_mut(&forum_id) {
			*granted -= revoked;
		}
	}

	acc
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::privileges::Privilege;

	const FORUM: ForumId = ForumId(5);
	const OTHER_FORUM: ForumId = ForumId(6);

	fn seeded(forum_ids: &[ForumId]) -> PrivilegeMap
	{
		forum_ids.iter().map(|&id| (id, DISALLOW_ALL)).collect()
	}

	#[test]
	fn positive_bits_are_combined()
	{
		let rows = [
			PrivilegeRow::for_group(FORUM, GroupId(1), Privilege::Read, DISALLOW_ALL),
			PrivilegeRow::for_group(FORUM, GroupId(2), Privilege::Reply, DISALLOW_ALL),
		];

		let result = join_bits(seeded(&[FORUM]), &[FORUM], &rows);

		assert_eq!(result[&FORUM], Privilege::Read | Privilege::Reply);
	}

	#[test]
	fn negative_on_any_row_revokes()
	{
		let rows = [
			PrivilegeRow::for_group(FORUM, GroupId(1), Privilege::Read | Privilege::Reply, DISALLOW_ALL),
			PrivilegeRow::for_group(FORUM, GroupId(2), DISALLOW_ALL, Privilege::Reply),
		];

		let result = join_bits(seeded(&[FORUM]), &[FORUM], &rows);

		assert_eq!(result[&FORUM], Privileges::from(Privilege::Read));
	}

	#[test]
	fn negative_wins_within_a_row()
	{
		let rows = [PrivilegeRow::for_group(
			FORUM,
			GroupId(1),
			Privilege::Read | Privilege::Vote,
			Privilege::Vote,
		)];

		let result = join_bits(seeded(&[FORUM]), &[FORUM], &rows);

		assert_eq!(result[&FORUM], Privileges::from(Privilege::Read));
	}

	#[test]
	fn forums_are_independent()
	{
		let rows = [
			PrivilegeRow::for_group(FORUM, GroupId(1), Privilege::Read, DISALLOW_ALL),
			PrivilegeRow::for_group(OTHER_FORUM, GroupId(1), DISALLOW_ALL, Privilege::Read),
		];

		let result = join_bits(seeded(&[FORUM, OTHER_FORUM]), &[FORUM, OTHER_FORUM], &rows);

		assert_eq!(result[&FORUM], Privileges::from(Privilege::Read));
		assert_eq!(result[&OTHER_FORUM], DISALLOW_ALL);
	}

	#[test]
	fn unrequested_forums_are_ignored()
	{
		let rows = [PrivilegeRow::for_group(OTHER_FORUM, GroupId(1), Privilege::Read, DISALLOW_ALL)];
		let result = join_bits(seeded(&[FORUM]), &[FORUM], &rows);

		assert_eq!(result.len(), 1);
		assert_eq!(result[&FORUM], DISALLOW_ALL);
	}

	#[test]
	fn owner_prefers_user()
	{
		let mut row = PrivilegeRow::for_user(FORUM, UserId(3), DISALLOW_ALL, DISALLOW_ALL);

		assert_eq!(row.owner(), Some(Owner::User(UserId(3))));

		row.group_id = Some(GroupId(4));
		assert_eq!(row.owner(), Some(Owner::User(UserId(3))));

		row.user_id = None;
		assert_eq!(row.owner(), Some(Owner::Group(GroupId(4))));
		assert!(!row.is_user_row());
	}
}
