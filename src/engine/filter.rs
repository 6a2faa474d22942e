use crate::forums::AsForumId;
use crate::privileges::{DISALLOW_ALL, PrivilegeMap, Privileges};

/// Decides which side of a privilege check a forum has to be on to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator
{
	/// Keep forums that grant the privilege.
	Visible,

	/// Keep forums that do not grant the privilege.
	Invisible,
}

impl FilterOperator
{
	/// Applies the operator to an already masked set of privileges.
	pub fn test(self, masked: Privileges) -> bool
	{
		match self {
			Self::Visible => !masked.is_empty(),
			Self::Invisible => masked.is_empty(),
		}
	}
}

/// Selects the `forums` for which `operator` holds for `privilege`.
///
/// Forums missing from `privileges` are treated as [`DISALLOW_ALL`]. The order
/// of `forums` is preserved.
pub fn filter_forums<'f, T>(
	privileges: &PrivilegeMap,
	forums: &'f [T],
	privilege: Privileges,
	operator: FilterOperator,
) -> Vec<&'f T>
where
	T: AsForumId,
{
	forums
		.iter()
		.filter(|forum| {
			let mask = privileges
				.get(&forum.forum_id())
				.copied()
				.unwrap_or(DISALLOW_ALL);

			operator.test(mask & privilege)
		})
		.collect()
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::forums::ForumId;
	use crate::privileges::Privilege;

	#[test]
	fn visible_and_invisible_partition_forums()
	{
		let forums = [ForumId(1), ForumId(2), ForumId(3)];
		let privileges = PrivilegeMap::from([
			(ForumId(1), Privilege::Read | Privilege::Reply),
			(ForumId(2), Privileges::from(Privilege::Reply)),
		]);

		let read = Privileges::from(Privilege::Read);

		assert_eq!(filter_forums(&privileges, &forums, read, FilterOperator::Visible), [&ForumId(1)]);
		assert_eq!(
			filter_forums(&privileges, &forums, read, FilterOperator::Invisible),
			[&ForumId(2), &ForumId(3)],
		);
	}
}
