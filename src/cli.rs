use std::path::Path;

use forum_acl::privileges::Owner;
use forum_acl::{ForumId, GroupId, PrivilegeRef, UserId};

pub(crate) fn args() -> Args
{
	<Args as clap::Parser>::parse()
}

/// Inspect and edit forum privileges.
#[derive(Debug, clap::Parser)]
#[command(version)]
pub(crate) struct Args
{
	/// Path to the configuration file [default: forum-acl.toml]
	#[arg(long = "config", global = true)]
	pub config_path: Option<Box<Path>>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command
{
	/// Check whether a user has a privilege in a forum
	///
	/// Exits with status 1 if the privilege is not granted.
	#[clap(name = "check")]
	Check
	{
		#[command(flatten)]
		identity: Identity,

		/// The forum to check
		#[arg(long)]
		forum: ForumId,

		/// The privilege to check, by name (`reply`) or bit (`16`)
		privilege: PrivilegeRef,
	},

	/// Print the resolved privileges of a user
	#[clap(name = "show")]
	Show
	{
		#[command(flatten)]
		identity: Identity,

		/// Only show these forums (all forums if omitted)
		#[arg(long = "forum")]
		forums: Vec<ForumId>,

		/// Print JSON instead of a table
		#[arg(long)]
		json: bool,
	},

	/// Set the privileges of a user or group in a forum
	#[clap(name = "set")]
	Set
	{
		/// The forum to edit
		#[arg(long)]
		forum: ForumId,

		#[command(flatten)]
		owner: OwnerArgs,

		/// Comma separated privilege bits; negative bits revoke (e.g. `2,16,-256`)
		#[arg(allow_hyphen_values = true)]
		value: String,
	},

	/// Print every privilege name and its bit
	#[clap(name = "names")]
	Names,

	/// Run pending database migrations
	#[clap(name = "migrate")]
	Migrate,
}

/// Who privileges are resolved for.
#[derive(Debug, clap::Args)]
pub(crate) struct Identity
{
	/// The user; the anonymous user if omitted
	#[arg(long = "user")]
	pub user_id: Option<UserId>,

	/// Group memberships; looked up in the database if omitted (ignored for
	/// the anonymous user)
	#[arg(long = "group")]
	pub group_ids: Vec<GroupId>,
}

/// Who a privilege row belongs to.
#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub(crate) struct OwnerArgs
{
	/// A user
	#[arg(long = "user")]
	pub user_id: Option<UserId>,

	/// A group
	#[arg(long = "group")]
	pub group_id: Option<GroupId>,
}

impl OwnerArgs
{
	pub(crate) fn owner(&self) -> Option<Owner>
	{
		match (self.user_id, self.group_id) {
			(Some(user_id), _) => Some(Owner::User(user_id)),
			(None, Some(group_id)) => Some(Owner::Group(group_id)),
			(None, None) => None,
		}
	}
}

#[cfg(test)]
mod tests
{
	use clap::Parser;
	use forum_acl::privileges::check_privilege;
	use forum_acl::{Privilege, Privileges};

	use super::*;

	#[test]
	fn set_accepts_negative_bits()
	{
		let args = Args::try_parse_from(["forum-acl", "set", "--forum", "3", "--group", "2", "2,-256"]);

		let Ok(Args { command: Command::Set { forum, owner, value }, .. }) = args else {
			panic!("arguments should parse");
		};

		assert_eq!(forum, ForumId(3));
		assert_eq!(owner.owner(), Some(Owner::Group(GroupId(2))));
		assert_eq!(value, "2,-256");
	}

	#[test]
	fn check_accepts_bits_and_names()
	{
		let reply = Privileges::from(Privilege::Reply);

		for (input, expected) in [("16", PrivilegeRef::Bits(16)), ("reply", PrivilegeRef::from("reply"))] {
			let args = Args::try_parse_from(["forum-acl", "check", "--user", "5", "--forum", "1", input]);

			let Ok(Args { command: Command::Check { identity, forum, privilege }, .. }) = args else {
				panic!("arguments should parse");
			};

			assert_eq!(identity.user_id, Some(UserId(5)));
			assert_eq!(forum, ForumId(1));
			assert_eq!(privilege, expected);
			assert_eq!(check_privilege(reply, privilege), Ok(true));
		}
	}

	#[test]
	fn set_requires_exactly_one_owner()
	{
		assert!(Args::try_parse_from(["forum-acl", "set", "--forum", "3", "2"]).is_err());
		assert!(
			Args::try_parse_from([
				"forum-acl", "set", "--forum", "3", "--user", "1", "--group", "2", "2"
			])
			.is_err()
		);
	}

	#[test]
	fn show_is_anonymous_by_default()
	{
		let args = Args::try_parse_from(["forum-acl", "--config", "acl.toml", "show", "--forum", "1"]);

		let Ok(Args { config_path, command: Command::Show { identity, forums, json } }) = args else {
			panic!("arguments should parse");
		};

		assert_eq!(config_path.as_deref(), Some(Path::new("acl.toml")));
		assert_eq!(identity.user_id, None);
		assert_eq!(forums, [ForumId(1)]);
		assert!(!json);
	}
}
