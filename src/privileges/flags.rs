//! Privileges referenced either by name or by raw bits.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::{DISALLOW_ALL, Privilege, Privileges, UnknownPrivilege};

/// A reference to one or more privileges.
///
/// Callers may name privileges (`"read"`) or pass their bits directly; both
/// forms are resolved to a [`Privileges`] mask at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrivilegeRef
{
	/// A privilege name, looked up in the name table.
	Name(Box<str>),

	/// Raw privilege bits.
	Bits(u32),
}

impl PrivilegeRef
{
	/// Resolves `self` into a mask.
	pub fn resolve(&self) -> Result<Privileges, UnknownPrivilege>
	{
		match *self {
			Self::Name(ref name) => name.parse::<Privilege>().map(Privileges::from),
			Self::Bits(bits) => Ok(Privileges::from_bits(bits)),
		}
	}
}

impl fmt::Display for PrivilegeRef
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match *self {
			Self::Name(ref name) => f.write_str(name),
			Self::Bits(bits) => write!(f, "{bits:#b}"),
		}
	}
}

/// Integers are taken as bits, anything else as a name.
impl FromStr for PrivilegeRef
{
	type Err = Infallible;

	fn from_str(value: &str) -> Result<Self, Self::Err>
	{
		let value = value.trim();

		Ok(match value.parse::<u32>() {
			Ok(bits) => Self::Bits(bits),
			Err(_) => Self::Name(value.into()),
		})
	}
}

impl From<&str> for PrivilegeRef
{
	fn from(name: &str) -> Self
	{
		Self::Name(name.into())
	}
}

impl From<String> for PrivilegeRef
{
	fn from(name: String) -> Self
	{
		Self::Name(name.into_boxed_str())
	}
}

impl From<u32> for PrivilegeRef
{
	fn from(bits: u32) -> Self
	{
		Self::Bits(bits)
	}
}

impl From<Privilege> for PrivilegeRef
{
	fn from(privilege: Privilege) -> Self
	{
		Self::Bits(privilege.bit())
	}
}

impl From<Privileges> for PrivilegeRef
{
	fn from(privileges: Privileges) -> Self
	{
		Self::Bits(privileges.bits())
	}
}

/// Combines `flags` into a single mask.
///
/// Flags are resolved in order. As soon as one of them resolves to
/// [`DISALLOW_ALL`], the result is [`DISALLOW_ALL`] regardless of the other
/// flags. No flags at all also yields [`DISALLOW_ALL`].
///
/// # Errors
///
/// Returns [`UnknownPrivilege`] if a name does not belong to any privilege.
pub fn join_flags<I>(flags: I) -> Result<Privileges, UnknownPrivilege>
where
	I: IntoIterator,
	I::Item: Into<PrivilegeRef>,
{
	let mut result = DISALLOW_ALL;

	for flag in flags {
		let flag = flag.into().resolve()?;

		if flag == DISALLOW_ALL {
			return Ok(DISALLOW_ALL);
		}

		result |= flag;
	}

	Ok(result)
}

/// Checks whether `mask` grants `privilege`.
///
/// This is the fast path once a mask has been resolved; it performs no I/O.
///
/// # Errors
///
/// Returns [`UnknownPrivilege`] if `privilege` names an unknown privilege.
pub fn check_privilege(
	mask: Privileges,
	privilege: impl Into<PrivilegeRef>,
) -> Result<bool, UnknownPrivilege>
{
	privilege
		.into()
		.resolve()
		.map(|privilege| mask.intersects(privilege))
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn no_flags_disallow_all()
	{
		assert_eq!(join_flags(Vec::<PrivilegeRef>::new()), Ok(DISALLOW_ALL));
	}

	#[test]
	fn names_are_joined()
	{
		assert_eq!(join_flags(["read", "vote"]), Ok(Privilege::Read | Privilege::Vote));
	}

	#[test]
	fn names_and_bits_can_be_mixed()
	{
		let flags = [PrivilegeRef::from("reply"), PrivilegeRef::from(Privilege::Sticky.bit())];

		assert_eq!(join_flags(flags), Ok(Privilege::Reply | Privilege::Sticky));
	}

	#[test]
	fn explicit_disallow_wins()
	{
		let flags = [PrivilegeRef::from("read"), PrivilegeRef::from(0)];

		assert_eq!(join_flags(flags), Ok(DISALLOW_ALL));
	}

	#[test]
	fn unknown_name_is_an_error()
	{
		assert_eq!(
			join_flags(["read", "teleport"]),
			Err(UnknownPrivilege { name: "teleport".into() }),
		);
	}

	#[test]
	fn check_privilege_tests_the_bit()
	{
		let mask = Privilege::Read | Privilege::Moderate;

		assert_eq!(check_privilege(mask, "moderate"), Ok(true));
		assert_eq!(check_privilege(mask, Privilege::Reply), Ok(false));
		assert_eq!(check_privilege(DISALLOW_ALL, "moderate"), Ok(false));
		assert!(check_privilege(mask, "fly").is_err());
	}

	#[test]
	fn parsed_integers_are_bits()
	{
		assert_eq!("16".parse::<PrivilegeRef>(), Ok(PrivilegeRef::Bits(16)));
		assert_eq!(" reply ".parse::<PrivilegeRef>(), Ok(PrivilegeRef::from("reply")));

		let mask = Privileges::from(Privilege::Reply);

		for input in ["16", "reply"] {
			let Ok(privilege) = input.parse::<PrivilegeRef>();
			assert_eq!(check_privilege(mask, privilege), Ok(true));
		}
	}
}
