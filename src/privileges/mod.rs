//! Forum privileges.
//!
//! Privileges are stored as bitflags, where each bit represents one capability
//! a user can have inside a forum. Bit 0 is never used; a mask of `0` means
//! "nothing is allowed" ([`DISALLOW_ALL`]).
//!
//! The functions in this module are the pure mask algebra the resolution layer
//! is built on. None of them perform any I/O.

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};
use std::str::FromStr;

use ::serde::{Deserialize, Serialize};

use crate::forums::ForumId;

mod iter;
pub use iter::{Iter, split_bits};

mod flags;
pub use flags::{PrivilegeRef, check_privilege, join_flags};

mod form;
pub use form::{join_negative_positive, split_negative_positive};

pub mod rows;
pub use rows::{Owner, PrivilegeId, PrivilegeRow, join_bits};

mod serde;
mod sqlx;

/// A mapping from forum to the effective privileges a user has in that forum.
pub type PrivilegeMap = HashMap<ForumId, Privileges>;

/// The empty mask.
///
/// Any flag resolving to this value makes [`join_flags()`] return it as well.
pub const DISALLOW_ALL: Privileges = Privileges::NONE;

/// The names of all privileges, in canonical order.
pub const PRIVILEGES: [&str; Privilege::COUNT] = {
	let mut names = [""; Privilege::COUNT];
	let mut idx = 0;

	while idx < Privilege::COUNT {
		names[idx] = Privilege::ALL[idx].name();
		idx += 1;
	}

	names
};

/// The bit assigned to each privilege name, in canonical order.
pub const PRIVILEGES_BITS: [(&str, u32); Privilege::COUNT] = {
	let mut bits = [("", 0); Privilege::COUNT];
	let mut idx = 0;

	while idx < Privilege::COUNT {
		bits[idx] = (Privilege::ALL[idx].name(), Privilege::ALL[idx].bit());
		idx += 1;
	}

	bits
};

/// A single forum privilege.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege
{
	/// The user can see the forum and read its topics.
	Read = 1 << 1,

	/// The user can vote in polls.
	Vote = 1 << 2,

	/// The user can create new topics.
	Create = 1 << 3,

	/// The user can reply to existing topics.
	Reply = 1 << 4,

	/// The user can attach files to posts.
	Upload = 1 << 5,

	/// The user can attach polls to new topics.
	CreatePoll = 1 << 6,

	/// The user can mark topics as sticky.
	Sticky = 1 << 7,

	/// The user can moderate the forum.
	Moderate = 1 << 8,
}

impl Privilege
{
	/// The number of known privileges.
	pub const COUNT: usize = 8;

	/// All privileges, in canonical order.
	pub const ALL: [Self; Self::COUNT] = [
		Self::Read,
		Self::Vote,
		Self::Create,
		Self::Reply,
		Self::Upload,
		Self::CreatePoll,
		Self::Sticky,
		Self::Moderate,
	];

	/// Returns the bit representing this privilege.
	pub const fn bit(self) -> u32
	{
		self as u32
	}

	/// Returns the canonical name of this privilege.
	pub const fn name(self) -> &'static str
	{
		match self {
			Self::Read => "read",
			Self::Vote => "vote",
			Self::Create => "create",
			Self::Reply => "reply",
			Self::Upload => "upload",
			Self::CreatePoll => "create_poll",
			Self::Sticky => "sticky",
			Self::Moderate => "moderate",
		}
	}

	/// Looks up the privilege assigned to `bit`.
	///
	/// Returns [`None`] if `bit` is not exactly one known privilege bit.
	pub const fn from_bit(bit: u32) -> Option<Self>
	{
		let mut idx = 0;

		while idx < Self::COUNT {
			if Self::ALL[idx].bit() == bit {
				return Some(Self::ALL[idx]);
			}

			idx += 1;
		}

		None
	}

	/// Looks up a privilege by its canonical name.
	pub fn from_name(name: &str) -> Option<Self>
	{
		Self::ALL
			.into_iter()
			.find(|privilege| privilege.name() == name)
	}
}

impl fmt::Display for Privilege
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.write_str(self.name())
	}
}

/// An error that can occur when looking up a privilege by name.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unknown privilege `{name}`")]
pub struct UnknownPrivilege
{
	/// The name that was looked up.
	pub name: Box<str>,
}

impl FromStr for Privilege
{
	type Err = UnknownPrivilege;

	fn from_str(value: &str) -> Result<Self, Self::Err>
	{
		Self::from_name(value).ok_or_else(|| UnknownPrivilege { name: value.into() })
	}
}

/// A set of [`Privilege`]s.
///
/// The mask keeps whatever bits it was created from; bits that do not belong
/// to any known privilege are carried along but never yielded by
/// [`Privileges::iter()`].
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Privileges(u32);

impl Privileges
{
	/// No privileges.
	pub const NONE: Self = Self(0);

	/// All known privileges.
	pub const ALL: Self = {
		let mut bits = 0;
		let mut idx = 0;

		while idx < Privilege::COUNT {
			bits |= Privilege::ALL[idx].bit();
			idx += 1;
		}

		Self(bits)
	};

	/// Create a mask from a raw integer value.
	pub const fn from_bits(bits: u32) -> Self
	{
		Self(bits)
	}

	/// Create a mask from a possibly negative integer, normalizing its sign.
	///
	/// Returns [`None`] if the absolute value does not fit into a mask.
	pub fn from_signed(value: i64) -> Option<Self>
	{
		u32::try_from(value.unsigned_abs()).ok().map(Self)
	}

	/// Returns the underlying integer value.
	pub const fn bits(self) -> u32
	{
		self.0
	}

	/// Checks whether no bits are set.
	pub const fn is_empty(self) -> bool
	{
		self.0 == 0
	}

	/// Checks if `other` is a subset of `self`.
	pub const fn contains(self, other: Self) -> bool
	{
		(self.0 & other.0) == other.0
	}

	/// Checks if `self` and `other` share at least one bit.
	pub const fn intersects(self, other: Self) -> bool
	{
		(self.0 & other.0) != 0
	}

	/// Returns an [`Iterator`] over the [`Privilege`]s stored in `self`.
	pub fn iter(self) -> Iter
	{
		split_bits(Some(self))
	}
}

impl fmt::Debug for Privileges
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.debug_set().entries(self.iter().map(Privilege::name)).finish()
	}
}

impl fmt::Display for Privileges
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		f.debug_list().entries(self.iter().map(Privilege::name)).finish()
	}
}

impl fmt::Binary for Privileges
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt::Binary::fmt(&self.0, f)
	}
}

impl From<Privilege> for Privileges
{
	fn from(privilege: Privilege) -> Self
	{
		Self(privilege.bit())
	}
}

impl FromIterator<Privilege> for Privileges
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = Privilege>,
	{
		iter.into_iter().fold(Self::NONE, |acc, privilege| acc | privilege)
	}
}

impl IntoIterator for Privileges
{
	type Item = Privilege;
	type IntoIter = Iter;

	fn into_iter(self) -> Self::IntoIter
	{
		self.iter()
	}
}

impl<P> BitOr<P> for Privileges
where
	P: Into<Privileges>,
{
	type Output = Self;

	fn bitor(self, rhs: P) -> Self::Output
	{
		Self(self.0 | rhs.into().0)
	}
}

impl<P> BitOrAssign<P> for Privileges
where
	P: Into<Privileges>,
{
	fn bitor_assign(&mut self, rhs: P)
	{
		self.0 |= rhs.into().0;
	}
}

impl<P> BitAnd<P> for Privileges
where
	P: Into<Privileges>,
{
	type Output = Self;

	fn bitand(self, rhs: P) -> Self::Output
	{
		Self(self.0 & rhs.into().0)
	}
}

impl<P> BitAndAssign<P> for Privileges
where
	P: Into<Privileges>,
{
	fn bitand_assign(&mut self, rhs: P)
	{
		self.0 &= rhs.into().0;
	}
}

/// Removes every bit of `rhs` from `self`.
impl<P> Sub<P> for Privileges
where
	P: Into<Privileges>,
{
	type Output = Self;

	fn sub(self, rhs: P) -> Self::Output
	{
		Self(self.0 & !rhs.into().0)
	}
}

impl<P> SubAssign<P> for Privileges
where
	P: Into<Privileges>,
{
	fn sub_assign(&mut self, rhs: P)
	{
		self.0 &= !rhs.into().0;
	}
}

impl Not for Privileges
{
	type Output = Self;

	fn not(self) -> Self::Output
	{
		Self(!self.0)
	}
}

impl BitOr for Privilege
{
	type Output = Privileges;

	fn bitor(self, rhs: Privilege) -> Self::Output
	{
		Privileges(self.bit() | rhs.bit())
	}
}

impl BitOr<Privileges> for Privilege
{
	type Output = Privileges;

	fn bitor(self, rhs: Privileges) -> Self::Output
	{
		Privileges(self.bit() | rhs.0)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn bits_are_distinct_powers_of_two()
	{
		let mut seen = 0_u32;

		for (name, bit) in PRIVILEGES_BITS {
			assert!(bit.is_power_of_two(), "{name} is not a power of two");
			assert!((2..=256).contains(&bit), "{name} is out of range");
			assert_eq!(seen & bit, 0, "{name} reuses a bit");
			seen |= bit;
		}

		assert_eq!(seen, 0b1_1111_1110);
		assert_eq!(DISALLOW_ALL.bits(), 0);
	}

	#[test]
	fn names_are_in_canonical_order()
	{
		assert_eq!(PRIVILEGES, [
			"read",
			"vote",
			"create",
			"reply",
			"upload",
			"create_poll",
			"sticky",
			"moderate",
		]);
	}

	#[test]
	fn reverse_lookup_works()
	{
		for privilege in Privilege::ALL {
			assert_eq!(Privilege::from_bit(privilege.bit()), Some(privilege));
			assert_eq!(Privilege::from_name(privilege.name()), Some(privilege));
		}

		assert_eq!(Privilege::from_bit(0), None);
		assert_eq!(Privilege::from_bit(1), None);
		assert_eq!(Privilege::from_bit(Privilege::Read.bit() | Privilege::Vote.bit()), None);
	}

	#[test]
	fn parse_fails_on_unknown_name()
	{
		assert_eq!(
			"delete_everything".parse::<Privilege>(),
			Err(UnknownPrivilege { name: "delete_everything".into() }),
		);
	}

	#[test]
	fn sub_removes_bits()
	{
		let mask = Privilege::Read | Privilege::Reply;

		assert_eq!(mask - Privilege::Reply, Privileges::from(Privilege::Read));
		assert_eq!(mask - Privileges::NONE, mask);
	}

	#[test]
	fn from_signed_normalizes_sign()
	{
		assert_eq!(Privileges::from_signed(-6), Some(Privileges::from_bits(6)));
		assert_eq!(Privileges::from_signed(6), Some(Privileges::from_bits(6)));
		assert_eq!(Privileges::from_signed(i64::MIN), None);
	}

	#[test]
	fn display_lists_names()
	{
		let mask = Privilege::Moderate | Privilege::Read;

		assert_eq!(mask.to_string(), r#"["read", "moderate"]"#);
	}
}
