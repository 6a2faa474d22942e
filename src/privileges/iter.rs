//! [`Iterator`]s for [`Privileges`].

use std::iter::FusedIterator;

use super::{Privilege, Privileges};

/// Splits `mask` into the individual privileges it contains.
///
/// Privileges are yielded lazily, in canonical order, each exactly once.
/// [`None`] and the empty mask yield nothing.
pub fn split_bits(mask: Option<Privileges>) -> Iter
{
	Iter { bits: mask.map_or(0, Privileges::bits) & Privileges::ALL.bits(), idx: 0 }
}

/// An iterator over the privileges contained in a [`Privileges`] mask.
#[derive(Debug, Clone)]
pub struct Iter
{
	/// The known bits that are left.
	bits: u32,

	/// Index into [`Privilege::ALL`] we are at.
	idx: usize,
}

impl Iterator for Iter
{
	type Item = Privilege;

	fn next(&mut self) -> Option<Self::Item>
	{
		while self.bits != 0 {
			let privilege = *Privilege::ALL.get(self.idx)?;
			self.idx += 1;

			if self.bits & privilege.bit() != 0 {
				self.bits &= !privilege.bit();
				return Some(privilege);
			}
		}

		None
	}

	fn size_hint(&self) -> (usize, Option<usize>)
	{
		let count = self.bits.count_ones() as usize;
		(count, Some(count))
	}
}

impl ExactSizeIterator for Iter
{
}

impl FusedIterator for Iter
{
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn none_yields_nothing()
	{
		assert_eq!(split_bits(None).count(), 0);
		assert_eq!(split_bits(Some(Privileges::NONE)).count(), 0);
	}

	#[test]
	fn yields_every_bit_once_in_order()
	{
		let mask = Privilege::Moderate | Privilege::Read | Privilege::Upload;
		let bits = split_bits(Some(mask)).map(Privilege::bit).collect::<Vec<_>>();

		assert_eq!(bits, [2, 32, 256]);
	}

	#[test]
	fn unknown_bits_are_skipped()
	{
		let mask = Privileges::from_bits(1 | Privilege::Vote.bit() | (1 << 20));
		let iter = split_bits(Some(mask));

		assert_eq!(iter.len(), 1);
		assert_eq!(iter.collect::<Vec<_>>(), [Privilege::Vote]);
	}

	#[test]
	fn all_yields_everything()
	{
		assert_eq!(Privileges::ALL.iter().collect::<Vec<_>>(), Privilege::ALL);
	}
}
