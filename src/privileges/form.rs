//! The encoding used by the admin interface to submit per-forum bit edits.
//!
//! A forum's edit is a comma separated list of signed integers. Positive values
//! are granted bits, negative values are revoked bits, e.g. `4,-8,2`.

use super::{Privileges, split_bits};

/// Parses an admin form value into `(negative, positive)` masks.
///
/// Tokens that are not integers are skipped.
pub fn split_negative_positive(value: &str) -> (Privileges, Privileges)
{
	let mut negative = Privileges::NONE;
	let mut positive = Privileges::NONE;

	for token in value.split(',') {
		let Ok(number) = token.trim().parse::<i64>() else {
			continue;
		};

		let Some(bits) = Privileges::from_signed(number) else {
			continue;
		};

		if number < 0 {
			negative |= bits;
		} else {
			positive |= bits;
		}
	}

	(negative, positive)
}

/// Encodes `negative` and `positive` the way [`split_negative_positive()`]
/// expects them.
///
/// Granted bits come first, followed by revoked bits, each in canonical order.
pub fn join_negative_positive(negative: Privileges, positive: Privileges) -> String
{
	let granted = split_bits(Some(positive)).map(|privilege| i64::from(privilege.bit()));
	let revoked = split_bits(Some(negative)).map(|privilege| -i64::from(privilege.bit()));

	granted
		.chain(revoked)
		.map(|number| number.to_string())
		.collect::<Vec<_>>()
		.join(",")
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::privileges::Privilege;

	#[test]
	fn splits_signed_values()
	{
		let (negative, positive) = split_negative_positive("4,-8,2");

		assert_eq!(negative.bits(), 8);
		assert_eq!(positive.bits(), 6);
	}

	#[test]
	fn skips_garbage()
	{
		let (negative, positive) = split_negative_positive("read, 16 ,,-x,-32, 99999999999");

		assert_eq!(negative.bits(), 32);
		assert_eq!(positive.bits(), 16);
	}

	#[test]
	fn empty_input()
	{
		assert_eq!(split_negative_positive(""), (Privileges::NONE, Privileges::NONE));
	}

	#[test]
	fn join_is_understood_by_split()
	{
		let negative = Privilege::Moderate | Privilege::Sticky;
		let positive = Privilege::Read | Privilege::Reply;
		let encoded = join_negative_positive(negative, positive);

		assert_eq!(encoded, "2,16,-128,-256");
		assert_eq!(split_negative_positive(&encoded), (negative, positive));
	}
}
