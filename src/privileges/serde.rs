//! Trait implementations for the [`serde`] crate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Privilege, Privileges};

/// Masks are serialized as their raw bits so cached rows survive a round trip
/// through any serializer unchanged, including bits that are not known to
/// this build.
impl Serialize for Privileges
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.bits().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Privileges
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Helper
		{
			Bits(u32),
			Names(Vec<Privilege>),
		}

		Helper::deserialize(deserializer).map(|value| match value {
			Helper::Bits(bits) => Self::from_bits(bits),
			Helper::Names(names) => names.into_iter().collect(),
		})
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn serializes_as_bits()
	{
		let mask = Privilege::Read | Privilege::Reply;

		assert_eq!(serde_json::to_string(&mask).ok().as_deref(), Some("18"));
	}

	#[test]
	fn deserializes_bits_or_names()
	{
		let from_bits = serde_json::from_str::<Privileges>("18").ok();
		let from_names = serde_json::from_str::<Privileges>(r#"["read", "reply"]"#).ok();

		assert_eq!(from_bits, Some(Privilege::Read | Privilege::Reply));
		assert_eq!(from_names, from_bits);
		assert!(serde_json::from_str::<Privileges>(r#"["jump"]"#).is_err());
	}
}
