//! Helper macro for creating "ID" types.

/// Creates a new "ID" type backed by an unsigned integer column.
macro_rules! make_id {
	($(#[$meta:meta])* $name:ident as $repr:ty) => {
		$(#[$meta])*
		#[repr(transparent)]
		#[derive(
			Debug,
			Clone,
			Copy,
			PartialEq,
			Eq,
			PartialOrd,
			Ord,
			Hash,
			serde::Serialize,
			serde::Deserialize,
			sqlx::Type,
		)]
		#[serde(transparent)]
		#[sqlx(transparent)]
		pub struct $name(pub $repr);

		impl std::fmt::Display for $name
		{
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
			{
				std::fmt::Display::fmt(&self.0, f)
			}
		}

		impl From<$name> for $repr
		{
			fn from(value: $name) -> Self
			{
				value.0
			}
		}

		impl From<$repr> for $name
		{
			fn from(value: $repr) -> Self
			{
				Self(value)
			}
		}

		impl std::str::FromStr for $name
		{
			type Err = <$repr as std::str::FromStr>::Err;

			fn from_str(value: &str) -> std::result::Result<Self, Self::Err>
			{
				<$repr as std::str::FromStr>::from_str(value).map(Self)
			}
		}
	};
}

pub(crate) use make_id;
