//! Trait implementations for the [`sqlx`] crate.
//!
//! Masks are stored in signed integer columns. Older rows may carry a negative
//! number; its sign is dropped when decoding.

use std::error::Error;

use super::Privileges;

impl<DB> sqlx::Type<DB> for Privileges
where
	DB: sqlx::Database,
	i64: sqlx::Type<DB>,
{
	fn type_info() -> <DB as sqlx::Database>::TypeInfo
	{
		<i64 as sqlx::Type<DB>>::type_info()
	}

	fn compatible(ty: &<DB as sqlx::Database>::TypeInfo) -> bool
	{
		<i64 as sqlx::Type<DB>>::compatible(ty)
	}
}

impl<'q, DB> sqlx::Encode<'q, DB> for Privileges
where
	DB: sqlx::Database,
	i64: sqlx::Encode<'q, DB>,
{
	fn encode_by_ref(
		&self,
		buf: &mut <DB as sqlx::Database>::ArgumentBuffer<'q>,
	) -> Result<sqlx::encode::IsNull, Box<dyn Error + Send + Sync>>
	{
		<i64 as sqlx::Encode<'q, DB>>::encode_by_ref(&i64::from(self.bits()), buf)
	}

	fn size_hint(&self) -> usize
	{
		<i64 as sqlx::Encode<'q, DB>>::size_hint(&i64::from(self.bits()))
	}
}

impl<'r, DB> sqlx::Decode<'r, DB> for Privileges
where
	DB: sqlx::Database,
	i64: sqlx::Decode<'r, DB>,
{
	fn decode(value: <DB as sqlx::Database>::ValueRef<'r>) -> Result<Self, Box<dyn Error + Send + Sync>>
	{
		let raw = <i64 as sqlx::Decode<'r, DB>>::decode(value)?;

		Privileges::from_signed(raw)
			.ok_or_else(|| format!("privilege mask {raw} does not fit into 32 bits").into())
	}
}
