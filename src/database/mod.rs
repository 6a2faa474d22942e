//! MySQL connection handling.

use std::num::NonZero;

use sqlx::pool::PoolOptions;
use url::Url;

mod error;
pub use error::{DatabaseError, DatabaseResult};

pub type Driver = sqlx::MySql;
pub type Pool = sqlx::Pool<Driver>;
pub type QueryBuilder<'args> = sqlx::QueryBuilder<'args, Driver>;

/// Options for [`connect()`].
#[derive(Debug, Builder)]
pub struct ConnectOptions<'a>
{
	url: &'a Url,

	#[builder(default = 1)]
	min_connections: u32,

	max_connections: Option<NonZero<u32>>,
}

/// Opens a connection pool to the database at `options.url`.
///
/// If no maximum is configured, the pool is sized after the number of
/// available CPUs.
#[tracing::instrument(skip_all, fields(url = %options.url.host_str().unwrap_or_default()), err)]
pub async fn connect(options: ConnectOptions<'_>) -> DatabaseResult<Pool>
{
	let max_connections = options
		.max_connections
		.map_or_else(available_parallelism, NonZero::get)
		.max(options.min_connections);

	let pool = PoolOptions::<Driver>::new()
		.min_connections(options.min_connections)
		.max_connections(max_connections)
		.connect(options.url.as_str())
		.await?;

	tracing::debug!(min = options.min_connections, max = max_connections, "connected to database");

	Ok(pool)
}

/// Runs all pending migrations.
#[tracing::instrument(skip_all, err)]
pub async fn migrate(pool: &Pool) -> DatabaseResult<()>
{
	sqlx::migrate!("./database/migrations")
		.run(pool)
		.await
		.map_err(sqlx::Error::from)?;

	Ok(())
}

fn available_parallelism() -> u32
{
	std::thread::available_parallelism()
		.ok()
		.and_then(|count| u32::try_from(count.get()).ok())
		.unwrap_or(1)
}
