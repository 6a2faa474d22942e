#![allow(
	missing_copy_implementations,
	reason = "configs won't be copied around"
)]

mod database;
mod tracing;

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use color_eyre::Section;
use color_eyre::eyre::{self, WrapErr};
use forum_acl::EngineConfig;
use serde::Deserialize;
use url::Url;

pub(crate) use self::database::DatabaseConfig;
pub(crate) use self::tracing::TracingConfig;

/// Where the configuration is read from if `--config` is not specified.
pub(crate) const DEFAULT_PATH: &str = "forum-acl.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct Config
{
	pub tracing: TracingConfig,
	pub database: DatabaseConfig,
	pub privileges: EngineConfig,
}

impl Config
{
	/// Loads the configuration.
	///
	/// An explicit `path` must exist. Without one, [`DEFAULT_PATH`] is tried
	/// and the defaults are used if it does not exist.
	pub(crate) fn load(path: Option<&Path>) -> eyre::Result<Self>
	{
		let mut config = match path {
			Some(path) => Self::load_from_file(path)?,
			None => match Self::load_from_file(DEFAULT_PATH) {
				Ok(config) => config,
				Err(error) if is_not_found(&error) => Self::default(),
				Err(error) => return Err(error),
			},
		};

		if let Ok(url) = env::var("DATABASE_URL") {
			config.database.url = Url::parse(&url).wrap_err("`DATABASE_URL` is not a valid URL")?;
		}

		Ok(config)
	}

	pub(crate) fn load_from_file(path: impl AsRef<Path>) -> eyre::Result<Self>
	{
		let file = fs::read_to_string(path.as_ref())
			.wrap_err_with(|| format!("failed to read configuration file at {:?}", path.as_ref()))
			.suggestion("create the file or run with `--config` to specify an alternative path")?;

		toml::from_str(&file).wrap_err("failed to parse configuration file")
	}
}

fn is_not_found(error: &eyre::Report) -> bool
{
	error
		.downcast_ref::<io::Error>()
		.is_some_and(|error| error.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests
{
	use std::time::Duration;

	use forum_acl::{GroupId, UserId};

	use super::*;

	#[test]
	fn empty_config_uses_defaults()
	{
		let config = toml::from_str::<Config>("");

		assert!(config.is_ok_and(|config| {
			config.privileges == EngineConfig::default()
				&& config.database.url.scheme() == "mysql"
				&& config.tracing.stderr.enable
		}));
	}

	#[test]
	fn privileges_table()
	{
		let config = toml::from_str::<Config>(
			r#"
			[privileges]
			anonymous-user-id = 0
			registered-group-id = 2
			anonymous-cache-key = "acl:guest"
			anonymous-cache-ttl = 600

			[database]
			url = "mysql://forum@db.internal/forum"
			max-connections = 4
			"#,
		);

		let Ok(config) = config else {
			panic!("config should parse");
		};

		assert_eq!(config.privileges.anonymous_user_id, UserId(0));
		assert_eq!(config.privileges.registered_group_id, GroupId(2));
		assert_eq!(&*config.privileges.anonymous_cache_key, "acl:guest");
		assert_eq!(config.privileges.anonymous_cache_ttl, Duration::from_secs(600));
		assert_eq!(config.database.url.host_str(), Some("db.internal"));
		assert_eq!(config.database.max_connections.map(|max| max.get()), Some(4));
	}

	#[test]
	fn unknown_fields_are_rejected()
	{
		assert!(toml::from_str::<Config>("[privileges]\nanonymous = 1").is_err());
	}

	#[test]
	fn missing_default_file_is_detected()
	{
		let error = Config::load_from_file("/nonexistent/forum-acl.toml");

		assert!(error.is_err_and(|error| is_not_found(&error)));
	}
}
