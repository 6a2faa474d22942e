use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct TracingConfig
{
	/// Filter directives used when `RUST_LOG` is not set.
	pub filter: Box<str>,
	pub stderr: StderrConfig,
	pub files: FilesConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct StderrConfig
{
	pub enable: bool,
	pub ansi: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct FilesConfig
{
	pub enable: bool,

	#[serde(default = "default_files_directory")]
	pub directory: Box<Path>,
}

impl Default for TracingConfig
{
	fn default() -> Self
	{
		Self {
			filter: Box::from("warn,forum_acl=info"),
			stderr: StderrConfig::default(),
			files: FilesConfig::default(),
		}
	}
}

impl Default for StderrConfig
{
	fn default() -> Self
	{
		Self { enable: true, ansi: true }
	}
}

impl Default for FilesConfig
{
	fn default() -> Self
	{
		Self { enable: Default::default(), directory: default_files_directory() }
	}
}

fn default_files_directory() -> Box<Path>
{
	PathBuf::from("logs").into_boxed_path()
}
