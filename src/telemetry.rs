use std::{env, fs, io};

use color_eyre::eyre::{self, WrapErr};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::TracingConfig;

/// Keeps the logfile writer alive; drop it last.
pub(crate) struct Guard
{
	_files_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

pub(crate) fn init(config: &TracingConfig) -> eyre::Result<Guard>
{
	let stderr_layer = config.stderr.enable.then(|| {
		tracing_subscriber::fmt::layer()
			.compact()
			.with_ansi(config.stderr.ansi)
			.with_writer(io::stderr)
			.with_timer(UtcTime::rfc_3339())
	});

	let (files_layer, files_guard) = config
		.files
		.enable
		.then(|| -> eyre::Result<_> {
			if !config.files.directory.exists() {
				fs::create_dir_all(&*config.files.directory).wrap_err_with(|| {
					format!("failed to create log directory at {:?}", config.files.directory)
				})?;
			}

			let directory =
				config.files.directory.canonicalize().wrap_err_with(|| {
					format!("failed to canonicalize {:?}", config.files.directory)
				})?;

			let (writer, guard) = tracing_appender::rolling::Builder::default()
				.rotation(tracing_appender::rolling::Rotation::DAILY)
				.filename_prefix("forum-acl")
				.filename_suffix("log")
				.build(directory)
				.map(tracing_appender::non_blocking)
				.wrap_err("failed to install logfile thread")?;

			let layer = tracing_subscriber::fmt::layer()
				.json()
				.with_file(false)
				.with_line_number(false)
				.with_span_list(true)
				.with_writer(writer)
				.with_timer(UtcTime::rfc_3339());

			Ok((layer, guard))
		})
		.transpose()?
		.unzip();

	let filter = if env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
		EnvFilter::from_default_env()
	} else {
		EnvFilter::try_new(&*config.filter)
			.wrap_err_with(|| format!("invalid tracing filter {:?}", config.filter))?
	};

	tracing_subscriber::registry()
		.with(Layer::and_then(stderr_layer, files_layer).with_filter(filter))
		.init();

	Ok(Guard { _files_guard: files_guard })
}
