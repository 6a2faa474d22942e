//! `forum-acl` - inspect and edit forum privileges.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::process::ExitCode;

use color_eyre::Section;
use color_eyre::eyre::{self, WrapErr};
use forum_acl::cache::MemoryCache;
use forum_acl::database;
use forum_acl::forums::ForumProvider as _;
use forum_acl::privileges::{PRIVILEGES_BITS, check_privilege};
use forum_acl::store::MySqlStore;
use forum_acl::{ForumId, Privilege, PrivilegeEngine, User};

mod cli;
mod config;
mod telemetry;

use self::cli::{Command, Identity};
use self::config::Config;

type Engine<'a> = PrivilegeEngine<&'a MySqlStore, MemoryCache<Vec<forum_acl::PrivilegeRow>>, &'a MySqlStore>;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode>
{
	color_eyre::install()?;

	let args = cli::args();

	if let Command::Names = args.command {
		print_names()?;
		return Ok(ExitCode::SUCCESS);
	}

	match dotenvy::dotenv() {
		Err(error) if !error.not_found() => {
			return Err(error).wrap_err("failed to load `.env` file");
		},
		Ok(_) | Err(_) => {},
	}

	let config = Config::load(args.config_path.as_deref())?;
	let _guard = telemetry::init(&config.tracing).wrap_err("failed to initialize tracing")?;

	let pool = database::connect(config.database.connect_options())
		.await
		.wrap_err("failed to connect to database")
		.suggestion("set `database.url` in the configuration file or `DATABASE_URL`")?;

	let store = MySqlStore::new(pool);
	let engine = PrivilegeEngine::new(&store, MemoryCache::new(), &store, config.privileges);

	match args.command {
		Command::Names => Ok(ExitCode::SUCCESS),
		Command::Migrate => {
			database::migrate(store.pool())
				.await
				.wrap_err("failed to run migrations")?;

			tracing::info!("migrations applied");

			Ok(ExitCode::SUCCESS)
		},
		Command::Check { identity, forum, privilege } => {
			let user = resolve_user(&engine, identity).await?;
			let privileges = engine.get_forum_privileges(&user, forum).await?;
			let granted = check_privilege(privileges, privilege)
				.suggestion("run `forum-acl names` to list all privileges")?;

			writeln!(io::stdout(), "{}", if granted { "granted" } else { "denied" })?;

			Ok(if granted { ExitCode::SUCCESS } else { ExitCode::FAILURE })
		},
		Command::Show { identity, forums, json } => {
			let user = resolve_user(&engine, identity).await?;
			let forums = if forums.is_empty() {
				Vec::from_iter(store.all_forum_ids().await?)
			} else {
				forums
			};

			let privileges = engine
				.get_privileges(&user, forums)
				.await?
				.into_iter()
				.collect::<BTreeMap<ForumId, _>>();

			let mut stdout = io::stdout().lock();

			if json {
				let named = privileges
					.iter()
					.map(|(&forum_id, &privileges)| (forum_id, privileges.iter().collect::<Vec<Privilege>>()))
					.collect::<BTreeMap<_, _>>();

				serde_json::to_writer_pretty(&mut stdout, &named)?;
				writeln!(stdout)?;
			} else {
				for (forum_id, privileges) in privileges {
					writeln!(stdout, "{forum_id:>6}  {privileges:#011b}  {privileges}")?;
				}
			}

			Ok(ExitCode::SUCCESS)
		},
		Command::Set { forum, owner, value } => {
			let owner = owner
				.owner()
				.ok_or_else(|| eyre::eyre!("either `--user` or `--group` is required"))?;

			match engine.set_privilege(forum, owner, &value).await? {
				Some(id) => writeln!(io::stdout(), "privilege row {id} saved")?,
				None => writeln!(io::stdout(), "no privilege row left for {owner} in forum {forum}")?,
			}

			Ok(ExitCode::SUCCESS)
		},
	}
}

/// Builds the user to resolve privileges for.
///
/// Group memberships are read from the database unless they were passed
/// explicitly. Guests always resolve as the configured anonymous identity.
async fn resolve_user(engine: &Engine<'_>, identity: Identity) -> eyre::Result<User>
{
	let user_id = match identity.user_id {
		Some(user_id) if !engine.is_anonymous_user(user_id) => user_id,
		Some(_) | None => {
			if !identity.group_ids.is_empty() {
				tracing::warn!("ignoring `--group` for the anonymous user");
			}

			return Ok(engine.anonymous_user());
		},
	};

	let group_ids = if identity.group_ids.is_empty() {
		engine.store().groups_of(user_id).await?
	} else {
		identity.group_ids
	};

	Ok(User::authenticated(user_id, group_ids))
}

fn print_names() -> io::Result<()>
{
	let mut stdout = io::stdout().lock();

	for (name, bit) in PRIVILEGES_BITS {
		writeln!(stdout, "{name:<12} {bit:>4}")?;
	}

	Ok(())
}
