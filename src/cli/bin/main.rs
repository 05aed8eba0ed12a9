// Macros
#[macro_use]
extern crate prettytable;

// Std
use std::io::{stdout, Write};

// Crates
use anyhow::Result;
use clap::{crate_version, value_parser, Arg, ArgMatches, Command};
use futures::TryStreamExt;
use prettytable::Table;
use sqlx::sqlite::SqlitePool;

// Local
use punchclock::accounts::{self, DEFAULT_ADMIN_NAME};
use punchclock::api::ADMIN_RECENT_LIMIT;
use punchclock::config::Settings;
use punchclock::db::{self, DATE_FORMAT};
use punchclock::telemetry::{get_subscriber, init_subscriber};
use punchclock::{export, ledger};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `export` output stays clean.
    let subscriber = get_subscriber("punchclock-cli".into(), "warn".into(), std::io::stderr);
    init_subscriber(subscriber);

    let matches = Command::new("punchclock")
        .version(crate_version!())
        .author("Samuel Vanderwaal")
        .about("Operator tools for the punch clock database.")
        .subcommand_required(true)
        .subcommand(Command::new("init").about("Create the schema and seed the default admin."))
        .subcommand(
            Command::new("add-employee")
                .about("Create a new employee account.")
                .arg(Arg::new("name").required(true).help("Login name."))
                .arg(Arg::new("secret").required(true).help("Password.")),
        )
        .subcommand(Command::new("employees").about("List employee accounts."))
        .subcommand(
            Command::new("recent")
                .about("Display the most recent punches across all employees.")
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .value_parser(value_parser!(u32))
                        .help("Maximum number of punches to show."),
                ),
        )
        .subcommand(Command::new("export").about("Write every punch as CSV to stdout."))
        .get_matches();

    let settings = Settings::from_env()?;
    let pool = db::setup_pool(&settings.database_url).await?;
    db::setup_db(&pool).await?;

    match matches.subcommand() {
        Some(("init", _)) => init(&pool).await?,
        Some(("add-employee", args)) => add_employee(&pool, args).await?,
        Some(("employees", _)) => list_employees(&pool).await?,
        Some(("recent", args)) => {
            let limit = args
                .get_one::<u32>("limit")
                .copied()
                .unwrap_or(ADMIN_RECENT_LIMIT);
            display_recent(&pool, limit).await?
        }
        Some(("export", _)) => export_csv(&pool).await?,
        _ => unreachable!("a subcommand is required"),
    }

    Ok(())
}

async fn init(pool: &SqlitePool) -> Result<()> {
    if accounts::bootstrap(pool).await? {
        println!("Default admin '{}' created.", DEFAULT_ADMIN_NAME);
    } else {
        println!("Admin account already present.");
    }
    Ok(())
}

async fn add_employee(pool: &SqlitePool, args: &ArgMatches) -> Result<()> {
    let name = args.get_one::<String>("name").map(|s| s.trim()).unwrap_or_default();
    let secret = args.get_one::<String>("secret").map(|s| s.trim()).unwrap_or_default();

    let account = accounts::create_employee(pool, name, secret).await?;
    println!("Employee '{}' created with id {}.", account.name, account.id);

    Ok(())
}

async fn list_employees(pool: &SqlitePool) -> Result<()> {
    let employees = ledger::list_employees(pool).await?;

    let mut table = Table::new();
    table.add_row(row![Fb => "Id", "Name"]);
    for employee in employees {
        table.add_row(row![employee.id, employee.name]);
    }
    table.printstd();

    Ok(())
}

async fn display_recent(pool: &SqlitePool, limit: u32) -> Result<()> {
    let punches = ledger::all_joined(pool, limit).await?;

    let mut table = Table::new();
    table.add_row(row![Fb => "Employee", "Time", "Kind"]);
    for punch in punches {
        table.add_row(row![
            punch.account_name,
            punch.timestamp.format(DATE_FORMAT),
            punch.kind
        ]);
    }
    table.printstd();

    Ok(())
}

async fn export_csv(pool: &SqlitePool) -> Result<()> {
    let mut chunks = Box::pin(export::export_all(pool.clone()));
    let stdout = stdout();
    let mut out = stdout.lock();

    while let Some(chunk) = chunks.try_next().await? {
        out.write_all(&chunk)?;
    }
    out.flush()?;

    Ok(())
}
