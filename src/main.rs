use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use route_console::config::ConsoleConfig;
use route_console::models::{LocationDraft, OperatingDays, TransportationDraft};
use route_console::{
    ApiClient, ConsoleError, HttpTransport, LegacyRouteQuery, ProfileStore, RouteSearchRequest,
    RouteSearchResult, RouteSearcher, SearchMethod, SessionStore, TransportationType, telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "route-console", version, about = "Administer locations, transportations and route search")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print raw JSON instead of one line per item
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Credentials {
    #[arg(short, long, global = true, env = "ROUTE_CONSOLE_USERNAME")]
    username: Option<String>,

    #[arg(short, long, global = true, env = "ROUTE_CONSOLE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check credentials and remember the profile
    Login,
    /// Show the profile remembered from the last login
    Whoami,
    /// Forget the remembered profile
    Logout,
    #[command(subcommand)]
    Locations(LocationCommand),
    #[command(subcommand)]
    Transportations(TransportationCommand),
    #[command(subcommand)]
    Routes(RouteCommand),
}

#[derive(Debug, Args)]
struct LocationFields {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long)]
    code: String,
}

impl From<LocationFields> for LocationDraft {
    fn from(fields: LocationFields) -> Self {
        LocationDraft {
            name: fields.name,
            country: fields.country,
            city: fields.city,
            location_code: fields.code,
        }
    }
}

#[derive(Debug, Subcommand)]
enum LocationCommand {
    List,
    Get { id: i64 },
    Code { code: String },
    Create(LocationFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: LocationFields,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
struct TransportationFields {
    #[arg(long)]
    origin: String,
    #[arg(long)]
    origin_id: Option<i64>,
    #[arg(long)]
    destination: String,
    #[arg(long)]
    destination_id: Option<i64>,
    /// UBER, BUS, FLIGHT or SUBWAY
    #[arg(long = "type")]
    transportation_type: TransportationType,
    /// Weekdays 1 (Monday) to 7 (Sunday), comma separated; defaults to every day
    #[arg(long, value_delimiter = ',')]
    days: Vec<u8>,
}

impl TryFrom<TransportationFields> for TransportationDraft {
    type Error = anyhow::Error;

    fn try_from(fields: TransportationFields) -> anyhow::Result<Self> {
        let operating_days = if fields.days.is_empty() {
            OperatingDays::every_day()
        } else {
            OperatingDays::new(fields.days).map_err(anyhow::Error::msg)?
        };
        Ok(TransportationDraft {
            origin_location_id: fields.origin_id,
            origin_location_code: fields.origin,
            destination_location_id: fields.destination_id,
            destination_location_code: fields.destination,
            transportation_type: fields.transportation_type,
            operating_days,
        })
    }
}

#[derive(Debug, Subcommand)]
enum TransportationCommand {
    List,
    Get { id: i64 },
    /// Segments between two location codes
    Search { origin: String, destination: String },
    /// Segments leaving a location on a date
    Origin { origin: String, date: NaiveDate },
    Create(TransportationFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: TransportationFields,
    },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum RouteCommand {
    Search {
        origin: String,
        destination: String,
        /// Travel date, YYYY-MM-DD
        date: NaiveDate,
        /// Send the query as a JSON body
        #[arg(long)]
        post: bool,
    },
    Get { id: i64 },
    /// Legacy listing filtered by location ids
    List {
        #[arg(long)]
        origin_id: Option<i64>,
        #[arg(long)]
        destination_id: Option<i64>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn open_session_store(config: &ConsoleConfig) -> SessionStore {
    match ProfileStore::open(&config.session.profile_location) {
        Ok(profiles) => SessionStore::with_profile_store(profiles, config.session.profile_ttl()),
        Err(e) => {
            warn!("Profile storage unavailable, continuing without it: {}", e);
            SessionStore::in_memory()
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn items<T: Serialize>(&self, items: &[T], line: impl Fn(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
        } else if items.is_empty() {
            println!("No results");
        } else {
            for item in items {
                println!("{}", line(item));
            }
        }
        Ok(())
    }

    fn item<T: Serialize>(&self, item: &T, line: impl Fn(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else {
            println!("{}", line(item));
        }
        Ok(())
    }

    /// Mutations may answer with no body at all
    fn echoed<T: Serialize>(
        &self,
        item: Option<&T>,
        line: impl Fn(&T) -> String,
        done: &str,
    ) -> anyhow::Result<()> {
        match item {
            Some(item) => self.item(item, line),
            None => {
                println!("{done}");
                Ok(())
            }
        }
    }
}

fn print_search_result(output: &Output, result: &RouteSearchResult) -> anyhow::Result<()> {
    match result {
        RouteSearchResult::Direct(routes) => output.items(routes, |r| {
            format!(
                "#{} {} → {} {} {} - {} ({:.2})",
                r.id,
                r.origin.location_code,
                r.destination.location_code,
                r.transportation.transportation_type,
                r.departure_time,
                r.arrival_time,
                r.price
            )
        }),
        RouteSearchResult::Itineraries(itineraries) => output.items(itineraries, |i| {
            format!("{} ({} legs)", i.stops(), i.legs.len())
        }),
        RouteSearchResult::Unrecognized(raw) => {
            println!("{}", serde_json::to_string_pretty(raw)?);
            Ok(())
        }
    }
}

async fn run(cli: Cli, config: ConsoleConfig) -> anyhow::Result<()> {
    let session = Arc::new(open_session_store(&config));
    let output = Output { json: cli.json };

    match &cli.command {
        Command::Whoami => {
            match session.remembered_profile() {
                Some(profile) => println!("{} ({})", profile.display_name, profile.role),
                None => println!("Not signed in"),
            }
            return Ok(());
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
            return Ok(());
        }
        _ => {}
    }

    let transport = HttpTransport::new(&config.api).context("Failed to create HTTP client")?;
    let client = Arc::new(ApiClient::new(transport, session));

    let (Some(username), Some(password)) = (&cli.credentials.username, &cli.credentials.password)
    else {
        bail!("Credentials required: pass --username/--password or set ROUTE_CONSOLE_USERNAME/ROUTE_CONSOLE_PASSWORD");
    };
    let signed_in = client.login(username, password).await?;

    match cli.command {
        Command::Login => println!("Signed in as {} ({})", signed_in.display_name, signed_in.role),
        Command::Whoami | Command::Logout => {}
        Command::Locations(command) => match command {
            LocationCommand::List => output.items(&client.list_locations().await?, |l| {
                format!("#{} {} - {}, {}", l.id, l.label(), l.city, l.country)
            })?,
            LocationCommand::Get { id } => {
                output.item(&client.get_location(id).await?, |l| format!("#{} {}", l.id, l.label()))?;
            }
            LocationCommand::Code { code } => {
                output.item(&client.get_location_by_code(&code).await?, |l| {
                    format!("#{} {}", l.id, l.label())
                })?;
            }
            LocationCommand::Create(fields) => {
                let created = client.create_location(&fields.into()).await?;
                output.echoed(created.as_ref(), |l| format!("Created #{} {}", l.id, l.label()), "Location created")?;
            }
            LocationCommand::Update { id, fields } => {
                let updated = client.update_location(id, &fields.into()).await?;
                output.echoed(updated.as_ref(), |l| format!("Updated #{} {}", l.id, l.label()), &format!("Location #{id} updated"))?;
            }
            LocationCommand::Delete { id } => {
                client.delete_location(id).await?;
                println!("Deleted location #{id}");
            }
        },
        Command::Transportations(command) => match command {
            TransportationCommand::List => {
                output.items(&client.list_transportations().await?, |t| format!("#{} {}", t.id, t))?;
            }
            TransportationCommand::Get { id } => {
                output.item(&client.get_transportation(id).await?, |t| format!("#{} {}", t.id, t))?;
            }
            TransportationCommand::Search { origin, destination } => {
                let segments = client.search_transportations(&origin, &destination).await?;
                output.items(&segments, |t| format!("#{} {}", t.id, t))?;
            }
            TransportationCommand::Origin { origin, date } => {
                let segments = client.transportations_from_origin(&origin, date).await?;
                output.items(&segments, |t| format!("#{} {}", t.id, t))?;
            }
            TransportationCommand::Create(fields) => {
                let created = client.create_transportation(&fields.try_into()?).await?;
                output.echoed(created.as_ref(), |t| format!("Created #{} {}", t.id, t), "Transportation created")?;
            }
            TransportationCommand::Update { id, fields } => {
                let updated = client.update_transportation(id, &fields.try_into()?).await?;
                output.echoed(updated.as_ref(), |t| format!("Updated #{} {}", t.id, t), &format!("Transportation #{id} updated"))?;
            }
            TransportationCommand::Delete { id } => {
                client.delete_transportation(id).await?;
                println!("Deleted transportation #{id}");
            }
        },
        Command::Routes(command) => match command {
            RouteCommand::Search { origin, destination, date, post } => {
                let method = if post { SearchMethod::Post } else { SearchMethod::Get };
                let searcher = RouteSearcher::new(Arc::clone(&client)).with_method(method);
                let request = RouteSearchRequest::new(origin, destination, date);
                if let Some(result) = searcher.search(&request).await?.into_fresh() {
                    print_search_result(&output, &result)?;
                }
            }
            RouteCommand::Get { id } => {
                output.item(&client.get_route(id).await?, |r| {
                    format!(
                        "#{} {} → {} ({})",
                        r.id, r.origin.location_code, r.destination.location_code, r.transportation.transportation_type
                    )
                })?;
            }
            RouteCommand::List { origin_id, destination_id, date } => {
                let query = LegacyRouteQuery { origin_id, destination_id, date };
                let routes = client.list_routes_legacy(&query).await?;
                print_search_result(&output, &RouteSearchResult::Direct(routes))?;
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    telemetry::init(&config.logging)?;

    if let Err(e) = run(cli, config).await {
        if let Some(console_error) = e.downcast_ref::<ConsoleError>() {
            eprintln!("{}", console_error.user_message());
            std::process::exit(1);
        }
        return Err(e);
    }
    Ok(())
}
