//! Visit Logger CLI
//!
//! Command-line interface for Visit Logger operations:
//! - Sign up / sign in
//! - List and create tracking scripts, print or copy snippets
//! - Page through analytics, print graphs, export CSV
//! - Send a test visit

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use visitlog::analytics::{AnalyticsView, ChartSeries, DayWindow, RecordView};
use visitlog::dashboard::{snippet, RegistryConfig, ScriptRegistry};
use visitlog::{
    AnalyticsBackend, Config, Identity, IdentityClient, SessionStore, TrackEvent, TrackerClient,
};

#[derive(Parser)]
#[command(name = "visitlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Website visit tracking from the terminal")]
#[command(long_about = "Visit Logger tracks visits to your websites.\nCreate a tracking script, embed its snippet, and browse the visits it records.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account email
    #[arg(long, env = "VISITLOG_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "VISITLOG_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup {
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Check credentials and show the account
    Login,

    /// List your tracking scripts
    Scripts,

    /// Create a tracking script
    CreateScript {
        /// Script name (e.g., the website it tracks)
        name: String,
    },

    /// Print a script's embeddable snippet
    Snippet {
        /// Script id
        script_id: String,
        /// Copy to the system clipboard (requires the `clipboard` feature)
        #[arg(long)]
        copy: bool,
    },

    /// Show visits recorded for a script
    Analytics {
        /// Script id
        script_id: String,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Output file for csv (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show visits per day for a script
    Graph {
        /// Script id
        script_id: String,
        /// Window in days (3, 5, 10, 30, 365)
        #[arg(short, long, default_value = "5")]
        days: u32,
    },

    /// Send a test visit for a script
    Track {
        /// Script id
        script_id: String,
        /// Reported host / address
        #[arg(long, default_value = "localhost")]
        ip: String,
    },

    /// Send a password recovery email
    ResetPassword {
        /// Account email
        email: String,
    },

    /// Print the quick start guide with the sample snippet
    Docs,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Backend clients built from configuration
struct Backends {
    config: Config,
    session: SessionStore,
    identity: Arc<IdentityClient>,
    tracker: Arc<TrackerClient>,
    email: Option<String>,
    password: Option<String>,
}

impl Backends {
    fn new(config: Config, cli: &Cli) -> anyhow::Result<Self> {
        config.validate()?;

        let identity = Arc::new(IdentityClient::new(config.identity_client())?);
        let tracker = Arc::new(TrackerClient::new(config.tracker_client())?);
        let session = SessionStore::new(identity.clone(), config.session());

        Ok(Self {
            config,
            session,
            identity,
            tracker,
            email: cli.email.clone(),
            password: cli.password.clone(),
        })
    }

    fn credentials(&self) -> anyhow::Result<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => bail!("--email and --password (or VISITLOG_EMAIL / VISITLOG_PASSWORD) are required"),
        }
    }

    async fn sign_in(&self) -> anyhow::Result<Identity> {
        let (email, password) = self.credentials()?;
        Ok(self.session.login(email, password).await?)
    }

    fn registry(&self) -> ScriptRegistry {
        ScriptRegistry::new(
            self.identity.clone(),
            self.tracker.clone(),
            RegistryConfig {
                database_id: self.config.identity.database_id.clone(),
                collection_id: self.config.identity.scripts_collection_id.clone(),
                track_url: self.config.tracker_client().track_url(),
            },
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need no backend
    match &cli.command {
        Commands::Config { output } => {
            let content = visitlog::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
        Commands::Docs => {
            let tracker = Config::load_default().tracker_client();
            println!("Quick Start Guide\n");
            println!("1. Add the tracking script");
            println!("Paste this into your website's HTML, just before the closing </body> tag:\n");
            println!("{}\n", snippet::sample(&tracker.track_url()));
            println!("2. View your analytics");
            println!("Once installed, visits are tracked automatically. Run `visitlog scripts` and `visitlog analytics <script-id>`.");
            return Ok(());
        }
        _ => {}
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    visitlog::logging::init(&config.logging);

    let ctx = Backends::new(config, &cli)?;

    match cli.command {
        Commands::Signup { name } => {
            let (email, password) = ctx.credentials()?;
            let identity = ctx.session.sign_up(email, password, name.as_deref()).await?;
            println!("Account created: {} ({})", identity.display_name(), identity.id);
        }

        Commands::Login => {
            let identity = ctx.sign_in().await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                println!("Signed in as {} ({})", identity.display_name(), identity.id);
            }
        }

        Commands::Scripts => {
            let identity = ctx.sign_in().await?;
            let registry = ctx.registry();
            registry.refresh(&identity.id).await?;
            let snapshot = registry.snapshot().await;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&snapshot.scripts)?);
            } else if snapshot.scripts.is_empty() {
                println!("No scripts yet. Create one with `visitlog create-script <name>`.");
            } else {
                println!("{:<38} | Name", "Script ID");
                println!("{}", "-".repeat(60));
                for script in &snapshot.scripts {
                    println!("{:<38} | {}", script.script_id, script.name);
                }
            }
        }

        Commands::CreateScript { name } => {
            let identity = ctx.sign_in().await?;
            let created = ctx.registry().create(&identity.id, &name).await?;
            println!("Script created: {}", created.script_id);
        }

        Commands::Snippet { script_id, copy } => {
            let identity = ctx.sign_in().await?;
            let registry = ctx.registry();
            registry.refresh(&identity.id).await?;

            let script = registry
                .get(&script_id)
                .await
                .with_context(|| format!("Script not found: {}", script_id))?;

            if copy {
                copy_snippet(&registry, &script_id).await?;
                println!("Copied!");
            } else {
                println!("{}", registry.embed_code(&script));
            }
        }

        Commands::Analytics {
            script_id,
            page,
            output,
        } => {
            ctx.sign_in().await?;
            let view = AnalyticsView::new(
                ctx.tracker.clone(),
                &script_id,
                ctx.config.analytics.page_size,
            );
            let table = view.table.load_page(page).await;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&table)?),
                "csv" => write_csv(&table.records, output.as_deref())?,
                _ => {
                    if let Some(message) = table.empty_message {
                        println!("{}", message);
                    } else {
                        print_records(&table.records);
                    }
                    println!("\nPage {} of {}", table.page, table.total_pages);
                }
            }
        }

        Commands::Graph { script_id, days } => {
            let window = match DayWindow::from_days(days) {
                Some(window) => window,
                None => bail!("Unsupported window {}; use 3, 5, 10, 30 or 365", days),
            };

            ctx.sign_in().await?;
            let view = AnalyticsView::new(ctx.tracker.clone(), &script_id, 1);
            view.graph.load(window).await;
            let points = view.graph.points().await;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("{}\n", window.label());
                match ChartSeries::from_points(&points, 0, 0) {
                    Some(series) => {
                        for line in series.ascii_bars(40) {
                            println!("{}", line);
                        }
                    }
                    None => println!("No data"),
                }
            }
        }

        Commands::Track { script_id, ip } => {
            let identity = ctx.sign_in().await?;
            let event = TrackEvent::now(
                &script_id,
                &identity.id,
                ip,
                format!("visitlog-cli/{}", env!("CARGO_PKG_VERSION")),
            );
            ctx.tracker.track(&event).await?;
            println!("Visit recorded for {}", script_id);
        }

        Commands::ResetPassword { email } => {
            if let Some(message) = visitlog::forms::validate_email(&email) {
                bail!(message);
            }
            ctx.session.reset_password(&email).await?;
            println!("Recovery email sent to {}", email);
        }

        Commands::Config { .. } | Commands::Docs => {}
    }

    Ok(())
}

#[cfg(feature = "clipboard")]
async fn copy_snippet(registry: &ScriptRegistry, script_id: &str) -> anyhow::Result<()> {
    registry
        .copy_snippet(script_id, &visitlog::dashboard::SystemClipboard)
        .await?;
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
async fn copy_snippet(_registry: &ScriptRegistry, _script_id: &str) -> anyhow::Result<()> {
    bail!("Clipboard support not built; rebuild with `--features clipboard` or omit --copy")
}

fn print_records(records: &[RecordView]) {
    println!(
        "{:<16} | {:<22} | {:<14} | {:<10} | User Agent",
        "IP Address", "Timestamp", "City", "Page Views"
    );
    println!("{}", "-".repeat(100));

    for record in records {
        let views = record.page_views.as_deref().unwrap_or("N/A");
        println!(
            "{:<16} | {:<22} | {:<14} | {:<10} | {}",
            record.ip_address, record.local_time, record.city, views, record.user_agent
        );
    }
}

fn write_csv(records: &[RecordView], output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let sink: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let mut writer = csv::Writer::from_writer(sink);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Wrote {} rows to {:?}", records.len(), path);
    }
    Ok(())
}
