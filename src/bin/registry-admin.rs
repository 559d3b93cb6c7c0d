use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use statuslist_registry::store::{InMemorySectionMetadataStore, InMemoryStatusStore, InMemorySubjectIndex};
use statuslist_registry::{Registry, RegistrySettings, SigningKey};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// Demo admin shell for a token status list registry, backed by the
/// in-memory reference stores. A real deployment swaps these for
/// database-backed `StatusStore`/`SectionMetadataStore`/`SubjectIndex`
/// implementations without touching anything below this file.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    subcommand_required = false,
    arg_required_else_help = false
)]
struct Args {
    /// PKCS8 PEM file holding the ECDSA P-256 signing key.
    #[arg(long)]
    signing_key_path: String,

    /// Base URL this registry is reachable at, embedded in published
    /// tokens' `aggregation_uri`.
    #[arg(long, default_value = "http://localhost:8080")]
    external_server_url: String,

    /// Value for the token `iss` claim.
    #[arg(long, default_value = "https://issuer.example")]
    issuer: String,

    /// Seed the initial section (0) with this many decoy rows. Must exceed
    /// the depletion threshold or the very first write rolls straight into
    /// section 1.
    #[arg(long, default_value_t = 5000)]
    initial_section_size: i64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive shell (default when no subcommand is given).
    Repl,
    /// Search the subject index.
    Search {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        date_of_birth: Option<String>,
    },
    /// Write a new status for a fresh credential, via the decoy-promotion path.
    Submit { status: u8 },
    /// Overwrite a known (section, index) slot directly.
    UpdateStatus { section: i64, index: i64, status: u8 },
    /// Print the currently cached JWT for a section.
    Jwt { section: i64 },
}

const PROMPT: &str = "statuslist> ";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    let registry = build_registry(&args).await?;
    registry.spawn_refresh();
    // Populate the cache for section 0 before the REPL's first `jwt` lookup;
    // otherwise a reader would have to wait for the first scheduled tick.
    registry.refresh.invalidate_section(0).await?;

    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => run_repl(registry).await?,
        Command::Search {
            first_name,
            last_name,
            date_of_birth,
        } => {
            let results = registry
                .admin
                .search_person(first_name.as_deref(), last_name.as_deref(), date_of_birth.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Submit { status } => {
            let (section, index) = registry.submit_status(status).await?;
            println!("wrote section={section} index={index}");
        }
        Command::UpdateStatus { section, index, status } => {
            registry.admin.update_status(section, index, status).await?;
            println!("updated section={section} index={index} status={status}");
        }
        Command::Jwt { section } => match registry.serving.get_cached_jwt(section) {
            Some(jwt) => println!("{jwt}"),
            None => println!("no cached token for section {section}"),
        },
    }
    Ok(())
}

async fn build_registry(args: &Args) -> Result<Registry> {
    let pem = std::fs::read_to_string(&args.signing_key_path)
        .with_context(|| format!("reading signing key at {}", args.signing_key_path))?;
    let signing_key = SigningKey::from_pkcs8_pem(&pem, None)?;

    let status_store: Arc<dyn statuslist_registry::StatusStore> = Arc::new(InMemoryStatusStore::new());
    let section_metadata: Arc<dyn statuslist_registry::SectionMetadataStore> =
        Arc::new(InMemorySectionMetadataStore::new());
    let subject_index: Arc<dyn statuslist_registry::SubjectIndex> = Arc::new(InMemorySubjectIndex::new());

    // Seed section 0 up front; a real deployment's store would already hold
    // whatever section history it was last left in.
    status_store
        .create_section(0, args.initial_section_size.max(1))
        .await?;

    let settings = RegistrySettings {
        signing_key_path: args.signing_key_path.clone(),
        external_server_url: args.external_server_url.clone(),
        section_size: args.initial_section_size,
        ..RegistrySettings::default()
    };

    Ok(Registry::new(
        status_store,
        section_metadata,
        subject_index,
        signing_key,
        &settings,
        args.issuer.clone(),
    ))
}

async fn run_repl(registry: Registry) -> Result<()> {
    println!("token status list registry admin shell. 'help' for commands, 'exit' to quit.");
    let mut editor = Editor::<(), DefaultHistory>::new()?;

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit" | "q") {
                    break;
                }
                if editor.add_history_entry(trimmed).is_err() {
                    eprintln!("ERR failed to store command in history");
                }
                if let Err(e) = dispatch_line(&registry, trimmed).await {
                    eprintln!("ERR {e}");
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("ERR failed to read input: {e}");
                break;
            }
        }
    }
    Ok(())
}

async fn dispatch_line(registry: &Registry, line: &str) -> Result<()> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("submit") => {
            let status: u8 = parts
                .next()
                .context("usage: submit <status>")?
                .parse()
                .context("status must be 0-255")?;
            let (section, index) = registry.submit_status(status).await?;
            println!("wrote section={section} index={index}");
        }
        Some("jwt") => {
            let section: i64 = parts.next().context("usage: jwt <section>")?.parse()?;
            match registry.serving.get_cached_jwt(section) {
                Some(jwt) => println!("{jwt}"),
                None => println!("no cached token for section {section}"),
            }
        }
        Some("search") => {
            let query = parts.next().unwrap_or("");
            let results = registry.admin.search_person(Some(query), None, None).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Some("help") | None => {
            println!("commands: submit <status> | jwt <section> | search <name> | exit");
        }
        Some(other) => println!("unknown command: {other} (try 'help')"),
    }
    Ok(())
}
