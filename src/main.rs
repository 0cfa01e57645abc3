//! NeoNS `.neo` redirect host.
//!
//! Drives the library from the command line, standing in for the browser:
//! navigation requests come from arguments or stdin, and rules live in the
//! bundled store, persisted to a JSON file when a store path is given.
//!
//! ```text
//!   request URL ──▶ interceptor ──▶ reconciler ──▶ resolver ──▶ Neo N3 node
//!                   (pattern +          │            (invokefunction resolve)
//!                    resource type)     ▼
//!                                  rule store ──▶ neons-rules.json
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use neons_redirect::config::{load_config, RedirectConfig};
use neons_redirect::interceptor::{Interception, NavigationRequest, RequestInterceptor};
use neons_redirect::lifecycle::{signals, KeepAlive, Shutdown};
use neons_redirect::observability::{logging, metrics};
use neons_redirect::reconcile::{Reconciler, RuleTemplate};
use neons_redirect::resolver::{DomainResolver, NeoRpcClient, Resolution};
use neons_redirect::rules::{InMemoryRuleStore, ResourceType, RuleStoreAccessor};

#[derive(Parser)]
#[command(name = "neons-redirect")]
#[command(about = "Resolve .neo names through NeoNS and maintain redirect rules", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule store file (overrides `rules.store_path`).
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a .neo URL without touching the rule store
    Resolve { url: String },
    /// Intercept one or more navigation requests
    Intercept {
        #[arg(required = true)]
        urls: Vec<String>,

        #[arg(long, default_value = "main_frame")]
        resource_type: ResourceType,
    },
    /// Print the stored redirect rules
    Rules,
    /// Remove every redirect rule
    Reset,
    /// Intercept request URLs read from stdin, one per line
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RedirectConfig::default(),
    };
    logging::init_logging(&config.observability.log_level);

    let rules = RuleStoreAccessor::new(open_store(cli.store.as_ref(), &config)?);

    match cli.command {
        Commands::Resolve { url } => {
            let client = NeoRpcClient::new(&config.node)?;
            match client.resolve(&url).await {
                Resolution::Resolved(target) => println!("{}", target),
                Resolution::Unresolved => println!("unresolved"),
            }
        }
        Commands::Intercept {
            urls,
            resource_type,
        } => {
            let interceptor = build_interceptor(&config, rules)?;
            let handles: Vec<_> = urls
                .into_iter()
                .map(|url| {
                    let handle = interceptor.dispatch(NavigationRequest::new(url.clone(), resource_type));
                    (url, handle)
                })
                .collect();

            for (url, handle) in handles {
                print_interception(&url, &handle.await?);
            }
        }
        Commands::Rules => {
            let mut list = rules.list_rules().await?;
            list.sort_by_key(|rule| rule.id);
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Commands::Reset => match rules.clear_all().await {
            Ok(count) => println!("All dynamic rules have been reset successfully ({} removed).", count),
            Err(e) => {
                eprintln!("Failed to reset the rules: {}", e);
                return Err(e.into());
            }
        },
        Commands::Watch => run_watch(&config, rules).await?,
    }

    Ok(())
}

fn open_store(
    override_path: Option<&PathBuf>,
    config: &RedirectConfig,
) -> Result<Arc<InMemoryRuleStore>, Box<dyn Error>> {
    let path = override_path
        .cloned()
        .or_else(|| config.rules.store_path.as_ref().map(PathBuf::from));

    let store = match path {
        Some(path) => InMemoryRuleStore::load_from_file(&path, config.rules.max_rules)?,
        None => {
            tracing::warn!("No rule store path configured, rules will not outlive this process");
            InMemoryRuleStore::new(config.rules.max_rules)
        }
    };
    Ok(Arc::new(store))
}

fn build_interceptor(
    config: &RedirectConfig,
    rules: RuleStoreAccessor,
) -> Result<Arc<RequestInterceptor>, Box<dyn Error>> {
    let client = NeoRpcClient::new(&config.node)?;
    let template = RuleTemplate::from_config(config)?;
    let reconciler = Arc::new(Reconciler::new(Arc::new(client), rules, template));
    Ok(Arc::new(RequestInterceptor::from_config(
        &config.interception,
        reconciler,
    )?))
}

async fn run_watch(config: &RedirectConfig, rules: RuleStoreAccessor) -> Result<(), Box<dyn Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let interceptor = build_interceptor(config, rules)?;
    let shutdown = Arc::new(Shutdown::new());
    let signal_task = signals::spawn_signal_handler(Arc::clone(&shutdown));
    let keepalive = tokio::spawn(
        KeepAlive::new(Duration::from_secs(config.lifecycle.keepalive_secs)).run(shutdown.subscribe()),
    );

    tracing::info!(pattern = %config.interception.pattern, "Watching stdin for navigation requests");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.subscribe();
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let url = line.trim().to_string();
                if url.is_empty() {
                    continue;
                }
                let handle = interceptor.dispatch(NavigationRequest::new(url.clone(), ResourceType::MainFrame));
                in_flight.spawn(async move { (url, handle.await) });
            }
            Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                report(done);
            }
            _ = stop.recv() => break,
        }
    }

    shutdown.trigger();
    while let Some(done) = in_flight.join_next().await {
        report(done);
    }
    let _ = keepalive.await;
    let _ = signal_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

type Completed = Result<(String, Result<Interception, tokio::task::JoinError>), tokio::task::JoinError>;

fn report(done: Completed) {
    match done {
        Ok((url, Ok(interception))) => print_interception(&url, &interception),
        Ok((url, Err(e))) => tracing::error!(%url, error = %e, "Interception task failed"),
        Err(e) => tracing::error!(error = %e, "Interception task failed"),
    }
}

fn print_interception(url: &str, interception: &Interception) {
    match interception {
        Interception::Ignored => println!("{}: ignored", url),
        Interception::Reconciled(outcome) => println!("{}: {}", url, outcome),
        Interception::Failed(e) => println!("{}: failed: {}", url, e),
    }
}
