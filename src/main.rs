use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sipbrain_cockpit::session::{GuidanceHealth, Speaker};
use sipbrain_cockpit::{
    create_router, AppState, BackendClient, CockpitSession, Collaborators, Config, RestStore,
    SessionEvent, SessionFactory, WsGuidanceConnector,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long the CLI waits for the summary write before the process exits
const SUMMARY_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "sipbrain-cockpit", version, about = "Live call-assist cockpit")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/cockpit")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control API
    Serve,
    /// Run an interactive call against a lead; type customer lines, `/end` to hang up
    Call { lead_id: String },
    /// List leads assigned to the configured agent
    Leads,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Agent: {} ({})", cfg.agent.name, cfg.agent.id);

    match cli.command {
        Command::Serve => serve(&cfg).await,
        Command::Call { lead_id } => call(&cfg, &lead_id).await,
        Command::Leads => leads(&cfg).await,
    }
}

fn session_factory(cfg: &Config) -> SessionFactory {
    let store = Arc::new(RestStore::new(&cfg.store.url, &cfg.store.api_key));
    let collaborators = Collaborators {
        leads: store.clone(),
        interactions: store,
        guidance: Arc::new(WsGuidanceConnector::new(&cfg.backend.guidance_ws_url)),
    };
    SessionFactory::new(cfg.session_config(), cfg.agent.clone(), collaborators)
}

async fn serve(cfg: &Config) -> Result<()> {
    let state = AppState::new(session_factory(cfg));
    let app = create_router(state);

    let addr = cfg.http_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP control API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

async fn call(cfg: &Config, lead_id: &str) -> Result<()> {
    let session = session_factory(cfg).create(lead_id);
    let renderer = tokio::spawn(render_events(session.subscribe()));

    println!("INITIALIZING...");
    session.connect().await?;
    print_header(&session).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) if line.trim() == "/end" => break,
                    Some(line) => {
                        session.submit_utterance(&line).await?;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let ended = session.end().await?;
    println!(
        "Call ended after {}s. Objections: {}",
        ended.record.duration_sec,
        if ended.record.objections_raised.is_empty() {
            "none".to_string()
        } else {
            ended.record.objections_raised.join(", ")
        }
    );

    // Leaving the call does not wait on the write; only process exit does
    match tokio::time::timeout(SUMMARY_FLUSH_TIMEOUT, ended.write).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!("Call summary not saved: {}", e),
        Ok(Err(e)) => warn!("Call summary task failed: {}", e),
        Err(_) => warn!("Call summary still pending after {:?}", SUMMARY_FLUSH_TIMEOUT),
    }

    drop(session);
    renderer.abort();
    Ok(())
}

async fn print_header(session: &CockpitSession) {
    let snapshot = session.snapshot().await;
    if let Some(lead) = &snapshot.lead {
        println!("● LIVE  {}  {}  ({})", lead.name, lead.city, lead.occupation);
    }
    if let GuidanceHealth::Degraded { reason } = &snapshot.guidance {
        println!("!! Guidance unavailable: {}", reason);
    }
    println!("Type what the customer says. /end to hang up.");
}

/// Print cards, script updates and warnings as they arrive
async fn render_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Renderer skipped {} events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event {
            SessionEvent::TranscriptAppended(entry) => {
                let who = match entry.speaker {
                    Speaker::Customer => "Customer",
                    Speaker::Agent => "Agent",
                };
                println!("[{}] {}: {}", entry.timestamp.format("%H:%M"), who, entry.text);
            }
            SessionEvent::InterventionReceived(card) => {
                println!("┌ {:?}: {}", card.kind, card.title);
                println!("│ {}", card.content);
                for (label, value) in card.table_rows() {
                    println!("│   {:<16} {}", label, value);
                }
                println!("└");
            }
            SessionEvent::ScriptUpdated(script) => println!("Suggested script: {}", script),
            SessionEvent::GuidanceDegraded(reason) => println!("!! Guidance degraded: {}", reason),
            SessionEvent::LeadBlocked(reason) => println!("!! Cannot load lead: {}", reason),
            SessionEvent::SummaryWriteFailed(reason) => {
                println!("!! Call summary not saved: {}", reason)
            }
            SessionEvent::StatusChanged(_) | SessionEvent::SummaryWritten => {}
        }
    }
}

async fn leads(cfg: &Config) -> Result<()> {
    let backend = BackendClient::new(&cfg.backend.api_url);
    let leads = backend.agent_leads(&cfg.agent.id).await?;

    for summary in leads {
        println!(
            "{:<12} {:<24} {:<12} {:<14} {}",
            summary.lead.id,
            summary.lead.name,
            summary.lead.city,
            summary.lead.occupation,
            summary.ai_strategy_tag.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
