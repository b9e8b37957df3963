mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use recoverly_core::{
    Carrier, Case, CaseLane, CaseStatus, ClaimQuery, ClaimStatus, ConfidenceLabel, Evidence,
    EvidenceSource, EvidenceType, load_cases,
};
use recoverly_store::{
    CaseFilter, CaseSet, CaseStore, HoldMode, StoreConfig, TransitionPolicy, UndoState,
    run_undo_countdown,
};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recoverly")]
#[command(about = "Shipping cost recovery cases: views, reports, and approvals")]
#[command(version)]
struct Cli {
    /// JSON file of cases. Defaults to the built-in demo set.
    #[arg(long, global = true, env = "RECOVERLY_FIXTURES")]
    fixtures: Option<PathBuf>,
    /// JSON store config (undo window, hold mode, policy, evidence table).
    #[arg(long, global = true, env = "RECOVERLY_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides `hold_mode` from the config: toast | persist.
    #[arg(long, global = true, env = "RECOVERLY_HOLD_MODE")]
    hold_mode: Option<HoldMode>,
    /// Overrides `transition_policy` from the config: unchecked | enforced.
    #[arg(long, global = true, env = "RECOVERLY_POLICY")]
    policy: Option<TransitionPolicy>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cases as a table.
    List {
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
        #[arg(long)]
        status: Option<CaseStatus>,
        #[arg(long)]
        lane: Option<CaseLane>,
        #[arg(long)]
        carrier: Option<Carrier>,
        #[arg(long)]
        confidence: Option<ConfidenceLabel>,
        /// Tracking number, order number or customer name.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one case in full.
    Show { id: String },
    /// Recovery totals, carrier breakdown, denial reasons.
    Report,
    /// Legacy claims table.
    Claims {
        #[arg(long)]
        status: Option<ClaimStatus>,
        #[arg(long)]
        carrier: Option<Carrier>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Approve and submit one or more cases.
    Approve {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Revert immediately through the undo window.
        #[arg(long, conflicts_with = "wait")]
        undo: bool,
        /// Keep the undo window open until it expires. Ctrl-C undoes.
        #[arg(long)]
        wait: bool,
    },
    /// Put a case on hold.
    Hold {
        id: String,
        #[arg(long)]
        wait: bool,
    },
    /// Attach newly received evidence to a case.
    Receive {
        id: String,
        #[arg(long = "type")]
        kind: EvidenceType,
        #[arg(long, default_value = "UPLOAD")]
        source: EvidenceSource,
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        wait: bool,
    },
    /// Log a request for customer evidence.
    Request { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    All,
    Ready,
    Attention,
    Actionable,
    Held,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("recoverly v{}", env!("CARGO_PKG_VERSION"));
    let mut store = open_store(&cli)?;

    match cli.command {
        Command::List {
            view,
            status,
            lane,
            carrier,
            confidence,
            search,
        } => {
            let set = store.cases();
            let base: Vec<&Case> = match view {
                View::All => set.iter().collect(),
                View::Ready => set.ready_cases(),
                View::Attention => set.needs_attention(),
                View::Actionable => set.actionable(),
                View::Held => set.held_cases(),
            };
            let filter = CaseFilter {
                lane,
                carrier,
                confidence,
                status,
            };
            let matched: Vec<&Case> = match &search {
                Some(q) => set.search(q),
                None => set.iter().collect(),
            };
            let rows: Vec<Case> = base
                .into_iter()
                .filter(|c| filter.matches(c) && matched.iter().any(|m| m.id == c.id))
                .cloned()
                .collect();
            tracing::debug!(active = filter.active(), rows = rows.len(), "filtered case list");
            display::print_case_table(&rows, filter.active())?;
        }
        Command::Show { id } => {
            let case = find(store.cases(), &id)?;
            let completeness = store
                .completeness(&id)
                .with_context(|| format!("no case with id {id}"))?;
            display::print_case_card(case, &completeness, chrono::Utc::now())?;
        }
        Command::Report => display::print_report(store.cases()),
        Command::Claims {
            status,
            carrier,
            search,
            page,
        } => {
            let claims = store.cases().claims();
            let query = ClaimQuery {
                status,
                carrier,
                search,
            };
            display::print_claims(&query.page(&claims, page), &claims);
        }
        Command::Approve { ids, undo, wait } => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let approved = match ids.as_slice() {
                [id] => usize::from(store.approve(id)?),
                many => store.approve_many(many)?,
            };
            if approved == 0 {
                bail!("no matching cases to approve");
            }
            let store = settle(store, undo, wait).await?;
            for id in &ids {
                if let Some(case) = store.cases().get(id) {
                    println!("  {:<10} {}", case.id, case.status.label());
                }
            }
        }
        Command::Hold { id, wait } => {
            if !store.hold(&id) {
                bail!("no case with id {id}");
            }
            let store = settle(store, false, wait).await?;
            let case = find(store.cases(), &id)?;
            println!("  {:<10} {} held={}", case.id, case.status.label(), case.held);
        }
        Command::Receive {
            id,
            kind,
            source,
            file,
            summary,
            wait,
        } => {
            let evidence = Evidence {
                kind,
                source,
                file_ref: file,
                summary,
            };
            if !store.record_evidence_received(&id, evidence) {
                bail!("no case with id {id}");
            }
            let store = settle(store, false, wait).await?;
            let case = find(store.cases(), &id)?;
            println!(
                "  {:<10} {} ({} evidence item(s))",
                case.id,
                case.status.label(),
                case.evidence.len()
            );
        }
        Command::Request { id } => {
            if !store.record_evidence_requested(&id) {
                bail!("no case with id {id}");
            }
            println!("Evidence requested for case {id}.");
        }
    }

    Ok(())
}

/// Load cases and config, then apply the command-line overrides.
fn open_store(cli: &Cli) -> anyhow::Result<CaseStore> {
    let cases = match &cli.fixtures {
        Some(path) => load_fixture_file(path)?,
        None => CaseSet::demo()?,
    };
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(mode) = cli.hold_mode {
        config.hold_mode = mode;
    }
    if let Some(policy) = cli.policy {
        config.transition_policy = policy;
    }
    Ok(CaseStore::new(cases, config))
}

fn load_fixture_file(path: &Path) -> anyhow::Result<CaseSet> {
    let cases = load_cases(path).with_context(|| format!("loading {}", path.display()))?;
    Ok(CaseSet::new(cases))
}

fn find<'a>(set: &'a CaseSet, id: &str) -> anyhow::Result<&'a Case> {
    set.get(id).with_context(|| format!("no case with id {id}"))
}

/// Show the undo toast, then undo, wait out the window, or leave it pending.
async fn settle(mut store: CaseStore, undo: bool, wait: bool) -> anyhow::Result<CaseStore> {
    if let Some(window) = store.pending_undo() {
        display::print_undo(window);
    }
    if undo {
        store.undo()?;
        println!("Undone.");
        return Ok(store);
    }
    if !wait {
        return Ok(store);
    }

    let shared = Arc::new(Mutex::new(store));
    let closed = tokio::select! {
        state = run_undo_countdown(shared.clone()) => state,
        _ = tokio::signal::ctrl_c() => {
            shared.lock().await.undo()?;
            Some(UndoState::Undone)
        }
    };
    match closed {
        Some(UndoState::Undone) => println!("Undone."),
        Some(UndoState::Expired) => println!("Undo window expired."),
        Some(UndoState::Dismissed) => println!("Dismissed."),
        Some(UndoState::Active { .. }) | None => {}
    }
    let store = Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("store still shared after countdown"))?
        .into_inner();
    Ok(store)
}
