//! CLI entry point.
//!
//! # Responsibility
//! - Provide a small executable over `clientboard_core` for local checks.
//! - Print the dashboard counters, the client grid and the task board.
//! - Register clients and tasks without the desktop UI.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use clientboard_core::{
    attach_dashboard, init_logging, AppConfig, AssigneeFilter, ClientId, ClientQuery,
    ClientService, ClientStatus, ClientStore, CompletionFilter, NewClient, SortKey, StatusFilter,
    TaskQuery,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const ENV_CONFIG_PATH: &str = "CLIENTBOARD_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "clientboard", version, about = "Client engagement dashboard")]
struct Cli {
    /// TOML config file; falls back to $CLIENTBOARD_CONFIG, then defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print counters, the client grid and the task board.
    Show(ShowArgs),
    /// Register a new client.
    AddClient {
        name: String,
        #[arg(long, default_value = "onboarding")]
        status: ClientStatus,
    },
    /// Append a task to a client.
    AddTask { client_id: ClientId, text: String },
}

#[derive(Args, Debug, Default)]
struct ShowArgs {
    /// Case-insensitive substring of client name or task text.
    #[arg(long, default_value = "")]
    search: String,
    /// all | onboarding | active | pending | completed
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    /// next_meeting | open_tasks | created
    #[arg(long, default_value = "next_meeting")]
    sort: SortKey,
    /// all | unassigned | <name>
    #[arg(long, default_value = "all")]
    assignee: AssigneeFilter,
    /// all | pending | completed
    #[arg(long, default_value = "all")]
    completion: CompletionFilter,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("clientboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli.config)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let store = ClientStore::open(&config.db_path)?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command.unwrap_or(Command::Show(ShowArgs::default())) {
        Command::Show(args) => show(&store, args),
        Command::AddClient { name, status } => {
            let service = ClientService::new(&store);
            let mut input = NewClient::new(name);
            input.status = status;
            let client = service.create_client(input)?;
            println!("{}", client.id);
            Ok(())
        }
        Command::AddTask { client_id, text } => {
            let snapshot = store.snapshot()?;
            let service = ClientService::new(&store);
            let client = service.add_task(snapshot.clients(), client_id, &text)?;
            println!("{} open_tasks={}", client.id, client.open_task_count());
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig, Box<dyn Error>> {
    let path = path.or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn show(store: &ClientStore, args: ShowArgs) -> Result<(), Box<dyn Error>> {
    let (dashboard, _subscription) = attach_dashboard(store);
    let mut state = dashboard.lock();
    if let Some(err) = state.sync_error() {
        return Err(err.to_string().into());
    }

    state.client_query = ClientQuery {
        search: args.search.clone(),
        status: args.status,
        sort: args.sort,
    };
    state.task_query = TaskQuery {
        search: args.search,
        assignee: args.assignee,
        completion: args.completion,
    };

    let now = Utc::now();
    let today = now.date_naive();
    let stats = state.stats(now);
    println!(
        "clients={} pending_tasks={} upcoming_meetings={}",
        stats.total_clients, stats.pending_tasks, stats.upcoming_meetings
    );

    println!();
    for client in state.visible_clients() {
        let next_meeting = client
            .next_meeting
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let soon = if client.is_meeting_soon(today) { " (soon)" } else { "" };
        println!(
            "{}  {:<24} {:<12} next={}{} progress={}% open={}",
            client.id,
            client.name,
            client.status.label(),
            next_meeting,
            soon,
            client.progress_percent(),
            client.open_task_count()
        );
    }

    println!();
    for row in state.task_rows() {
        let mark = if row.task.completed { "x" } else { " " };
        let due = row
            .task
            .due_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let overdue = if row.task.is_overdue(today) { " overdue" } else { "" };
        println!(
            "[{mark}] {}  ({})  due={}{} assignee={}",
            row.task.text,
            row.client_name,
            due,
            overdue,
            row.task.assignee.as_deref().unwrap_or("unassigned")
        );
    }

    Ok(())
}
