mod commands;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{DashboardEvent, EndpointResolver, FetchError, FetchOutcome, QueryController};
use shared::domain::PageSize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Browse student performance records from the terminal")]
struct Args {
    /// API endpoint to try, in order. Repeat to give fallbacks.
    #[arg(long = "endpoint")]
    endpoints: Vec<String>,
    /// Settings file; defaults to ./dashboard.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    page_size: Option<PageSize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if !args.endpoints.is_empty() {
        settings.endpoints = args.endpoints;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }

    let session = EndpointResolver::new(settings.resolver_options())
        .resolve(&settings.endpoints)
        .await
        .context("failed to initialize the dashboard, please ensure the API is running")?;
    info!(endpoint = %session.endpoint(), "dashboard ready");

    let controller = QueryController::new(Arc::new(session), settings.controller_options());
    let renderer = spawn_renderer(Arc::clone(&controller), controller.subscribe_events());

    // The first page is shown even when it fails; the banner explains why.
    let _ = controller.initialize().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err:#}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        dispatch(&controller, command).await;
    }

    renderer.abort();
    Ok(())
}

async fn dispatch(controller: &Arc<QueryController>, command: Command) {
    match command {
        Command::Search(text) => controller.input_search(&text).await,
        Command::Options => {
            let snapshot = controller.snapshot().await;
            print!("{}", render::options_list(&snapshot.options, &snapshot.query));
        }
        Command::Dismiss => controller.dismiss_error().await,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
        fetching => {
            // Fetches run in the background so input stays responsive; their
            // results arrive through the event stream.
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                if run_fetch(&controller, fetching).await.is_none() {
                    println!("No more pages in that direction.");
                }
            });
        }
    }
}

async fn run_fetch(
    controller: &QueryController,
    command: Command,
) -> Option<Result<FetchOutcome, FetchError>> {
    let outcome = match command {
        Command::Course(course) => controller.set_course(course).await,
        Command::Subject(subject) => controller.set_subject(subject).await,
        Command::PageSize(page_size) => controller.set_page_size(page_size).await,
        Command::Sort(field) => controller.sort_by(field).await,
        Command::Page(page) => controller.go_to_page(page).await,
        Command::Next => return controller.next_page().await,
        Command::Previous => return controller.previous_page().await,
        _ => controller.refresh().await,
    };
    Some(outcome)
}

fn spawn_renderer(
    controller: Arc<QueryController>,
    mut events: broadcast::Receiver<DashboardEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => render_event(&controller, event).await,
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn render_event(controller: &QueryController, event: DashboardEvent) {
    match event {
        DashboardEvent::FilterOptionsLoaded(options) => println!(
            "Loaded {} courses and {} subjects, type 'options' to list them.",
            options.courses.len(),
            options.subjects.len()
        ),
        DashboardEvent::Loading => println!("Loading..."),
        DashboardEvent::ResultsUpdated(result) => {
            let query = controller.snapshot().await.query;
            print!("{}", render::results_view(&result, &query));
        }
        DashboardEvent::FetchFailed { context, error } => {
            println!("{}", render::error_banner(context, &error))
        }
        DashboardEvent::SearchHeld { draft } => println!(
            "Type at least {} characters to search, '{}' was not sent.",
            client_core::query::MIN_SEARCH_CHARS,
            draft.trim()
        ),
        DashboardEvent::ErrorDismissed => {}
    }
}
