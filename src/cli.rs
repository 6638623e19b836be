//! Command-line surface: one subcommand per automation the desktop app runs.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::browser::BrowserSession;
use crate::config::{BrowserBuilder, DEFAULT_DEBUG_PORT};
use crate::page::Page;
use crate::report::{RecordStyle, Report};
use crate::table::{TableAction, TableOps};
use crate::tables_api::{GetTablesRequest, TablesClient, DEFAULT_LIMIT};
use crate::task::{TaskRunner, TaskSpec};
use crate::voyager::{TaskExecutor, TaskPlan};

/// Characters of the base64 screenshot echoed back by `open`.
const SCREENSHOT_PREVIEW_CHARS: usize = 100;

/// Browser automation relay reporting results as JSON
#[derive(Parser, Debug)]
#[command(name = "browser-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output (logs go to stderr)
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a URL and report its title and a screenshot preview
    Open(OpenArgs),
    /// Run the steps of a task description
    RunTask(RunTaskArgs),
    /// Execute a task with the fixed navigate/fill/submit/extract plan
    Voyager(VoyagerArgs),
    /// Read or change an in-page table
    Table(TableArgs),
    /// List the user's tables through the table-api edge function
    GetTables(GetTablesArgs),
}

/// How to reach Chrome.
#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Chrome remote-debugging port
    #[arg(long, default_value_t = DEFAULT_DEBUG_PORT)]
    pub port: u16,

    /// Launch a private headless Chrome instead of connecting to `--port`
    #[arg(long)]
    pub launch: bool,

    /// Show the launched browser window
    #[arg(long, requires = "launch")]
    pub headed: bool,

    /// Chrome executable for `--launch`
    #[arg(long, requires = "launch")]
    pub chrome_path: Option<String>,

    /// Default timeout for element lookups, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,
}

impl BrowserArgs {
    async fn session(&self) -> anyhow::Result<BrowserSession> {
        let mut builder = BrowserBuilder::new()
            .port(self.port)
            .launch(self.launch)
            .headless(!self.headed)
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_path(path);
        }
        builder
            .build()
            .await
            .context("failed to acquire browser")
    }
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// URL to open
    #[arg(long, default_value = "https://example.com")]
    pub url: String,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(Args, Debug)]
pub struct RunTaskArgs {
    /// Task JSON data or path to a JSON file
    #[arg(long)]
    pub task: Option<String>,

    /// Browser to use
    #[arg(long, default_value = "chrome")]
    pub browser: String,
}

#[derive(Args, Debug)]
pub struct VoyagerArgs {
    /// Task description, used to build the fixed four-step plan
    #[arg(long, required_unless_present = "plan")]
    pub task: Option<String>,

    /// Plan JSON or path to a plan file; its own `task` drives the run
    #[arg(long)]
    pub plan: Option<String>,

    /// Pause between actions, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub pause_ms: u64,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Page that renders the table
    #[arg(long)]
    pub url: String,

    /// Table ID (the element is `#table-<id>`)
    #[arg(long)]
    pub table_id: String,

    #[arg(long, value_enum)]
    pub table_action: TableAction,

    /// JSON payload for write and update
    #[arg(long)]
    pub data: Option<String>,

    /// Timeout for wait-for-update, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub wait_ms: u64,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

#[derive(Args, Debug)]
pub struct GetTablesArgs {
    /// Supabase URL
    #[arg(long, env = "SUPABASE_URL")]
    pub url: String,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub key: String,

    /// User JWT token
    #[arg(long)]
    pub jwt: Option<String>,

    /// Filter by category ID
    #[arg(long)]
    pub category: Option<String>,

    /// Search term for table name
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum number of tables to return
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
}

/// Error shape for arguments clap rejected, picked from the subcommand name.
pub fn record_style_for(args: &[String]) -> RecordStyle {
    match args.iter().skip(1).find(|a| !a.starts_with('-')).map(String::as_str) {
        Some("voyager") | Some("table") => RecordStyle::Success,
        _ => RecordStyle::Status,
    }
}

impl Command {
    /// Shape of the error record for failures that escape the command.
    pub fn record_style(&self) -> RecordStyle {
        match self {
            Command::Voyager(_) | Command::Table(_) => RecordStyle::Success,
            Command::Open(_) | Command::RunTask(_) | Command::GetTables(_) => RecordStyle::Status,
        }
    }

    pub async fn run(self, debug: bool) -> anyhow::Result<Report> {
        match self {
            Command::Open(args) => run_open(args).await,
            Command::RunTask(args) => run_task(args, debug).await,
            Command::Voyager(args) => run_voyager(args).await,
            Command::Table(args) => run_table(args).await,
            Command::GetTables(args) => run_get_tables(args).await,
        }
    }
}

/// Log to stderr; stdout carries only the result record.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug, Serialize)]
struct OpenReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    screenshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Local>,
}

async fn run_open(args: OpenArgs) -> anyhow::Result<Report> {
    tracing::info!("connecting to Chrome on port {}", args.browser.port);
    let session = args.browser.session().await?;

    let outcome = open_and_capture(&session, &args.url).await;
    close_session(session).await;

    let report = match outcome {
        Ok((title, screenshot)) => OpenReport {
            status: "success",
            title: Some(title),
            screenshot,
            error: None,
            timestamp: Local::now(),
        },
        Err(e) => {
            tracing::error!("open failed: {e}");
            OpenReport {
                status: "error",
                title: None,
                screenshot: None,
                error: Some(e.to_string()),
                timestamp: Local::now(),
            }
        }
    };
    let success = report.status == "success";
    Ok(Report::new(&report, success)?)
}

async fn open_and_capture(
    session: &BrowserSession,
    url: &str,
) -> crate::Result<(String, Option<String>)> {
    tracing::info!("opening URL: {url}");
    let page: Page = session.new_page(url).await?;
    let title = page.title().await?;
    tracing::info!("page title: {title}");

    let encoded = page.screenshot_base64().await?;
    let preview = if encoded.is_empty() {
        None
    } else {
        let head: String = encoded.chars().take(SCREENSHOT_PREVIEW_CHARS).collect();
        Some(format!("{head}..."))
    };
    Ok((title, preview))
}

async fn run_task(args: RunTaskArgs, debug: bool) -> anyhow::Result<Report> {
    let spec = TaskSpec::load(args.task.as_deref())
        .await
        .context("failed to load task")?;
    let report = TaskRunner::new(args.browser, debug).run(&spec).await;
    Ok(Report::new(&report, true)?)
}

async fn run_voyager(args: VoyagerArgs) -> anyhow::Result<Report> {
    let plan = match (args.plan.as_deref(), args.task.as_deref()) {
        (Some(source), _) => TaskPlan::load(source).await.context("failed to load plan")?,
        (None, Some(task)) => TaskPlan::fixed(task),
        (None, None) => anyhow::bail!("--task or --plan is required"),
    };

    let session = args.browser.session().await?;
    let outcome = match session.blank_page().await {
        Ok(page) => Ok(TaskExecutor::new(&page, plan.task.clone())
            .with_pause(Duration::from_millis(args.pause_ms))
            .execute(plan)
            .await),
        Err(e) => Err(e),
    };
    close_session(session).await;

    let report = outcome.context("failed to open page")?;
    let success = report.success;
    Ok(Report::new(&report, success)?)
}

async fn run_table(args: TableArgs) -> anyhow::Result<Report> {
    let data = args
        .data
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--data is not valid JSON")?;

    let session = args.browser.session().await?;
    let outcome = match session.new_page(&args.url).await {
        Ok(page) => Ok(TableOps::new(&page)
            .run(
                &args.table_id,
                args.table_action,
                data.as_ref(),
                Duration::from_millis(args.wait_ms),
            )
            .await),
        Err(e) => Err(e),
    };
    close_session(session).await;

    let outcome = outcome.context("failed to open page")?;
    let success = outcome.succeeded();
    Ok(Report::new(&outcome, success)?)
}

async fn run_get_tables(args: GetTablesArgs) -> anyhow::Result<Report> {
    let client = TablesClient::new(args.url, args.key).with_jwt(args.jwt);
    let request = GetTablesRequest {
        limit: args.limit,
        category: args.category.filter(|c| !c.is_empty()),
        search: args.search.filter(|s| !s.is_empty()),
    };

    let report = client.get_tables(&request).await;
    let success = report.succeeded();
    Ok(Report::new(&report, success)?)
}

async fn close_session(session: BrowserSession) {
    if let Err(e) = session.close().await {
        tracing::warn!("failed to close browser session: {e}");
    }
}
