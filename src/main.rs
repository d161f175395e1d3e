use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use carrier_map::config::{AppConfig, MappingConfig};
use carrier_map::error::AppError;
use carrier_map::telemetry;
use carrier_map::workflows::mapping::{
    write_csv, CarrierMappingBuilder, MappingBuildError, MatchPass, MatchRecord,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    mapping: MappingConfig,
}

#[derive(Parser, Debug)]
#[command(
    name = "Carrier Mapping Service",
    about = "Reconcile registry carrier names against the regulator roster from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build the registry-to-roster mapping table
    Mapping {
        #[command(subcommand)]
        command: MappingCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum MappingCommand {
    /// Match registry carrier names to roster entries and emit the table
    Build(MappingBuildArgs),
}

#[derive(Args, Debug)]
struct MappingBuildArgs {
    /// Roster CSV exported from the regulator's company list
    #[arg(long)]
    roster: PathBuf,
    /// Registry CSV with a CARRIER_NAME column
    #[arg(long)]
    registry: PathBuf,
    /// Run date stamped on every row (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    run_date: Option<NaiveDate>,
    /// Roster category filter (defaults to the configured value)
    #[arg(long)]
    category_filter: Option<String>,
    /// Write the mapping table as CSV to this path
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print every mapping row after the summary
    #[arg(long)]
    list_rows: bool,
}

#[derive(Debug, Deserialize)]
struct MappingBuildRequest {
    roster_csv: String,
    registry_csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    run_date: Option<NaiveDate>,
    #[serde(default)]
    category_filter: Option<String>,
}

#[derive(Debug, Serialize)]
struct MappingBuildResponse {
    run_date: NaiveDate,
    category_filter: String,
    total: usize,
    records: Vec<MatchRecord>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Mapping {
            command: MappingCommand::Build(args),
        } => run_mapping_build(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/mapping/build", post(mapping_build_endpoint))
        .with_state(state)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        mapping: config.mapping.clone(),
    };

    let app = app_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "carrier mapping service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_mapping_build(args: MappingBuildArgs) -> Result<(), AppError> {
    let MappingBuildArgs {
        roster,
        registry,
        run_date,
        category_filter,
        out,
        list_rows,
    } = args;

    let config = AppConfig::load()?;
    let category_filter = category_filter.unwrap_or(config.mapping.category_filter);
    let run_date = run_date.unwrap_or_else(|| Local::now().date_naive());

    let records = CarrierMappingBuilder::from_paths(roster, registry, &category_filter, run_date)?;
    render_mapping_summary(&records, run_date, &category_filter, list_rows);

    if let Some(path) = out {
        let file = std::fs::File::create(&path)?;
        write_csv(&records, file).map_err(MappingBuildError::Csv)?;
        println!("\nWrote {} rows to {}", records.len(), path.display());
    }

    Ok(())
}

fn render_mapping_summary(
    records: &[MatchRecord],
    run_date: NaiveDate,
    category_filter: &str,
    list_rows: bool,
) {
    let exact = records
        .iter()
        .filter(|record| record.matched_by == MatchPass::Exact)
        .count();

    println!("Carrier mapping run");
    println!(
        "Run date {run_date}, roster category filter '{category_filter}'"
    );
    println!(
        "{} mapped carriers ({} exact, {} normalized)",
        records.len(),
        exact,
        records.len() - exact
    );

    if list_rows {
        println!("\nMapping rows");
        for record in records {
            println!(
                "- {} -> {} | {}, {} {} | via {}",
                record.source_name,
                record.target_name,
                record.city.as_deref().unwrap_or("-"),
                record.state.as_deref().unwrap_or("-"),
                record.zip.as_deref().unwrap_or("-"),
                record.matched_by.label()
            );
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn mapping_build_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<MappingBuildRequest>,
) -> Result<Json<MappingBuildResponse>, AppError> {
    let MappingBuildRequest {
        roster_csv,
        registry_csv,
        run_date,
        category_filter,
    } = payload;

    let category_filter = category_filter.unwrap_or(state.mapping.category_filter);
    let run_date = run_date.unwrap_or_else(|| Local::now().date_naive());

    let records = CarrierMappingBuilder::from_readers(
        Cursor::new(roster_csv.into_bytes()),
        Cursor::new(registry_csv.into_bytes()),
        &category_filter,
        run_date,
    )?;

    Ok(Json(MappingBuildResponse {
        run_date,
        category_filter,
        total: records.len(),
        records,
    }))
}
