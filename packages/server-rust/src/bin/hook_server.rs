//! Demo hook server: a login action, two event triggers, and a scheduled
//! trigger, served over HTTP.

use clap::Parser;
use hasura_hooks_core::{ActionPayload, EventPayload, HookError, ScheduledTriggerPayload};
use hasura_hooks_server::service::{
    use_actions, use_events, use_scheduled_triggers, ActionKind, EventKind, ExecutionContext,
    HandlerMap, HookOptions, ScheduledKind,
};
use hasura_hooks_server::{NetworkConfig, NetworkModule, StdoutLogger};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hook-server", about = "Serve Hasura action, event, and scheduled trigger webhooks")]
struct Args {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 9000)]
    port: u16,

    /// Origins allowed to call the hooks from a browser. Empty disables CORS.
    #[arg(long = "cors-origin", env = "HOOKS_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Header carrying the request id recorded with every hook log line.
    #[arg(long, env = "HOOKS_REQUEST_ID_HEADER", default_value = "x-request-id")]
    request_id_header: String,

    /// Log traces, request bodies, and handler results.
    #[arg(long, env = "HOOKS_DEBUG")]
    debug: bool,

    /// Emit JSON log lines, with hook records printed to stdout as-is.
    #[arg(long, env = "HOOKS_LOG_JSON")]
    log_json: bool,
}

/// Static context visible to every handler.
#[derive(Debug, Clone)]
struct AppKind(&'static str);

fn init_log(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn login(ctx: ExecutionContext, payload: ActionPayload) -> Result<Value, HookError> {
    if let Some(kind) = ctx.extension::<AppKind>() {
        info!(app = kind.0, role = ?payload.user_role(), "login");
    }
    Ok(payload.input)
}

async fn hello_event(_ctx: ExecutionContext, _payload: EventPayload) -> Result<Value, HookError> {
    Ok(json!({ "hello": "world" }))
}

async fn update_user(_ctx: ExecutionContext, payload: EventPayload) -> Result<Value, HookError> {
    Ok(payload.event.data.new.unwrap_or(Value::Null))
}

async fn hello_scheduled(
    _ctx: ExecutionContext,
    _payload: ScheduledTriggerPayload,
) -> Result<Value, HookError> {
    Ok(json!({ "hello": "world" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_log(args.log_json);

    let mut options = HookOptions::new()
        .with_debug(args.debug)
        .with_context(AppKind("Action"));
    if args.log_json {
        options = options.with_logger(StdoutLogger);
    }

    let actions = use_actions(
        HandlerMap::<ActionKind>::new().with("login", login),
        options.clone(),
    );
    let events = use_events(
        HandlerMap::<EventKind>::new()
            .with("hello", hello_event)
            .with("update_user", update_user),
        options.clone(),
    );
    let scheduled = use_scheduled_triggers(
        HandlerMap::<ScheduledKind>::new().with("hello", hello_scheduled),
        options,
    );

    let config = NetworkConfig {
        host: args.host,
        port: args.port,
        cors_origins: args.cors_origins,
        request_id_header: args.request_id_header,
        ..NetworkConfig::default()
    };
    let mut module = NetworkModule::new(config)
        .with_actions(actions)
        .with_events(events)
        .with_scheduled_triggers(scheduled);

    let port = module.start().await?;
    info!(port, "hook server listening");

    module
        .serve(async {
            // A failed signal handler is treated as an immediate shutdown.
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}
