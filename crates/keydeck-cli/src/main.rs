// crates/keydeck-cli/src/main.rs
// ============================================================================
// Module: Keydeck CLI Entry Point
// Description: Command dispatcher for permission, query, and config tooling.
// Purpose: Expose the dashboard logic offline for scripting and inspection.
// Dependencies: clap, keydeck-config, keydeck-core, serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The Keydeck CLI runs the dashboard's pure logic without a backend: it
//! renders and toggles permission catalogs, builds query payloads from URL
//! query strings, formats outcome labels, and validates configuration. All
//! user-facing strings are routed through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use keydeck_cli::render::CatalogView;
use keydeck_cli::render::render_text;
use keydeck_cli::t;
use keydeck_config::KeydeckConfig;
use keydeck_core::ApiId;
use keydeck_core::DiagnosticSink;
use keydeck_core::KeyId;
use keydeck_core::KeyspaceId;
use keydeck_core::MemoryDiagnosticSink;
use keydeck_core::PermissionCatalog;
use keydeck_core::PermissionName;
use keydeck_core::PermissionSelector;
use keydeck_core::QueryContext;
use keydeck_core::QueryParams;
use keydeck_core::QueryPayload;
use keydeck_core::QueryView;
use keydeck_core::SearchTarget;
use keydeck_core::SelectionCommand;
use keydeck_core::classify_severity;
use keydeck_core::error_percentage;
use keydeck_core::format_outcome_label;
use keydeck_core::permissions::filter_catalog;
use keydeck_core::query::ActiveKeysTimeseries;
use keydeck_core::query::ApiTimeseriesScope;
use keydeck_core::query::KeyDetailsLogs;
use keydeck_core::query::KeyDetailsScope;
use keydeck_core::query::KeysOverviewLogs;
use keydeck_core::query::KeysOverviewScope;
use keydeck_core::query::SpentCredits;
use keydeck_core::query::VerificationTimeseries;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "keydeck", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Root key permission catalogs.
    Permissions {
        /// Selected permissions subcommand.
        #[command(subcommand)]
        command: PermissionsCommand,
    },
    /// Query payload utilities.
    Query {
        /// Selected query subcommand.
        #[command(subcommand)]
        command: QueryCommand,
    },
    /// Verification outcome helpers.
    Outcome {
        /// Selected outcome subcommand.
        #[command(subcommand)]
        command: OutcomeCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Permissions subcommands.
#[derive(Subcommand, Debug)]
enum PermissionsCommand {
    /// Render a catalog with its checkbox values.
    Show(PermissionsShowCommand),
    /// Apply one toggle and render the result.
    Toggle(PermissionsToggleCommand),
}

/// Query subcommands.
#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Build a view payload from a URL query string.
    Build(QueryBuildCommand),
}

/// Outcome subcommands.
#[derive(Subcommand, Debug)]
enum OutcomeCommand {
    /// Format an outcome code as a display label.
    Label(OutcomeLabelCommand),
    /// Classify a valid/error count pair.
    Severity(OutcomeSeverityCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Keydeck configuration file.
    Validate(ConfigValidateCommand),
}

/// Catalog selection shared by permission commands.
#[derive(Args, Debug)]
struct CatalogArgs {
    /// API identifier; omit for the workspace catalog.
    #[arg(long = "api", value_name = "API_ID")]
    api: Option<String>,
    /// Search text narrowing the visible catalog.
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
    /// Which entry text the search matches.
    #[arg(long = "match", value_enum, default_value_t = SearchTargetArg::Action)]
    target: SearchTargetArg,
    /// Currently selected permission (repeatable).
    #[arg(long = "select", value_name = "PERMISSION")]
    selected: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `permissions show`.
#[derive(Args, Debug)]
struct PermissionsShowCommand {
    /// Catalog and selection.
    #[command(flatten)]
    catalog: CatalogArgs,
}

/// Arguments for `permissions toggle`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("toggle").required(true).args(["root", "category", "permission"])))]
struct PermissionsToggleCommand {
    /// Catalog and selection.
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Toggle the select-all checkbox.
    #[arg(long, action = ArgAction::SetTrue)]
    root: bool,
    /// Toggle one category checkbox.
    #[arg(long, value_name = "NAME")]
    category: Option<String>,
    /// Toggle one permission checkbox.
    #[arg(long, value_name = "PERMISSION")]
    permission: Option<String>,
}

/// Search target values.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SearchTargetArg {
    /// Match action names.
    Action,
    /// Match descriptions.
    Description,
    /// Match either.
    Any,
}

impl From<SearchTargetArg> for SearchTarget {
    fn from(value: SearchTargetArg) -> Self {
        match value {
            SearchTargetArg::Action => Self::Action,
            SearchTargetArg::Description => Self::Description,
            SearchTargetArg::Any => Self::Any,
        }
    }
}

/// Output formats for permission commands.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Indented checkbox tree.
    Text,
    /// JSON projection.
    Json,
}

/// Buildable views.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ViewArg {
    /// Keys overview log table.
    KeysOverviewLogs,
    /// Single key verification log table.
    KeyDetailsLogs,
    /// API verification chart.
    VerificationTimeseries,
    /// API active keys chart.
    ActiveKeysTimeseries,
    /// Single key credit spend chart.
    SpentCredits,
}

/// Arguments for `query build`.
#[derive(Args, Debug)]
struct QueryBuildCommand {
    /// View to build.
    #[arg(long, value_enum)]
    view: ViewArg,
    /// URL query string carrying filter and sort params.
    #[arg(long, value_name = "QUERY", default_value = "")]
    params: String,
    /// Query timestamp in unix milliseconds (defaults to the system clock).
    #[arg(long, value_name = "UNIX_MS")]
    now: Option<i64>,
    /// API identifier for API-scoped views.
    #[arg(long = "api-id", value_name = "API_ID")]
    api_id: Option<String>,
    /// Key identifier for key-scoped views.
    #[arg(long = "key-id", value_name = "KEY_ID")]
    key_id: Option<String>,
    /// Keyspace identifier for key-scoped views.
    #[arg(long = "keyspace-id", value_name = "KEYSPACE_ID")]
    keyspace_id: Option<String>,
    /// Pagination cursor for log views.
    #[arg(long, value_name = "CURSOR")]
    cursor: Option<i64>,
    /// Optional config file path (defaults to keydeck.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Include dropped and coerced filters in the output.
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
}

/// Arguments for `outcome label`.
#[derive(Args, Debug)]
struct OutcomeLabelCommand {
    /// Outcome code (e.g. `RATE_LIMITED`).
    #[arg(value_name = "CODE")]
    code: String,
}

/// Arguments for `outcome severity`.
#[derive(Args, Debug)]
struct OutcomeSeverityCommand {
    /// Valid verification count.
    #[arg(long, value_name = "N")]
    valid: u64,
    /// Failed verification count.
    #[arg(long, value_name = "N")]
    error: u64,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to keydeck.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Permissions {
            command,
        } => command_permissions(command),
        Commands::Query {
            command,
        } => command_query(command),
        Commands::Outcome {
            command,
        } => command_outcome(command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    let help = command.render_help().to_string();
    write_stdout_line(&help).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Permissions Commands
// ============================================================================

/// Dispatches permissions subcommands.
fn command_permissions(command: PermissionsCommand) -> CliResult<ExitCode> {
    match command {
        PermissionsCommand::Show(command) => command_permissions_show(&command),
        PermissionsCommand::Toggle(command) => command_permissions_toggle(&command),
    }
}

/// Executes `permissions show`.
fn command_permissions_show(command: &PermissionsShowCommand) -> CliResult<ExitCode> {
    let (catalog, selector) = load_selection(&command.catalog)?;
    write_selection(&command.catalog, &catalog, &selector)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `permissions toggle`.
fn command_permissions_toggle(command: &PermissionsToggleCommand) -> CliResult<ExitCode> {
    let (catalog, mut selector) = load_selection(&command.catalog)?;
    let toggle = toggle_command(command, &catalog)?;
    selector.dispatch(&catalog, &toggle);
    write_selection(&command.catalog, &catalog, &selector)?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves the visible catalog and the initial selector.
fn load_selection(args: &CatalogArgs) -> CliResult<(PermissionCatalog, PermissionSelector)> {
    let full = args.api.as_deref().map_or_else(PermissionCatalog::workspace, |api| {
        PermissionCatalog::for_api(&ApiId::new(api))
    });
    let catalog =
        filter_catalog(&full, args.search.as_deref().unwrap_or_default(), args.target.into());
    let selected = args
        .selected
        .iter()
        .map(|raw| parse_permission(raw))
        .collect::<CliResult<BTreeSet<_>>>()?;
    let selector = PermissionSelector::new(selected, &catalog);
    Ok((catalog, selector))
}

/// Maps toggle flags to a reducer command.
fn toggle_command(
    command: &PermissionsToggleCommand,
    catalog: &PermissionCatalog,
) -> CliResult<SelectionCommand> {
    if let Some(name) = &command.category {
        if catalog.category(name).is_none() {
            return Err(CliError::new(t!("permissions.category_unknown", name = name)));
        }
        return Ok(SelectionCommand::ToggleCategory {
            category: name.clone(),
        });
    }
    if let Some(raw) = &command.permission {
        return Ok(SelectionCommand::TogglePermission {
            permission: parse_permission(raw)?,
        });
    }
    Ok(SelectionCommand::ToggleRoot)
}

/// Parses a permission string from the command line.
fn parse_permission(raw: &str) -> CliResult<PermissionName> {
    PermissionName::parse(raw).map_err(|err| {
        CliError::new(t!("permissions.select_invalid", permission = raw, error = err))
    })
}

/// Writes the selection in the requested format.
fn write_selection(
    args: &CatalogArgs,
    catalog: &PermissionCatalog,
    selector: &PermissionSelector,
) -> CliResult<()> {
    let view = CatalogView::new(catalog, selector.state(), args.search.as_deref());
    match args.format {
        OutputFormat::Text => write_stdout_line(&render_text(&view))
            .map_err(|err| CliError::new(output_error("stdout", &err))),
        OutputFormat::Json => write_json(&view),
    }
}

// ============================================================================
// SECTION: Query Commands
// ============================================================================

/// Dispatches query subcommands.
fn command_query(command: QueryCommand) -> CliResult<ExitCode> {
    match command {
        QueryCommand::Build(command) => command_query_build(&command),
    }
}

/// Executes `query build`.
fn command_query_build(command: &QueryBuildCommand) -> CliResult<ExitCode> {
    let config = KeydeckConfig::load_or_default(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let settings = config.query_settings();
    let memory = Arc::new(MemoryDiagnosticSink::new());
    let diagnostics: Arc<dyn DiagnosticSink> = if command.explain {
        Arc::clone(&memory) as Arc<dyn DiagnosticSink>
    } else {
        config
            .diagnostics_sink()
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?
    };
    let now_ms = match command.now {
        Some(now_ms) => now_ms,
        None => system_now_ms()?,
    };
    let ctx = QueryContext {
        now_ms,
        settings: &settings,
        diagnostics: diagnostics.as_ref(),
    };
    let params = QueryParams::parse(&command.params);
    let mut output = match command.view {
        ViewArg::KeysOverviewLogs => {
            let scope = KeysOverviewScope {
                api_id: ApiId::new(require(command.api_id.as_deref(), "api-id", command.view)?),
            };
            build_view::<KeysOverviewLogs>(&scope, &params, command.cursor, &ctx)?
        }
        ViewArg::KeyDetailsLogs => {
            let scope = key_scope(command)?;
            build_view::<KeyDetailsLogs>(&scope, &params, command.cursor, &ctx)?
        }
        ViewArg::VerificationTimeseries => {
            let scope = api_scope(command)?;
            build_view::<VerificationTimeseries>(&scope, &params, None, &ctx)?
        }
        ViewArg::ActiveKeysTimeseries => {
            let scope = api_scope(command)?;
            build_view::<ActiveKeysTimeseries>(&scope, &params, None, &ctx)?
        }
        ViewArg::SpentCredits => {
            let scope = key_scope(command)?;
            build_view::<SpentCredits>(&scope, &params, None, &ctx)?
        }
    };
    if command.explain
        && let Value::Object(map) = &mut output
    {
        let events = serde_json::to_value(memory.events())
            .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
        map.insert("diagnostics".to_string(), events);
    }
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds and validates one view, returning the serialized query.
fn build_view<V: QueryView>(
    scope: &V::Scope,
    params: &QueryParams,
    cursor: Option<i64>,
    ctx: &QueryContext<'_>,
) -> CliResult<Value> {
    let built = V::build_from_params(scope, params, cursor, ctx);
    built
        .payload
        .validate()
        .map_err(|err| CliError::new(t!("query.payload_invalid", error = err)))?;
    serde_json::to_value(&built).map_err(|err| CliError::new(t!("output.json_failed", error = err)))
}

/// Scope for API-level charts.
fn api_scope(command: &QueryBuildCommand) -> CliResult<ApiTimeseriesScope> {
    Ok(ApiTimeseriesScope {
        api_id: ApiId::new(require(command.api_id.as_deref(), "api-id", command.view)?),
    })
}

/// Scope for single-key views.
fn key_scope(command: &QueryBuildCommand) -> CliResult<KeyDetailsScope> {
    Ok(KeyDetailsScope {
        key_id: KeyId::new(require(command.key_id.as_deref(), "key-id", command.view)?),
        keyspace_id: KeyspaceId::new(require(
            command.keyspace_id.as_deref(),
            "keyspace-id",
            command.view,
        )?),
    })
}

/// Returns a required, non-blank scope flag.
fn require<'a>(value: Option<&'a str>, flag: &str, view: ViewArg) -> CliResult<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CliError::new(t!("query.scope.missing", flag = flag, view = view_name(view)))),
    }
}

/// Command-line name of a view.
fn view_name(view: ViewArg) -> String {
    view.to_possible_value().map_or_else(String::new, |value| value.get_name().to_string())
}

/// Reads the system clock in unix milliseconds.
fn system_now_ms() -> CliResult<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| CliError::new(t!("query.clock_failed", error = err)))?;
    i64::try_from(elapsed.as_millis())
        .map_err(|err| CliError::new(t!("query.clock_failed", error = err)))
}

// ============================================================================
// SECTION: Outcome Commands
// ============================================================================

/// Dispatches outcome subcommands.
fn command_outcome(command: OutcomeCommand) -> CliResult<ExitCode> {
    let line = match command {
        OutcomeCommand::Label(command) => format_outcome_label(&command.code),
        OutcomeCommand::Severity(command) => severity_line(command.valid, command.error),
    };
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats the severity bucket and error share for a count pair.
fn severity_line(valid: u64, error: u64) -> String {
    let percentage = format!("{:.2}", error_percentage(valid, error));
    t!("outcome.severity", severity = classify_severity(valid, error), percentage = percentage)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = KeydeckConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty-printed JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
