use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use surmado::config::{
    default_config_path, find_config_file, get_config, load_config, Config, ConfigFile,
};
use surmado::models::{
    BusinessScale, IncludeFinancial, ListReportsQuery, ReportList, ReportStyle, ScanRequest,
    ScanRerunRequest, ScanTier, SignalContext, SignalRequest, SignalRerunRequest, SignalTier,
    SolutionsRequest,
};
use surmado::ui;
use surmado::utils::WaitOptions;
use surmado::{Surmado, SurmadoError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Surmado CLI - run marketing intelligence reports from the terminal
#[derive(Parser, Debug)]
#[command(name = "surmado")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Surmado Signal, Scan and Solutions reports", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key (defaults to SURMADO_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SignalTierArg {
    Basic,
    Pro,
}

impl From<SignalTierArg> for SignalTier {
    fn from(tier: SignalTierArg) -> Self {
        match tier {
            SignalTierArg::Basic => SignalTier::Basic,
            SignalTierArg::Pro => SignalTier::Pro,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ScanTierArg {
    Basic,
    Premium,
}

impl From<ScanTierArg> for ScanTier {
    fn from(tier: ScanTierArg) -> Self {
        match tier {
            ScanTierArg::Basic => ScanTier::Basic,
            ScanTierArg::Premium => ScanTier::Premium,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ScaleArg {
    Small,
    Medium,
    Large,
}

impl From<ScaleArg> for BusinessScale {
    fn from(scale: ScaleArg) -> Self {
        match scale {
            ScaleArg::Small => BusinessScale::Small,
            ScaleArg::Medium => BusinessScale::Medium,
            ScaleArg::Large => BusinessScale::Large,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StyleArg {
    Executive,
    Technical,
    Comprehensive,
}

impl From<StyleArg> for ReportStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Executive => ReportStyle::Executive,
            StyleArg::Technical => ReportStyle::Technical,
            StyleArg::Comprehensive => ReportStyle::Comprehensive,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum IncludeFinancialArg {
    Yes,
    No,
}

impl From<IncludeFinancialArg> for IncludeFinancial {
    fn from(include: IncludeFinancialArg) -> Self {
        match include {
            IncludeFinancialArg::Yes => IncludeFinancial::Yes,
            IncludeFinancialArg::No => IncludeFinancial::No,
        }
    }
}

/// Options shared by every report-creation command
#[derive(Args, Debug)]
struct CreateOptions {
    /// URL that receives a POST when the report completes (HTTPS)
    #[arg(long)]
    webhook_url: Option<String>,

    /// Additional body field as key=value (value parsed as JSON when possible)
    #[arg(long = "extra", value_name = "KEY=VALUE", value_parser = parse_extra)]
    extra: Vec<(String, Value)>,

    /// Wait for the report to complete
    #[arg(long)]
    wait: bool,

    /// Maximum minutes to wait with --wait
    #[arg(long)]
    wait_timeout: Option<u64>,

    /// Seconds between status checks with --wait
    #[arg(long)]
    poll_interval: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an AI Visibility Test (Signal)
    Signal {
        #[arg(long)]
        url: String,
        #[arg(long)]
        brand_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        industry: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        persona: String,
        /// Comma-separated problems your product solves
        #[arg(long)]
        pain_points: String,
        #[arg(long)]
        brand_details: String,
        /// Comma-separated competitor names
        #[arg(long)]
        direct_competitors: String,
        #[arg(long, value_enum, default_value_t = SignalTierArg::Basic)]
        tier: SignalTierArg,
        #[arg(long)]
        indirect_competitors: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        product: Option<String>,
        #[arg(long, value_enum)]
        business_scale: Option<ScaleArg>,
        #[command(flatten)]
        options: CreateOptions,
    },

    /// Run an SEO Audit (Scan)
    Scan {
        #[arg(long)]
        url: String,
        #[arg(long)]
        brand_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = ScanTierArg::Basic)]
        tier: ScanTierArg,
        /// Competitor URL to compare against (repeatable)
        #[arg(long = "competitor-url")]
        competitor_urls: Vec<String>,
        #[arg(long, value_enum)]
        report_style: Option<StyleArg>,
        #[command(flatten)]
        options: CreateOptions,
    },

    /// Run Strategic Advisory (Solutions)
    Solutions {
        #[arg(long)]
        email: String,
        /// Token from a Signal report (inherits its context)
        #[arg(long)]
        signal_token: Option<String>,
        /// Token from a Scan report (adds SEO context)
        #[arg(long)]
        scan_token: Option<String>,
        #[arg(long)]
        brand_name: Option<String>,
        #[arg(long)]
        business_story: Option<String>,
        #[arg(long)]
        decision: Option<String>,
        #[arg(long)]
        success: Option<String>,
        #[arg(long)]
        timeline: Option<String>,
        #[arg(long)]
        scale_indicator: Option<String>,
        /// Whether to include a financial analysis
        #[arg(long, value_enum)]
        include_financial: Option<IncludeFinancialArg>,
        #[arg(long)]
        financial_context: Option<String>,
        #[arg(long)]
        monthly_revenue: Option<String>,
        #[arg(long)]
        monthly_costs: Option<String>,
        #[arg(long)]
        cash_available: Option<String>,
        #[command(flatten)]
        options: CreateOptions,
    },

    /// Re-run a Signal report from stored brand context
    SignalRerun {
        #[arg(long)]
        brand_slug: String,
        #[arg(long)]
        persona_slug: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = SignalTierArg::Basic)]
        tier: SignalTierArg,
        /// Wait for the report to complete
        #[arg(long)]
        wait: bool,
    },

    /// Re-run a Scan report from stored brand context
    ScanRerun {
        #[arg(long)]
        brand_slug: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = ScanTierArg::Basic)]
        tier: ScanTierArg,
        /// Wait for the report to complete
        #[arg(long)]
        wait: bool,
    },

    /// Show a report's status and download links
    #[command(alias = "get")]
    Report {
        /// Report ID (e.g. rpt_abc123)
        report_id: String,
    },

    /// List reports for your organization
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Reports per page (max 100)
        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },

    /// Wait for a report to complete
    Wait {
        report_id: String,
        /// Maximum minutes to wait
        #[arg(long)]
        timeout_minutes: Option<u64>,
        /// Seconds between status checks
        #[arg(long)]
        poll_interval: Option<u64>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file (stores --api-key only when given)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

fn parse_extra(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        return Err("extra field name must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Tracing filter for the `surmado` target: `-v` wins over the configured level
fn log_filter(verbose: u8, configured: &str) -> String {
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    format!("surmado={}", level)
}

fn load_cli_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = &cli.config {
        load_config(path).with_context(|| format!("loading {}", path.display()))?
    } else if let Some(path) = find_config_file() {
        load_config(&path).with_context(|| format!("loading {}", path.display()))?
    } else {
        get_config()?
    };

    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_cli_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            ui::print_error(&format!("{:#}", err));
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| log_filter(cli.verbose, &config.logging.level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli, config).await {
        match err.downcast_ref::<SurmadoError>() {
            Some(SurmadoError::InsufficientCredits { message, .. }) => {
                ui::print_error(message);
                ui::print_hint("Not enough credits. Top up at surmado.com");
            }
            Some(api_err) => {
                ui::print_error(&api_err.message());
                if let Some(code) = api_err.status_code() {
                    ui::print_hint(&format!("HTTP status {}", code));
                }
            }
            None => ui::print_error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");

    let format = match cli.output {
        OutputFormat::Auto if ui::is_terminal() => OutputFormat::Table,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    };

    if let Commands::Config { command } = cli.command {
        return run_config(command, cli.api_key);
    }

    let client = Surmado::from_config(&config)?;
    let wait_defaults = WaitOptions::default()
        .timeout_minutes(config.polling.timeout_minutes)
        .poll_interval(Duration::from_secs(config.polling.poll_interval_secs));

    match cli.command {
        Commands::Signal {
            url,
            brand_name,
            email,
            industry,
            location,
            persona,
            pain_points,
            brand_details,
            direct_competitors,
            tier,
            indirect_competitors,
            keywords,
            product,
            business_scale,
            options,
        } => {
            let context = SignalContext {
                industry,
                location,
                persona,
                pain_points,
                brand_details,
                direct_competitors,
            };
            let mut request = SignalRequest::new(url, brand_name, email, context).tier(tier.into());
            request.indirect_competitors = indirect_competitors;
            request.keywords = keywords;
            request.product = product;
            request.business_scale = business_scale.map(Into::into);
            request.webhook_url = options.webhook_url.clone();
            request.extra.extend(options.extra.iter().cloned());

            let created = client.signal(&request).await?;
            finish_create(&client, created, &options, wait_defaults, format).await
        }

        Commands::Scan {
            url,
            brand_name,
            email,
            tier,
            competitor_urls,
            report_style,
            options,
        } => {
            let mut request = ScanRequest::new(url, brand_name, email).tier(tier.into());
            if !competitor_urls.is_empty() {
                request = request.competitor_urls(competitor_urls);
            }
            request.report_style = report_style.map(Into::into);
            request.webhook_url = options.webhook_url.clone();
            request.extra.extend(options.extra.iter().cloned());

            let created = client.scan(&request).await?;
            finish_create(&client, created, &options, wait_defaults, format).await
        }

        Commands::Solutions {
            email,
            signal_token,
            scan_token,
            brand_name,
            business_story,
            decision,
            success,
            timeline,
            scale_indicator,
            include_financial,
            financial_context,
            monthly_revenue,
            monthly_costs,
            cash_available,
            options,
        } => {
            let request = SolutionsRequest {
                email,
                signal_token,
                scan_token,
                brand_name,
                business_story,
                decision,
                success,
                timeline,
                scale_indicator,
                include_financial: include_financial.map(Into::into),
                financial_context,
                monthly_revenue,
                monthly_costs,
                cash_available,
                webhook_url: options.webhook_url.clone(),
                extra: options.extra.iter().cloned().collect(),
            };

            let created = client.solutions(&request).await?;
            finish_create(&client, created, &options, wait_defaults, format).await
        }

        Commands::SignalRerun {
            brand_slug,
            persona_slug,
            email,
            tier,
            wait,
        } => {
            let request =
                SignalRerunRequest::new(brand_slug, persona_slug, email).tier(tier.into());
            let created = client.signal_rerun(&request).await?;
            let options = CreateOptions::waiting(wait);
            finish_create(&client, created, &options, wait_defaults, format).await
        }

        Commands::ScanRerun {
            brand_slug,
            email,
            tier,
            wait,
        } => {
            let request = ScanRerunRequest::new(brand_slug, email).tier(tier.into());
            let created = client.scan_rerun(&request).await?;
            let options = CreateOptions::waiting(wait);
            finish_create(&client, created, &options, wait_defaults, format).await
        }

        Commands::Report { report_id } => {
            let report = client.get_report(&report_id).await?;
            print_report(&report, format)
        }

        Commands::List { page, page_size } => {
            let body = client
                .list_reports(ListReportsQuery::new(page, page_size))
                .await?;
            match format {
                OutputFormat::Table => {
                    let list = ReportList::from_value(&body)
                        .context("unexpected report list format")?;
                    println!("{}", ui::report_table(&list.reports));
                    if let Some(total) = list.total {
                        println!("Page {} ({} reports total)", page, total);
                    }
                    Ok(())
                }
                _ => print_json(&body),
            }
        }

        Commands::Wait {
            report_id,
            timeout_minutes,
            poll_interval,
        } => {
            let mut options = wait_defaults;
            if let Some(minutes) = timeout_minutes {
                options = options.timeout_minutes(minutes);
            }
            if let Some(secs) = poll_interval {
                options = options.poll_interval(Duration::from_secs(secs));
            }
            let report = wait_with_spinner(&client, &report_id, &options, format).await?;
            print_report(&report, format)
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }
}

impl CreateOptions {
    fn waiting(wait: bool) -> Self {
        Self {
            webhook_url: None,
            extra: Vec::new(),
            wait,
            wait_timeout: None,
            poll_interval: None,
        }
    }
}

async fn finish_create(
    client: &Surmado,
    created: Value,
    options: &CreateOptions,
    wait_defaults: WaitOptions,
    format: OutputFormat,
) -> Result<()> {
    if !options.wait {
        return print_report(&created, format);
    }

    let report_id = created
        .get("report_id")
        .and_then(Value::as_str)
        .context("response did not include a report_id")?;
    if format == OutputFormat::Table {
        ui::print_success(&format!("Report created: {}", report_id));
    }

    let mut wait_options = wait_defaults;
    if let Some(minutes) = options.wait_timeout {
        wait_options = wait_options.timeout_minutes(minutes);
    }
    if let Some(secs) = options.poll_interval {
        wait_options = wait_options.poll_interval(Duration::from_secs(secs));
    }

    let report = wait_with_spinner(client, report_id, &wait_options, format).await?;
    print_report(&report, format)
}

async fn wait_with_spinner(
    client: &Surmado,
    report_id: &str,
    options: &WaitOptions,
    format: OutputFormat,
) -> Result<Value> {
    if format != OutputFormat::Table {
        return Ok(client.wait_for_report(report_id, options).await?);
    }

    let spinner = ui::Spinner::new(&format!("Waiting for {}...", report_id));
    match client.wait_for_report(report_id, options).await {
        Ok(report) => {
            spinner.finish_with_success(&format!("{} completed", report_id));
            Ok(report)
        }
        Err(err) => {
            spinner.finish_with_error(&err.message());
            Err(err.into())
        }
    }
}

fn print_report(report: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            ui::print_report_summary(report);
            Ok(())
        }
        _ => print_json(report),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_config(command: ConfigCommands, api_key: Option<String>) -> Result<()> {
    let path = default_config_path().context("could not determine config directory")?;
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Init { force } => {
            let wrote_key = api_key.is_some();
            init_config(&path, api_key, force)?;
            ui::print_success(&format!("Wrote {}", path.display()));
            if !wrote_key {
                ui::print_hint("No API key stored; set SURMADO_API_KEY or rerun with --api-key");
            }
        }
    }
    Ok(())
}

/// Write the default template, storing only an explicitly passed key
fn init_config(path: &Path, api_key: Option<String>, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ConfigFile::create_default(api_key).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extra() {
        assert_eq!(
            parse_extra("campaign=spring").unwrap(),
            ("campaign".to_string(), Value::String("spring".to_string()))
        );
        assert_eq!(
            parse_extra("budget=5000").unwrap(),
            ("budget".to_string(), serde_json::json!(5000))
        );
        assert_eq!(
            parse_extra("note=a=b").unwrap(),
            ("note".to_string(), Value::String("a=b".to_string()))
        );
        assert!(parse_extra("novalue").is_err());
        assert!(parse_extra("=x").is_err());
    }

    #[test]
    fn test_parse_solutions_command() {
        let cli = Cli::try_parse_from([
            "surmado",
            "solutions",
            "--email",
            "you@acme.com",
            "--signal-token",
            "tok_123",
            "--extra",
            "campaign=spring",
            "--wait",
        ])
        .unwrap();

        match cli.command {
            Commands::Solutions {
                email,
                signal_token,
                options,
                ..
            } => {
                assert_eq!(email, "you@acme.com");
                assert_eq!(signal_token.as_deref(), Some("tok_123"));
                assert!(options.wait);
                assert_eq!(options.extra.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_include_financial() {
        let cli = Cli::try_parse_from([
            "surmado",
            "solutions",
            "--email",
            "you@acme.com",
            "--signal-token",
            "tok_123",
            "--include-financial",
            "no",
        ])
        .unwrap();

        match cli.command {
            Commands::Solutions {
                include_financial, ..
            } => assert_eq!(include_financial, Some(IncludeFinancialArg::No)),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(IncludeFinancial::from(IncludeFinancialArg::No), IncludeFinancial::No);
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, "warn"), "surmado=warn");
        assert_eq!(log_filter(0, "info"), "surmado=info");
        assert_eq!(log_filter(1, "info"), "surmado=debug");
        assert_eq!(log_filter(3, "info"), "surmado=trace");
    }

    #[test]
    fn test_config_init_ignores_environment_key() {
        std::env::set_var("SURMADO_API_KEY", "sur_env_secret");
        let cli = Cli::try_parse_from(["surmado", "config", "init"]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_config(&path, cli.api_key, false).unwrap();
        std::env::remove_var("SURMADO_API_KEY");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("sur_env_secret"));
        assert!(ConfigFile::load(&path).unwrap().config.api_key.is_none());

        // Existing files are kept unless forced
        assert!(init_config(&path, Some("sur_flag".to_string()), false).is_err());
        init_config(&path, Some("sur_flag".to_string()), true).unwrap();
        assert_eq!(
            ConfigFile::load(&path).unwrap().config.api_key.as_deref(),
            Some("sur_flag")
        );
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["surmado", "list"]).unwrap();
        match cli.command {
            Commands::List { page, page_size } => {
                assert_eq!(page, 1);
                assert_eq!(page_size, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
