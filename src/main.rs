//! pom-guardian CLI - command-line interface for archetype enforcement
//!
//! Architecture: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output
//! - Provides clean separation between user interface and business logic

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pom_guardian::archetypes::structure_summary;
use pom_guardian::descriptor::load_descriptor_async;
use pom_guardian::rules::dependencies::{forbidden_dependency_rule, DEFAULT_IGNORED_ARCHETYPES};
use pom_guardian::{
    Archetype, Classification, EnforcerConfig, OutputFormat, ProjectValidator, ReportFormatter,
    ReportOptions, Severity, ValidationOptions,
};
use std::path::PathBuf;
use std::process;

/// pom-guardian - project archetype and dependency enforcement
#[derive(Parser)]
#[command(name = "pom-guardian")]
#[command(version)]
#[command(about = "Enforces project archetype naming, structure and dependency rules")]
#[command(long_about = "pom-guardian classifies every project descriptor into exactly one archetype (API, SPI, IMPLEMENTATION, BILL_OF_MATERIALS, ...) and fails the build when a project matches no permitted archetype or depends on something its archetype may not use.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check project descriptors for violations
    Check(CheckArgs),

    /// Classify a single project descriptor
    Classify {
        /// Descriptor file
        descriptor: PathBuf,

        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known archetypes with their patterns
    Archetypes,

    /// Explain one archetype and the rules applied to it
    Explain {
        /// Archetype name, e.g. BILL_OF_MATERIALS or bill-of-materials
        archetype: String,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Descriptor files or directories (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Minimum severity level to report
    #[arg(short, long, value_enum)]
    severity: Option<SeverityArg>,

    /// Maximum number of violations to report
    #[arg(long)]
    max_violations: Option<usize>,

    /// Additional exclude patterns
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Only run these rules
    #[arg(long = "rule", action = clap::ArgAction::Append)]
    rules: Vec<String>,

    /// Disable parallel processing
    #[arg(long)]
    no_parallel: bool,

    /// Fail on the first unreadable descriptor
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    #[cfg(feature = "colors")]
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Check(args) => run_check(cli.config, args, !cli.no_color).await,
        Commands::Classify { descriptor, json } => run_classify(cli.config, descriptor, json).await,
        Commands::Archetypes => run_list_archetypes(cli.config),
        Commands::Explain { archetype } => run_explain(cli.config, &archetype),
        Commands::ValidateConfig { config_file } => Ok(run_validate_config(config_file.or(cli.config))),
    }
}

/// Explicit path, else a well-known file in the working directory, else defaults
fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<EnforcerConfig> {
    let path = match config_path {
        Some(path) => Some(path),
        None => EnforcerConfig::discover("."),
    };

    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            EnforcerConfig::load_from_file(&path)
                .with_context(|| format!("could not load configuration {}", path.display()))
        }
        None => Ok(EnforcerConfig::default()),
    }
}

async fn run_check(config_path: Option<PathBuf>, args: CheckArgs, use_colors: bool) -> anyhow::Result<i32> {
    let config = load_config(config_path)?;

    let validator = ProjectValidator::new_with_config(config)?.with_report_formatter(ReportFormatter::new(
        ReportOptions {
            use_colors,
            max_violations: args.max_violations,
            min_severity: args.severity.map(Into::into),
            ..Default::default()
        },
    ));

    let paths = if args.paths.is_empty() { vec![PathBuf::from(".")] } else { args.paths };

    let options = ValidationOptions {
        parallel: !args.no_parallel,
        fail_fast: args.fail_fast,
        exclude_patterns: args.exclude,
        rules: args.rules,
        ..Default::default()
    };

    let report = validator.validate_paths(&paths, &options).await?;
    println!("{}", validator.format_report(&report, args.format.into())?);

    Ok(if report.has_errors() { 1 } else { 0 })
}

async fn run_classify(config_path: Option<PathBuf>, descriptor: PathBuf, json: bool) -> anyhow::Result<i32> {
    let validator = ProjectValidator::new_with_config(load_config(config_path)?)?;
    let project = load_descriptor_async(&descriptor).await?;
    let classification = validator.classify(&project)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    } else {
        match &classification {
            Classification::Exact { archetype } => println!("{}: {}", project.gav(), archetype),
            Classification::Inexact { best_guess, message } => {
                println!("{}: {} (inexact)", project.gav(), best_guess);
                println!("  {message}");
            }
            failure => println!("{}", failure.failure_message().unwrap_or_default()),
        }
    }

    Ok(if classification.is_exact() { 0 } else { 1 })
}

fn run_list_archetypes(config_path: Option<PathBuf>) -> anyhow::Result<i32> {
    let config = load_config(config_path)?;
    let registry = config.registry()?;

    println!("Known archetypes ({}):", Archetype::ALL.len());
    for (archetype, definition) in registry.iter() {
        println!();
        println!("  {archetype}");
        println!("    {}", archetype.description());
        println!("    {definition}");
        println!("    Accepts missing coordinates: {}", definition.accepts_nulls());
        if let Some(structure) = structure_summary(archetype) {
            println!("    Structure: {structure}");
        }
    }

    Ok(0)
}

fn run_explain(config_path: Option<PathBuf>, name: &str) -> anyhow::Result<i32> {
    let archetype: Archetype = match name.parse() {
        Ok(archetype) => archetype,
        Err(e) => {
            eprintln!("{e}");
            return Ok(1);
        }
    };

    let config = load_config(config_path)?;
    let registry = config.registry()?;
    let definition = registry.definition(archetype);

    println!("Archetype: {archetype}");
    println!("  {}", archetype.description());
    println!();
    println!("Patterns:");
    println!("  groupId:    {}", definition.group_id_pattern());
    println!("  artifactId: {}", definition.artifact_id_pattern());
    println!("  packaging:  {}", definition.packaging_pattern());
    println!("  Missing coordinates accepted: {}", definition.accepts_nulls());

    println!();
    println!("Structure: {}", structure_summary(archetype).unwrap_or("no structural rules"));

    println!();
    println!("As a dependency:");
    match forbidden_dependency_rule(archetype) {
        Some((rule, suggestion)) => {
            println!("  Don't use {archetype} dependencies {rule}");
            println!("  Fix: {suggestion}");
        }
        None => println!("  Permitted"),
    }

    println!();
    let ignored = config.rules.correct_dependencies.ignored_archetypes.contains(&archetype);
    println!("Own dependencies: {}", if ignored { "not checked" } else { "checked" });
    if !ignored && DEFAULT_IGNORED_ARCHETYPES.contains(&archetype) {
        println!("  (checked because the configuration overrides the default ignored archetypes)");
    }

    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>) -> i32 {
    let Some(config_path) = config_path.or_else(|| EnforcerConfig::discover(".")) else {
        eprintln!("No configuration file given and none of pom_guardian.yaml, pom_guardian.yml, .pom_guardian.yaml found");
        return 1;
    };

    println!("Validating configuration: {}", config_path.display());

    match EnforcerConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Evaluated groupIds: {}", config.group_ids.evaluate.join(", "));
            println!("  Ignored groupIds: {}", config.group_ids.ignore.join(", "));
            println!("  Archetype overrides: {}", config.archetypes.len());
            println!("  correct-dependencies enabled: {}", config.rules.correct_dependencies.enabled);
            println!("  permitted-archetype enabled: {}", config.rules.permitted_archetype.enabled);
            println!("  correct-packaging enabled: {}", config.rules.correct_packaging.enabled);
            println!("  Fingerprint: {}", config.fingerprint());
            0
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            1
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn check_args(paths: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            paths,
            format: OutputFormatArg::Json,
            severity: None,
            max_violations: None,
            exclude: vec![],
            rules: vec![],
            no_parallel: false,
            fail_fast: false,
        }
    }

    #[tokio::test]
    async fn test_check_command() {
        let temp_dir = TempDir::new().unwrap();
        let dirty = temp_dir.path().join("project.yaml");
        fs::write(
            &dirty,
            "groupId: com.example.foo.api\nartifactId: foo-api\ndependencies:\n  - groupId: com.example.foo.impl.core\n    artifactId: foo-impl-core\n",
        )
        .unwrap();

        let config = temp_dir.path().join("pom_guardian.yaml");
        fs::write(&config, "version: \"1.0\"\n").unwrap();

        let result = run_check(Some(config.clone()), check_args(vec![dirty.clone()]), false).await;
        assert_eq!(result.unwrap(), 1);

        let mut only_compliance = check_args(vec![dirty]);
        only_compliance.rules = vec!["permitted-archetype".to_string()];
        assert_eq!(run_check(Some(config), only_compliance, false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_classify_command() {
        let temp_dir = TempDir::new().unwrap();
        let exact = temp_dir.path().join("exact.yaml");
        let unknown = temp_dir.path().join("unknown.json");
        fs::write(&exact, "groupId: com.example.foo\nartifactId: foo-reactor\npackaging: pom\nmodules: [foo-api]\n")
            .unwrap();
        fs::write(&unknown, r#"{"groupId": "com.example.foo", "artifactId": "foo-gadget"}"#).unwrap();

        let config = temp_dir.path().join("pom_guardian.yaml");
        fs::write(&config, "version: \"1.0\"\n").unwrap();

        assert_eq!(run_classify(Some(config.clone()), exact, false).await.unwrap(), 0);
        assert_eq!(run_classify(Some(config), unknown, true).await.unwrap(), 1);
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("test_config.yaml");

        let yaml = serde_yaml::to_string(&EnforcerConfig::default()).unwrap();
        fs::write(&config_file, yaml).unwrap();
        assert_eq!(run_validate_config(Some(config_file.clone())), 0);

        fs::write(&config_file, "version: \"1.0\"\ngroup_ids:\n  evaluate: ['(']\n").unwrap();
        assert_eq!(run_validate_config(Some(config_file)), 1);
    }

    #[test]
    fn test_explain_archetype() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("pom_guardian.yaml");
        fs::write(&config, "version: \"1.0\"\n").unwrap();

        assert_eq!(run_explain(Some(config.clone()), "bill-of-materials").unwrap(), 0);
        assert_eq!(run_explain(Some(config), "gadget").unwrap(), 1);
    }

    #[test]
    fn test_list_archetypes() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("pom_guardian.yaml");
        fs::write(&config, "version: \"1.0\"\narchetypes:\n  PARENT:\n    artifact_id: '.*-parent.*'\n").unwrap();

        assert_eq!(run_list_archetypes(Some(config)).unwrap(), 0);
    }
}
