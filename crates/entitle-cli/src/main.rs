//! Entitle - entitlements file updater
//!
//! Usage:
//!   entitle update App.entitlements --app-group-identifiers group.com.test.testapp
//!   entitle show App.entitlements
//!   entitle fields

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entitle_core::commands::{ShowCommand, UpdateCommand, UpdateOptions, UpdateReport};
use entitle_core::diagnostics::{Diagnostics, TracingDiagnostics};
use entitle_core::document::EntitlementsDocument;
use entitle_core::error::MergeError;
use entitle_core::overrides::{OverrideField, OverrideSet};
use entitle_core::params::ValidationMode;

#[derive(Parser)]
#[command(name = "entitle")]
#[command(about = "Update entitlements files during app builds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace capability keys in an entitlements file
    Update(Box<UpdateArgs>),

    /// Print the contents of an entitlements file
    Show {
        /// Path to the .entitlements file
        entitlements_file: PathBuf,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        format: ShowFormat,
    },

    /// List the parameters `update` understands
    Fields,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output on success
    Quiet,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum ShowFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct UpdateArgs {
    /// Path to the .entitlements file
    entitlements_file: PathBuf,

    /// Access levels for Sign in with Apple (e.g. Default)
    ///
    /// Pass the flag with no values to write an empty array.
    #[arg(long, value_name = "LEVEL", num_args = 0.., value_delimiter = ',')]
    apple_signin: Option<Vec<String>>,

    /// App group identifiers (e.g. group.com.test.testapp)
    #[arg(long, value_name = "GROUP", num_args = 0.., value_delimiter = ',')]
    app_group_identifiers: Option<Vec<String>>,

    /// Merchant identifiers for in-app payments (e.g. merchant.com.test.testapp)
    #[arg(long, value_name = "MERCHANT", num_args = 0.., value_delimiter = ',')]
    app_payments: Option<Vec<String>>,

    /// Associated domains (e.g. applinks:cv.test.cn)
    #[arg(long, value_name = "DOMAIN", num_args = 0.., value_delimiter = ',')]
    app_associated_domains: Option<Vec<String>>,

    /// TOML file with overrides keyed by parameter name
    ///
    /// Values given on the command line take precedence.
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Skip checking that the entitlements file exists during validation
    #[arg(long)]
    skip_exists_check: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

impl UpdateArgs {
    fn override_set(&self) -> OverrideSet {
        OverrideSet {
            apple_signin: self.apple_signin.clone(),
            app_group_identifiers: self.app_group_identifiers.clone(),
            app_payments: self.app_payments.clone(),
            app_associated_domains: self.app_associated_domains.clone(),
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entitle=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run_cli(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Core errors were already reported by the command that raised them
            if err.downcast_ref::<MergeError>().is_none() {
                TracingDiagnostics.user_error(&format!("{err:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Update(args) => run_update(*args)?,
        Commands::Show {
            entitlements_file,
            format,
        } => run_show(entitlements_file, format)?,
        Commands::Fields => print_fields(),
    }
    Ok(())
}

fn run_update(args: UpdateArgs) -> Result<()> {
    let mut options =
        UpdateOptions::new(&args.entitlements_file).with_overrides(args.override_set());
    if let Some(file) = &args.overrides {
        options = options.with_overrides_file(file);
    }
    if args.skip_exists_check {
        options = options.with_validation_mode(ValidationMode::Test);
    }

    let report = UpdateCommand::with_defaults().execute(&options)?;

    print_update_result(args.format, &report)
}

fn print_update_result(format: OutputFormat, report: &UpdateReport) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("✓ Updated {}", report.path.display());
            if report.replaced_keys.is_empty() {
                println!("  No overrides given, file rewritten unchanged");
            }
            for key in &report.replaced_keys {
                println!("  • {key}");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": report.path,
                "replaced": report.replaced_keys,
                "document": report.document.as_dictionary(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn run_show(path: PathBuf, format: ShowFormat) -> Result<()> {
    let document = ShowCommand::with_defaults().execute(&path)?;
    print_document(format, &document)
}

fn print_document(format: ShowFormat, document: &EntitlementsDocument) -> Result<()> {
    match format {
        ShowFormat::Table => {
            if document.is_empty() {
                println!("(no entitlements)");
            }
            for (key, value) in document.as_dictionary().iter() {
                println!("{key} = {}", serde_json::to_string(value)?);
            }
        }
        ShowFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(document.as_dictionary())?
            );
        }
    }
    Ok(())
}

fn print_fields() {
    for field in OverrideField::ALL {
        println!("--{}", field.parameter().replace('_', "-"));
        println!("    key: {}", field.document_key());
        println!("    {}", field.description());
    }
}
