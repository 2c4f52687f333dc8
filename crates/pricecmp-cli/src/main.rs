mod compare;
mod output;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pricecmp_core::Site;
use pricecmp_scraper::{extract_price, StaticPage, WaitBudget};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricecmp")]
#[command(about = "Compare product prices between Amazon and Flipkart")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every catalog product on both sites and write the comparison CSV
    Compare(CompareArgs),
    /// Run one site's price extraction against a saved HTML page
    Extract {
        /// Which site's rules to apply: amazon or flipkart
        #[arg(long)]
        site: Site,
        html_file: PathBuf,
    },
    /// Validate and list the product catalog
    Catalog {
        /// YAML catalog file (defaults to `PRICECMP_CATALOG_PATH`, then the built-in list)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
pub(crate) struct CompareArgs {
    /// YAML catalog file (defaults to `PRICECMP_CATALOG_PATH`, then the built-in list)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// CSV output path (defaults to `PRICECMP_OUTPUT_PATH`)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Directory for page screenshots (defaults to `PRICECMP_SCREENSHOT_DIR`)
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,
    /// Skip page screenshots
    #[arg(long)]
    pub no_screenshots: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let config = pricecmp_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Compare(CompareArgs::default()));

    let code = match command {
        Commands::Compare(args) => run_compare_command(&config, &args).await,
        Commands::Extract { site, html_file } => {
            run_extract(site, &html_file).await?;
            ExitCode::SUCCESS
        }
        Commands::Catalog { catalog } => {
            run_catalog(catalog.as_deref().or(config.catalog_path.as_deref()))?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

/// A failed run prints troubleshooting tips and exits non-zero. Partial
/// screenshots are left in place.
async fn run_compare_command(config: &pricecmp_core::AppConfig, args: &CompareArgs) -> ExitCode {
    match compare::run_compare(config, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "comparison run failed");
            eprintln!("Error during scraping: {e:#}");
            compare::print_troubleshooting_tips();
            ExitCode::FAILURE
        }
    }
}

async fn run_extract(site: Site, html_file: &std::path::Path) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(html_file)
        .with_context(|| format!("failed to read {}", html_file.display()))?;
    let page = StaticPage::new(markup);

    match extract_price(site, &page, &WaitBudget::immediate()).await {
        Some(price) => println!("{site}: {}", report::format_inr(price)),
        None => println!("{site}: no price found"),
    }
    Ok(())
}

fn run_catalog(path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let catalog = compare::resolve_catalog(path)?;
    let source = path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string());

    println!("{} products ({source})", catalog.len());
    for product in catalog.products() {
        println!("\n{}", product.name);
        println!("  {:<10}{}", "Amazon", product.amazon_url);
        println!("  {:<10}{}", "Flipkart", product.flipkart_url);
    }
    Ok(())
}
