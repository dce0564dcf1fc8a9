use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use portfolio_insights_cli::logging::init_logging;
use portfolio_insights_cli::render::render_report;
use portfolio_insights_core::errors::CoreError;
use portfolio_insights_core::models::settings::{ProviderKind, Settings};
use portfolio_insights_core::PortfolioAnalyzer;

#[derive(Parser, Debug)]
#[command(name = "portfolio-insights")]
#[command(about = "Parse portfolio data, calculate metrics and ask questions about it")]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Text generation provider (gemini, openai)
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a portfolio file and print the report
    Analyze {
        /// Portfolio file (CSV, JSON or text); `-` reads stdin
        input: String,

        /// Skip the generated insights and forecast
        #[arg(long)]
        no_narrative: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a portfolio file and answer one question about it
    Ask {
        input: String,

        question: String,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a portfolio file, then answer questions read from stdin
    Chat { input: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level);

    let settings = load_settings(&args)?;
    let mut analyzer = PortfolioAnalyzer::from_settings(&settings)?;

    match args.command {
        Command::Analyze {
            input,
            no_narrative,
            json,
        } => {
            let data = read_input(&input)?;
            let report = analyzer
                .analyze(&data, !no_narrative)
                .await
                .map_err(user_facing)?;
            if json {
                println!("{}", serde_json::to_string_pretty(report)?);
            } else {
                print!("{}", render_report(report));
            }
        }
        Command::Ask {
            input,
            question,
            json,
        } => {
            let data = read_input(&input)?;
            analyzer.analyze(&data, false).await.map_err(user_facing)?;
            let answer = analyzer.ask(&question).await.map_err(user_facing)?;
            if json {
                println!("{}", serde_json::json!({ "answer": answer }));
            } else {
                println!("{answer}");
            }
        }
        Command::Chat { input } => {
            let data = read_input(&input)?;
            let report = analyzer.analyze(&data, true).await.map_err(user_facing)?;
            print!("{}", render_report(report));
            chat_loop(&mut analyzer).await?;
        }
    }

    Ok(())
}

/// Settings file (if any), then environment, then command-line flags.
fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_env()?;
    if let Some(provider) = args.provider {
        settings.provider = provider;
    }
    if let Some(model) = &args.model {
        settings.model = Some(model.clone());
    }
    settings.validate()?;
    tracing::debug!(
        provider = %settings.provider,
        model = %settings.effective_model(),
        "settings loaded"
    );
    Ok(settings)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read portfolio data from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

async fn chat_loop(analyzer: &mut PortfolioAnalyzer) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("\n> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        match analyzer.ask(question).await {
            Ok(answer) => println!("{answer}"),
            Err(e) => println!("{}", e.user_message()),
        }
    }
    Ok(())
}

/// Replace collaborator detail with the short user-facing message.
/// Full detail is already in the log.
fn user_facing(e: CoreError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}
