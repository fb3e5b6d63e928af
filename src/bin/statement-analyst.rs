use clap::{Parser, Subcommand};
use financial_statement_analyst::display::{format_delta, format_times, render_table};
use financial_statement_analyst::llm::GeminiProvider;
use financial_statement_analyst::{
    AnalysisError, AnalysisSnapshot, AnalystApp, AnalystConfig, AnchorLabels, ChatRole,
    EnvSecretStore,
};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

type App = AnalystApp<GeminiProvider<EnvSecretStore>>;

#[derive(Parser)]
#[command(
    name = "statement-analyst",
    version,
    about = "Growth, composition and liquidity analysis of a two-year balance sheet"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Match Vietnamese (VAS) line item labels instead of English ones
    #[arg(long, global = true)]
    vietnamese: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the analysis table and liquidity indicators
    Analyze {
        /// Spreadsheet with columns: label | prior year | current year
        file: PathBuf,

        /// Emit the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Also request a written assessment from the AI model
        #[arg(long)]
        commentary: bool,
    },
    /// Ask follow-up questions about a spreadsheet
    Chat { file: PathBuf },
    /// Print the JSON schema of the `analyze --json` output
    Schema,
}

fn load_config(cli: &Cli) -> Result<AnalystConfig, AnalysisError> {
    let mut config = match &cli.config {
        Some(path) => AnalystConfig::from_toml_file(path)?,
        None => AnalystConfig::default(),
    };
    if cli.vietnamese {
        config.anchors = AnchorLabels::vietnamese();
    }
    Ok(config)
}

fn print_snapshot(snapshot: &AnalysisSnapshot) {
    println!("Growth & asset composition\n");
    println!("{}\n", render_table(&snapshot.table));

    println!("Current ratio");
    println!("  Prior year:   {}", format_times(&snapshot.liquidity.prior));
    match format_delta(&snapshot.liquidity) {
        Some(delta) => println!(
            "  Current year: {} ({})",
            format_times(&snapshot.liquidity.current),
            delta
        ),
        None => println!("  Current year: {}", format_times(&snapshot.liquidity.current)),
    }

    for warning in &snapshot.warnings {
        println!("⚠️  {}", warning);
    }
    println!();
}

fn load_file(app: &mut App, path: &Path) -> Result<(), AnalysisError> {
    match app.on_file_loaded(path) {
        Ok(snapshot) => {
            print_snapshot(snapshot);
            Ok(())
        }
        Err(e @ AnalysisError::MissingAnchor(_)) | Err(e @ AnalysisError::ColumnCount(_)) => {
            eprintln!("❌ Data structure error: {}", e);
            Err(e)
        }
        Err(e) => {
            eprintln!(
                "❌ Could not read or process the file: {}. Check the file format.",
                e
            );
            Err(e)
        }
    }
}

async fn analyze(app: &mut App, file: &Path, json: bool, commentary: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let snapshot = app.on_file_loaded(file)?;
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        load_file(app, file)?;
    }

    if commentary {
        println!("Sending the analysis to {} ...", app.config().model);
        match app.on_analyze_requested().await {
            Ok(result) => {
                println!("\nAI assessment:\n");
                println!("{}\n", result.text);
            }
            Err(e @ AnalysisError::MissingCredential(_)) => {
                eprintln!("❌ {}. Set it in the environment or a .env file.", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn chat(app: &mut App, file: &Path) -> Result<(), Box<dyn Error>> {
    load_file(app, file)?;

    println!("🤖 Ask questions about the statement. Commands: /reload <file>, /history, quit");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if prompt.is_empty() {
            continue;
        }

        if let Some(path) = prompt.strip_prefix("/reload ") {
            // A failed reload still clears the previous table and chat.
            let _ = load_file(app, Path::new(path.trim()));
            continue;
        }

        if prompt == "/history" {
            for turn in app.session().turns() {
                let who = match turn.role {
                    ChatRole::User => "you",
                    ChatRole::Assistant => "ai",
                };
                println!("[{}] {}", who, turn.content);
            }
            continue;
        }

        println!("\nThinking...");

        match app.on_chat_submitted(prompt).await {
            Ok(reply) => {
                println!("\n{}\n", reply);
                println!("------------------------------------------------------------------");
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let provider = GeminiProvider::new(EnvSecretStore, &config);
    let mut app = AnalystApp::new(config, provider);

    match &cli.command {
        Command::Analyze {
            file,
            json,
            commentary,
        } => analyze(&mut app, file, *json, *commentary).await,
        Command::Chat { file } => chat(&mut app, file).await,
        Command::Schema => {
            let schema = schemars::schema_for!(AnalysisSnapshot);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}
