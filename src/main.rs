//! study-buddy CLI - LLM-generated quizzes in the terminal.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use study_buddy::client::HealthStatus;
use study_buddy::{
    Difficulty, GenerationRequest, Question, QuestionGenerator, QuestionType, QuizManager,
    Settings, build_chat_model, quiz,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "study-buddy")]
#[command(version)]
#[command(about = "Generate a quiz on any topic with an LLM, answer it, and export the results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to an optional TOML settings file (environment variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct QuizArgs {
    /// Topic to ask about
    #[arg(short, long)]
    topic: String,

    /// Difficulty: easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Question type: mcq or fill-blank
    #[arg(short = 'q', long = "type", default_value = "mcq")]
    question_type: QuestionType,

    /// Number of questions
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    count: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz and answer it interactively
    Quiz {
        #[command(flatten)]
        args: QuizArgs,

        /// Write the results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also save a timestamped CSV into this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },

    /// Generate questions and print them as JSON
    Generate {
        #[command(flatten)]
        args: QuizArgs,
    },

    /// Validate settings and probe the configured provider
    Check,

    /// Show example configuration
    Example,
}

/// `RUST_LOG` when set and valid, otherwise the fallback directives.
fn log_filter(rust_log: Option<&str>, fallback: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn setup_logging(verbose: bool, logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {logs_dir:?}"))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, "app.log"));

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (file_default, console_default) = if verbose {
        ("info,study_buddy=debug", "info,study_buddy=debug")
    } else {
        ("info", "warn")
    };
    let file_filter = log_filter(rust_log.as_deref(), file_default);
    let console_filter = log_filter(rust_log.as_deref(), console_default);

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter);
    let file = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to set subscriber")?;

    Ok(guard)
}

fn print_example_config() {
    let example = r#"# study-buddy configuration
#
# Put these in the environment or a .env file. The same keys in lowercase
# can go in a TOML file passed with --config; the environment wins.

# Provider: false = Groq (cloud), true = Ollama (local)
USE_OLLAMA=false

# Groq
GROQ_API_KEY=gsk_...
GROQ_MODEL=llama-3.3-70b-versatile
# GROQ_BASE_URL=https://api.groq.com/openai/v1

# Ollama
OLLAMA_MODEL=glm-4.7-flash:q4_K_M
OLLAMA_BASE_URL=http://localhost:11434

# Generation
TEMPERATURE=0.9          # 0.0 - 2.0
MAX_RETRIES=3            # attempts per question (0 behaves like 1)
RETRY_BACKOFF_MS=0       # fixed delay between attempts
REQUEST_TIMEOUT_SECS=120

# Logging
LOGS_DIR=logs
"#;
    println!("{example}");
}

fn build_generator(settings: &Settings) -> Result<QuestionGenerator> {
    let model = build_chat_model(settings).context("Failed to create LLM client")?;
    info!(
        provider = model.name(),
        model = model.model(),
        max_attempts = settings.max_attempts(),
        "LLM client ready"
    );
    Ok(QuestionGenerator::from_settings(Arc::from(model), settings))
}

fn build_request(args: &QuizArgs) -> Result<GenerationRequest> {
    GenerationRequest::new(args.topic.as_str(), args.difficulty, args.question_type)
        .context("Please enter a topic before generating the quiz")
}

async fn generate_quiz(
    generator: &QuestionGenerator,
    request: &GenerationRequest,
    count: u8,
) -> Result<QuizManager> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!(
        "Generating {count} {} questions about {}...",
        request.difficulty, request.topic
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut manager = QuizManager::new();
    let result = manager
        .generate_questions(generator, request, usize::from(count))
        .await;
    spinner.finish_and_clear();

    result.context("Error generating questions")?;
    Ok(manager)
}

/// Ask one question on stdin. MCQ accepts the option number or its text.
fn ask<R: BufRead>(input: &mut R, number: usize, question: &Question) -> Result<String> {
    println!("\nQuestion {number}: {}", question.text());

    let options = question.options();
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }

    loop {
        if options.is_empty() {
            print!("Fill in the blank: ");
        } else {
            print!("Select an option [1-{}]: ", options.len());
        }
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read answer")? == 0 {
            bail!("Input closed before the quiz was finished");
        }
        let answer = line.trim();

        if options.is_empty() {
            return Ok(answer.to_string());
        }

        if let Ok(choice) = answer.parse::<usize>()
            && (1..=options.len()).contains(&choice)
        {
            return Ok(options[choice - 1].clone());
        }
        if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(answer)) {
            return Ok(option.clone());
        }
        println!("Please pick a number between 1 and {}.", options.len());
    }
}

fn print_results(manager: &QuizManager) {
    let score = manager.score();
    println!("\n=== Results ===");
    println!(
        "Score:       {}/{} ({:.1}%)",
        score.correct, score.total, score.percentage
    );

    for result in manager.results() {
        let mark = if result.is_correct { "correct" } else { "wrong" };
        println!("\nQuestion {} [{mark}]: {}", result.question_number, result.question);
        if !result.is_correct {
            println!("  Your answer:    {}", result.user_answer);
            println!("  Correct answer: {}", result.correct_answer);
        }
    }
}

async fn run_quiz(
    settings: &Settings,
    args: &QuizArgs,
    csv: Option<PathBuf>,
    save_dir: Option<PathBuf>,
) -> Result<()> {
    let request = build_request(args)?;
    let generator = build_generator(settings)?;
    let mut manager = generate_quiz(&generator, &request, args.count).await?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut answers = Vec::with_capacity(manager.len());
    for (index, question) in manager.questions().iter().enumerate() {
        answers.push(ask(&mut input, index + 1, question)?);
    }
    manager.set_answers(answers)?;
    manager.evaluate();
    print_results(&manager);

    if let Some(path) = csv {
        quiz::save_csv_to(manager.results(), &path)
            .with_context(|| format!("Error saving results to {path:?}"))?;
        println!("\nResults saved to {path:?}");
    }
    if let Some(dir) = save_dir {
        let path = quiz::save_csv(manager.results(), &dir, "quiz_results")
            .context("Error saving results to CSV")?;
        println!("Results saved to {path:?}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Example = cli.command {
        print_example_config();
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let _guard = setup_logging(cli.verbose, &settings.logs_dir)?;

    match cli.command {
        Commands::Example => unreachable!("handled before settings are loaded"),

        Commands::Check => {
            let model = build_chat_model(&settings).context("Failed to create LLM client")?;
            let health = model.health_check().await;

            println!("Provider:    {}", model.name());
            println!("Model:       {}", model.model());
            println!("Temperature: {}", settings.temperature);
            println!("Attempts:    {}", settings.max_attempts());
            println!("Status:      {}", health.status);
            if let Some(latency) = health.latency_ms {
                println!("Latency:     {latency} ms");
            }
            if health.status != HealthStatus::Healthy {
                bail!(
                    "{} endpoint is {}: {}",
                    health.endpoint,
                    health.status,
                    health.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Commands::Generate { args } => {
            let request = build_request(&args)?;
            let generator = build_generator(&settings)?;
            let manager = generate_quiz(&generator, &request, args.count).await?;
            let json = serde_json::to_string_pretty(manager.questions())
                .context("Failed to serialize questions")?;
            println!("{json}");
        }

        Commands::Quiz {
            args,
            csv,
            save_dir,
        } => {
            run_quiz(&settings, &args, csv, save_dir).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use study_buddy::generator::{parse, validate};
    use tracing_subscriber::filter::LevelFilter;

    fn mcq() -> Question {
        let raw = parse(
            r#"{"question": "2 + 2?", "options": ["3", "4", "5", "6"], "correct_answer": "4"}"#,
            QuestionType::Mcq,
        )
        .unwrap();
        validate(&raw).unwrap()
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        assert_eq!(
            log_filter(Some("trace"), "warn").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(
            log_filter(None, "warn").max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_quiz_args() {
        let cli = Cli::try_parse_from([
            "study-buddy",
            "quiz",
            "--topic",
            "volcanoes",
            "--type",
            "fill-blank",
            "-d",
            "Hard",
            "-n",
            "3",
        ])
        .unwrap();

        let Commands::Quiz { args, .. } = cli.command else {
            panic!("expected quiz command");
        };
        assert_eq!(args.question_type, QuestionType::FillBlank);
        assert_eq!(args.difficulty, Difficulty::Hard);
        assert_eq!(args.count, 3);

        assert!(
            Cli::try_parse_from(["study-buddy", "quiz", "--topic", "x", "-n", "11"]).is_err()
        );
    }

    #[test]
    fn test_ask_accepts_number_or_text() {
        let question = mcq();

        let mut input = io::Cursor::new("9\n2\n");
        assert_eq!(ask(&mut input, 1, &question).unwrap(), "4");

        let mut input = io::Cursor::new("6\n");
        assert_eq!(ask(&mut input, 1, &question).unwrap(), "6");

        let mut input = io::Cursor::new("");
        assert!(ask(&mut input, 1, &question).is_err());
    }
}
