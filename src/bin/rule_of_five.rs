use clap::{Parser, Subcommand};
use colored::Colorize;
use rule_of_five::{
    ElisionMode, Error, JsonSink, OutputFormat, Recorder, Runner, Scenario, Sink, StdoutSink,
    TracerConfig,
};
use std::io;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "rule-of-five")]
#[command(version, about = "Trace which special member function runs, exercise by exercise", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// TOML file with tracer settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Trace every return by value, as with -fno-elide-constructors
    #[arg(long, global = true)]
    no_elide: bool,

    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the exercises
    List,
    /// Run exercises by number (2.3) or name (explicit-move)
    Run { selectors: Vec<String> },
    /// Run every exercise in order
    All,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }

    if let Err(err) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut config = TracerConfig::load_or_default(cli.config.as_deref())?;
    if cli.no_elide {
        config.elision = ElisionMode::Disabled;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if cli.no_color {
        config.color = false;
    }

    let scenarios = match cli.command {
        Some(Command::List) => {
            list();
            return Ok(());
        }
        Some(Command::All) => Scenario::ALL.to_vec(),
        Some(Command::Run { selectors }) => Scenario::select(selectors.as_slice())?,
        None => Scenario::select::<String>(&[])?,
    };

    let sink: Rc<dyn Sink> = match config.format {
        OutputFormat::Text => Rc::new(StdoutSink::stdout(config.indent, config.color)),
        OutputFormat::Json => Rc::new(JsonSink::new(io::stdout())),
    };
    let recorder = Recorder::new(sink, &config);
    let runner = Runner::new(recorder, config.elision);

    tracing::info!(count = scenarios.len(), "running scenarios");
    runner.run_program(&scenarios)
}

fn list() {
    for scenario in Scenario::ALL {
        println!(
            "  {} {:<18} {}",
            format!("{:<5}", scenario.id()).bold(),
            scenario.slug(),
            scenario.question()
        );
    }
}
