use anyhow::Result;
use clap::Parser;
use iterbench::{
    aggregate,
    artifact::Corpus,
    cache::CommandFlusher,
    cli::{Cli, Command, RunArgs, SummaryArgs},
    config::BenchConfig,
    error::{self, BenchError},
    executor::{self, FileIterator},
    orchestrator::{BenchmarkPlan, Orchestrator},
    parser, report,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings always reach stderr
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: RunArgs) -> Result<()> {
    let corpora = args.folders.iter().map(|p| Corpus::from_path(p)).collect();
    let plan = BenchmarkPlan::new(corpora, args.strategies, args.count, &args.out)?;

    let config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };

    let exe = executor::locate_executable(args.exe.as_deref(), &config.executable.candidates)?;
    tracing::debug!(exe = %exe.display(), runs = plan.total_runs(), "resolved file iterator");

    let mut orchestrator = Orchestrator::new(
        CommandFlusher::new(config.cache_flush),
        FileIterator::new(exe),
    );
    orchestrator.run_all(&plan, &mut std::io::stdout().lock())?;
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    if !args.folder.is_dir() {
        return Err(BenchError::ReportFolderMissing(args.folder).into());
    }

    let results = parser::scan_directory(&args.folder)?;
    let stats = aggregate::compute_statistics(&results);
    report::render(
        &results,
        &stats,
        &args.folder,
        &args.out,
        &mut std::io::stdout().lock(),
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(error::EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.debug);

    let outcome = match cli.command {
        Command::Run(args) => run(args),
        Command::Summary(args) => summary(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(error::exit_code_for(&err))
        }
    }
}
