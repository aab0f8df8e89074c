use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sprout_core::{materialize, Args, ChatClient, Config, Outcome, Session};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.is_init() {
        Config::create_config(&args.config)
            .with_context(|| format!("Error creating config {}", args.config))?;
        println!("Created {}", args.config);
        return Ok(());
    }

    init_logging(args.debug);
    let config = Config::new(&args.config, &args);

    let client = ChatClient::new(config.llm.clone())?;
    let stdin = io::stdin();
    let color = io::stdout().is_terminal();
    let mut session = Session::new(stdin.lock(), io::stdout(), color);

    let root = match session.run(&client, args.description())? {
        Outcome::Create(root) => root,
        Outcome::Aborted => return Ok(()),
    };

    let base = config.output.directory.unwrap_or_else(|| PathBuf::from("."));
    println!("\nCreating final project structure in {}...", base.display());
    let report = materialize(&root, &base)
        .with_context(|| format!("Error creating base output directory {}", base.display()))?;

    for (path, err) in &report.failures {
        eprintln!("Failed to create {}: {}", path.display(), err);
    }
    println!(
        "Created {} directories and {} files.",
        report.created_dirs.len(),
        report.created_files.len()
    );
    if report.is_clean() {
        println!("Project structure created successfully!");
    }
    Ok(())
}

/// Log level used when `RUST_LOG` is not set.
fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
