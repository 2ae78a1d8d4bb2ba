// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! tether CLI - runs an entry script together with its statically linked modules

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tether_engine::{Engine, FsSourceReader};
use tether_ext::{JsFileResolver, RequireChain, install_require};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tether",
    about = "Runs an ECMAScript entry file with its import/export graph",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Entry script, run as a module
    script: Option<PathBuf>,

    /// Evaluate script from command line
    #[arg(short = 'e', long = "eval", conflicts_with = "script")]
    eval: Option<String>,

    /// Directory that module specifiers are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Directory name searched by require() for bare module names
    #[arg(long, default_value = tether_ext::require::DEFAULT_MODULES_DIR)]
    modules_dir: String,

    /// Do not define the global require() function
    #[arg(long)]
    no_require: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tether=debug,tether_engine=debug,tether_ext=debug"
    } else {
        "tether=warn,tether_engine=warn,tether_ext=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let reader = match &cli.base_dir {
        Some(dir) => FsSourceReader::with_base_dir(dir),
        None => FsSourceReader::new(),
    };
    let mut engine = Engine::new().with_source_reader(reader);

    if !cli.no_require {
        let resolver = JsFileResolver::new().with_modules_dir(cli.modules_dir.as_str());
        install_require(&mut engine, RequireChain::new().with_resolver(resolver))
            .map_err(|e| anyhow::anyhow!(describe(&e)))?;
    }

    if let Some(code) = cli.eval {
        let result = engine
            .eval(&code)
            .map_err(|e| anyhow::anyhow!(describe(&e)))?;
        if !result.is_undefined() {
            println!("{}", result);
        }
    } else if let Some(script) = cli.script {
        let source = std::fs::read_to_string(&script)
            .with_context(|| format!("cannot read '{}'", script.display()))?;
        tracing::debug!(script = %script.display(), "running entry module");
        engine
            .run_module(&script.to_string_lossy(), &source)
            .map_err(|e| anyhow::anyhow!(describe(&e)))?;
    } else {
        anyhow::bail!("nothing to run; pass a script path or --eval <CODE>");
    }

    Ok(())
}

/// Flattens an error and its causes into one line.
///
/// Engine errors hold script values, so they cross into `anyhow` as text.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
