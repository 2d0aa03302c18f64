//! # Meu Caixa Register Entry Point
//!
//! ```text
//! caixa-register [--config <path>]
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: caixa-register [--config <path>]";

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|a| a == "-h" || a == "--help") {
        println!("Meu Caixa register\n{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let config_path = match parse_args(std::env::args().skip(1)) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    match caixa_register::run(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("caixa-register: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>, String> {
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("{} requires a path", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            other => return Err(format!("unexpected argument '{}'", other)),
        }
    }

    Ok(config_path)
}
