mod cli;
mod commands;
#[allow(unused_assignments)]
mod diagnostic;
mod error;
mod output;
mod telemetry;

use clap::Parser;

use crate::error::ExitCode;

fn main() {
    let cli = cli::Cli::parse();
    telemetry::init(&cli.global);
    let output = output::OutputContext::from_global(&cli.global);

    let result = match cli.command {
        cli::Commands::Check(args) => commands::check::run(args, &output),
        cli::Commands::Format(args) => commands::format::run(args, &output),
        cli::Commands::Ast(args) => commands::ast::run(args, &output),
        cli::Commands::Completions(args) => commands::completions::run(args),
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success as i32),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}
