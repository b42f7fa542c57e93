use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use sharplens::workspace::solution;
use sharplens::{cli, config, logging, mcp, rpc};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Serve { solution } => {
            let mut config = config::Config::from_env();
            if solution.is_some() {
                config.solution_path = solution;
            }
            mcp::serve(config)
        }
        cli::Command::Request {
            solution: solution_arg,
            method,
            params,
            params_file,
        } => {
            let mut config = config::Config::from_env();
            if solution_arg.is_some() {
                config.solution_path = solution_arg;
            }
            logging::init(config.log_level);
            let params_raw = if let Some(path) = params_file {
                std::fs::read_to_string(&path)?
            } else {
                params
            };
            let params: Value = serde_json::from_str(&params_raw)?;
            let mut core = rpc::Core::new(config);
            if let Some(path) = core.workspace.config().solution_path.clone() {
                let resolved = solution::resolve_solution_file(&path)?;
                core.workspace.load(&resolved)?;
            }
            let result = rpc::handle_method(&mut core, &method, params)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
