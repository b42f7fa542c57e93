use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sharplens",
    version,
    about = "C# solution code intelligence over MCP stdio",
    after_help = r#"Examples:
  sharplens serve --solution ./App.sln
  sharplens request --solution ./App.sln --method health_check
  sharplens request --solution ./App.sln --method search_symbols --params '{"query":"*Handler","kind":"Class"}'
  sharplens request --solution ./App.sln --method find_references --params '{"filePath":"/src/App/Foo.cs","line":4,"column":17}'
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the MCP server over stdin/stdout.
    Serve {
        /// Solution file or directory; overrides SOLUTION_PATH.
        #[arg(long)]
        solution: Option<PathBuf>,
    },
    /// Run a single tool invocation and print the JSON result.
    Request {
        /// Solution file or directory; overrides SOLUTION_PATH.
        #[arg(long)]
        solution: Option<PathBuf>,
        #[arg(long)]
        method: String,
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, value_name = "PATH")]
        params_file: Option<PathBuf>,
    },
}
