pub mod cli;
pub mod config;
pub mod deadcode;
pub mod depgraph;
pub mod diagnostics;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod navigate;
pub mod refactor;
pub mod rpc;
pub mod search;
pub mod semantics;
pub mod syntax;
pub mod util;
pub mod workspace;
