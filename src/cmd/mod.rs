/*!
Subcommand modules.

  serve.rs   run the MCP server on stdio (default)
  list.rs    print the tool registry
  exec.rs    invoke one tool in-process
  shared.rs  global options, bootstrap, parameter parsing
  format.rs  human output helpers

Each subcommand exposes one `execute_*` function returning `anyhow::Result<()>`.
*/

pub mod exec;
pub mod format;
pub mod list;
pub mod serve;
pub mod shared;

pub use exec::{ExecArgs, execute_exec};
pub use list::{ListArgs, execute_list};
pub use serve::{ServeArgs, execute_serve};
pub use shared::GlobalOpts;
