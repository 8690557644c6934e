/*!
`serve.rs`

Implements `choreo-mcp serve` (also the default command): resolve ambient
values, then run the MCP server over stdio until the client disconnects.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::shared::{GlobalOpts, bootstrap, runtime};
use crate::mcp::{ChoreoServer, serve_stdio};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

pub fn execute_serve(_args: ServeArgs, global: &GlobalOpts) -> Result<()> {
    let settings = global.settings()?;
    let rt = runtime()?;
    rt.block_on(async {
        let dispatcher = bootstrap(settings).await?;
        serve_stdio(ChoreoServer::new(dispatcher)).await
    })
}
