/*!
`list.rs`

Implements `choreo-mcp list`: print the tool registry (names, parameters,
descriptions) without contacting the API. Required-ness reflects whether an
ambient token was configured; organization defaults are only known after
startup resolution, so org parameters are listed as required here.

JSON Output Shape:
{
  "status": "ok",
  "count": 4,
  "tools": [
    { "name": "get_projects", "description": "...", "inputSchema": {...} }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::GlobalOpts;
use crate::tools::{Ambient, Registry, ToolSpec};

/// CLI arguments for `choreo-mcp list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let settings = global.settings()?;
    let registry = Registry::new(Ambient::from_settings(&settings));

    if args.json {
        let tools: Vec<serde_json::Value> = registry.iter().map(tool_json).collect();
        let out = serde_json::json!({
            "status": "ok",
            "count": registry.len(),
            "tools": tools,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            &format!("{} Tools ({})", emoji("tool", &style), registry.len()),
            Some(&format!("base={}", settings.base_url)),
            &style,
        )
    );
    let rows: Vec<Vec<String>> = registry
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            vec![
                (i + 1).to_string(),
                spec.name.to_string(),
                params_summary(spec),
                spec.name.description().to_string(),
            ]
        })
        .collect();
    println!("{}", table(&["#", "NAME", "PARAMS", "DESCRIPTION"], &rows, &style));
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(Role::Dim, "* = required parameter", &style)
    );
    Ok(())
}

fn tool_json(spec: &ToolSpec) -> serde_json::Value {
    serde_json::json!({
        "name": spec.name.as_str(),
        "description": spec.name.description(),
        "inputSchema": spec.input_schema(),
    })
}

/// `orgId*, token*` style summary.
fn params_summary(spec: &ToolSpec) -> String {
    spec.params
        .iter()
        .map(|p| {
            if p.required {
                format!("{}*", p.name)
            } else {
                p.name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
