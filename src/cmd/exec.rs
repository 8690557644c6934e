/*!
`exec.rs`

Implements `choreo-mcp exec <TOOL>`: invoke one tool in-process through the
same dispatcher the MCP server uses, and print the result.

  --param KEY=VALUE   (repeatable)
  --param-file PATH   JSON or YAML object; --param overrides file entries
  --json              machine-readable output

JSON Success Output:
{
  "status": "ok",
  "tool": "get_projects",
  "elapsed_ms": 42,
  "arguments": { "orgId": "123", "token": "***" },
  "result": [ ...records... ]
}

JSON Error Output:
{
  "status":"error",
  "error":"message"
}
*/

use std::time::Instant;

use anyhow::{Result, anyhow};
use clap::Args;
use serde_json::Value;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::{
    GlobalOpts, bootstrap, connect, load_param_file_into_map, parse_params, redact_arguments,
    runtime,
};
use crate::tools::ToolName;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Tool name to invoke (e.g. get_projects)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_exec(args: ExecArgs, global: &GlobalOpts) -> Result<()> {
    let Some(tool) = ToolName::from_str_ci(&args.tool) else {
        let known: Vec<&str> = ToolName::all().iter().map(|t| t.as_str()).collect();
        return output_error(
            args.json,
            &format!("unknown tool '{}' (known: {})", args.tool, known.join(", ")),
        );
    };

    let mut provided = match parse_params(&args.params) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    if let Some(ref pf) = args.param_file
        && let Err(e) = load_param_file_into_map(pf, &mut provided)
    {
        return output_error(args.json, &format!("{e:#}"));
    }

    let settings = global.settings()?;
    // Skip the startup orgs lookup when the call supplies its own organization.
    let resolve_org = tool
        .org_param()
        .is_some_and(|p| !provided.contains_key(p));
    let rt = runtime()?;
    let started = Instant::now();
    let result = rt.block_on(async {
        let dispatcher = if resolve_org {
            bootstrap(settings).await?
        } else {
            connect(settings)?
        };
        dispatcher
            .invoke(tool.as_str(), Some(&provided))
            .await
            .map_err(|e| anyhow!(e.to_string()))
    });
    let elapsed_ms = started.elapsed().as_millis();

    let text = match result {
        Ok(text) => text,
        Err(e) => return output_error(args.json, &format!("{e:#}")),
    };

    let shown_args = redact_arguments(&provided);
    // The dispatcher renders JSON; fall back to the raw text if it is not.
    let result_value: Value =
        serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "tool": tool.as_str(),
            "elapsed_ms": elapsed_ms,
            "arguments": shown_args,
            "result": result_value,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let count = result_value.as_array().map(|a| a.len()).unwrap_or(0);
    println!(
        "{}",
        box_header(
            &format!("{} {} ({} records)", emoji("success", &style), tool, count),
            Some(&format!("{elapsed_ms} ms")),
            &style,
        )
    );

    if shown_args.is_empty() {
        println!(
            "{}",
            color(
                Role::Dim,
                format!("{} No arguments supplied (ambient values used)", emoji("info", &style)),
                &style
            )
        );
    } else {
        let mut rows: Vec<Vec<String>> = shown_args
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), v]
            })
            .collect();
        rows.sort_by(|a, b| a[0].cmp(&b[0]));
        println!("{}", color(Role::Accent, "Arguments:", &style));
        println!("{}", table(&["NAME", "VALUE"], &rows, &style));
    }

    println!();
    println!("{}", color(Role::Success, "Result:", &style));
    println!("{text}");
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Output Helpers                                                              */
/* -------------------------------------------------------------------------- */

fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({"status": "error", "error": msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} Exec Error", emoji("error", &style));
        println!("{}", box_header(&title, None, &style));
        println!("{}", color(Role::Error, msg, &style));
    }
    Err(anyhow!(msg.to_string()))
}
