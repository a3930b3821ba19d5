//! aebridge command-line client.
//!
//! Provides the `aebridge` binary with subcommands for talking to a running
//! bridge: `ping` checks liveness, `eval` sends a script and prints the
//! result (pretty-printed when it is JSON).

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use aebridge_client::{BridgeClient, EvalValue, DEFAULT_URL};

/// Client for the aebridge scripting bridge.
#[derive(Parser)]
#[command(name = "aebridge", about = "Client for the aebridge scripting bridge")]
struct Cli {
    /// Bridge URL.
    #[arg(short, long, global = true, default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Check that the bridge is reachable.
    Ping,

    /// Evaluate a script in the host application.
    Eval {
        /// Script text. Read from --file or stdin when omitted.
        script: Option<String>,

        /// Read the script from a file.
        #[arg(short, long, conflicts_with = "script")]
        file: Option<PathBuf>,

        /// Send the script as-is, without the host-side error guard,
        /// and print the result text undecoded.
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = BridgeClient::new(cli.url);

    let exit_code = match cli.command {
        Commands::Ping => run_ping(&client).await,
        Commands::Eval { script, file, raw } => run_eval(&client, script, file, raw).await,
    };
    process::exit(exit_code);
}

/// Execute the ping subcommand.
///
/// Returns exit code: 0 = alive, 1 = unreachable or error status.
async fn run_ping(client: &BridgeClient) -> i32 {
    match client.ping().await {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Execute the eval subcommand.
///
/// Returns exit code: 0 = success, 1 = request failed or the script raised,
/// 2 = the script could not be read.
async fn run_eval(
    client: &BridgeClient,
    script: Option<String>,
    file: Option<PathBuf>,
    raw: bool,
) -> i32 {
    let script = match read_script(script, file) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 2;
        }
    };

    if raw {
        return match client.eval_raw(&script).await {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    match client.eval(&script).await {
        Ok(value) => {
            let failed = value.is_script_error();
            match value {
                EvalValue::Json(json) => {
                    let text = serde_json::to_string_pretty(&json)
                        .unwrap_or_else(|_| json.to_string());
                    println!("{}", text);
                }
                EvalValue::Text(text) => println!("{}", text),
            }
            if failed {
                1
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Resolve the script from the argument, a file, or stdin.
fn read_script(script: Option<String>, file: Option<PathBuf>) -> Result<String, String> {
    if let Some(script) = script {
        return Ok(script);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read script from stdin: {}", e))?;
    if buf.trim().is_empty() {
        return Err("no script given: pass SCRIPT, --file, or pipe it on stdin".to_string());
    }
    Ok(buf)
}
