use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scry_render::{render_value, RenderConfig};
use scry_value::{ErrorValue, ObjectValue, ToValue, Value};

#[derive(Parser)]
#[command(name = "scry")]
#[command(version = "0.1.0")]
#[command(about = "Call-site-aware value inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the token stream of a source snippet
    Tokens {
        /// Source text (or a file path with --file)
        #[arg(value_name = "INPUT")]
        input: String,

        /// Treat INPUT as a file path
        #[arg(short, long)]
        file: bool,
    },

    /// Recover the call expression starting at FILE:LINE
    Callsite {
        /// Source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based line the call starts on
        #[arg(value_name = "LINE")]
        line: usize,

        /// Output as JSON (for IDE integration)
        #[arg(long)]
        json: bool,
    },

    /// Render a showcase of sample values with the active config
    Demo {
        /// Apply ANSI styling
        #[arg(long)]
        color: bool,

        /// Show instance identity tokens
        #[arg(long)]
        identity: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokens { input, file } => cmd_tokens(&input, file),
        Commands::Callsite { file, line, json } => cmd_callsite(&file, line, json),
        Commands::Demo { color, identity } => cmd_demo(color, identity),
        Commands::Config => {
            println!("{}", RenderConfig::example());
            Ok(())
        }
    }
}

fn cmd_tokens(input: &str, is_file: bool) -> Result<()> {
    let source = if is_file {
        std::fs::read_to_string(input)?
    } else {
        input.to_string()
    };

    let (tokens, errors) = scry_lexer::tokenize(&source);
    for token in &tokens {
        println!("{:>4}..{:<4} {:?}", token.span.start, token.span.end, token.token);
    }
    for error in &errors {
        eprintln!("error: {}", error);
    }
    println!(
        "{} tokens, {} errors, {:?}",
        tokens.len(),
        errors.len(),
        scry_lexer::scan(&tokens)
    );
    Ok(())
}

fn cmd_callsite(file: &PathBuf, line: usize, json: bool) -> Result<()> {
    let site = scry_callsite::resolve(&file.to_string_lossy(), line, &scry_inspect::TARGET);

    if json {
        let payload = serde_json::json!({
            "file": site.file,
            "start_line": site.start_line,
            "stop_line": site.stop_line,
            "call": site.call,
            "args": site.args,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if site.is_unknown() {
        println!("source unavailable");
        return Ok(());
    }
    println!("call:  {}", site.call);
    println!("lines: {}..{}", site.start_line, site.stop_line);
    for (i, arg) in site.args.iter().enumerate() {
        println!("arg {}: {}", i, arg);
    }
    Ok(())
}

fn cmd_demo(color: bool, identity: bool) -> Result<()> {
    let config = RenderConfig {
        color,
        show_identity: identity,
        ..RenderConfig::default()
    };

    let samples: Vec<(&str, Value)> = vec![
        ("int", 42i64.to_value()),
        ("float", 2.5f64.to_value()),
        ("string", "the quick brown fox".to_value()),
        ("list", vec![1i64, 2, 3].to_value()),
        ("tuple", (1i64, "two", 3.0f64).to_value()),
        (
            "map",
            std::collections::BTreeMap::from([("one", 1i64), ("two", 2)]).to_value(),
        ),
        ("iterator", Value::iterator(0i64..8)),
        (
            "object",
            ObjectValue::new("Point")
                .field("x", 3i64)
                .field("y", 4i64)
                .method("norm")
                .with_display("Point(3, 4)")
                .into_value(),
        ),
        (
            "error",
            ErrorValue::new("IoError", "no such file")
                .with_source(ErrorValue::new("OsError", "ENOENT"))
                .into_value(),
        ),
        (
            "regex",
            regex::Regex::new(r"[a-z]+\d*")?.to_value(),
        ),
        ("path", PathBuf::from("/tmp/scry/demo.rs").to_value()),
        ("datetime", chrono::Utc::now().to_value()),
    ];

    for (name, value) in &samples {
        println!("{} = {}", name, render_value(value, &config));
    }
    Ok(())
}
