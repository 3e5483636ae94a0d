//! Docweave CLI
//!
//! Usage:
//!   docweave render [FILE]                 Convert markup to a document
//!   docweave list --templates <DIR>        List registered templates
//!   docweave schemas --templates <DIR>     Print tool schemas as JSON
//!   docweave invoke <NAME> --templates <DIR> --args <JSON>

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docweave::{render_markup, TemplateRegistry};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(about = "Markup templating for container documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Template descriptor directories, searched in order
    #[arg(short, long = "templates", global = true)]
    templates: Vec<PathBuf>,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Convert markup source to a document (stdin if no file given)
    Render {
        /// Input markup file
        input: Option<PathBuf>,

        /// Output path (stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered templates with their arguments
    List,

    /// Print every registered tool schema as a JSON array
    Schemas,

    /// Invoke a template tool and write the rendered document
    Invoke {
        /// Template name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// Output path (defaults to the tool's suggested filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // the handle must stay alive for logging to keep flowing
    let _logger = match flexi_logger::Logger::try_with_str(&cli.log)
        .and_then(|logger| logger.start())
    {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            std::process::exit(1);
        }
    };

    match run(cli) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Render { input, output } => {
            let source = match input {
                Some(path) => fs::read_to_string(&path)
                    .map_err(|e| format!("reading '{}': {}", path.display(), e))?,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let doc = render_markup(&source);
            match output {
                Some(path) => doc.save(&path)?,
                None => {
                    let bytes = doc.to_json()?;
                    println!("{}", String::from_utf8_lossy(&bytes));
                }
            }
        }

        Command::List => {
            let registry = TemplateRegistry::load(&cli.templates);
            for tool in registry.tools() {
                println!("{}: {}", tool.name(), tool.description());
                for arg in &tool.descriptor().args {
                    let req = if arg.required { "required" } else { "optional" };
                    println!(
                        "  {} ({}, {}): {}",
                        arg.name,
                        arg.arg_type.json_name(),
                        req,
                        arg.description
                    );
                }
                match tool.placeholders() {
                    Ok(tokens) => println!("  placeholders: {}", tokens.join(", ")),
                    Err(e) => println!("  placeholders: unavailable ({})", e),
                }
            }
        }

        Command::Schemas => {
            let registry = TemplateRegistry::load(&cli.templates);
            let schemas: Vec<_> = registry.tools().map(|t| t.schema()).collect();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }

        Command::Invoke { name, args, output } => {
            let registry = TemplateRegistry::load(&cli.templates);
            let args: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&args).map_err(|e| format!("parsing --args: {}", e))?;
            let rendered = registry.invoke(&name, &args)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&rendered.filename));
            docweave::document::write_atomic(&path, &rendered.bytes)
                .map_err(|e| format!("writing '{}': {}", path.display(), e))?;
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}
