use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xmlconf::{Backend, Config, Container, Scalar, Value, XmlBackend, DEFAULT_PREFIX};

#[derive(Debug, Parser)]
#[command(
    name = "xmlconf",
    version,
    about = "Convert XML configuration to and from generic containers"
)]
struct Args {
    /// Prefix of the reserved attrs/text/children keys
    #[arg(short, long, global = true, default_value = DEFAULT_PREFIX)]
    prefix: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read XML and print the container as JSON
    Load {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Read a JSON container and write it as XML
    Dump {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Read XML and write it back through the container representation
    Roundtrip {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let backend = XmlBackend::with_config(Config::with_prefix(args.prefix));

    match args.command {
        Command::Load { input, output } => {
            let data = load_xml(&backend, input.as_deref())?;
            let mut json =
                serde_json::to_string_pretty(&data).context("failed to render container")?;
            json.push('\n');
            write_output(output.as_deref(), json.as_bytes())
        }
        Command::Dump { input, output } => {
            let raw = read_input(input.as_deref())?;
            let json: serde_json::Value =
                serde_json::from_slice(&raw).context("input is not valid JSON")?;
            let Value::Mapping(data) = json_to_value(json) else {
                bail!("JSON input must be an object");
            };
            dump_xml(&backend, &data, output.as_deref())
        }
        Command::Roundtrip { input, output } => {
            let data = load_xml(&backend, input.as_deref())?;
            dump_xml(&backend, &data, output.as_deref())
        }
    }
}

fn load_xml(backend: &XmlBackend, input: Option<&Path>) -> Result<Container> {
    let raw = read_input(input)?;
    backend
        .loads(&raw)
        .with_context(|| format!("failed to parse xml from {}", describe(input)))
}

/// The file is only touched once serialization has succeeded
fn dump_xml(backend: &XmlBackend, data: &Container, output: Option<&Path>) -> Result<()> {
    let bytes = backend.dumps(data).context("failed to serialize xml")?;
    write_output(output, &bytes)
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "stdin".to_string(), |path| path.display().to_string())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut source: Box<dyn Read> = match path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let mut buffer = Vec::new();
    source
        .read_to_end(&mut buffer)
        .with_context(|| format!("failed to read {}", describe(path)))?;
    if buffer.iter().all(u8::is_ascii_whitespace) {
        bail!("no input provided on {}", describe(path));
    }
    debug!(bytes = buffer.len(), source = %describe(path), "read input");
    Ok(buffer)
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    let mut sink: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    sink.write_all(data)
        .and_then(|()| sink.flush())
        .with_context(|| format!("failed to write {}", describe(path)))
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Scalar(Scalar::Null),
        serde_json::Value::Bool(b) => b.into(),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::from)
            .or_else(|| n.as_u64().map(Value::from))
            .or_else(|| n.as_f64().map(Value::from))
            .unwrap_or_default(),
        serde_json::Value::String(s) => s.into(),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| (key, json_to_value(value)))
                .collect(),
        ),
    }
}
