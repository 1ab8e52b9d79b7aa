use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::config::GraphConfig;
use crate::graph::GraphEngine;
use crate::protocol::InboundMessage;
use crate::scene::{Color, SvgSurface};

const MIN_WIDTH: f32 = 320.0;
const BACKGROUND: Color = Color::rgb8(0x0D, 0x0D, 0x0D);

#[derive(Parser, Debug)]
#[command(
    name = "lanegraph",
    version,
    about = "Headless commit graph renderer (lane layout to SVG)"
)]
pub struct Args {
    /// Graph messages as JSON: one message object or an array, '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output SVG file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Geometry config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport height in pixels
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Scroll the viewport down by this many pixels before rendering
    #[arg(short = 's', long = "scroll", default_value_t = 0.0)]
    pub scroll: f32,

    /// Center this commit in the viewport before rendering
    #[arg(long = "center")]
    pub center: Option<String>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => GraphConfig::from_file(path)?,
        None => GraphConfig::default(),
    };

    let input = read_input(args.input.as_deref())?;
    let messages = parse_messages(&input)?;

    let mut engine = GraphEngine::new(config);
    engine.resize(args.height);
    for message in messages {
        apply_message(&mut engine, message);
    }

    if args.scroll != 0.0 {
        engine.on_scroll(args.scroll);
    }
    if let Some(sha) = args.center.as_deref() {
        if !engine.scroll_to_commit(sha) {
            anyhow::bail!("Commit {sha} is not in the graph");
        }
    }

    let (content_width, _) = engine.content_size();
    let mut surface = SvgSurface::new(content_width.max(MIN_WIDTH), args.height)
        .with_background(BACKGROUND)
        .with_view_offset(engine.scroll_offset());
    engine.render(&mut surface);
    write_output(&surface.document(), args.output.as_deref())
}

fn apply_message(engine: &mut GraphEngine, message: InboundMessage) {
    match message {
        InboundMessage::FullGraph(batch) => {
            engine.layout_full(&batch.commits, &batch.labels);
        }
        InboundMessage::IncrementalGraph(batch) => {
            engine.layout_incremental_remove(&batch.deleted_shas);
            engine.layout_incremental_add(&batch.added_commits);
        }
        InboundMessage::CommitDetail(detail) => {
            debug!("No detail pane in one-shot mode, dropping detail for {}", detail.sha);
        }
    }
}

fn parse_messages(input: &str) -> Result<Vec<InboundMessage>> {
    if input.trim_start().starts_with('[') {
        serde_json::from_str(input).context("Failed to parse message array")
    } else {
        let message = serde_json::from_str(input).context("Failed to parse message")?;
        Ok(vec![message])
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(document: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, document)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => io::stdout()
            .write_all(document.as_bytes())
            .context("Failed to write stdout"),
    }
}
