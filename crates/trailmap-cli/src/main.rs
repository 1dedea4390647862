use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trailmap_core::LayoutDirection;
use trailmap_graph::{LayoutStrategy, LayoutStrategyKind};
use trailmap_cli::{LayoutJob, read_config, run_query};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out one graph file
    Layout {
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the result; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Lay out several graph files in parallel
    Batch {
        inputs: Vec<PathBuf>,

        #[arg(long)]
        out_dir: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Run a query against a code graph file
    Query {
        #[arg(short, long)]
        graph: PathBuf,

        query: String,
    },
}

#[derive(ClapArgs, Debug)]
struct LayoutArgs {
    /// JSON file with layout settings; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = LayoutStrategyKind::Bucket)]
    strategy: LayoutStrategyKind,

    /// Flow direction of the trail strategy
    #[arg(short, long, value_enum, default_value_t = LayoutDirection::LeftRight)]
    direction: LayoutDirection,

    /// Resolve overlap after the layout
    #[arg(short, long)]
    postprocess: bool,
}

impl LayoutArgs {
    fn strategy(&self) -> LayoutStrategy {
        self.strategy.with_direction(self.direction)
    }

    fn job(&self) -> Result<LayoutJob> {
        Ok(LayoutJob {
            config: read_config(self.config.as_deref())?,
            strategy: self.strategy(),
            postprocess: self.postprocess,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Layout {
            input,
            output,
            layout,
        } => {
            let result = layout.job()?.run_file(&input, output.as_deref())?;
            tracing::info!(
                "Laid out {} nodes, bounding size {}x{}",
                result.nodes.len(),
                result.bounding_size.x,
                result.bounding_size.y
            );
            if output.is_none() {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Batch {
            inputs,
            out_dir,
            layout,
        } => {
            let written = layout.job()?.run_batch(&inputs, &out_dir)?;
            println!("Wrote {} layouts to {}", written.len(), out_dir.display());
        }
        Command::Query { graph, query } => {
            let result = run_query(&graph, &query)?;
            if !result.valid {
                tracing::warn!("Query '{}' is invalid", query);
            }
            print!("{}", result.tree);
            println!("{}", serde_json::to_string_pretty(&result.result)?);
        }
    }

    Ok(())
}
