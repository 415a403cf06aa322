//! pcbgraph CLI - build, inspect and lay out PCB component knowledge graphs.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pcbgraph::graph::BuildResult;
use pcbgraph::taxonomy::{Classified, MatchOutcome};
use pcbgraph::{
    GraphFormat, GraphStatistics, Layout, LayoutAlgorithm, NodeKind, PcbGraphCore, RelationKind,
    RunOptions, RunResult,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pcbgraph")]
#[command(about = "PCB component knowledge graph builder", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); also shows details where supported
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the knowledge graph, lay it out and export it
    Build {
        /// Vayo JSON export or flat JSON array of component records
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory for exports and reports
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// JSON configuration file
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Layout algorithm
        #[arg(short, long, value_enum, default_value = "hierarchical")]
        layout: LayoutChoice,

        /// Seed for the spring layout (overrides the configuration)
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Graph formats to write, comma separated (defaults to the configured list)
        #[arg(long = "graph-format", value_enum, value_delimiter = ',', value_name = "FORMAT")]
        graph_formats: Vec<GraphFormatChoice>,

        /// Do not write any files
        #[arg(long)]
        no_export: bool,
    },

    /// Print graph statistics without writing files
    Stats {
        /// Vayo JSON export or flat JSON array of component records
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// JSON configuration file
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Number of entries in each top list
        #[arg(long)]
        top: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Classify a single component's package, function and physical descriptors
    Classify {
        /// Raw package string
        #[arg(long)]
        package: String,

        /// Raw function descriptor
        #[arg(long, default_value = "")]
        function: String,

        /// Raw physical descriptor (derived from the package when omitted)
        #[arg(long, default_value = "")]
        physical: String,

        /// JSON configuration file
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the effective taxonomy tables
    Taxonomy {
        /// JSON configuration file
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutChoice {
    Hierarchical,
    Spring,
    Radial,
}

impl From<LayoutChoice> for LayoutAlgorithm {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Hierarchical => LayoutAlgorithm::Hierarchical,
            LayoutChoice::Spring => LayoutAlgorithm::Spring,
            LayoutChoice::Radial => LayoutAlgorithm::Radial,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphFormatChoice {
    Graphml,
    Gml,
    Gexf,
}

impl From<GraphFormatChoice> for GraphFormat {
    fn from(choice: GraphFormatChoice) -> Self {
        match choice {
            GraphFormatChoice::Graphml => GraphFormat::GraphMl,
            GraphFormatChoice::Gml => GraphFormat::Gml,
            GraphFormatChoice::Gexf => GraphFormat::Gexf,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Build {
            input,
            output,
            config,
            layout,
            seed,
            format,
            graph_formats,
            no_export,
        } => {
            let options = RunOptions {
                layout: Some(layout.into()),
                seed,
                output_dir: (!no_export).then_some(output),
                graph_formats: (!graph_formats.is_empty())
                    .then(|| graph_formats.into_iter().map(GraphFormat::from).collect()),
            };
            handle_build(&input, config.as_deref(), &options, format)
        }
        Commands::Stats {
            input,
            config,
            top,
            format,
        } => handle_stats(&input, config.as_deref(), top, format),
        Commands::Classify {
            package,
            function,
            physical,
            config,
        } => handle_classify(&package, &function, &physical, config.as_deref()),
        Commands::Taxonomy { config } => handle_taxonomy(config.as_deref(), cli.verbose > 0),
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_core(config: Option<&Path>) -> Result<PcbGraphCore, i32> {
    PcbGraphCore::from_config_file(config).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn handle_build(
    input: &Path,
    config: Option<&Path>,
    options: &RunOptions,
    format: OutputFormat,
) -> i32 {
    let core = match load_core(config) {
        Ok(core) => core,
        Err(code) => return code,
    };

    tracing::debug!("Building graph from {}", input.display());
    match core.run(input, options) {
        Ok(result) => {
            let top_n = core.config().export.top_n;
            match format {
                OutputFormat::Human => output_build_human(&result, top_n),
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "input": result.input.display().to_string(),
                        "statistics": result.build.statistics,
                        "diagnostics": result.build.diagnostics,
                        "layout": result.layout.as_ref().map(layout_summary),
                        "exported": result.exported,
                    });
                    return print_json(&value);
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_stats(
    input: &Path,
    config: Option<&Path>,
    top: Option<usize>,
    format: OutputFormat,
) -> i32 {
    let core = match load_core(config) {
        Ok(core) => core,
        Err(code) => return code,
    };
    let top_n = top.unwrap_or(core.config().export.top_n);

    let records = match PcbGraphCore::load_records(input) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let build = core.build(&records);
    tracing::debug!("{} diagnostics", build.diagnostics.len());

    match format {
        OutputFormat::Human => {
            println!("\nFile: {}", input.display());
            println!("{}", "─".repeat(60));
            output_statistics(&build.statistics, top_n);
            output_diagnostics(&build);
            0
        }
        OutputFormat::Json => {
            let top: serde_json::Map<String, serde_json::Value> = NodeKind::CATEGORIES
                .iter()
                .map(|kind| {
                    (
                        kind.as_str().to_string(),
                        serde_json::json!(build.statistics.top(*kind, top_n)),
                    )
                })
                .collect();
            print_json(&serde_json::json!({
                "statistics": build.statistics,
                "top": top,
                "diagnostics": build.diagnostics,
            }))
        }
    }
}

fn handle_classify(package: &str, function: &str, physical: &str, config: Option<&Path>) -> i32 {
    let core = match load_core(config) {
        Ok(core) => core,
        Err(code) => return code,
    };
    let c = core.classifier().classify(package, function, physical);

    println!("Package:  {}", describe(&c.package));
    match &c.function {
        Some(f) => println!("Function: {}", describe(f)),
        None => println!("Function: (omitted, no rule matched)"),
    }
    println!("Physical: {}", describe(&c.physical));
    0
}

fn handle_taxonomy(config: Option<&Path>, verbose: bool) -> i32 {
    let core = match load_core(config) {
        Ok(core) => core,
        Err(code) => return code,
    };
    let taxonomy = core.classifier().config();

    println!("Package patterns (first match wins):\n");
    for p in &taxonomy.package_patterns {
        print_rule(&p.label, &p.patterns, verbose);
    }
    println!("\nFunction rules (first match wins):\n");
    for r in &taxonomy.function_rules {
        print_rule(&r.label, &r.keywords, verbose);
    }
    println!("\nPhysical form rules:\n");
    for r in &taxonomy.physical_rules {
        print_rule(&r.label, &r.keywords, verbose);
    }
    println!("\nSentinels:");
    println!("  Empty package:       {}", taxonomy.unknown_package);
    println!("  Unmatched function:  {}", taxonomy.unclassified_function);
    println!("  Unmatched physical:  {}", taxonomy.other_physical);
    0
}

fn print_rule(label: &str, needles: &[String], verbose: bool) {
    if verbose {
        println!("  {:<14} {}", label, needles.join(", "));
    } else {
        println!("  {}", label);
    }
}

fn describe(c: &Classified) -> String {
    let how = match c.outcome {
        MatchOutcome::Matched => "matched",
        MatchOutcome::Verbatim => "verbatim",
        MatchOutcome::Sentinel => "sentinel",
    };
    format!("{} ({})", c.label, how)
}

fn output_build_human(result: &RunResult, top_n: usize) {
    println!("\nFile: {}", result.input.display());
    println!("{}", "─".repeat(60));
    output_statistics(&result.build.statistics, top_n);
    output_diagnostics(&result.build);

    if let Some(layout) = &result.layout {
        println!("\n  Layout: {}", layout.algorithm);
        println!("    Nodes placed: {}", layout.len());
        if let Some(iterations) = layout.iterations {
            println!(
                "    Iterations:   {}{}",
                iterations,
                if layout.converged { "" } else { " (budget reached)" }
            );
        }
    }

    if !result.exported.is_empty() {
        println!("\n  Exported:");
        for path in result.exported.values() {
            println!("    {}", path.display());
        }
    }
}

fn output_statistics(stats: &GraphStatistics, top_n: usize) {
    println!("\n  Graph:");
    println!("    Nodes: {}", stats.total_nodes);
    println!("    Edges: {}", stats.total_edges);
    for kind in NodeKind::ALL {
        println!("    {:<14} {}", format!("{}:", kind), stats.node_count(kind));
    }
    for relation in RelationKind::ALL {
        println!(
            "    {:<16} {}",
            format!("{}:", relation),
            stats.relation_count(relation)
        );
    }
    println!("    Density: {:.4}", stats.network.density);

    println!("\n  Records:");
    println!("    Read:               {}", stats.total_records);
    println!("    Malformed:          {}", stats.rejected_malformed);
    println!("    Duplicate ids:      {}", stats.rejected_duplicate);
    println!("    Unclassified:       {}", stats.unclassified);

    for kind in NodeKind::CATEGORIES {
        let top = stats.top(kind, top_n);
        if top.is_empty() {
            continue;
        }
        println!("\n  Top {}:", kind);
        for (label, count) in top {
            println!("    {:<20} {}", label, count);
        }
    }
}

fn output_diagnostics(build: &BuildResult) {
    if build.diagnostics.is_empty() {
        return;
    }
    println!("\n  Diagnostics:");
    for diagnostic in &build.diagnostics {
        println!("    - {}", diagnostic);
    }
}

fn layout_summary(layout: &Layout) -> serde_json::Value {
    serde_json::json!({
        "algorithm": layout.algorithm,
        "nodes": layout.len(),
        "iterations": layout.iterations,
        "converged": layout.converged,
    })
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
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
