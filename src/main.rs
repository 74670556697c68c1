use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swapnet::bits::{BitSet, ReachSet};
use swapnet::network::Network;
use swapnet::search::config::DEFAULT_PROGRESS_INTERVAL;
use swapnet::search::finder::check_arity;
use swapnet::search::{
    create_search, Algorithm, ParallelConfig, Progress, ProgressHook, SearchAlgorithm,
    SearchConfig, SearchStatistics,
};
use swapnet::semantics::Target;
use swapnet::validation::{
    format_outputs, network_image, pattern_string, verify_target, Verification,
};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "swapnet")]
#[command(about = "swapnet - minimal compare-exchange network synthesis")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// CLI algorithm selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliAlgorithm {
    /// Depth-first search with a single explored-state table
    Sequential,
    /// First swaps split across worker threads
    Parallel,
}

impl From<CliAlgorithm> for Algorithm {
    fn from(cli: CliAlgorithm) -> Self {
        match cli {
            CliAlgorithm::Sequential => Algorithm::Sequential,
            CliAlgorithm::Parallel => Algorithm::Parallel,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the shortest network satisfying a target
    Find {
        /// Target: `conway`, a `B3/S23`-style rule, `conway-classic` or `evacuate-top`
        #[arg(long, default_value = "conway")]
        target: String,
        /// Number of network inputs
        #[arg(long, default_value = "8")]
        arity: usize,
        /// Largest network to consider, prefix included
        #[arg(long, default_value = "19")]
        max_swaps: usize,
        /// Swaps the network must start with, e.g. "0-4,1-5"
        #[arg(long)]
        prefix: Option<String>,

        // --- Algorithm selection ---
        /// Search algorithm to use
        #[arg(long, value_enum, default_value = "sequential")]
        algorithm: CliAlgorithm,
        /// Number of worker threads for parallel search
        #[arg(long, short = 'j')]
        cores: Option<usize>,

        // --- Common options ---
        /// Timeout in seconds for the search
        #[arg(long)]
        timeout: Option<u64>,
        /// Recursive calls between progress reports (0 disables them)
        #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
        progress_interval: u64,
        /// Abort once the explored-state table holds this many entries
        #[arg(long)]
        memo_limit: Option<usize>,
        /// List the output patterns the network can still produce
        #[arg(long)]
        show_outputs: bool,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
    /// Check a network against a target over every input
    Verify {
        /// Network to check, e.g. "0-4,1-5,2-6"
        #[arg(long)]
        network: String,
        /// Target: `conway`, a `B3/S23`-style rule, `conway-classic` or `evacuate-top`
        #[arg(long, default_value = "conway")]
        target: String,
        /// Number of network inputs
        #[arg(long, default_value = "8")]
        arity: usize,
        /// List the output patterns the network can produce
        #[arg(long)]
        show_outputs: bool,
    },
    /// Print the terminal test and the patterns a network must avoid
    Template {
        /// Target: `conway`, a `B3/S23`-style rule, `conway-classic` or `evacuate-top`
        #[arg(long, default_value = "conway")]
        target: String,
        /// Number of network inputs
        #[arg(long, default_value = "8")]
        arity: usize,
    },
}

/// Options for the search command
struct FindOptions {
    target: Target,
    arity: usize,
    cores: Option<usize>,
    show_outputs: bool,
    config: SearchConfig,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_target(name: &str, arity: usize) -> Result<Target> {
    Target::parse(name, arity).with_context(|| format!("invalid target '{}'", name))
}

fn parse_network(text: &str, what: &str, arity: usize) -> Result<Network> {
    let network: Network = text
        .parse()
        .with_context(|| format!("invalid {} '{}'", what, text))?;
    network
        .validate(arity)
        .with_context(|| format!("invalid {} for {} inputs", what, arity))?;
    Ok(network)
}

// --- Search ---

fn run_find(options: FindOptions) -> Result<ExitCode> {
    check_arity::<ReachSet>(options.arity)?;
    let template: ReachSet = options.target.violation_template();
    println!("Target: {}", options.target);
    if let Some(test) = options.target.describe_test() {
        println!("Terminal test: {}", test);
    }
    println!(
        "Forbidden outputs: {} of {}",
        template.count_ones(),
        template.len()
    );
    println!(
        "Budget: {} swaps ({} prefix, {} free)",
        options.config.max_swaps,
        options.config.prefix.len(),
        options.config.free_swaps()
    );

    println!("\nRunning {} search...", options.config.algorithm);
    let mut parallel_config = ParallelConfig::default();
    if options.config.algorithm == Algorithm::Parallel {
        let num_cores = options.cores.unwrap_or_else(num_cpus::get);
        println!("  Workers: {}", num_cores);
        parallel_config = parallel_config.with_workers(num_cores);
    }
    let progress: ProgressHook = Box::new(|progress: &Progress<'_>| {
        info!(
            iterations = progress.iterations,
            explored = progress.explored_states,
            depth = progress.depth,
            "explored {:.4}%",
            progress.percent_done
        );
    });
    let mut search = create_search(
        options.arity,
        template,
        options.config,
        parallel_config,
        Some(progress),
    )?;
    let result = search.search()?;

    print!("\n{}", result);
    print_search_statistics(&result.statistics);

    let network = match &result.network {
        Some(network) if result.success => network,
        _ => return Ok(ExitCode::from(2)),
    };

    if options.show_outputs {
        let outputs: ReachSet = network_image(network, options.arity);
        print!("\n{}", format_outputs(&outputs, options.arity));
    }

    report_verification(network, &options.target)
}

fn report_verification(network: &Network, target: &Target) -> Result<ExitCode> {
    match verify_target(network, target) {
        Verification::Verified { inputs } => {
            println!("\nVerified on all {} inputs.", inputs);
            Ok(ExitCode::SUCCESS)
        }
        Verification::Counterexample(counterexample) => {
            println!("\nCounterexample: {}", counterexample);
            Ok(ExitCode::from(1))
        }
    }
}

/// Print search statistics
fn print_search_statistics(stats: &SearchStatistics) {
    println!("\nSearch Statistics:");
    for line in stats.format_summary().lines() {
        println!("  {}", line);
    }
}

fn run_verify(network: &str, target: &str, arity: usize, show_outputs: bool) -> Result<ExitCode> {
    check_arity::<ReachSet>(arity)?;
    let target = parse_target(target, arity)?;
    let network = parse_network(network, "network", arity)?;
    println!("Network: {} ({} swaps)", network, network.len());
    println!("Target: {}", target);
    if show_outputs {
        let outputs: ReachSet = network_image(&network, arity);
        print!("\n{}", format_outputs(&outputs, arity));
    }
    report_verification(&network, &target)
}

fn run_template(target: &str, arity: usize) -> Result<ExitCode> {
    check_arity::<ReachSet>(arity)?;
    let target = parse_target(target, arity)?;
    let template: ReachSet = target.violation_template();
    println!("Target: {}", target);
    match target.describe_test() {
        Some(test) => println!("Terminal test: {}", test),
        None => println!("Terminal test: none"),
    }
    println!(
        "Forbidden outputs ({} of {}):",
        template.count_ones(),
        template.len()
    );
    for pattern in template.ones_iter() {
        println!("\t{}", pattern_string(pattern as u32, arity));
    }
    Ok(ExitCode::SUCCESS)
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Find {
            target,
            arity,
            max_swaps,
            prefix,
            algorithm,
            cores,
            timeout,
            progress_interval,
            memo_limit,
            show_outputs,
            verbose,
        } => {
            init_tracing(verbose);
            let target = parse_target(&target, arity)?;
            let prefix = match prefix.as_deref() {
                Some(text) => parse_network(text, "prefix", arity)?,
                None => Network::new(),
            };
            if prefix.len() > max_swaps {
                bail!(
                    "prefix has {} swaps but the budget is {}",
                    prefix.len(),
                    max_swaps
                );
            }
            let config = SearchConfig::default()
                .with_algorithm(algorithm.into())
                .with_max_swaps(max_swaps)
                .with_prefix(prefix)
                .with_progress_interval(progress_interval)
                .with_memo_limit_option(memo_limit)
                .with_timeout_option(timeout.map(Duration::from_secs));

            run_find(FindOptions {
                target,
                arity,
                cores,
                show_outputs,
                config,
            })
        }
        Commands::Verify {
            network,
            target,
            arity,
            show_outputs,
        } => {
            init_tracing(false);
            run_verify(&network, &target, arity, show_outputs)
        }
        Commands::Template { target, arity } => {
            init_tracing(false);
            run_template(&target, arity)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_find() {
        let args = Args::try_parse_from([
            "swapnet",
            "find",
            "--target",
            "b3/s23",
            "--max-swaps",
            "17",
            "--algorithm",
            "parallel",
            "-j",
            "2",
        ])
        .unwrap();
        match args.command {
            Commands::Find {
                max_swaps,
                algorithm,
                cores,
                arity,
                progress_interval,
                ..
            } => {
                assert_eq!(max_swaps, 17);
                assert_eq!(Algorithm::from(algorithm), Algorithm::Parallel);
                assert_eq!(cores, Some(2));
                assert_eq!(arity, 8);
                assert_eq!(progress_interval, DEFAULT_PROGRESS_INTERVAL);
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["swapnet"]).is_err());
    }

    #[test]
    fn test_parse_network_checks_arity() {
        assert!(parse_network("0-4,1-5", "prefix", 8).is_ok());
        assert_eq!(
            parse_network("0 - 4, 1 - 5", "prefix", 8).unwrap().len(),
            2
        );
        assert!(parse_network("0-9", "prefix", 8).is_err());
        assert!(parse_network("4-0", "prefix", 8).is_err());
    }

    #[test]
    fn test_report_verification() {
        let target = parse_target("conway", 8).unwrap();
        let network = Network::sorting_network_8();
        assert_eq!(
            report_verification(&network, &target).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            report_verification(&network.truncated(14), &target).unwrap(),
            ExitCode::from(1)
        );
    }
}
