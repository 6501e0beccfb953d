//! hostrt - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hostrt::runtime::natives;
use hostrt::util::{config, logger};
use hostrt::{HeapEngine, MemoryStats, RuntimeHandle, NAME, VERSION};
use std::path::PathBuf;

/// Inspect and control the process runtime
#[derive(Parser, Debug)]
#[command(name = "hostrt")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $HOSTRT_CONFIG or ./hostrt.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print managed memory statistics
    Stats,

    /// Request a collection pass and show its effect
    Gc {
        /// Allocate and retire this many scopes of garbage first
        #[arg(long, default_value_t = 0)]
        churn: usize,

        /// Bytes allocated per churn scope
        #[arg(long, default_value_t = 16 * 1024)]
        scope_size: usize,
    },

    /// List runtime natives
    Natives,

    /// Terminate the process with a status code
    Exit {
        /// Exit status
        #[arg(value_name = "CODE", allow_negative_numbers = true)]
        code: i32,
    },

    /// Print version information
    Version,
}

fn print_stats(
    label: &str,
    stats: MemoryStats,
) {
    println!(
        "{:<8} total={} free={} used={}",
        label,
        stats.total,
        stats.free,
        stats.used()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load_config(args.config.as_deref()).context("Failed to load config")?;
    let level = if args.verbose {
        logger::LogLevel::Debug
    } else {
        config.log_level()?
    };
    logger::init_with_level(level);

    let engine = HeapEngine::try_new(config.gc.clone()).with_context(|| {
        format!(
            "Failed to reserve initial heap of {} bytes",
            config.gc.initial_heap_size.min(config.gc.max_heap_size)
        )
    })?;
    let engine: &'static HeapEngine = Box::leak(Box::new(engine));
    let runtime = RuntimeHandle::install(engine).context("Failed to install engine")?;

    match args.command {
        Commands::Stats => {
            print_stats("memory", runtime.memory_stats());
        }
        Commands::Gc { churn, scope_size } => {
            for _ in 0..churn {
                engine
                    .alloc(scope_size)
                    .with_context(|| format!("Failed to allocate {} bytes", scope_size))?;
                engine.retire_scope();
            }
            print_stats("before", runtime.memory_stats());
            runtime.request_collection();
            print_stats("after", runtime.memory_stats());
            engine.with_gc(|gc| {
                println!(
                    "collections={} reclaimed={} last_pause={:?}",
                    gc.collections(),
                    gc.reclaimed_bytes(),
                    gc.last_pause()
                );
            });
        }
        Commands::Natives => {
            for decl in natives::native_declarations() {
                println!("{:<28} {}", decl.native_name, decl.signature);
            }
        }
        Commands::Exit { code } => {
            runtime.terminate(code);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
