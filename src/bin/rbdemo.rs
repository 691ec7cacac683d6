//! Inserts a sequence of keys into a red-black tree, reporting each step.

use clap::Parser;
use log::{info, LevelFilter};
use redblack::RbTree;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

const DEFAULT_KEYS: [i64; 7] = [10, 20, 30, 15, 25, 5, 1];

#[derive(clap::Parser)]
struct Args {
    /// Keys to insert, in order
    #[arg(allow_negative_numbers = true, default_values_t = DEFAULT_KEYS)]
    keys: Vec<i64>,
    /// Log level for the tree's rotation and fixup tracing
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
    /// Print the structure of the finished tree
    #[arg(long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to install logger: {err}");
    }

    let mut tree = RbTree::new();
    for &key in &args.keys {
        println!("Inserting {key}...");
        tree.insert(key);
    }
    println!("Insertions complete! ({} nodes)", tree.len());
    info!("inserted {} keys", args.keys.len());

    if args.dump {
        println!("{tree:#?}");
    }
}
