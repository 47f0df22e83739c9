//! Allocator inspection command

use anyhow::Result;
use clap::Args;

use rso_core::util::clamp_base_unit_size;
use rso_core::{Allocator, DEFAULT_BASE_UNIT_SIZE, MAX_USAGE_GB};

use super::{print_allocation, print_json};

#[derive(Args)]
pub struct OptimizeArgs {
    /// Used storage in GB
    #[arg(value_parser = clap::value_parser!(u64).range(0..=MAX_USAGE_GB))]
    pub used: u64,

    /// Idle container size in GB (clamped to 10..=100)
    #[arg(short, long, default_value_t = DEFAULT_BASE_UNIT_SIZE)]
    pub base: u64,
}

pub async fn run(args: OptimizeArgs, json: bool) -> Result<()> {
    let allocator = Allocator::default();
    let allocation = allocator.optimize(args.used, args.base);

    if json {
        return print_json(&allocation);
    }

    let base = clamp_base_unit_size(args.base);
    if base != args.base {
        println!("Base unit clamped to {base} GB");
    }
    println!(
        "Used {} GB -> capacity {} GB ({} required with buffer)\n",
        args.used,
        allocation.total,
        allocator.required(args.used)
    );
    print_allocation(&allocation);
    println!(
        "\nUtilization {:.1}%, waste {} GB",
        allocation.utilization() * 100.0,
        allocation.waste()
    );

    Ok(())
}
