//! CLI command modules

pub mod config;
pub mod optimize;
pub mod replay;
pub mod simulate;

use rso_core::Allocation;
use rso_daemon::StorageSummary;

/// Print a container table for an allocation
pub fn print_allocation(allocation: &Allocation) {
    println!("{:<6} {:>8} {:>8} {:>8}", "ID", "SIZE", "USED", "FILL");
    println!("{}", "-".repeat(33));
    for container in &allocation.containers {
        println!(
            "{:<6} {:>8} {:>8} {:>7.1}%",
            container.id,
            container.size,
            container.used,
            container.fill_ratio() * 100.0
        );
    }
}

/// Print the controller summary block
pub fn print_summary(summary: &StorageSummary) {
    println!("Used:          {} GB", summary.used);
    println!(
        "Capacity:      {} GB in {} container(s)",
        summary.capacity, summary.containers
    );
    println!("Base unit:     {} GB", summary.base_unit_size);
    println!("Utilization:   {:.1}%", summary.utilization_pct);
    println!(
        "Waste:         {} GB ({:.1}% efficient)",
        summary.waste, summary.efficiency_pct
    );
    println!("Episodes:      {}", summary.episode);
    println!("Total reward:  {:.2}", summary.total_reward);
    println!("Epsilon:       {:.4}", summary.epsilon);
    println!("States seen:   {}", summary.q_table_size);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
