use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run(filter: Option<&str>) -> Result<()> {
    println!();
    println!("{}", "⏱  Running benchmarks...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.args(["bench", "-p", "drawbuffer", "--bench", "raster"]);
    if let Some(filter) = filter {
        cmd.args(["--", filter]);
    }

    // Criterion's progress output goes straight to the terminal.
    let status = cmd.status().context("Failed to run cargo bench")?;
    if !status.success() {
        eprintln!("{}", "✗ Benchmarks failed".red().bold());
        anyhow::bail!("Benchmarks failed");
    }

    println!();
    println!(
        "{}",
        format!(
            "✓ Benchmarks finished in {:.2}s",
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!(
        "   {}",
        "HTML reports: target/criterion/report/index.html".dimmed()
    );
    println!();

    Ok(())
}
