use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// One rustdoc build of the library under a feature set.
struct DocBuild {
    label: &'static str,
    features: &'static [&'static str],
}

/// Feature sets whose docs must build without warnings. The last entry is
/// the one left in `target/doc` and opened with `--open`.
const FEATURE_SETS: &[DocBuild] = &[
    DocBuild {
        label: "no_std + alloc",
        features: &["--no-default-features"],
    },
    DocBuild {
        label: "std + serde",
        features: &["--features", "drawbuffer/serde"],
    },
];

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Documenting drawbuffer...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Examples in docs are compiled and run before any HTML is produced.
    cargo(
        "doctests",
        Command::new("cargo").args([
            "test",
            "--doc",
            "-p",
            "drawbuffer",
            "-p",
            "drawbuffer-testing",
            "--features",
            "drawbuffer/serde",
        ]),
    )?;

    let last = FEATURE_SETS.len().saturating_sub(1);
    for (i, build) in FEATURE_SETS.iter().enumerate() {
        let mut cmd = Command::new("cargo");
        cmd.env("RUSTDOCFLAGS", "-D warnings")
            .args(["doc", "--no-deps", "-p", "drawbuffer"])
            .args(build.features);
        if i == last {
            cmd.args(["-p", "drawbuffer-testing"]);
            if open {
                cmd.arg("--open");
            }
        }
        cargo(&format!("rustdoc ({})", build.label), &mut cmd)?;
    }

    println!(
        "{}",
        format!(
            "✓ Documentation done in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    if !open {
        println!(
            "   {}",
            "target/doc/drawbuffer/index.html (or pass --open)".dimmed()
        );
    }
    println!();

    Ok(())
}

fn cargo(label: &str, cmd: &mut Command) -> Result<()> {
    println!("{}", format!("  Running {label}...").cyan());
    let start = Instant::now();

    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {label}"))?;

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {label} failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} failed");
    }

    println!(
        "{}",
        format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    Ok(())
}
