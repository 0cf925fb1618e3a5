//! Build command
//!
//! Compile the extension module and publish it to the parent directory

use super::load_config;
use crate::BuildArgs;
use anyhow::{Context, Result};
use xhep_build::{BuildConfig, BuildReport, ExtensionBuilder};

/// Apply the command-line library switches on top of the loaded config.
fn apply_overrides(config: &mut BuildConfig, args: &BuildArgs) -> Result<()> {
    for name in &args.enable {
        config.enable(name)?;
    }
    for name in &args.disable {
        config.disable(name)?;
    }
    if args.no_clean {
        config.clean_before_build = false;
    }
    Ok(())
}

/// Build (or, with `--dry-run`, describe) the extension module
pub(crate) fn run(args: &BuildArgs) -> Result<()> {
    let mut config = load_config(&args.project)?;
    apply_overrides(&mut config, args)?;

    let builder = ExtensionBuilder::native(&config, args.verbose);

    if args.dry_run {
        return dry_run(&builder, &config);
    }

    if !args.quiet {
        println!("Building {} {}", config.package_name, config.version);
    }

    let report = builder
        .build(&config)
        .with_context(|| format!("Failed to build extension module {}", config.module_name))?;

    if args.verbose && !report.output.trim().is_empty() {
        println!("{}", report.output.trim_end());
    }

    if !args.quiet {
        print_summary(&report);
    }

    Ok(())
}

fn dry_run(builder: &ExtensionBuilder, config: &BuildConfig) -> Result<()> {
    let target = builder
        .configure(config)
        .context("Failed to configure extension module")?;
    let layout = builder.layout(config);

    if config.clean_before_build {
        println!("Would remove {}", layout.build_dir.display());
    }
    for invocation in builder.toolchain().plan(&target, &layout) {
        println!("{invocation}");
    }
    println!(
        "Would copy {} to {}",
        layout.artifact.display(),
        config.publish_path().display()
    );

    Ok(())
}

fn print_summary(report: &BuildReport) {
    if report.up_to_date {
        println!("{} is up to date", report.module_name);
    }

    if !report.linked_libraries.is_empty() {
        println!("  Linked: {}", report.linked_libraries.join(", "));
    }

    println!("  Published {}", report.artifact().display());

    println!(
        "Built {} from {} source(s) in {:.2}s",
        report.module_name,
        report.source_count,
        report.duration.as_secs_f64()
    );
}
