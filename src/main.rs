//! # chataudit CLI
//!
//! Command-line interface for the chataudit library.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chataudit::ChatauditError;
use chataudit::cli::Args;
use chataudit::core::UrlCategory;
use chataudit::events::PipelineEvent;
use chataudit::format::{OutputFormat, write_to_format};
use chataudit::pipeline::{ConversionOutcome, Pipeline};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), ChatauditError> {
    let total_start = Instant::now();

    let config = args.pipeline_config()?;
    let output_config = args.output_config();
    let format = args.resolved_format();
    let output_path = args.resolved_output();
    let output_str = output_path.to_string_lossy().into_owned();

    // Print header
    println!("📦 chataudit v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", output_str);
    println!("📄 Format:  {}", format);
    if let Some(layout) = config.layout {
        println!("🧩 Layout:  {} (forced)", layout);
    }
    if let Some(secs) = config.gap_threshold_secs {
        println!("⏱️  Gaps:    flagged above {}s", secs);
    }
    println!();

    println!("⏳ Converting...");
    let convert_start = Instant::now();
    let outcome = Pipeline::new(config).run_file(&args.input)?;
    println!(
        "   {} records ({:.2}s)",
        outcome.report.len(),
        convert_start.elapsed().as_secs_f64()
    );

    for warning in &outcome.warnings {
        println!("⚠️  {}", warning);
    }

    let lib_format: OutputFormat = format.into();
    println!("💾 Writing {}...", lib_format);
    write_to_format(&outcome.report, &output_str, lib_format, &output_config)?;

    if let Some(events_path) = &args.events {
        write_events(&outcome.events, events_path)?;
        println!("🧾 Events:  {}", events_path.display());
    }

    println!();
    println!("✅ Done! Output saved to {}", output_str);

    print_summary(&outcome);

    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

/// Persists events as JSON Lines.
fn write_events(events: &[PipelineEvent], path: &Path) -> Result<(), ChatauditError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(outcome: &ConversionOutcome) {
    let report = &outcome.report;
    let stats = &report.stats;

    println!();
    println!("📊 Summary:");
    if let Some(layout) = report.layout {
        println!("   Layout:      {}", layout);
    }
    println!("   Extracted:   {} messages", stats.raw_messages);
    println!("   Duplicates:  {} removed", stats.duplicates_removed);
    println!("   Skipped:     {} blocks", stats.skipped_blocks);
    println!("   Final:       {} records", stats.total_messages);

    println!();
    println!("🔗 URLs:");
    println!("   Total:       {}", stats.total_urls);
    println!("   In messages: {}", stats.messages_with_urls);
    if stats.messages_with_urls > 0 {
        println!("   Average:     {:.2} per message with URLs", stats.average_urls());
    }
    for category in UrlCategory::all() {
        if let Some(count) = stats.urls_by_category.get(category) {
            println!("   {:<12} {}", format!("{}:", category), count);
        }
    }

    println!();
    println!("📎 Attachments:");
    println!("   Total:       {}", stats.total_attachments);
    println!("   In messages: {}", stats.messages_with_attachments);
    if stats.messages_with_attachments > 0 {
        println!(
            "   Average:     {:.2} per message with attachments",
            stats.average_attachments()
        );
    }

    println!();
    println!("🕒 Timing:");
    if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
        println!("   From:        {}", first.format("%Y-%m-%d %H:%M:%S"));
        println!("   To:          {}", last.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("   Drift:       {} out of order", stats.drift_flagged);
    println!("   Gaps:        {} flagged", stats.gaps_flagged);
    println!("   Untimed:     {}", stats.untimed_messages);

    let top = report.top_senders(5);
    if !top.is_empty() {
        println!();
        println!("👥 Senders: {} unique", stats.unique_senders);
        for (sender, count) in top {
            println!("   {}: {} messages", sender, count);
        }
    }
}
