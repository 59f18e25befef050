// FILE: src/cli/handlers.rs
use crate::{
    cli::{EnhancedCli, OutputFormat},
    flatten_text, CompilationStats, CompilerError, OutputNode, Result, StyleParser,
};

use clap::ArgMatches;
use std::fs;
use std::path::Path;

fn required_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| CompilerError::InvalidFormat {
            message: format!("Missing required argument '{}'", name),
        })
}

// --- COMPILE ---
pub fn handle_compile_command(cli: &EnhancedCli, matches: &ArgMatches) -> Result<()> {
    let input_path = required_arg(matches, "input")?;
    let output_path = matches.get_one::<String>("output");
    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Text);

    let unit = cli.build_unit(input_path, matches)?;
    let options = cli.build_compiler_options(matches)?;
    log::info!("Compiling {} as .{}", input_path, unit.component_class);

    let (nodes, stats) = StyleParser::new(unit, options).parse_with_stats()?;
    let rendered = render(&nodes, format)?;

    match output_path {
        Some(output_file) => {
            fs::write(output_file, rendered)?;
            println!("✅ Compiled {} -> {}", input_path, output_file);
            println!("   Nodes: {}", nodes.len());
            println!("   Time: {}ms", cli.elapsed_ms());
        }
        None => println!("{}", rendered),
    }

    if matches.get_flag("stats") {
        print_detailed_stats(&stats);
    }

    Ok(())
}

fn render(nodes: &[OutputNode], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(flatten_text(nodes)),
        OutputFormat::Json => serde_json::to_string_pretty(nodes).map_err(|e| {
            CompilerError::Serialization {
                message: format!("JSON serialization error: {}", e),
            }
        }),
    }
}

fn print_detailed_stats(stats: &CompilationStats) {
    eprintln!("\n📊 Compilation Statistics:");
    eprintln!("   Source size: {} bytes", stats.source_size);
    eprintln!("   Rules visited: {}", stats.rules_visited);
    eprintln!("   Text nodes: {}", stats.text_nodes);
    eprintln!("   Structural nodes: {}", stats.structural_nodes);
    eprintln!("   Conditional groups: {}", stats.conditional_groups);
    eprintln!("   Issues: {}", stats.issues);
    eprintln!("   Compile time: {}ms", stats.compile_time_ms);
}

// --- CHECK ---
pub fn handle_check_command(cli: &EnhancedCli, matches: &ArgMatches) -> Result<()> {
    let input_path = required_arg(matches, "input")?;
    let recursive = matches.get_flag("recursive");

    if recursive && Path::new(input_path).is_dir() {
        check_directory_recursive(cli, input_path, matches)
    } else {
        check_single_file(cli, input_path, matches)
    }
}

fn check_single_file(cli: &EnhancedCli, input_path: &str, matches: &ArgMatches) -> Result<()> {
    println!("🔍 Checking {}", input_path);
    let unit = cli.build_unit(input_path, matches)?;
    let options = cli.build_compiler_options(matches)?;

    match StyleParser::new(unit, options).parse() {
        Ok(_) => {
            println!("✅ {} - No issues found", input_path);
            Ok(())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path, e);
            Err(e)
        }
    }
}

fn check_directory_recursive(cli: &EnhancedCli, dir_path: &str, matches: &ArgMatches) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;

    for entry in walkdir::WalkDir::new(dir_path).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            CompilerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        if !entry.file_type().is_file() || entry.path().extension().map_or(true, |ext| ext != "css") {
            continue;
        }
        let Some(path) = entry.path().to_str() else {
            log::warn!("Skipping non UTF-8 path {}", entry.path().display());
            continue;
        };

        total_files += 1;
        if check_single_file(cli, path, matches).is_err() {
            error_files += 1;
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    if total_files > 0 {
        println!(
            "   Success rate: {:.1}%",
            (total_files - error_files) as f64 / total_files as f64 * 100.0
        );
    }

    if error_files > 0 {
        Err(CompilerError::CheckFailed {
            failed: error_files,
            total: total_files,
        })
    } else {
        Ok(())
    }
}
