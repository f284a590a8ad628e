//! CLI tool for checking the structure and completeness of the hadith dataset

use hadith_verify::{load_records, verify, CountClass, ValidationReport, DEFAULT_RECORDS_PATH};
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [hadiths.json] [--json]", args[0]);
        eprintln!();
        eprintln!("Checks every record for required fields, Arabic script and text length,");
        eprintln!("then reports the record count and numbering. Exits 1 on any issue.");
        eprintln!("Default dataset: {}", DEFAULT_RECORDS_PATH);
        process::exit(2);
    }

    let json_output = args.iter().skip(1).any(|a| a == "--json");
    let json_path = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_RECORDS_PATH);

    if !json_output {
        println!("Loading existing hadith data...");
    }

    let records = match load_records(json_path) {
        Ok(records) => records,
        Err(e) => {
            if json_output {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    };

    let report = verify(&records);

    if json_output {
        match serde_json::to_string_pretty(&report.summary()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }

    process::exit(if report.passed() { 0 } else { 1 });
}

fn print_report(report: &ValidationReport) {
    println!("Found {} hadiths in the JSON file", report.record_count);

    println!();
    println!("Verifying hadith structure...");
    if report.issues.is_empty() {
        println!("✓ All hadiths appear to have proper structure and content");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
    }

    match report.count {
        CountClass::Expected42 => println!("✓ Found expected 42 hadiths (40 main + 2 additional)"),
        CountClass::Expected40 => println!("Found 40 hadiths (missing 2 commonly appended hadiths)"),
        CountClass::Unexpected(n) => {
            println!("⚠ Unexpected number of hadiths: {} (expected 40 or 42)", n)
        }
    }

    let numbering = &report.numbering;
    if numbering.is_ok() && numbering.sequential {
        println!("✓ Hadith numbering is sequential and correct");
        return;
    }

    if numbering.is_ok() {
        println!("⚠ Hadith numbers are complete but out of order");
        return;
    }

    println!("⚠ Hadith numbering issues detected");
    if !numbering.missing.is_empty() {
        println!("  Missing numbers: {:?}", numbering.missing);
    }
    if !numbering.unexpected.is_empty() {
        println!("  Unexpected numbers: {:?}", numbering.unexpected);
    }
    if !numbering.repeated.is_empty() {
        println!("  Repeated numbers: {:?}", numbering.repeated);
    }
    if !numbering.non_integer.is_empty() {
        println!(
            "  Records without an integer number (positions): {:?}",
            numbering.non_integer
        );
    }
}
