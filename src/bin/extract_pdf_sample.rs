//! CLI tool that prints the start of the source PDF next to the first dataset record

use hadith_verify::{
    extract_sample, load_records, RecordPreview, DEFAULT_PDF_PATH, DEFAULT_RECORDS_PATH,
};
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() > 3 || args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [pdf_file] [hadiths.json]", args[0]);
        eprintln!();
        eprintln!("Extracts pages up to the first hadith and shows the first JSON record.");
        eprintln!("Defaults: {} and {}", DEFAULT_PDF_PATH, DEFAULT_RECORDS_PATH);
        process::exit(2);
    }

    let pdf_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_PDF_PATH);
    let json_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_RECORDS_PATH);

    println!("Attempting to extract sample text from PDF...");
    let pdf_text = match extract_sample(pdf_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error extracting PDF: {}", e);
            process::exit(1);
        }
    };

    println!("PDF Text Sample:");
    println!("{}", "=".repeat(50));
    println!("{}", pdf_text);
    println!("{}", "=".repeat(50));

    println!();
    println!("Existing JSON First Hadith:");
    match load_records(json_path) {
        Ok(records) => match records.first() {
            Some(first) => println!("{}", RecordPreview::from_record(first)),
            None => println!("None"),
        },
        Err(e) => println!("Error loading JSON: {}", e),
    }
}
