//! CLI tool that extracts the whole source PDF, segments it into candidate
//! hadith sections and compares the section count with the dataset

use hadith_verify::compare::{write_text_dump, SECTION_PREVIEW_CHARS};
use hadith_verify::sections::{write_sections_dump, DEFAULT_DUMP_LIMIT};
use hadith_verify::{
    extract_full, find_sections, load_records, preview, Comparison, Error, DEFAULT_PDF_PATH,
    DEFAULT_RECORDS_PATH, FULL_TEXT_DUMP_PATH, SECTIONS_DUMP_PATH,
};
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() > 3 || args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [pdf_file] [hadiths.json]", args[0]);
        eprintln!();
        eprintln!("Writes {} and {},", FULL_TEXT_DUMP_PATH, SECTIONS_DUMP_PATH);
        eprintln!("then compares the number of PDF sections with the JSON records.");
        process::exit(2);
    }

    let pdf_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_PDF_PATH);
    let json_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_RECORDS_PATH);

    if let Err(e) = run(pdf_path, json_path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(pdf_path: &str, json_path: &str) -> Result<(), Error> {
    println!("Extracting all content from PDF...");
    let extraction = extract_full(pdf_path)?;
    println!("PDF has {} pages", extraction.page_count);

    let pdf_text = extraction.text();
    write_text_dump(FULL_TEXT_DUMP_PATH, &pdf_text).map_err(|source| Error::Dump {
        path: FULL_TEXT_DUMP_PATH.to_string(),
        source,
    })?;
    println!("Full PDF text saved to {}", FULL_TEXT_DUMP_PATH);

    println!("Finding hadith sections...");
    let sections = find_sections(&pdf_text);
    println!("Found {} potential hadith sections", sections.len());

    write_sections_dump(SECTIONS_DUMP_PATH, &sections, DEFAULT_DUMP_LIMIT).map_err(|source| {
        Error::Dump {
            path: SECTIONS_DUMP_PATH.to_string(),
            source,
        }
    })?;
    println!("Hadith sections saved to {}", SECTIONS_DUMP_PATH);

    println!("Loading existing JSON data...");
    // A missing dataset still lets the PDF side of the comparison run
    let json_count = match load_records(json_path) {
        Ok(records) => records.len(),
        Err(e) => {
            log::error!("Error loading JSON: {}", e);
            0
        }
    };
    println!("JSON contains {} hadiths", json_count);

    println!();
    let comparison = Comparison::new(sections.len(), json_count);
    println!("{}", comparison);
    if comparison.matches() {
        println!("✓ Section count matches the JSON data");
    } else {
        println!("⚠ Section count differs from the JSON data");
    }

    if let Some(first) = sections.first() {
        println!();
        println!("First PDF section preview:");
        println!("{}", preview(&first.text, SECTION_PREVIEW_CHARS));
    }

    Ok(())
}
