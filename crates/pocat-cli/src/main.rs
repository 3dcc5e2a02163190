#![forbid(unsafe_code)]

//! pocat binary entry point: catalog validation, message resolution,
//! coverage reporting, and normalization.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use pocat_core::{Catalog, CatalogSet, PluralRule, check_entry, format_named, format_positional};
use pocat_core::{header::Metadata, po};

mod cli;

use cli::{Command, HELP_TEXT, Parsed, VERSION};

fn main() {
    let filter = EnvFilter::try_from_env("POCAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match cli::parse_args(&args) {
        Ok(Parsed::Help) => {
            print!("{HELP_TEXT}");
            0
        }
        Ok(Parsed::Version) => {
            println!("pocat {VERSION}");
            0
        }
        Ok(Parsed::Run(command)) => run(command),
        Err(e) => {
            eprintln!("pocat: {e}");
            2
        }
    };
    process::exit(code);
}

fn run(command: Command) -> i32 {
    match command {
        Command::Check { files, strict } => check(&files, strict),
        Command::Get {
            file,
            id,
            positional,
            named,
            count,
            plural,
        } => get(&file, &id, &positional, &named, count, plural.as_deref()),
        Command::Coverage {
            files,
            json,
            fallback,
        } => coverage(&files, json, &fallback),
        Command::Fmt { file } => fmt(&file),
    }
}

fn check(files: &[PathBuf], strict: bool) -> i32 {
    let mut parse_failures = 0usize;
    let mut diagnostics = 0usize;

    for file in files {
        let display = file.display();
        let source = match fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{display}: read failed: {e}");
                parse_failures += 1;
                continue;
            }
        };
        let entries = match po::parse(&source) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("{display}: {e}");
                parse_failures += 1;
                continue;
            }
        };

        let mut translated = 0usize;
        let mut fuzzy = 0usize;
        let mut untranslated = 0usize;
        let mut messages = 0usize;

        for entry in &entries {
            if entry.is_header() {
                let meta = Metadata::parse(&entry.msgstr);
                if let Some(decl) = meta.plural_forms() {
                    if let Err(e) = PluralRule::parse(decl) {
                        println!("{display}: header: bad Plural-Forms: {e}");
                        diagnostics += 1;
                    }
                }
                continue;
            }
            messages += 1;
            if entry.is_fuzzy() {
                fuzzy += 1;
            } else if entry.is_translated() {
                translated += 1;
            } else {
                untranslated += 1;
            }
            for issue in check_entry(entry) {
                println!("{display}: msgid '{}': {issue}", entry.msgid);
                diagnostics += 1;
            }
        }
        if strict {
            diagnostics += fuzzy;
        }

        println!(
            "{display}: {messages} messages, {translated} translated, \
             {fuzzy} fuzzy, {untranslated} untranslated"
        );
    }

    if parse_failures > 0 || (strict && diagnostics > 0) {
        1
    } else {
        0
    }
}

fn get(
    file: &Path,
    id: &str,
    positional: &[String],
    named: &[(String, String)],
    count: Option<u64>,
    plural: Option<&str>,
) -> i32 {
    // A catalog that fails to load degrades to id-verbatim resolution; the
    // message still comes out, untranslated.
    let catalog = match Catalog::load(file) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(file = %file.display(), error = %e, "catalog unavailable, resolving verbatim");
            Catalog::empty()
        }
    };

    let template = match count {
        Some(n) => catalog.ngettext(id, plural.unwrap_or(id), n),
        None => catalog.gettext(id),
    };

    // Named substitution first, then positional over the remainder.
    let named: Vec<(&str, &str)> = named
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect();
    let positional: Vec<&str> = positional.iter().map(String::as_str).collect();
    let mut out = template.to_string();
    if !named.is_empty() {
        out = format_named(&out, &named);
    }
    if !positional.is_empty() {
        out = format_positional(&out, &positional);
    }

    println!("{out}");
    0
}

fn coverage(files: &[PathBuf], json: bool, fallback: &[String]) -> i32 {
    let mut set = CatalogSet::new();
    for file in files {
        let catalog = match Catalog::load(file) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("{}: {e}", file.display());
                return 1;
            }
        };
        match set.add_catalog_auto(catalog) {
            Ok(_) => {}
            Err(catalog) => {
                // No Language header: fall back to the file stem as the tag.
                let tag = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string());
                set.add_catalog(tag, catalog);
            }
        }
    }
    set.set_fallback_chain(fallback.to_vec());

    let report = set.coverage_report();
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("pocat: json encoding failed: {e}");
                return 1;
            }
        }
    } else {
        println!("{} message ids", report.total_ids);
        for locale in &report.locales {
            println!(
                "  {}: {}/{} translated ({:.1}%)",
                locale.locale, locale.translated, report.total_ids, locale.coverage_percent
            );
            for id in &locale.missing {
                println!("    missing: {id}");
            }
        }
    }
    0
}

fn fmt(file: &Path) -> i32 {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: read failed: {e}", file.display());
            return 1;
        }
    };
    match po::parse(&source) {
        Ok(entries) => {
            print!("{}", po::serialize(&entries));
            0
        }
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            1
        }
    }
}
