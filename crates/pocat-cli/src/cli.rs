//! Command-line argument parsing for the pocat tool.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `POCAT_*` prefix.

use std::env;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
pocat — PO message-catalog toolkit

USAGE:
    pocat <COMMAND> [OPTIONS]

COMMANDS:
    check FILE...          Parse catalogs and report diagnostics
    get FILE ID [ARG...]   Resolve and format one message
    coverage FILE...       Translation coverage across catalogs
    fmt FILE               Parse and re-serialize a catalog to stdout

OPTIONS (check):
    --strict               Exit non-zero on diagnostics (fuzzy entries,
                           placeholder mismatches), not just parse errors

OPTIONS (get):
    --count=N              Plural-aware lookup with count N
    --plural=TEXT          English plural template for --count misses
    --arg NAME=VALUE       Named argument (repeatable); positional
                           arguments are the trailing ARG... words

OPTIONS (coverage):
    --json                 Emit the report as JSON
    --fallback=TAGS        Comma-separated fallback chain (e.g. fr,en)

GLOBAL:
    --help, -h             Show this help message
    --version, -V          Show version

ENVIRONMENT VARIABLES:
    POCAT_LOG              Log filter (tracing EnvFilter syntax; default: warn)
    POCAT_STRICT           Set to 1/true to imply --strict for check
";

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check {
        files: Vec<PathBuf>,
        strict: bool,
    },
    Get {
        file: PathBuf,
        id: String,
        positional: Vec<String>,
        named: Vec<(String, String)>,
        count: Option<u64>,
        plural: Option<String>,
    },
    Coverage {
        files: Vec<PathBuf>,
        json: bool,
        fallback: Vec<String>,
    },
    Fmt {
        file: PathBuf,
    },
}

/// Errors from argument parsing, reported verbatim to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of parsing: a command to run, or an early exit (help/version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Command),
    Help,
    Version,
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Parse a full argument list (without the program name).
pub fn parse_args(args: &[String]) -> Result<Parsed, UsageError> {
    if args
        .iter()
        .any(|a| a == "--help" || a == "-h")
    {
        return Ok(Parsed::Help);
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        return Ok(Parsed::Version);
    }

    let (command, rest) = args
        .split_first()
        .ok_or_else(|| UsageError("missing command; try 'pocat --help'".into()))?;

    let command = match command.as_str() {
        "check" => parse_check(rest)?,
        "get" => parse_get(rest)?,
        "coverage" => parse_coverage(rest)?,
        "fmt" => parse_fmt(rest)?,
        other => {
            return Err(UsageError(format!(
                "unknown command '{other}'; try 'pocat --help'"
            )));
        }
    };
    Ok(Parsed::Run(command))
}

fn parse_check(args: &[String]) -> Result<Command, UsageError> {
    let mut files = Vec::new();
    let mut strict = env_flag("POCAT_STRICT");
    for arg in args {
        match arg.as_str() {
            "--strict" => strict = true,
            other if other.starts_with("--") => {
                return Err(UsageError(format!("unknown option '{other}' for check")));
            }
            path => files.push(PathBuf::from(path)),
        }
    }
    if files.is_empty() {
        return Err(UsageError("check: at least one FILE required".into()));
    }
    Ok(Command::Check { files, strict })
}

fn parse_get(args: &[String]) -> Result<Command, UsageError> {
    let mut file = None;
    let mut id = None;
    let mut positional = Vec::new();
    let mut named = Vec::new();
    let mut count = None;
    let mut plural = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--count=") {
            count = Some(
                value
                    .parse()
                    .map_err(|_| UsageError(format!("invalid --count value '{value}'")))?,
            );
        } else if let Some(value) = arg.strip_prefix("--plural=") {
            plural = Some(value.to_string());
        } else if arg == "--arg" {
            let pair = iter
                .next()
                .ok_or_else(|| UsageError("--arg requires NAME=VALUE".into()))?;
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| UsageError(format!("invalid --arg '{pair}', need NAME=VALUE")))?;
            named.push((name.to_string(), value.to_string()));
        } else if arg.starts_with("--") {
            return Err(UsageError(format!("unknown option '{arg}' for get")));
        } else if file.is_none() {
            file = Some(PathBuf::from(arg));
        } else if id.is_none() {
            id = Some(arg.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    Ok(Command::Get {
        file: file.ok_or_else(|| UsageError("get: FILE required".into()))?,
        id: id.ok_or_else(|| UsageError("get: ID required".into()))?,
        positional,
        named,
        count,
        plural,
    })
}

fn parse_coverage(args: &[String]) -> Result<Command, UsageError> {
    let mut files = Vec::new();
    let mut json = false;
    let mut fallback = Vec::new();
    for arg in args {
        if arg == "--json" {
            json = true;
        } else if let Some(tags) = arg.strip_prefix("--fallback=") {
            fallback = tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        } else if arg.starts_with("--") {
            return Err(UsageError(format!("unknown option '{arg}' for coverage")));
        } else {
            files.push(PathBuf::from(arg));
        }
    }
    if files.is_empty() {
        return Err(UsageError("coverage: at least one FILE required".into()));
    }
    Ok(Command::Coverage {
        files,
        json,
        fallback,
    })
}

fn parse_fmt(args: &[String]) -> Result<Command, UsageError> {
    let mut file = None;
    for arg in args {
        if arg.starts_with("--") {
            return Err(UsageError(format!("unknown option '{arg}' for fmt")));
        }
        if file.is_some() {
            return Err(UsageError("fmt: exactly one FILE expected".into()));
        }
        file = Some(PathBuf::from(arg));
    }
    Ok(Command::Fmt {
        file: file.ok_or_else(|| UsageError("fmt: FILE required".into()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse_args(&args(&["check", "--help"])).unwrap(), Parsed::Help);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Parsed::Help);
    }

    #[test]
    fn version_flag() {
        assert_eq!(parse_args(&args(&["--version"])).unwrap(), Parsed::Version);
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(parse_args(&[]).is_err());
    }

    #[test]
    fn check_collects_files() {
        let parsed = parse_args(&args(&["check", "a.po", "b.po", "--strict"])).unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Command::Check {
                files: vec!["a.po".into(), "b.po".into()],
                strict: true,
            })
        );
    }

    #[test]
    fn check_requires_files() {
        assert!(parse_args(&args(&["check"])).is_err());
    }

    #[test]
    fn get_with_positional_args() {
        let parsed = parse_args(&args(&["get", "fr.po", "%s does not exist", "foo.conf"])).unwrap();
        let Parsed::Run(Command::Get {
            file,
            id,
            positional,
            ..
        }) = parsed
        else {
            panic!("expected get");
        };
        assert_eq!(file, PathBuf::from("fr.po"));
        assert_eq!(id, "%s does not exist");
        assert_eq!(positional, vec!["foo.conf"]);
    }

    #[test]
    fn get_with_named_and_count() {
        let parsed = parse_args(&args(&[
            "get",
            "fr.po",
            "%(n)d items",
            "--arg",
            "n=3",
            "--count=3",
            "--plural=%(n)d item(s)",
        ]))
        .unwrap();
        let Parsed::Run(Command::Get {
            named,
            count,
            plural,
            ..
        }) = parsed
        else {
            panic!("expected get");
        };
        assert_eq!(named, vec![("n".to_string(), "3".to_string())]);
        assert_eq!(count, Some(3));
        assert_eq!(plural.as_deref(), Some("%(n)d item(s)"));
    }

    #[test]
    fn bad_count_rejected() {
        assert!(parse_args(&args(&["get", "f.po", "id", "--count=many"])).is_err());
    }

    #[test]
    fn coverage_options() {
        let parsed =
            parse_args(&args(&["coverage", "fr.po", "de.po", "--json", "--fallback=fr,en"]))
                .unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Command::Coverage {
                files: vec!["fr.po".into(), "de.po".into()],
                json: true,
                fallback: vec!["fr".into(), "en".into()],
            })
        );
    }

    #[test]
    fn fmt_takes_one_file() {
        assert!(parse_args(&args(&["fmt", "a.po", "b.po"])).is_err());
        assert!(parse_args(&args(&["fmt"])).is_err());
        assert!(parse_args(&args(&["fmt", "a.po"])).is_ok());
    }

    #[test]
    fn unknown_command_rejected() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn unknown_option_rejected() {
        assert!(parse_args(&args(&["check", "a.po", "--wat"])).is_err());
    }
}
