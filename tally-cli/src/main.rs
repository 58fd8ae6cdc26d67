use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tally_batch::{validate_documents, BatchEvent, BatchSession};
use tally_core::{export_file_name, read_csv, summarize, write_csv, Scope, Transaction};
use tally_ingest::Document;

mod config;
mod dashboard;
mod llm;
mod state;

use crate::llm::{LlmConfig, LlmExtractor};

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Extract, categorize and summarize statement transactions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from statement files (PDF/PNG/JPEG/WEBP/HEIC) and print the dashboard
    Process {
        /// Statement files, processed in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// "all" or one document's file name
        #[arg(long, default_value = "all")]
        scope: String,

        /// Select one document by exact name (use for a file literally named "all")
        #[arg(long, conflicts_with = "scope")]
        document: Option<String>,

        /// Write the scoped transactions as CSV (file, or directory for the default name)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Max transaction rows to print (0 = all; default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Summarize a previously exported CSV without calling the model
    Summarize {
        /// Path to a CSV written by `tally process --csv`
        csv: PathBuf,

        #[arg(long, default_value = "all")]
        scope: String,

        #[arg(long, conflicts_with = "scope")]
        document: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            files,
            scope,
            document,
            csv,
            json,
            limit,
        } => process(files, resolve_scope(&scope, document), csv, json, limit).await?,

        Command::Summarize {
            csv,
            scope,
            document,
            json,
        } => summarize_csv(&csv, resolve_scope(&scope, document), json)?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

/// `--document` wins over `--scope`; clap keeps them from being combined.
fn resolve_scope(scope: &str, document: Option<String>) -> Scope {
    match document {
        Some(name) => Scope::Document(name),
        None => Scope::parse(scope),
    }
}

/// Reject a document scope that names none of the submitted files, before any model call.
fn check_scope(scope: &Scope, docs: &[Document]) -> Result<()> {
    if let Scope::Document(name) = scope {
        if !docs.iter().any(|d| d.name == *name) {
            let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
            bail!("unknown document '{name}' for --scope (submitted: {})", names.join(", "));
        }
    }
    Ok(())
}

async fn process(
    files: Vec<PathBuf>,
    scope: Scope,
    csv: Option<PathBuf>,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    let cfg = config::load_config()?;

    let docs = files
        .iter()
        .map(|p| Document::load(p).with_context(|| format!("loading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;

    validate_documents(&docs)?;
    check_scope(&scope, &docs)?;

    let extractor = LlmExtractor::from_env(LlmConfig::from_section(&cfg.llm)?)?;

    let mut session = BatchSession::new();
    let outcome = session
        .run(&extractor, &docs, |ev| match ev {
            BatchEvent::Processing { index, name } => {
                eprintln!("[{}/{}] extracting {}", index + 1, docs.len(), name)
            }
            BatchEvent::Failed { name, .. } => eprintln!("failed: {name}"),
            BatchEvent::Finished { transactions } => {
                eprintln!("done: {transactions} transactions from {} documents\n", docs.len())
            }
            BatchEvent::Started { .. } | BatchEvent::Completed { .. } => {}
        })
        .await;

    match outcome {
        Ok(Some(_)) => {}
        Ok(None) => {
            println!("No documents to process.");
            return Ok(());
        }
        Err(e) => bail!("{e}"),
    }

    session.select_scope(scope)?;

    let scoped = session.scoped();
    if json {
        println!("{}", serde_json::to_string_pretty(&session.summary())?);
    } else {
        let symbol = &cfg.output.currency_symbol;
        print!("{}", dashboard::render_summary(&session.summary(), session.scope(), symbol));
        println!();
        print!(
            "{}",
            dashboard::render_table(&scoped, symbol, limit.unwrap_or(cfg.output.max_rows))
        );
    }

    if let Some(target) = csv {
        let path = export_path(&target, session.scope());
        write_export(&path, &scoped)?;
        eprintln!("Wrote {} ({} rows)", path.display(), scoped.len());
    }

    Ok(())
}

fn summarize_csv(path: &Path, scope: Scope, json: bool) -> Result<()> {
    if !path.exists() {
        bail!("CSV not found: {}", path.display());
    }
    let txns = read_csv(path).with_context(|| format!("parsing {}", path.display()))?;
    let scoped = scope.apply(&txns);
    if let Scope::Document(name) = &scope {
        if scoped.is_empty() {
            bail!("no transactions from {name} in {}", path.display());
        }
    }

    let summary = summarize(&scoped);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let cfg = config::load_config()?;
        print!("{}", dashboard::render_summary(&summary, &scope, &cfg.output.currency_symbol));
    }
    Ok(())
}

/// A directory target gets the default export name for the scope.
fn export_path(target: &Path, scope: &Scope) -> PathBuf {
    if target.is_dir() {
        target.join(export_file_name(scope))
    } else {
        target.to_path_buf()
    }
}

fn write_export(path: &Path, txns: &[Transaction]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let file = fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, txns).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_ingest::MediaType;

    #[test]
    fn test_export_path_directory_uses_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let p = export_path(dir.path(), &Scope::Document("jan.pdf".to_string()));
        assert_eq!(p, dir.path().join("transactions_jan.pdf.csv"));
    }

    #[test]
    fn test_export_path_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        assert_eq!(export_path(&target, &Scope::All), target);
    }

    #[test]
    fn test_write_export_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("all.csv");
        let txns = vec![Transaction::new("txn-00000", "2024-01-05", "Coffee", -4.5, "Dining", "a.pdf")];
        write_export(&path, &txns).unwrap();

        let back = read_csv(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].amount, -4.5);
    }

    #[test]
    fn test_cli_parses_process() {
        let cli = Cli::try_parse_from(["tally", "process", "a.pdf", "b.png", "--scope", "b.png"]).unwrap();
        match cli.command {
            Command::Process { files, scope, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(scope, "b.png");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_check_scope_before_extraction() {
        let docs = vec![
            Document::new("jan.pdf", MediaType::Pdf, Vec::new()),
            Document::new("feb.pdf", MediaType::Pdf, Vec::new()),
        ];
        assert!(check_scope(&Scope::All, &docs).is_ok());
        assert!(check_scope(&Scope::Document("feb.pdf".to_string()), &docs).is_ok());

        let err = check_scope(&Scope::Document("fbe.pdf".to_string()), &docs).unwrap_err();
        assert!(err.to_string().contains("fbe.pdf"));
    }

    #[test]
    fn test_document_flag_selects_file_named_all() {
        let cli = Cli::try_parse_from(["tally", "process", "all", "x.pdf", "--document", "all"]).unwrap();
        match cli.command {
            Command::Process { scope, document, .. } => {
                assert_eq!(resolve_scope(&scope, document), Scope::Document("all".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(resolve_scope("all", None), Scope::All);
    }

    #[test]
    fn test_scope_and_document_conflict() {
        assert!(
            Cli::try_parse_from(["tally", "process", "a.pdf", "--scope", "a.pdf", "--document", "a.pdf"]).is_err()
        );
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["tally", "process"]).is_err());
    }
}
