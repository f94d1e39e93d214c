//! certchain: Command-line tool for classifying observed certificate chains.

use anyhow::{Context, Result};
use certchain_lib::analyze::STORES_ENV;
use certchain_lib::{Chain, ChainOrder, ChainReport, ChainValidator, StorePaths, TrustStores};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "certchain",
    about = "Classify observed TLS certificate chains by trust status",
    long_about = "certchain reads certificate chains (leaf first) as observed in TLS\n\
                  handshakes and classifies every certificate and every chain against\n\
                  a set of trust stores: public vs. private issuers, interception\n\
                  products, cross-signed links, valid subchains and leaf certificates.\n\n\
                  Chains are JSON arrays of {\"Issuer\": ..., \"Subject\": ...} objects\n\
                  or PEM bundles (auto-detected). No signatures are checked.",
    after_help = "EXAMPLES:\n\
                  \n  certchain analyze chain.json\
                  \n  certchain analyze --stores ./stores --json chain.pem\
                  \n  certchain analyze --strict -r observed/\
                  \n  certchain show --order from-root chain.json\
                  \n  certchain status chain.json\
                  \n  certchain dn 'CN=example.com, O=Example\\, Inc, C=US'"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a chain, or every chain file in a directory
    #[command(after_help = "Exit status is 2 when --strict is given and any chain has\n\
                      mismatched pairs.\n\
                      \nEXAMPLES:\n\
                      \n  certchain analyze chain.json\
                      \n  certchain analyze --json chain.pem\
                      \n  certchain analyze --failures-only -r observed/\
                      \n  cat chain.json | certchain analyze")]
    Analyze {
        /// Chain file (JSON or PEM) or directory. Reads from stdin if omitted.
        file: Option<PathBuf>,
        #[command(flatten)]
        stores: StoreArgs,
        /// Force PEM input parsing (default: auto-detect)
        #[arg(long)]
        pem: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Exit with status 2 if any chain has mismatched pairs
        #[arg(long)]
        strict: bool,
        /// Only print chains with mismatched pairs (directory mode)
        #[arg(long)]
        failures_only: bool,
        /// Recurse into subdirectories (directory mode)
        #[arg(short, long)]
        recurse: bool,
    },
    /// Print the certificates of a chain
    Show {
        /// Chain file (JSON or PEM). Reads from stdin if omitted.
        file: Option<PathBuf>,
        /// Listing order
        #[arg(long, value_enum, default_value_t = OrderArg::FromLeaf)]
        order: OrderArg,
        /// Force PEM input parsing (default: auto-detect)
        #[arg(long)]
        pem: bool,
    },
    /// Print the trust status of every certificate in a chain
    Status {
        /// Chain file (JSON or PEM). Reads from stdin if omitted.
        file: Option<PathBuf>,
        #[command(flatten)]
        stores: StoreArgs,
        /// Force PEM input parsing (default: auto-detect)
        #[arg(long)]
        pem: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Parse a distinguished name and print its CN, O, OU and C
    Dn {
        /// Distinguished name text
        dn: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    FromLeaf,
    FromRoot,
}

impl From<OrderArg> for ChainOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::FromLeaf => ChainOrder::FromLeaf,
            OrderArg::FromRoot => ChainOrder::FromRoot,
        }
    }
}

/// Trust-store locations. Individual files override the directory defaults.
#[derive(Args, Default)]
struct StoreArgs {
    /// Directory with ccadb.txt, whitelist.txt, truststore.txt, interception.txt,
    /// peer_cross_signed.txt and strict_cross_signed.txt
    /// (default: $CERTCHAIN_STORES, then ./stores)
    #[arg(long, value_name = "DIR")]
    stores: Option<PathBuf>,
    /// CCADB name list
    #[arg(long, value_name = "FILE")]
    ccadb: Option<PathBuf>,
    /// Whitelist substring list
    #[arg(long, value_name = "FILE")]
    whitelist: Option<PathBuf>,
    /// Root program name list
    #[arg(long, value_name = "FILE")]
    truststore: Option<PathBuf>,
    /// Interception product substring list
    #[arg(long, value_name = "FILE")]
    interception: Option<PathBuf>,
    /// Peer cross-signed DN list
    #[arg(long, value_name = "FILE")]
    peer_cross_signed: Option<PathBuf>,
    /// Strict cross-signed DN list
    #[arg(long, value_name = "FILE")]
    strict_cross_signed: Option<PathBuf>,
}

impl StoreArgs {
    /// Resolve every store file, from flags first and the store directory second.
    fn paths(&self) -> Result<StorePaths> {
        let dir = self.stores.clone().or_else(certchain_lib::find_store_dir);
        let defaults = dir.as_deref().map(StorePaths::in_dir);
        let defaults = defaults.as_ref();
        let missing = |name: &str| {
            format!(
                "no {} store: pass --{} FILE, --stores DIR, or set {}",
                name, name, STORES_ENV
            )
        };

        Ok(StorePaths {
            ccadb: pick(&self.ccadb, defaults, |p| &p.ccadb)
                .with_context(|| missing("ccadb"))?,
            whitelist: pick(&self.whitelist, defaults, |p| &p.whitelist)
                .with_context(|| missing("whitelist"))?,
            truststore: pick(&self.truststore, defaults, |p| &p.truststore)
                .with_context(|| missing("truststore"))?,
            interception: pick(&self.interception, defaults, |p| &p.interception)
                .with_context(|| missing("interception"))?,
            peer_cross_signed: pick(&self.peer_cross_signed, defaults, |p| &p.peer_cross_signed)
                .unwrap_or_default(),
            strict_cross_signed: pick(&self.strict_cross_signed, defaults, |p| {
                &p.strict_cross_signed
            })
            .unwrap_or_default(),
        })
    }

    fn load(&self) -> Result<TrustStores> {
        let paths = self.paths()?;
        TrustStores::from_paths(&paths).context("Failed to load trust stores")
    }
}

/// A store file given by flag, else the directory default.
fn pick(
    flag: &Option<PathBuf>,
    defaults: Option<&StorePaths>,
    select: fn(&StorePaths) -> &PathBuf,
) -> Option<PathBuf> {
    flag.clone().or_else(|| defaults.map(|d| select(d).clone()))
}

/// Largest chain document accepted from a file or stdin.
const MAX_CHAIN_BYTES: u64 = 10 * 1024 * 1024;

/// Read a chain document from `file`, or from stdin when no file is given.
fn read_input(file: Option<&PathBuf>) -> Result<Vec<u8>> {
    let Some(path) = file else {
        let mut buf = Vec::new();
        std::io::stdin()
            .take(MAX_CHAIN_BYTES)
            .read_to_end(&mut buf)
            .context("reading chain from stdin")?;
        return Ok(buf);
    };

    let size = std::fs::metadata(path)
        .with_context(|| format!("cannot open chain {}", path.display()))?
        .len();
    if size > MAX_CHAIN_BYTES {
        anyhow::bail!(
            "chain {} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            MAX_CHAIN_BYTES
        );
    }
    std::fs::read(path).with_context(|| format!("reading chain {}", path.display()))
}

/// Parse chain input as PEM when forced or detected, JSON otherwise.
fn parse_chain(input: &[u8], pem: bool) -> Result<Chain> {
    if pem || certchain_lib::is_pem(input) {
        Ok(certchain_lib::chain_from_pem(input)?)
    } else {
        Ok(Chain::from_json(input)?)
    }
}

/// Extensions recognized as chain documents in batch mode.
const CHAIN_EXTENSIONS: [&str; 4] = ["json", "pem", "crt", "cer"];

fn is_chain_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CHAIN_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Chain documents under `dir` in path order; only the top level unless `recurse`.
fn find_chain_files(dir: &Path, recurse: bool) -> Vec<PathBuf> {
    let depth = if recurse { usize::MAX } else { 1 };
    let mut chains: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_chain_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    chains.sort();
    chains
}

/// One-line summary of a chain report.
fn summary_line(report: &ChainReport) -> String {
    format!(
        "{} cert(s), {} mismatched pair(s), {} subchain(s), {} leaf(s), {}{}",
        report.length,
        report.mismatches,
        report.subchains.count,
        report.leaf_total,
        report.category,
        if report.complete_chain { ", complete" } else { "" }
    )
}

/// A single result from batch processing.
struct BatchResult {
    path: String,
    report: Result<ChainReport, String>,
}

impl BatchResult {
    fn pass(&self) -> bool {
        matches!(&self.report, Ok(r) if r.is_fully_valid())
    }
}

/// Analyze chain files in parallel, sharing one set of trust stores.
fn run_batch(files: &[PathBuf], stores: &TrustStores, pem: bool) -> Vec<BatchResult> {
    let validator = ChainValidator::new(stores);
    files
        .par_iter()
        .map(|f| {
            let report = read_input(Some(f))
                .and_then(|data| parse_chain(&data, pem))
                .map(|chain| validator.analyze(&chain))
                .map_err(|e| {
                    tracing::warn!(file = %f.display(), error = %e, "skipping unreadable chain");
                    format!("{:#}", e)
                });
            BatchResult {
                path: f.display().to_string(),
                report,
            }
        })
        .collect()
}

/// Print batch results. Returns the number of chains that failed.
fn print_batch(results: &[BatchResult], json: bool, failures_only: bool) -> Result<usize> {
    let failures = results.iter().filter(|r| !r.pass()).count();

    if json {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .filter(|r| !failures_only || !r.pass())
            .map(|r| match &r.report {
                Ok(report) => serde_json::json!({ "file": r.path, "report": report }),
                Err(e) => serde_json::json!({ "file": r.path, "error": e }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(failures);
    }

    for r in results {
        if failures_only && r.pass() {
            continue;
        }
        match &r.report {
            Ok(report) if r.pass() => println!("{}: {}", r.path, summary_line(report)),
            Ok(report) => eprintln!("{}: {}", r.path, summary_line(report)),
            Err(e) => eprintln!("{}: FAIL ({})", r.path, e),
        }
    }
    Ok(failures)
}

fn init_logging() -> Result<()> {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze {
            file,
            stores,
            pem,
            json,
            strict,
            failures_only,
            recurse,
        } => {
            let stores = stores.load()?;

            if let Some(dir) = file.as_ref().filter(|p| p.is_dir()) {
                let files = find_chain_files(dir, *recurse);
                if files.is_empty() {
                    anyhow::bail!("No chain files found in {}", dir.display());
                }
                let results = run_batch(&files, &stores, *pem);
                let failures = print_batch(&results, *json, *failures_only)?;
                if *strict && failures > 0 {
                    std::process::exit(2);
                }
                return Ok(());
            }

            let input = read_input(file.as_ref())?;
            let chain = parse_chain(&input, *pem)?;
            let report = ChainValidator::new(&stores).analyze(&chain);

            if *json {
                println!("{}", certchain_lib::to_json(&report)?);
            } else {
                print!("{}", certchain_lib::display_report(&report));
            }
            if *strict && !report.is_fully_valid() {
                std::process::exit(2);
            }
        }
        Commands::Show { file, order, pem } => {
            let input = read_input(file.as_ref())?;
            let chain = parse_chain(&input, *pem)?;
            print!("{}", certchain_lib::display_chain(&chain, (*order).into()));
        }
        Commands::Status {
            file,
            stores,
            pem,
            json,
        } => {
            let stores = stores.load()?;
            let input = read_input(file.as_ref())?;
            let chain = parse_chain(&input, *pem)?;
            let statuses = ChainValidator::new(&stores).cert_statuses(&chain);

            if *json {
                println!("{}", certchain_lib::to_json(&statuses)?);
            } else {
                print!("{}", certchain_lib::display_statuses(&statuses));
            }
        }
        Commands::Dn { dn, json } => {
            let attrs = certchain_lib::parse_dn(dn);
            if *json {
                println!("{}", certchain_lib::to_json(&attrs)?);
            } else {
                for (key, value) in [
                    ("CN", attrs.cn()),
                    ("O", attrs.o()),
                    ("OU", attrs.ou()),
                    ("C", attrs.c()),
                ] {
                    if let Some(value) = value {
                        println!("{}: {}", key, value);
                    }
                }
            }
        }
    }

    Ok(())
}
