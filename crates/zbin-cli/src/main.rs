//! zbin: zero-knowledge note CLI
//!
//! Local commands (no store access):
//!   keygen                 - print a fresh hex key
//!   encrypt [<file>]       - encrypt text to a hex envelope
//!   decrypt <hex> --key    - decrypt a hex envelope
//!
//! Store commands (backend from [storage] in zbin.toml):
//!   put [<file>]           - seal, store, and print a share link
//!   get <link|id>          - fetch and open a note
//!   rm <link|id>           - delete a note
//!   purge                  - remove expired notes now
//!   config show            - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};

use zbin_core::config::{StorageBackend, ZbinConfig, DEFAULT_CONFIG_PATH};
use zbin_crypto::{open_note, seal_note, CryptoError, Envelope, NoteKey, ShareLink};
use zbin_store::{NoteService, PurgeOptions};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zbin",
    version,
    about = "zbin zero-knowledge note client",
    long_about = "zbin: encrypt notes locally and share them as self-expiring links"
)]
struct Cli {
    /// Path to zbin.toml configuration file
    #[arg(long, short = 'c', env = "ZBIN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ZBIN_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a new random key as hex
    Keygen {
        /// Key length in bytes: 16 or 32 (default: cipher.key_size)
        #[arg(long, short = 's')]
        size: Option<usize>,
    },

    /// Encrypt text from a file or stdin
    Encrypt {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
        /// Hex key to use (default: generate one and print it)
        #[arg(long, short = 'k')]
        key: Option<String>,
    },

    /// Decrypt a hex envelope
    Decrypt {
        /// Hex ciphertext (default: read from stdin)
        ciphertext: Option<String>,
        /// Hex key
        #[arg(long, short = 'k')]
        key: String,
    },

    /// Encrypt a note, store it, and print its share link
    Put {
        /// Input file (default: stdin)
        input: Option<PathBuf>,
        /// Days until the note expires
        #[arg(long, short = 't', default_value_t = 7)]
        ttl: u32,
        /// Mark the note burn-after-read
        #[arg(long)]
        burn: bool,
    },

    /// Fetch and decrypt a note
    Get {
        /// Share link or bare id
        link: String,
        /// Hex key, if the link carries none
        #[arg(long, short = 'k')]
        key: Option<String>,
    },

    /// Delete a note
    Rm {
        /// Share link or bare id
        link: String,
    },

    /// Delete every expired note now
    Purge,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);
    let config = ZbinConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if !cli.config.exists() {
        tracing::debug!("config file not found: {}  (using defaults)", cli.config.display());
    }

    match cli.command {
        Commands::Keygen { size } => cmd_keygen(&config, size),
        Commands::Encrypt { input, key } => cmd_encrypt(&config, input.as_deref(), key.as_deref()),
        Commands::Decrypt { ciphertext, key } => cmd_decrypt(&config, ciphertext, &key),
        Commands::Put { input, ttl, burn } => cmd_put(&config, input.as_deref(), ttl, burn).await,
        Commands::Get { link, key } => cmd_get(&config, &link, key.as_deref()).await,
        Commands::Rm { link } => cmd_rm(&config, &link).await,
        Commands::Purge => cmd_purge(&config).await,
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Read UTF-8 text from `path`, or stdin when absent.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

/// Accept a full share link or a bare document id.
fn parse_target(raw: &str) -> Result<ShareLink> {
    raw.parse::<ShareLink>()
        .with_context(|| format!("not a share link or document id: {raw:?}"))
}

fn open_service(config: &ZbinConfig) -> Result<NoteService> {
    if config.storage.backend == StorageBackend::Memory {
        tracing::warn!("storage.backend = memory: notes vanish when this command exits");
    }
    let store = zbin_store::open_store(&config.storage)?;
    Ok(NoteService::new(store, PurgeOptions::from(&config.purge)))
}

// ── Local cipher commands ─────────────────────────────────────────────────────

fn cmd_keygen(config: &ZbinConfig, size: Option<usize>) -> Result<()> {
    let key = zbin_crypto::generate_key(size.unwrap_or(config.cipher.key_size))?;
    println!("{}", key.to_hex());
    Ok(())
}

fn cmd_encrypt(config: &ZbinConfig, input: Option<&Path>, key: Option<&str>) -> Result<()> {
    let text = read_input(input)?;
    let iv_size = config.cipher.iv_size;
    match key {
        Some(hex_key) => {
            let key = NoteKey::from_hex(hex_key).context("parsing --key")?;
            let envelope = Envelope::open(key.as_bytes(), iv_size)?;
            println!("{}", zbin_crypto::to_hex(&envelope.encrypt_text(&text)?));
        }
        None => {
            let sealed = seal_note(&text, config.cipher.key_size, iv_size)?;
            println!("ciphertext: {}", sealed.ciphertext);
            println!("key:        {}", sealed.key.to_hex());
        }
    }
    Ok(())
}

fn cmd_decrypt(config: &ZbinConfig, ciphertext: Option<String>, key: &str) -> Result<()> {
    let ciphertext = match ciphertext {
        Some(c) => c,
        None => read_input(None)?,
    };
    let text = open_note(key, &ciphertext, config.cipher.iv_size)?;
    print!("{text}");
    Ok(())
}

// ── Store commands ────────────────────────────────────────────────────────────

async fn cmd_put(config: &ZbinConfig, input: Option<&Path>, ttl: u32, burn: bool) -> Result<()> {
    let text = read_input(input)?;
    let sealed = seal_note(&text, config.cipher.key_size, config.cipher.iv_size)?;

    let record = json!({
        "ciphertext": sealed.ciphertext,
        "ttl": ttl,
        "burn": burn,
    });
    let record = record
        .as_object()
        .context("note record is not a JSON object")?;

    let service = open_service(config)?;
    let doc = service.store(record).await.context("storing note")?;

    let link = ShareLink::new(&config.link.base_url, &doc.id, &sealed.key);
    println!("{link}");
    tracing::info!(id = %doc.id, expires = doc.expires, "note stored");
    Ok(())
}

async fn cmd_get(config: &ZbinConfig, raw: &str, key: Option<&str>) -> Result<()> {
    let mut link = parse_target(raw)?;
    if let Some(key) = key {
        link.key = Some(NoteKey::from_hex(key).context("parsing --key")?.to_hex());
    }
    let key = match link.note_key() {
        Ok(key) => key,
        Err(CryptoError::InvalidLink(_)) => {
            anyhow::bail!("no key for note {}: pass --key or use the full share link", link.id)
        }
        Err(e) => return Err(e.into()),
    };

    let service = open_service(config)?;
    let doc = service
        .retrieve(&link.id)
        .await
        .with_context(|| format!("fetching note {}", link.id))?;

    let text = open_note(&key.to_hex(), &doc.ciphertext, config.cipher.iv_size)?;
    print!("{text}");
    Ok(())
}

async fn cmd_rm(config: &ZbinConfig, raw: &str) -> Result<()> {
    let link = parse_target(raw)?;
    let service = open_service(config)?;
    let id = service
        .delete(&link.id)
        .await
        .with_context(|| format!("deleting note {}", link.id))?;
    println!("deleted {id}");
    Ok(())
}

async fn cmd_purge(config: &ZbinConfig) -> Result<()> {
    let service = open_service(config)?;
    let report = service.purge().await.context("purging expired notes")?;
    println!(
        "purge complete: {} notes removed in {} rounds",
        report.deleted, report.rounds
    );
    Ok(())
}

// ── `zbin config show` ────────────────────────────────────────────────────────

fn cmd_config_show(config: &ZbinConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
