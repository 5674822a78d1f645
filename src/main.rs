use clap::Parser;
use intake_site_lib::config::{
    self, ConfigMerger, IntakeConfig, PartialConfig, PartialServerConfig, PartialStorageConfig,
};
use intake_site_lib::server::{self, generate_auth_token};
use intake_site_lib::shutdown::{self, ShutdownState};
use intake_site_lib::storage::FileDocumentStore;
use std::path::PathBuf;

/// Intake site - marketing site with a project intake wizard and contact form
#[derive(Parser, Debug)]
#[command(name = "intake-site")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.intake-site/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Document store directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Fixed admin token (or set INTAKE_ADMIN_TOKEN env var).
    /// If not provided, a random token is generated on each startup
    #[arg(long, env = "INTAKE_ADMIN_TOKEN")]
    token: Option<String>,

    /// Rebuild the index files from the stored documents and exit
    #[arg(long)]
    rebuild_indexes: bool,
}

impl Cli {
    /// CLI flags as the highest-priority config layer
    fn overrides(&self) -> PartialConfig {
        PartialConfig {
            server: Some(PartialServerConfig {
                bind: self.bind.clone(),
                port: self.port,
                cors_origins: None,
            }),
            storage: Some(PartialStorageConfig {
                data_dir: self.data_dir.clone(),
            }),
            ..Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::init();

    let loaded = config::load_merged_config(cli.config.as_deref(), Some(cli.overrides()));

    if cli.rebuild_indexes {
        return rebuild_indexes(loaded?);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli, loaded))
}

async fn run(
    cli: Cli,
    loaded: Result<IntakeConfig, config::ConfigError>,
) -> anyhow::Result<()> {
    let shutdown_state = ShutdownState::new();
    if let Err(e) = shutdown::register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let (config, startup) = match loaded {
        Ok(config) => {
            // Use provided token or generate a random one
            let auth_token = match cli.token {
                Some(token) => token,
                None => {
                    let token = generate_auth_token();
                    println!("Admin token: {}", token);
                    token
                }
            };
            let startup =
                intake_site_lib::init_server_state(config.clone(), auth_token, shutdown_state.clone());
            (config, startup)
        }
        Err(e) => {
            // Still bind where the CLI asked, so the notice is reachable
            let config = ConfigMerger::new().with_cli(Some(cli.overrides())).merge();
            (config, Err(e.into()))
        }
    };

    match startup {
        Ok(state) => server::run_server(state)
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Err(e) => {
            log::error!("Starting in fallback mode: {}", e);
            let translator = intake_site_lib::i18n::Translator::builtin(
                intake_site_lib::i18n::DEFAULT_LOCALE,
            )?;
            server::run_fallback_server(&config.server, &translator, shutdown_state)
                .await
                .map_err(|e| anyhow::anyhow!(e))
        }
    }
}

fn rebuild_indexes(config: IntakeConfig) -> anyhow::Result<()> {
    let store = FileDocumentStore::open(&config.storage.data_dir)?;
    let rebuilt = store.rebuild_indexes()?;
    println!(
        "Rebuilt indexes in {}: {} submission(s), {} contact message(s)",
        config.storage.data_dir.display(),
        rebuilt.submissions,
        rebuilt.contacts
    );
    Ok(())
}
