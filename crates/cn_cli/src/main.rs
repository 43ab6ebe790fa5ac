use anyhow::{bail, Context};
use clap::Parser;
use cn_core::{logging::init_logging, Article, ArticleBackend, Category, Config, Identity, LocalStore};
use cn_player::{format_time, Effect, MediaPlayer, PlaybackState, PremiumStatus, SilentOutput};
use cn_publish::{ArticleForm, PointsAward};
use cn_storage::{create_backend, ArticleStore, FileLocalStore, MemoryBackend};
use cn_web::AppState;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cambliss news: browse, publish and listen", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "memory", help = "Article backend. Available backends: memory (default), rest")]
    backend: String,
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    state_dir: Option<PathBuf>,
    /// JSON file with an array of articles to preload into the memory backend
    #[arg(long)]
    seed: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List articles, newest first
    Articles {
        #[arg(long)]
        category: Option<Category>,
    },
    /// List the narrated episodes
    Episodes,
    /// Submit a new article
    Publish(PublishArgs),
    Premium {
        #[command(subcommand)]
        command: PremiumCommands,
    },
    /// Simulate playback of an episode and print what the player does
    Preview {
        id: String,
        #[arg(long, default_value_t = 90)]
        seconds: u32,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(clap::Args, Debug)]
struct PublishArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    summary: String,
    /// Article body; use --content-file for long texts
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,
    #[arg(long)]
    content_file: Option<PathBuf>,
    #[arg(long)]
    image_url: String,
    #[arg(long, default_value = "breaking")]
    category: Category,
    #[arg(long)]
    source: Option<String>,
    /// Comma separated
    #[arg(long, default_value = "")]
    tags: String,
    #[arg(long, env = "CAMBLISS_USER_ID")]
    user_id: Option<String>,
    #[arg(long, env = "CAMBLISS_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long)]
    name: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum PremiumCommands {
    Status,
    Upgrade,
    SignOut,
}

impl Cli {
    /// Environment first, flags on top.
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.backend_url {
            config = config.with_backend_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(dir) = &self.state_dir {
            config = config.with_state_dir(dir);
        }
        config
    }
}

impl PublishArgs {
    async fn form(&self) -> anyhow::Result<ArticleForm> {
        let content = match (&self.content, &self.content_file) {
            (Some(content), _) => content.clone(),
            (None, Some(path)) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => bail!("Either --content or --content-file is required"),
        };
        Ok(ArticleForm {
            title: self.title.clone(),
            summary: self.summary.clone(),
            content,
            image_url: self.image_url.clone(),
            category: self.category,
            source: self.source.clone(),
            tags: self.tags.clone(),
        })
    }

    fn identity(&self) -> Option<Identity> {
        let identity = Identity::new(self.user_id.as_deref()?, self.token.as_deref()?);
        Some(match &self.name {
            Some(name) => identity.with_display_name(name),
            None => identity,
        })
    }
}

async fn load_seed(path: &Path) -> anyhow::Result<Vec<Article>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Seed file {} is not a JSON array of articles", path.display()))
}

async fn build_backend(cli: &Cli, config: &Config) -> anyhow::Result<Arc<dyn ArticleBackend>> {
    match (&cli.seed, cli.backend.as_str()) {
        (Some(path), "memory") => {
            let articles = load_seed(path).await?;
            info!("🌱 Seeded {} articles from {}", articles.len(), path.display());
            Ok(Arc::new(MemoryBackend::with_articles(articles)))
        }
        (Some(_), other) => bail!("--seed only applies to the memory backend, not {}", other),
        (None, kind) => Ok(create_backend(kind, config)?),
    }
}

fn report(player: &MediaPlayer<SilentOutput>, effects: &[Effect]) {
    if effects.is_empty() {
        return;
    }
    let session = player.session();
    println!(
        "{:>6} / {}  {:?}  {:?}",
        format_time(session.position()),
        format_time(session.duration()),
        session.state(),
        effects
    );
}

async fn preview(
    store: &ArticleStore,
    premium: &PremiumStatus,
    config: &Config,
    id: &str,
    seconds: u32,
) -> anyhow::Result<()> {
    let episode = store
        .episode(id, &config.audio_base_url)
        .await
        .with_context(|| format!("No article with id {}", id))?;
    info!(
        "🎧 Previewing '{}' ({}, {})",
        episode.title,
        format_time(episode.duration as f64),
        if premium.is_premium() { "premium" } else { "free preview" }
    );

    let mut player = MediaPlayer::with_premium(SilentOutput, premium.subscribe());
    let effects = player.select_episode(Some(episode));
    report(&player, &effects);
    let effects = player.audio_ready();
    report(&player, &effects);

    for second in 1..=seconds {
        let effects = player.time_update(f64::from(second));
        report(&player, &effects);
        if effects.contains(&Effect::ShowUpgradePrompt) {
            println!("🔒 Free preview ended. Upgrade to premium to keep listening.");
            break;
        }
        if player.session().state() != PlaybackState::Playing {
            break;
        }
    }

    let effects = player.close();
    report(&player, &effects);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config();
    let backend = build_backend(&cli, &config).await?;
    info!("🏦 Article backend ready (using {})", backend.name());

    let local: Arc<dyn LocalStore> = Arc::new(FileLocalStore::new(&config.state_dir));
    let premium = Arc::new(PremiumStatus::new());
    premium.refresh_from(local.as_ref()).await?;

    match cli.command {
        Commands::Articles { category } => {
            let store = ArticleStore::new();
            store.refresh(backend.as_ref()).await?;
            let articles = match category {
                Some(category) => store.by_category(category).await,
                None => store.all().await,
            };
            for article in articles {
                println!(
                    "{:<36}  {:<13}  {:>2} min  {}",
                    article.id,
                    article.category.as_str(),
                    article.read_time,
                    article.title
                );
            }
        }
        Commands::Episodes => {
            let store = ArticleStore::new();
            store.refresh(backend.as_ref()).await?;
            for episode in store.episodes(&config.audio_base_url).await {
                println!(
                    "{:<36}  {:>6}  {}",
                    episode.id,
                    format_time(episode.duration as f64),
                    episode.title
                );
            }
        }
        Commands::Publish(args) => {
            let form = args.form().await?;
            let workflow = cn_publish::SubmissionWorkflow::new(backend.clone(), local.clone());
            let outcome = match workflow.submit(&form, args.identity().as_ref()).await {
                Ok(outcome) => outcome,
                Err(e) => bail!(e.user_message()),
            };
            println!("{}", serde_json::to_string_pretty(&outcome.article)?);
            match outcome.points {
                PointsAward::Awarded { points, total, .. } => {
                    println!("🎉 Article published! +{} points ({} total)", points, total)
                }
                PointsAward::Failed { reason } => {
                    println!("📰 Article published, but the points could not be credited: {}", reason)
                }
            }
        }
        Commands::Premium { command } => {
            let is_premium = match command {
                PremiumCommands::Status => premium.is_premium(),
                PremiumCommands::Upgrade => premium.upgrade(local.as_ref()).await?,
                PremiumCommands::SignOut => premium.sign_out(local.as_ref()).await?,
            };
            println!("{}", if is_premium { "premium" } else { "free" });
        }
        Commands::Preview { id, seconds } => {
            let store = ArticleStore::new();
            store.refresh(backend.as_ref()).await?;
            preview(&store, &premium, &config, &id, seconds).await?;
        }
        Commands::Serve { addr } => {
            let state = AppState::new(&config, backend, local, premium);
            if let Err(e) = state.store.refresh(state.backend.as_ref()).await {
                warn!("Starting with an empty article cache: {}", e);
            }
            cn_web::serve(addr, state).await?;
        }
    }

    Ok(())
}
