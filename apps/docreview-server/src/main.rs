//! Document Review Server
//!
//! Accepts DOCX and PDF uploads and provides REST endpoints for:
//!
//! - Grammar and AI compliance assessment against user guidelines
//! - AI rewriting of a document per free-text instruction
//! - Downloading original and rewritten documents
//!
//! ## Architecture
//!
//! Handlers are thin wrappers over `docreview_core::ReviewService`, which
//! owns the in-memory registry and the upload directory. Grammar checking
//! and the language-model provider are chosen at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::{Parser, ValueEnum};
use compliance_engine::{
    grammar::languagetool,
    llm::gemini::DEFAULT_MODEL, AssessmentGenerator, ComplianceEngine, DisabledChecker,
    GeminiClient, GrammarChecker, LanguageToolChecker, RuleBasedChecker, TextGenerator,
};
use docreview_core::{BlobStore, Registry, ReviewService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{
    handle_assess, handle_download, handle_get_document, handle_health, handle_modify,
    handle_upload,
};

/// Grammar checking backend
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GrammarBackend {
    /// Built-in regex rules
    Rules,
    /// LanguageTool HTTP server
    Languagetool,
    /// No grammar checking
    Off,
}

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "docreview-server")]
#[command(about = "Document compliance review server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory for uploaded and generated files
    #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
    upload_dir: PathBuf,

    /// Gemini API key; AI features degrade to a placeholder without it
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model id
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_MODEL)]
    ai_model: String,

    /// Time budget for a single AI call in milliseconds
    #[arg(long, env = "AI_TIMEOUT_MS", default_value = "60000")]
    ai_timeout_ms: u64,

    /// Grammar checking backend
    #[arg(long, env = "GRAMMAR_BACKEND", value_enum, default_value = "rules")]
    grammar: GrammarBackend,

    /// LanguageTool server base URL (used with --grammar languagetool)
    #[arg(long, env = "LANGUAGETOOL_URL", default_value = languagetool::DEFAULT_URL)]
    languagetool_url: String,

    /// Maximum upload size in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "20")]
    max_upload_mb: usize,

    /// Directory with the browser UI, served at /
    #[arg(long, env = "STATIC_DIR", default_value = BUNDLED_STATIC_DIR)]
    static_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Browser UI shipped with the server crate
pub const BUNDLED_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

/// Build the application router
pub fn build_router(
    state: AppState,
    max_upload_bytes: usize,
    static_dir: Option<PathBuf>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Document lifecycle
        .route("/upload", post(handle_upload))
        .route("/assess/:id", post(handle_assess))
        .route("/modify", post(handle_modify))
        .route("/download/:id", get(handle_download))
        .route("/documents/:id", get(handle_get_document));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_grammar_checker(args: &Args) -> anyhow::Result<Arc<dyn GrammarChecker>> {
    let checker: Arc<dyn GrammarChecker> = match args.grammar {
        GrammarBackend::Rules => Arc::new(RuleBasedChecker::new()),
        GrammarBackend::Languagetool => {
            Arc::new(LanguageToolChecker::new(&args.languagetool_url)?)
        }
        GrammarBackend::Off => Arc::new(DisabledChecker),
    };
    Ok(checker)
}

fn build_generator(args: &Args) -> anyhow::Result<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = args.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        warn!("GEMINI_API_KEY not set; AI assessment and rewriting are disabled");
        return Ok(None);
    };
    let client: Arc<dyn TextGenerator> =
        Arc::new(GeminiClient::new(api_key)?.with_model(args.ai_model.clone()));
    Ok(Some(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(log_level.into())
                .add_directive("tower_http=debug".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docreview server on {}:{}", args.host, args.port);

    let store = BlobStore::open(&args.upload_dir).await?;
    info!("Upload directory: {}", store.root().display());

    let grammar = build_grammar_checker(&args)?;
    let ai = AssessmentGenerator::new(
        build_generator(&args)?,
        Duration::from_millis(args.ai_timeout_ms),
    );
    let engine = ComplianceEngine::new(grammar, ai);

    let state = AppState {
        service: Arc::new(ReviewService::new(Arc::new(Registry::new(store)), engine)),
    };

    let static_dir = if args.static_dir.is_dir() {
        info!("Serving UI from {}", args.static_dir.display());
        Some(args.static_dir.clone())
    } else {
        warn!(
            "Static directory {} not found; UI disabled",
            args.static_dir.display()
        );
        None
    };

    let app = build_router(state, args.max_upload_mb * 1024 * 1024, static_dir);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Grammar backend: {:?}", args.grammar);
    info!("AI model: {} (timeout {}ms)", args.ai_model, args.ai_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
