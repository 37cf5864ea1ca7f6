use std::sync::Arc;

use anyhow::Context;
use faq_assist::auth::SecretValidator;
use faq_assist::config::ServiceConfig;
use faq_assist::llm::{LlmConfig, create_providers};
use faq_assist::rag::{CorpusEngineFactory, RetrievalBinding};
use faq_assist::server::{AppState, router};
use faq_assist::session::{InMemorySessionStore, SessionRepository, spawn_eviction_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    let api_key = config.openai_api_key.clone().unwrap_or_else(|| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    if config.secret.is_none() {
        tracing::warn!("CHATBOT_SECRET not set; every Q&A request will be rejected");
    }

    eprintln!("🤖 FAQ Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat model: {}", config.chat_model);
    eprintln!("   Embeddings: {}", config.embedding_model);
    eprintln!("   Corpus: {}", config.retrieval.corpus_path.display());
    eprintln!(
        "   Sessions: idle timeout {} min",
        config.sessions.idle_timeout.as_secs() / 60
    );

    // ── Retrieval ───────────────────────────────────────────────────────
    let providers = create_providers(&LlmConfig {
        api_key,
        chat_model: config.chat_model.clone(),
        embedding_model: config.embedding_model.clone(),
        temperature: 0.0,
    })
    .context("Failed to create LLM providers")?;
    let factory = Arc::new(CorpusEngineFactory::new(&config.retrieval, providers));
    let binding = RetrievalBinding::new(factory);

    // ── Sessions ────────────────────────────────────────────────────────
    let sessions: Arc<dyn SessionRepository> = InMemorySessionStore::new();
    let sweeper = spawn_eviction_task(
        Arc::clone(&sessions),
        config.sessions.idle_timeout,
        config.sessions.sweep_interval,
    );

    // ── HTTP ────────────────────────────────────────────────────────────
    let validator = Arc::new(SecretValidator::new(config.secret.clone()));
    let app = router(AppState { sessions, binding }, validator);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "Server running");
    eprintln!("   Listening: http://{}\n", config.bind);

    let served = axum::serve(listener, app).await;
    sweeper.abort();
    served?;
    Ok(())
}
