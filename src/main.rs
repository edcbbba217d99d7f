use mail_assist::api;
use mail_assist::config::MailConfig;

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

    let config = MailConfig::from_env();

    eprintln!("📬 Mail Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}/api/v1", config.bind_addr);
    eprintln!("   IMAP: {}:{}", config.imap_server, config.imap_port);
    eprintln!("   SMTP: {}:{}", config.smtp_server, config.smtp_port);
    if config.email_address.is_empty() {
        eprintln!("   Warning: EMAIL_ADDRESS not set — fetch/send will return 400");
    }

    let bind_addr = config.bind_addr.clone();
    let app = api::routes(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
