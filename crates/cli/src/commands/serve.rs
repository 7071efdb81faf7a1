//! `gaian-archive serve` — Start the HTTP server.

use gaian_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    println!("🌿 Gaian Archive");
    println!("   Listening:  {}:{}", config.server.host, config.server.port);
    println!("   Knowledge:  {} backend", config.knowledge.backend);
    println!(
        "   Synthesis:  {}",
        if config.openai.api_key.is_some() {
            config.synthesis.strategy.as_str()
        } else {
            "disabled (no API key)"
        }
    );

    gaian_gateway::start(config).await?;

    Ok(())
}
