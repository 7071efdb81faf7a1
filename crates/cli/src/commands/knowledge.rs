//! `gaian-archive knowledge` — Inspect or edit the knowledge base.

use clap::Subcommand;

use gaian_config::AppConfig;

#[derive(Subcommand)]
pub enum KnowledgeAction {
    /// Print the knowledge base as pretty JSON
    Show,

    /// Insert or replace one entry (file backend only)
    Upsert {
        /// Entry key
        key: String,
        /// Entry value; parsed as JSON when possible, stored as a string otherwise
        value: String,
    },
}

pub async fn run(action: KnowledgeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = gaian_knowledge::build_from_config(&config)?;

    match action {
        KnowledgeAction::Show => {
            let map = store.read().await?;
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        KnowledgeAction::Upsert { key, value } => {
            if store.name() != "file" {
                return Err(
                    "knowledge upsert only supports the file backend; \
                     use the admin API for vector stores"
                        .into(),
                );
            }

            let value = serde_json::from_str(&value)
                .unwrap_or_else(|_| serde_json::Value::String(value));

            let mut map = store.read().await?;
            map.insert(key.clone(), value);
            store.write(&map).await?;

            println!("✅ Upserted '{key}' ({} entries total)", map.len());
        }
    }

    Ok(())
}
