//! `gaian-archive doctor` — Diagnose configuration health.

use gaian_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Gaian Archive Doctor — Configuration Diagnostics");
    println!("===================================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration loaded");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            return Ok(());
        }
    };

    // Synthesis
    if config.openai.api_key.is_some() {
        println!("  ✅ Provider API key configured");
    } else {
        println!("  ⚠️  OPENAI_API_KEY not set — /api/chat will return errors");
        issues += 1;
    }

    if config.synthesis.strategy == "retrieval" && config.openai.vector_store_id.is_none() {
        println!("  ⚠️  Retrieval strategy selected but VECTOR_STORE_ID not set");
        issues += 1;
    }

    // Knowledge store
    if config.knowledge.backend == "vector" {
        if config.openai.vector_store_id.is_some() {
            println!("  ✅ Vector store configured");
        } else {
            println!("  ⚠️  Vector backend selected but VECTOR_STORE_ID not set");
            issues += 1;
        }
    } else if config.knowledge.file_path.exists() {
        println!(
            "  ✅ Knowledge file present: {}",
            config.knowledge.file_path.display()
        );
    } else {
        println!(
            "  ⚠️  Knowledge file missing (an empty base is served): {}",
            config.knowledge.file_path.display()
        );
        issues += 1;
    }

    // Admin + billing
    if config.admin_password.is_some() {
        println!("  ✅ Admin password configured");
    } else {
        println!("  ⚠️  ADMIN_PASSWORD not set — knowledge upserts disabled");
        issues += 1;
    }

    if config.stripe.secret_key.is_some() {
        println!("  ✅ Billing secret configured");
        if config.stripe.price_id.is_none() {
            println!("  ⚠️  STRIPE_PRICE_ID_PRO not set — checkout needs an explicit priceId");
            issues += 1;
        }
    } else {
        println!("  ⚠️  STRIPE_SECRET_KEY not set — billing endpoints disabled");
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
