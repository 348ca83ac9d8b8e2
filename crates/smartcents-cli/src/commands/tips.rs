//! Mentor tip command

use anyhow::Result;
use smartcents_core::{generate_tip_with_fallback, TipClient};

use super::App;

pub async fn cmd_tip(app: &App, tips: &TipClient) -> Result<()> {
    // Records are read up front; the generator never touches the store
    let request = app.tip_request()?;
    let generated = generate_tip_with_fallback(tips, &request).await;

    println!();
    println!("💡 {}", generated.tip);
    if generated.fallback {
        println!("   (rule-based tip; {} backend unavailable)", tips.backend_name());
    } else {
        println!("   ({})", generated.model);
    }

    Ok(())
}
