use anyhow::Result;

use ytrelay_gateway::AppState;

pub async fn subscribe(state: &AppState, channel_id: &str) -> Result<()> {
    let sub = state.manager.create(channel_id).await?;
    println!(
        "Subscribed to {} (expires {})",
        sub.channel_id,
        sub.expires_at.to_rfc3339()
    );
    Ok(())
}

pub async fn unsubscribe(state: &AppState, channel_id: &str) -> Result<()> {
    state.manager.remove(channel_id).await?;
    println!("Unsubscribed from {channel_id}");
    Ok(())
}

pub async fn list(state: &AppState, json: bool) -> Result<()> {
    let summary = state.manager.list().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.subscriptions.is_empty() {
        println!("No subscriptions.");
        return Ok(());
    }
    for s in &summary.subscriptions {
        println!(
            "{:<26} {:<8} {}  ({:+.2} days)",
            s.channel_id,
            s.status,
            s.expires_at.to_rfc3339(),
            s.days_until_expiry
        );
    }
    println!(
        "\n{} total, {} active, {} expired",
        summary.total, summary.active, summary.expired
    );
    Ok(())
}

/// One renewal pass; prints the summary as JSON. Fails on storage errors so
/// cron sees a non-zero exit.
pub async fn renew(state: &AppState) -> Result<()> {
    let summary = state.renewal.run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
