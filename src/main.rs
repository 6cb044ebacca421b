//! MegaRoki demo
//!
//! Plays one round of the memory-match game against a file-backed store,
//! then optionally loads the gallery.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mega_roki::{
    game::{achievements::AchievementsSummary, deck::Card, level::LevelId},
    EngineConfig, FileStore, GalleryAggregator, GalleryConfig, GameState, HttpCollection,
    MatchEngine, SessionDriver, SessionHandle, SharedStore, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("MegaRoki v{}", VERSION);

    let data_dir = std::env::var("ROKI_DATA_DIR").unwrap_or_else(|_| "./.roki".to_string());
    let store: SharedStore = Arc::new(
        FileStore::open(&data_dir).with_context(|| format!("opening data dir {data_dir}"))?,
    );
    info!("Data dir: {}", data_dir);

    demo_round(store.clone()).await?;

    if std::env::var("ROKI_GALLERY_ENABLED").is_ok_and(|v| v == "1") {
        demo_gallery().await?;
    }

    Ok(())
}

/// Autoplay the highest unlocked level by flipping known pairs.
async fn demo_round(store: SharedStore) -> Result<()> {
    let engine = MatchEngine::new(store.clone(), EngineConfig::from_env());
    let level: LevelId = engine
        .levels()
        .iter()
        .filter(|l| l.is_unlocked)
        .map(|l| l.id)
        .max()
        .unwrap_or(1);

    let session = SessionDriver::spawn(engine);
    let mut summary = AchievementsSummary::new(store);
    let mut changes = session.subscribe_medal_changes();

    info!("=== Playing level {} ===", level);
    let snapshot = session.start_level(level).await?;
    if !snapshot.game_state.is_playing() {
        bail!("level {level} did not start");
    }

    let outcome = autoplay(&session, snapshot.cards).await?;
    match outcome {
        GameState::Completed { success: true } => {
            let done = session.snapshot();
            info!(
                "Cleared level {} with {}s left: {}",
                level,
                done.last_time_remaining,
                done.earned_medal.display_name()
            );
            if done.earned_medal.is_earned() && summary.next_change(&mut changes).await {
                for tier in summary.ordered_medals() {
                    info!("  {:>9}: {}", tier.display_name(), summary.count(tier));
                }
            }
        }
        other => warn!("Round ended as {:?}", other),
    }

    session.shutdown().await?;
    Ok(())
}

async fn autoplay(session: &SessionHandle, cards: Vec<Card>) -> Result<GameState> {
    let mut remaining = cards;
    let mut state = GameState::Playing;

    while let Some(first) = remaining.pop() {
        let Some(pos) = remaining.iter().position(|c| c.content == first.content) else {
            bail!("unpaired card {}", first.content);
        };
        let second = remaining.swap_remove(pos);

        session.select_card(first.id).await?;
        state = session.select_card(second.id).await?.game_state;
        if !state.is_playing() {
            break;
        }
    }

    Ok(state)
}

async fn demo_gallery() -> Result<()> {
    let config = GalleryConfig::from_env();
    let source = HttpCollection::new(&config)?;
    let gallery = GalleryAggregator::new(Arc::new(source), &config);

    info!("=== Loading gallery from {} ===", config.base_url);
    gallery.load_if_needed().await;

    if let Some(message) = gallery.error_message() {
        warn!("Gallery unavailable: {}", message);
        return Ok(());
    }
    for item in gallery.items() {
        info!(
            "#{} {} ({})",
            item.id,
            item.title,
            item.artist.as_deref().unwrap_or("unknown artist")
        );
    }
    Ok(())
}
