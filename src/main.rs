use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use city_places::bot::{self, TelegramDelivery, Workflow};
use city_places::config::{Config, LogFormat};
use city_places::db::{self, DbPool};
use city_places::localization::init_localization;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

/// Flag the configured users as administrators, registering them if needed
async fn promote_admins(pool: &DbPool, admin_ids: &[i64]) -> Result<()> {
    for &user_id in admin_ids {
        if !db::user_exists(pool, user_id).await? {
            db::create_user(pool, user_id).await?;
        }
        db::set_admin(pool, user_id, true).await?;
        info!(user_id, "Administrator enabled");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    info!("Starting City Places Telegram Bot");

    init_localization()?;

    let pool = db::connect(&config.database_url).await?;
    db::init_database_schema(&pool).await?;
    promote_admins(&pool, &config.admin_ids).await?;

    let workflow = Arc::new(Workflow::new(pool).with_review_limit(config.review_limit));

    let bot = Bot::new(config.bot_token);
    let delivery = Arc::new(TelegramDelivery::new(bot.clone(), config.delivery));

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![workflow, delivery])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
