use std::{sync::Arc, time::Duration};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    types::AllowedUpdate, update_listeners::Polling,
};
use tracing::info;

use funnel_core::{
    channel::ChannelPort,
    config::Config,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    onboarding::Onboarding,
    store::SqliteStore,
};

use crate::{handlers, TelegramChannel, TelegramMessenger};

/// Slack on top of the long-poll timeout before the HTTP client gives up on a request.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub onboarding: Arc<Onboarding>,
}

/// Long-poll Telegram and feed updates to the onboarding dispatcher until Ctrl-C.
///
/// Errors are startup failures (HTTP client, token check); the caller decides whether
/// to retry.
pub async fn run_polling(cfg: Arc<Config>, store: SqliteStore) -> anyhow::Result<()> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(cfg.polling_timeout + HTTP_TIMEOUT_SLACK)
        .build()?;
    let bot = Bot::with_client(cfg.bot_token.clone(), client);

    let me = bot.get_me().await?;
    info!(
        username = %me.username(),
        base_chat_id = cfg.base_chat_id.0,
        admin = cfg.admin_id.is_some(),
        reports = cfg.report_chat_id.is_some(),
        "bot started"
    );

    // Broadcasts fan out to every subscriber; keep them under the flood limits.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));
    let channel: Arc<dyn ChannelPort> = Arc::new(TelegramChannel::new(bot.clone()));

    let state = Arc::new(AppState {
        onboarding: Arc::new(Onboarding::new(cfg.clone(), store, messenger, channel)),
    });

    let listener = Polling::builder(bot.clone())
        .timeout(cfg.polling_timeout)
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
        .build();

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        // One worker: updates are handled strictly in arrival order.
        .distribution_function(|_| Some(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    info!("polling stopped");
    Ok(())
}
