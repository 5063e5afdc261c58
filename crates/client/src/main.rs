mod config;

use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{debug, error, info};

use config::Settings;
use domain::{Account, AccountId, ListDescriptor};
use receiving::{ReceiveManager, ReceiveSettings, RestClient, SettingsHandle, StatusInbox};
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let db = Db::new(&settings.database.url).await?;

    let (inbox, mut rx_inbox) = StatusInbox::channel();

    let intervals = SettingsHandle::new(ReceiveSettings {
        message_interval_secs: settings.receiving.message_interval_secs,
        list_member_interval_secs: settings.receiving.list_member_interval_secs,
    });

    let manager = Arc::new(ReceiveManager::new(
        intervals,
        Arc::new(db.clone()),
        inbox,
    ));

    // inbox 消费者：落库，按 id 去重
    let db_for_drain = db.clone();
    tokio::spawn(async move {
        while let Some(item) = rx_inbox.recv().await {
            match db_for_drain.store_message(item.account, &item.message).await {
                Ok(true) => info!(
                    account = %item.account,
                    id = item.message.id,
                    "stored direct message"
                ),
                Ok(false) => debug!(id = item.message.id, "duplicate message skipped"),
                Err(e) => error!("failed to store message {}: {e:?}", item.message.id),
            }
        }
    });

    // 变更事件目前只记日志，渲染层接上后走这里
    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "receive event");
        }
    });

    for account_settings in &settings.accounts {
        let account = Account {
            id: AccountId(account_settings.id),
            screen_name: account_settings.screen_name.clone(),
            access_token: account_settings.token.clone(),
        };
        let gateway = Arc::new(RestClient::new(&settings.api.base_url, account.clone()));

        manager.track_account(account.clone(), gateway.clone()).await;

        for list in settings
            .lists
            .iter()
            .filter(|l| l.account_id == account_settings.id)
        {
            let descriptor = ListDescriptor {
                owner_screen_name: list.owner_screen_name.clone(),
                slug: list.slug.clone(),
            };
            manager
                .watch_list(account.id, descriptor, gateway.clone())
                .await;
        }
    }

    info!(
        "Receiving started: {} accounts, {} watched lists",
        settings.accounts.len(),
        settings.lists.len()
    );

    shutdown_signal().await;
    manager.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
