use config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub api: ApiSettings,
    pub receiving: ReceivingSettings,
    // 账号与关注列表来自配置文件，环境变量不提供数组默认值
    #[serde(default)]
    pub accounts: Vec<AccountSettings>,
    #[serde(default)]
    pub lists: Vec<ListSettings>,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

#[derive(Deserialize, Clone)]
pub struct ReceivingSettings {
    pub message_interval_secs: u64,
    pub list_member_interval_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct AccountSettings {
    pub id: i64,
    pub screen_name: String,
    pub token: String,
}

#[derive(Deserialize, Clone)]
pub struct ListSettings {
    pub account_id: i64,
    pub owner_screen_name: String,
    pub slug: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_map = collect_env_vars();

        let s = config::Config::builder()
            .set_default("database.url", "sqlite://data/volery.db")?
            .set_default("api.base_url", "https://api.example.org/1.1")?
            .set_default("receiving.message_interval_secs", 90)?
            .set_default("receiving.list_member_interval_secs", 1800)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(config::File::from_str(
                &serde_json::to_string(&env_map)
                    .expect("Environment variables should serialize to JSON"),
                config::FileFormat::Json,
            ))
            .build()?;

        s.try_deserialize()
    }
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("VOLERY_"))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches("VOLERY_")
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}
