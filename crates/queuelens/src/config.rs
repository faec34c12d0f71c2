// Config is the one place runtime settings come from.

// Values are read from the environment (and .env) once at startup
// and handed to whoever needs them; nothing here is global.

// Every key has a QUEUELENS_ name and, where it makes sense, a plain
// fallback name so existing REDIS_URL style setups keep working.

use crate::jobs::snapshot::SnapshotConfig;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8999";
pub const DEFAULT_SCAN_COUNT: usize = 100;
pub const DEFAULT_MAX_HISTORY: usize = 50;

// Naming owned by the job runner that writes the records.
pub const DEFAULT_RESULT_KEY_PREFIX: &str = "arq:result:";
pub const DEFAULT_QUEUE_NAME: &str = "arq:queue";

#[derive(Clone, Debug)]
pub struct Config {
    // where the job runner keeps its queue and results
    pub redis_url: String,
    // address the dashboard binds to
    pub listen_addr: String,
    // keys requested from the one SCAN pass per request
    pub scan_count: usize,
    // rows returned per snapshot
    pub max_history: usize,
    // result keys look like <prefix><job_id>
    pub result_key_prefix: String,
    // sorted set holding jobs that have not started yet
    pub queue_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // .env is optional; real env vars win over it
        dotenvy::dotenv().ok();

        let redis_url = env_or_fallback("QUEUELENS_REDIS_URL", "REDIS_URL")
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        if !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
            && !redis_url.starts_with("redis+unix://")
            && !redis_url.starts_with("unix://")
        {
            anyhow::bail!("QUEUELENS_REDIS_URL must be a redis:// URL, got {redis_url}");
        }

        let listen_addr = env_or_fallback("QUEUELENS_LISTEN_ADDR", "LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        // bad numbers fall back to the default instead of failing startup
        let scan_count = parse_count(
            env_or_fallback("QUEUELENS_SCAN_COUNT", "SCAN_COUNT"),
            DEFAULT_SCAN_COUNT,
        );

        let max_history = parse_count(
            env_or_fallback("QUEUELENS_MAX_HISTORY", "MAX_HISTORY"),
            DEFAULT_MAX_HISTORY,
        );

        let result_key_prefix = env_non_empty("QUEUELENS_RESULT_KEY_PREFIX")
            .unwrap_or_else(|| DEFAULT_RESULT_KEY_PREFIX.to_string());

        let queue_name = env_non_empty("QUEUELENS_QUEUE_NAME")
            .unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string());

        Ok(Self {
            redis_url,
            listen_addr,
            scan_count,
            max_history,
            result_key_prefix,
            queue_name,
        })
    }

    // The assembler only needs the store naming and the two budgets.
    pub fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig {
            scan_count: self.scan_count,
            max_history: self.max_history,
            result_key_prefix: self.result_key_prefix.clone(),
            queue_name: self.queue_name.clone(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    env_non_empty(primary).or_else(|| env_non_empty(fallback))
}

fn parse_count(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .max(1)
}
