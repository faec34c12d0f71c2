use std::env;

use queuelens::config::Config;
use queuelens::jobs::SnapshotAssembler;
use queuelens::store::RedisConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
        std::process::exit(2);
    }

    let cfg = Config::from_env()?;
    let connector = RedisConnector::new(&cfg.redis_url)?;
    let snapshots = SnapshotAssembler::new(connector, cfg.snapshot_config());

    match args[1].as_str() {
        "snapshot" => {
            let snapshot = snapshots.build_snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "pending" => {
            let n = snapshots.pending_count().await?;
            println!("{n}");
        }
        other => {
            eprintln!("Unknown command: {other}");
            usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

fn usage() {
    eprintln!(
        "queuelensctl <command>\n\
         Commands:\n\
         - snapshot   print the current dashboard snapshot as JSON\n\
         - pending    print the number of queued jobs\n\
         \n\
         Uses QUEUELENS_REDIS_URL or REDIS_URL.\n"
    );
}
