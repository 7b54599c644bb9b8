use sparkle_admin::{Config, purge_expired_sessions, seed_admin};
use tracing_subscriber::EnvFilter;

enum Command {
    PurgeSessions,
    SeedAdmin,
}

impl Command {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "purge-sessions" => Some(Command::PurgeSessions),
            "seed-admin" => Some(Command::SeedAdmin),
            _ => None,
        }
    }
}

fn print_usage(bin_name: &str) {
    eprintln!("Usage: {bin_name} <purge-sessions|seed-admin>");
}

fn init_tracing(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "cron".to_string());
    let command = args.next().as_deref().and_then(Command::parse);

    let Some(command) = command.filter(|_| args.next().is_none()) else {
        print_usage(&bin_name);
        std::process::exit(2);
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.json_format);

    let outcome = match command {
        Command::PurgeSessions => purge_expired_sessions(&config)
            .await
            .map(|purged| format!("Expired session purge completed: sessions_removed={purged}")),
        Command::SeedAdmin => seed_admin(&config)
            .await
            .map(|outcome| {
                format!(
                    "Seed check completed: admin_created={} sample_reviews={}",
                    outcome.admin_created, outcome.sample_reviews
                )
            }),
    };

    match outcome {
        Ok(summary) => println!("{summary}"),
        Err(err) => {
            eprintln!("Cron job failed: {err}");
            std::process::exit(1);
        }
    }
}
