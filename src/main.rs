use clap::Parser;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use sqlx::postgres::PgPoolOptions;

mod models;
mod repositories;
pub mod services;
pub mod settings;

#[derive(Parser)]
#[command(name = "regard-ledger", about = "Investment/referral platform backend")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

fn init_logging() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(
            Root::builder()
                .appender("stdout")
                .build(log::LevelFilter::Info),
        )
        .expect("Could not build logging config.");

    log4rs::init_config(config).expect("Could not initialize logging.");
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = settings::Settings::new(&cli.config).expect("Could not load config file.");
    let conn = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await
        .expect("Could not connect to database.");

    log::info!("Starting services.");
    services::start_services(conn, config)
        .await
        .expect("Could not start services.");
}
