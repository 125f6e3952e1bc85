use community_events::cli::Args;
use community_events::commands;
use community_events::config::AppConfig;
use community_events::database_factory::{DatabaseConfig, DatabaseFactory};
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_args();
    let override_date = match args.validate_override_date() {
        Ok(date) => date,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let config = AppConfig::load();

    let mut db_config = DatabaseConfig::builder().override_date(override_date);
    if args.test {
        db_config = db_config.test_mode();
    }
    db_config = match &args.db_path {
        Some(path) => db_config.path(path.to_string_lossy()),
        None => db_config.path(config.database_path.clone()),
    };

    let db = match DatabaseFactory::create(db_config.build()) {
        Ok(db) => db,
        Err(e) => {
            error!("Error opening database: {}", e);
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = commands::execute(args.command, db, &config, &mut stdout) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
