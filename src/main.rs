//! `eb-devtools` 바이너리 진입점.

use eb_devtools::interface::cli::{Cli, CliAction};
use eb_devtools::interface::composition::AppComposition;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let action = Cli::parse_action();
    let composition = AppComposition::default();

    let result = match action {
        CliAction::Sign(options) => composition
            .sign_usecase()
            .and_then(|usecase| usecase.execute(&options))
            .map(|uri| println!("{uri}")),
        CliAction::InspectConfig => composition
            .inspect_config_usecase()
            .and_then(|usecase| usecase.execute())
            .map(|json| println!("{json}")),
        CliAction::WriteConfig(update) => composition
            .configure_usecase()
            .and_then(|mut usecase| usecase.execute(&update)),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
