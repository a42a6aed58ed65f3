//! flipperctl binary entry point.

use clap::Parser;

use flipperctl_cli::app::FlipperCli;
use flipperctl_cli::cli::CliArgs;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let app = match FlipperCli::from_args(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("flipperctl: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run(args).await {
        eprintln!("flipperctl: {e}");
        std::process::exit(1);
    }
}
