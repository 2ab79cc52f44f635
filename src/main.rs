use clap::Parser;
use color_eyre::eyre::Result;
use log::*;

use labtail_release::{
    ReleaseWorkflow, cli, readme::FsFileEditor, runner::SystemCommandRunner,
};

fn initialize_logger(debug: bool) -> labtail_release::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("labtail_release")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    info!("Releasing ...");

    let workflow = ReleaseWorkflow::new(
        cli_args.release_config(),
        SystemCommandRunner::new(),
        FsFileEditor,
    )?;

    let outcome = workflow.run().inspect_err(|_| {
        error!("Releasing ... Fatal error!");
    })?;

    if let Some(summary) = outcome.summary(cli_args.dry) {
        if outcome.is_success() {
            info!("{summary}");
        } else {
            error!("{summary}");
        }
    }

    Ok(())
}
