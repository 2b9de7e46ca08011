use std::io;
use std::sync::Arc;

use anyhow::Context;

use wakeword::settings::{ParseOutcome, Settings};
use wakeword::{output::Output, pipeline};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match Settings::parse_args(std::env::args_os())
        .context("parsing command line arguments")?
    {
        ParseOutcome::Run(settings) => settings,
        ParseOutcome::PrintAndExit0(message) => {
            eprintln!("{message}");
            return Ok(());
        }
    };

    log::info!(
        "starting wakeword pipeline: {} wake-word model(s), threshold={}, trigger_level={}, refractory={}",
        settings.wakeword_models.len(),
        settings.threshold,
        settings.trigger_level,
        settings.refractory
    );

    let output = Arc::new(Output::new());
    let result = pipeline::run(settings, io::stdin(), Arc::clone(&output));
    if let Err(ref e) = result {
        log::error!("pipeline terminated with an error: {e}");
    }
    result?;
    Ok(())
}
