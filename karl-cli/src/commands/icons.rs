//! Icons command - warm Material icon glyphs.

use super::common::{finish, KeyReport};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the icons command.
pub struct IconsArgs {
    pub names: Vec<String>,
}

/// Run the icons command.
pub fn run(runner: &CliRunner, args: IconsArgs) -> Result<(), CliError> {
    let preloader = runner.preloader();
    let style = &runner.config().icons;
    println!(
        "Preloading {} icon(s) with class '{}'",
        args.names.len(),
        style.icon_class
    );
    println!();

    let reports = runner.block_on(async {
        let requests: Vec<_> = args
            .names
            .iter()
            .map(|name| {
                let first = preloader.preload_icon(name.as_str());
                let second = preloader.preload_icon(name.as_str());
                (name, first, second)
            })
            .collect();

        let mut reports = Vec::with_capacity(requests.len());
        for (name, first, second) in requests {
            let report = match tokio::join!(first, second) {
                (Ok(icon), Ok(_)) => {
                    KeyReport::ok(name.as_str(), format!("{}-{}", style.marker_prefix, icon))
                }
                (Err(e), _) | (_, Err(e)) => KeyReport::failed(name.as_str(), e.to_string()),
            };
            reports.push(report);
        }
        reports
    });

    finish(&reports, preloader.metrics().snapshot())
}
