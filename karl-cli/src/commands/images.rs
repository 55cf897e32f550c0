//! Images command - preload image sources and report the outcome.

use tracing::debug;

use super::common::{finish, KeyReport};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the images command.
pub struct ImagesArgs {
    pub sources: Vec<String>,
}

/// Run the images command.
///
/// Every source is requested twice before anything is awaited, so the
/// second request of each pair joins the first.
pub fn run(runner: &CliRunner, args: ImagesArgs) -> Result<(), CliError> {
    let preloader = runner.preloader();
    println!("Preloading {} image source(s)", args.sources.len());
    println!();

    let reports = runner.block_on(async {
        let requests: Vec<_> = args
            .sources
            .iter()
            .map(|source| {
                let first = preloader.preload(source.as_str());
                let second = preloader.preload(source.as_str());
                (source, first.ptr_eq(&second), first, second)
            })
            .collect();

        let mut reports = Vec::with_capacity(requests.len());
        for (source, shared, first, second) in requests {
            let (first, second) = tokio::join!(first, second);
            debug!(source = %source, shared, "Preload pair settled");

            let report = match (first, second) {
                (Ok(handle), Ok(_)) => {
                    let detail = match handle.image() {
                        Some(image) => format!("{}x{}", image.width(), image.height()),
                        None => "already cached".to_string(),
                    };
                    KeyReport::ok(source.as_str(), with_sharing(detail, shared))
                }
                (Err(e), _) | (_, Err(e)) => KeyReport::failed(source.as_str(), e.to_string()),
            };
            reports.push(report);
        }
        reports
    });

    finish(&reports, preloader.metrics().snapshot())
}

fn with_sharing(detail: String, shared: bool) -> String {
    if shared {
        format!("{} (second request joined)", detail)
    } else {
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_sharing() {
        assert_eq!(with_sharing("4x4".into(), false), "4x4");
        assert_eq!(
            with_sharing("4x4".into(), true),
            "4x4 (second request joined)"
        );
    }
}
