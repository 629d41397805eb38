mod cli;
mod env;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mirrorfetch_fetch::{FetchRequest, Fetcher, ReqwestClient};
use mirrorfetch_source::{SourceRequest, Sources};

use crate::cli::App;
use crate::cli::names;
use crate::env::Config;

fn main() -> ExitCode {
    logging::init();
    match run(App::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mirrorfetch: {}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(app: App) -> Result<()> {
    let config = Config::from_env().with_app(&app);
    let options = config.fetch_options(app.dry_run);
    let policy = app.policy();

    let client = ReqwestClient::new().context("cannot set up the HTTP client")?;
    let fetcher = Arc::new(Fetcher::new(client));
    let sources = Sources::standard(Arc::clone(&fetcher), Some(config.trust_store.clone()));

    let Some((first, rest)) = app.args.split_first() else {
        bail!("nothing to download");
    };

    if let Some(source) = sources.find(first) {
        for name in rest {
            let target = names::resolve(name, app.destdir.as_deref(), app.prefix.as_deref());
            let mut request = SourceRequest::new(target.name)
                .policy(policy)
                .options(options.clone());
            request.dir = target.dir;
            if let Some(beta) = &app.unicode_beta {
                request = request.unicode_beta(beta.clone());
            }
            let outcome = source.resolve_and_fetch(&request)?;
            tracing::debug!(source = source.name(), ?outcome, "done");
        }
        return Ok(());
    }

    let [url, name] = app.args.as_slice() else {
        bail!(
            "expected URL NAME or SOURCE NAME... (sources: {})",
            sources.names().collect::<Vec<_>>().join(", ")
        );
    };
    let mut request = FetchRequest::new(url.as_str())
        .name(name.as_str())
        .policy(policy)
        .options(options);
    request.dir = app.destdir.clone();
    let outcome = fetcher.download(&request)?;
    tracing::debug!(?outcome, "done");
    Ok(())
}

/// One diagnostic for the whole error chain, skipping causes already
/// spelled out by the message that wraps them.
fn diagnostic(err: &anyhow::Error) -> String {
    let mut message = err.to_string();
    for cause in err.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }
    message
}
