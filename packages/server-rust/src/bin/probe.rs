//! `authbridge-probe`: exercises delegate isolation under concurrency.
//!
//! Registers the in-memory basic provider, then runs several threads that
//! each authenticate against their own callback handler. Every thread gets
//! its own wrapped server config from the bridge; the provider and the
//! stand-in handler it was given are shared by all of them. Exits non-zero if
//! any authentication reached the wrong handler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use authbridge_core::{AuthStatus, MessageInfo, Subject, Value};
use authbridge_server::provider::basic::{PASSWORD_PROPERTY, USERNAME_PROPERTY};
use authbridge_server::provider::{BasicAuthConfigProvider, IdentityCallbackHandler};
use authbridge_server::telemetry::init_tracing;
use authbridge_server::{AuthBridge, BridgeConfig};
use clap::Parser;

const APP_CONTEXT: &str = "/probe";

#[derive(Parser)]
#[command(name = "authbridge-probe", version, about = "Delegate isolation probe")]
struct Args {
    /// Number of concurrent threads.
    #[arg(long, default_value_t = 8)]
    threads: usize,

    /// Authentications per thread.
    #[arg(long, default_value_t = 1000)]
    iterations: usize,

    /// JSON bridge configuration file.
    #[arg(long, env = "AUTHBRIDGE_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };
    config.log.json |= args.json_logs;
    init_tracing(&config.log)?;

    let bridge = AuthBridge::new(config);
    bridge.register(
        Arc::new(BasicAuthConfigProvider::new()),
        APP_CONTEXT,
        Some("probe"),
    );

    let mismatches = AtomicUsize::new(0);
    std::thread::scope(|scope| -> Result<()> {
        let mut workers = Vec::with_capacity(args.threads);
        for index in 0..args.threads {
            let bridge = &bridge;
            let mismatches = &mismatches;
            workers.push(scope.spawn(move || {
                run_worker(bridge, index, args.iterations, mismatches)
            }));
        }
        for worker in workers {
            match worker.join() {
                Ok(result) => result?,
                Err(_) => bail!("probe worker panicked"),
            }
        }
        Ok(())
    })?;

    let mismatches = mismatches.load(Ordering::Relaxed);
    let total = args.threads * args.iterations;
    if mismatches > 0 {
        tracing::error!(mismatches, total, "callbacks reached the wrong handler");
        bail!("{mismatches} of {total} authentications reached the wrong handler");
    }
    tracing::info!(threads = args.threads, total, "all authentications stayed on their own handler");
    Ok(())
}

fn run_worker(
    bridge: &AuthBridge,
    index: usize,
    iterations: usize,
    mismatches: &AtomicUsize,
) -> Result<()> {
    let username = format!("user-{index}");
    let password = format!("secret-{index}");
    let real = Arc::new(IdentityCallbackHandler::new().with_user(&username, &password, ["probe"]));

    let Some(config) = bridge.server_auth_config(APP_CONTEXT, real.clone())? else {
        bail!("no provider registered for {APP_CONTEXT}");
    };

    for _ in 0..iterations {
        let mut message = MessageInfo::new(Value::Null)
            .with_property(USERNAME_PROPERTY, username.as_str())
            .with_property(PASSWORD_PROPERTY, password.as_str());
        let id = config.get_auth_context_id(&message);
        let Some(context) = config.get_auth_context(id.as_deref(), None, &Default::default())?
        else {
            bail!("provider returned no auth context");
        };

        let mut subject = Subject::new();
        let status = context.validate_request(&mut message, &mut subject, None)?;
        let established = real.established().map(|identity| identity.principal);
        if status != AuthStatus::Success || established.as_deref() != Some(username.as_str()) {
            tracing::warn!(thread = index, ?status, ?established, "mismatched authentication");
            mismatches.fetch_add(1, Ordering::Relaxed);
        }
        context.clean_subject(&message, &mut subject)?;
    }
    Ok(())
}
