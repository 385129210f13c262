//! CLI command handlers.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use story_core::api::ApiClient;
use story_core::app::{FlowError, StoryApp};
use story_core::auth::SessionStore;
use story_core::config::Config;
use story_core::locale::{Catalog, LocaleStore};
use story_core::notify::{ContainerNotifier, Notice, NoticeKind, Notifier, Presenter, ToastNotifier};
use story_core::signals::SignalBus;
use story_core::storage::{FileStorage, Storage};

pub mod auth;
pub mod config;
pub mod locale;
pub mod stories;

/// Wires the services against `$STORY_HOME`.
pub fn open_app(config: &Config) -> Result<StoryApp> {
    let storage: Arc<dyn Storage> =
        Arc::new(FileStorage::open_default().context("open persisted state")?);
    let session = SessionStore::new(Arc::clone(&storage));
    let client = Arc::new(ApiClient::from_config(config, session, SignalBus::new())?);
    let locale = Arc::new(LocaleStore::new(
        storage,
        Catalog::builtin(),
        config.default_locale,
    ));
    let toasts: Arc<dyn Notifier> = Arc::new(ToastNotifier::with_renderer(render_toast));

    tracing::debug!(base_url = client.base_url(), "services ready");
    Ok(StoryApp::new(&client, locale, Presenter::new(toasts)))
}

/// Toasts go to stderr for errors and stdout for successes.
fn render_toast(notice: &Notice) {
    match notice.kind {
        NoticeKind::Error => eprintln!("error: {}", notice.message),
        NoticeKind::Success => println!("{}", notice.message),
    }
}

/// Prints the inline notice a flow left behind, or turns it into the
/// command's error.
fn report<T>(form: &ContainerNotifier, outcome: Result<T, FlowError>) -> Result<T> {
    match outcome {
        Ok(value) => {
            if let Some(notice) = form.current() {
                println!("{}", notice.message);
            }
            Ok(value)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "flow failed");
            let message = form
                .current()
                .map_or_else(|| err.to_string(), |notice| notice.message);
            bail!("{message}")
        }
    }
}
