//! Story command handlers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use story_core::api::ApiError;
use story_core::app::{FlowError, StoryApp};
use story_core::dates::{format_readable, relative_time_from};
use story_core::notify::ContainerNotifier;
use story_core::stories::{Photo, StoryEntry};

use super::report;

/// Presents an API failure inline and wraps the classified error.
fn shown(app: &StoryApp, form: &ContainerNotifier, err: &ApiError) -> FlowError {
    FlowError::Api(app.presenter().show_error_to_user(err, Some(form)))
}

fn require_login(app: &StoryApp) -> Result<()> {
    if !app.is_authenticated() {
        bail!("Not logged in. Run `story login` first.");
    }
    Ok(())
}

pub async fn list(app: &StoryApp, page: u32, size: u32, location: bool, json: bool) -> Result<()> {
    require_login(app)?;

    let form = ContainerNotifier::new("stories");
    let outcome = app.story_client().list(page, size, location).await;
    let entries = report(&form, outcome.map_err(|err| shown(app, &form, &err)))?;

    if json {
        let out = serde_json::to_string_pretty(&entries).context("serialize stories")?;
        println!("{out}");
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", app.locale().get_message("no-stories"));
        return Ok(());
    }

    let locale = app.locale().get_locale();
    let now = Utc::now();
    for entry in &entries {
        println!(
            "{}  {}  ({})",
            entry.id,
            entry.name,
            relative_time_from(&entry.created_at, now, locale)
        );
        println!("    {}", entry.description);
    }
    Ok(())
}

pub async fn show(app: &StoryApp, id: &str) -> Result<()> {
    require_login(app)?;

    let form = ContainerNotifier::new("story");
    let outcome = app.story_client().get(id).await;
    let entry = report(&form, outcome.map_err(|err| shown(app, &form, &err)))?;
    print_entry(app, &entry);
    Ok(())
}

fn print_entry(app: &StoryApp, entry: &StoryEntry) {
    let locale = app.locale().get_locale();
    println!("{}", entry.name);
    println!("{}", format_readable(&entry.created_at, locale));
    println!();
    println!("{}", entry.description);
    println!();
    println!("{}: {}", app.locale().get_message("photo"), entry.photo_url);
    if let Some((lat, lon)) = entry.location() {
        println!("lat {lat}, lon {lon}");
    }
}

pub async fn add(
    app: &StoryApp,
    description: &str,
    photo: &Path,
    location: Option<(f64, f64)>,
    guest: bool,
) -> Result<()> {
    let photo = Photo::from_path(photo)?;
    let form = ContainerNotifier::new("add-story");
    let created = report(
        &form,
        app.submit_story(description, Some(photo), location, guest, Some(&form))
            .await,
    )?;
    if let Some(entry) = created.story {
        print_entry(app, &entry);
    }
    Ok(())
}
