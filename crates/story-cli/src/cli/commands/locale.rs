//! Locale command handlers.

use anyhow::{Result, bail};
use story_core::app::StoryApp;
use story_core::locale::Locale;

pub fn get(app: &StoryApp) {
    println!("{}", app.locale().get_locale());
}

pub fn set(app: &StoryApp, tag: &str) -> Result<()> {
    if !app.locale().set_locale(tag) {
        let supported: Vec<&str> = Locale::all().iter().map(|locale| locale.tag()).collect();
        bail!("Unsupported locale: {tag} (supported: {})", supported.join(", "));
    }
    println!("{}", app.locale().get_locale());
    Ok(())
}

pub fn message(app: &StoryApp, key: &str) {
    println!("{}", app.locale().get_message(key));
}
