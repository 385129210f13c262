//! Session command handlers.

use anyhow::{Result, bail};
use story_core::app::StoryApp;
use story_core::auth::mask_token;
use story_core::notify::ContainerNotifier;

use super::report;

pub async fn login(app: &StoryApp, email: &str, password: &str) -> Result<()> {
    let form = ContainerNotifier::new("login");
    let session = report(
        &form,
        app.submit_login(email, password, Some(&form)).await,
    )?;
    tracing::debug!(user = %session.user.name, "session stored");
    Ok(())
}

pub async fn logout(app: &StoryApp) -> Result<()> {
    app.logout().await
}

pub async fn register(app: &StoryApp, name: &str, email: &str, password: &str) -> Result<()> {
    let form = ContainerNotifier::new("register");
    report(
        &form,
        app.submit_register(name, email, password, Some(&form)).await,
    )?;
    Ok(())
}

pub fn whoami(app: &StoryApp) -> Result<()> {
    let Some(session) = app.auth().current_session().filter(|_| app.is_authenticated()) else {
        bail!("Not logged in. Run `story login` first.");
    };

    let user = &session.user;
    println!("{}", user.name);
    if let Some(email) = &user.email {
        println!("email: {email}");
    }
    if let Some(id) = &user.id {
        println!("id: {id}");
    }
    println!("token: {}", mask_token(&session.token));
    Ok(())
}
