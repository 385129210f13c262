//! Application controller: page state, feed, and the submission flows.
//!
//! Every flow runs validate, submit, persist, notify. At most one
//! submission is outstanding; the in-flight flag is released on every exit
//! path by [`InFlight`]'s drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthService, Profile, Session};
use crate::locale::LocaleStore;
use crate::notify::{NoticeKind, Notifier, Presenter};
use crate::signals::{Signal, SignalBus};
use crate::stories::{
    CreatedStory, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, NewStory, Photo, StoryClient, StoryEntry,
};
use crate::validation::{
    Field, Rule, ValidationErrors, validate_login, validate_registration, validate_story,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Login,
    Register,
    AddStory,
    About,
}

impl Page {
    pub fn route(self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Login => "/login",
            Page::Register => "/register",
            Page::AddStory => "/add",
            Page::About => "/about",
        }
    }
}

/// Why a submission flow did not complete.
#[derive(Debug)]
pub enum FlowError {
    /// Another submission is still outstanding.
    Busy,
    /// The flow needs a logged-in user.
    LoginRequired,
    Invalid(ValidationErrors),
    /// The API call failed; carries the classified error that was shown.
    Api(ApiError),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::Busy => f.write_str("A previous request is still in progress"),
            FlowError::LoginRequired => f.write_str("Please login to add a story"),
            FlowError::Invalid(errors) => write!(f, "{errors}"),
            FlowError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Invalid(errors) => Some(errors),
            FlowError::Api(err) => Some(err),
            FlowError::Busy | FlowError::LoginRequired => None,
        }
    }
}

/// Holds the in-flight flag for the lifetime of one submission.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct AppState {
    page: Page,
    is_authenticated: bool,
    stories: Vec<StoryEntry>,
}

pub struct StoryApp {
    auth: AuthService,
    feed: StoryClient,
    locale: Arc<LocaleStore>,
    presenter: Presenter,
    signals: SignalBus,
    receiver: tokio::sync::Mutex<Receiver<Signal>>,
    state: Mutex<AppState>,
    in_flight: AtomicBool,
}

impl StoryApp {
    pub fn new(client: &Arc<ApiClient>, locale: Arc<LocaleStore>, presenter: Presenter) -> Self {
        let signals = client.signals().clone();
        let receiver = signals.subscribe();
        let auth = AuthService::new(Arc::clone(client));
        let state = AppState {
            is_authenticated: auth.is_authenticated(),
            ..AppState::default()
        };

        Self {
            auth,
            feed: StoryClient::new(Arc::clone(client)),
            locale,
            presenter,
            signals,
            receiver: tokio::sync::Mutex::new(receiver),
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn story_client(&self) -> &StoryClient {
        &self.feed
    }

    pub fn locale(&self) -> &LocaleStore {
        &self.locale
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn page(&self) -> Page {
        self.state().page
    }

    pub fn navigate(&self, page: Page) {
        tracing::debug!(route = page.route(), "navigate");
        self.state().page = page;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.auth.current_user()
    }

    /// Stories currently loaded into the feed.
    pub fn stories(&self) -> Vec<StoryEntry> {
        self.state().stories.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reloads the feed. Without a session the feed is empty and no request
    /// is made.
    ///
    /// # Errors
    /// Returns the classified error, which has also been shown globally.
    pub async fn load_stories(&self) -> Result<Vec<StoryEntry>, ApiError> {
        if !self.is_authenticated() {
            self.state().stories.clear();
            return Ok(Vec::new());
        }

        match self
            .feed
            .list(DEFAULT_PAGE, DEFAULT_PAGE_SIZE, false)
            .await
        {
            Ok(stories) => {
                self.state().stories.clone_from(&stories);
                Ok(stories)
            }
            Err(err) => {
                let shown = self.presenter.show_error_to_user(&err, None);
                self.pump_signals().await;
                Err(shown)
            }
        }
    }

    /// # Errors
    /// See [`FlowError`]. Failures are also shown in `form` (or globally).
    pub async fn submit_login(
        &self,
        email: &str,
        password: &str,
        form: Option<&dyn Notifier>,
    ) -> Result<Session, FlowError> {
        let _guard = self.begin(form)?;
        self.check(validate_login(email, password), form)?;

        let session = match self.auth.login(email.trim(), password).await {
            Ok(session) => session,
            Err(err) => return Err(self.fail(&err, form).await),
        };

        self.presenter
            .show_success_message(&self.locale.get_message("login-success"), form);
        self.navigate(Page::Dashboard);
        self.signals.emit(Signal::LoginSucceeded);
        self.pump_signals().await;
        Ok(session)
    }

    /// # Errors
    /// See [`FlowError`]. Failures are also shown in `form` (or globally).
    pub async fn submit_register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        form: Option<&dyn Notifier>,
    ) -> Result<Profile, FlowError> {
        let _guard = self.begin(form)?;
        self.check(validate_registration(name, email, password), form)?;

        let profile = match self
            .auth
            .register(name.trim(), email.trim(), password)
            .await
        {
            Ok(profile) => profile,
            Err(err) => return Err(self.fail(&err, form).await),
        };

        self.presenter
            .show_success_message(&self.locale.get_message("register-success"), form);
        self.navigate(Page::Login);
        Ok(profile)
    }

    /// Publishes a story. Guests post through the guest endpoint; members
    /// must be logged in.
    ///
    /// # Errors
    /// See [`FlowError`]. Failures are also shown in `form` (or globally).
    pub async fn submit_story(
        &self,
        description: &str,
        photo: Option<Photo>,
        location: Option<(f64, f64)>,
        as_guest: bool,
        form: Option<&dyn Notifier>,
    ) -> Result<CreatedStory, FlowError> {
        let _guard = self.begin(form)?;
        if !as_guest && !self.is_authenticated() {
            self.notify_error(&self.locale.get_message("login-required"), form);
            return Err(FlowError::LoginRequired);
        }
        self.check(validate_story(description, photo.as_ref()), form)?;

        let Some(photo) = photo else {
            return Err(FlowError::Invalid(ValidationErrors::single(
                Field::Photo,
                Rule::Required,
            )));
        };
        let mut story = NewStory::new(description, photo).map_err(FlowError::Invalid)?;
        if let Some((lat, lon)) = location {
            story = story.with_location(lat, lon);
        }

        let result = if as_guest {
            self.feed.create_as_guest(&story).await
        } else {
            self.feed.create(&story).await
        };
        let created = match result {
            Ok(created) => created,
            Err(err) => return Err(self.fail(&err, form).await),
        };

        self.presenter
            .show_success_message(&self.locale.get_message("story-added"), form);
        self.navigate(Page::Dashboard);
        // The story is published even if the reload fails; load_stories shows why.
        if let Err(err) = self.load_stories().await {
            tracing::debug!(error = %err, "feed reload after submission failed");
        }
        Ok(created)
    }

    /// Clears the session and announces the logout.
    ///
    /// # Errors
    /// Returns an error if the cleared session cannot be persisted.
    pub async fn logout(&self) -> anyhow::Result<()> {
        self.auth.logout()?;
        self.signals.emit(Signal::LoggedOut);
        self.pump_signals().await;
        self.presenter
            .show_success_message(&self.locale.get_message("logout-success"), None);
        Ok(())
    }

    /// Applies one signal to the app state.
    pub async fn handle_signal(&self, signal: &Signal) {
        tracing::debug!(?signal, "handling signal");
        match signal {
            Signal::LoginSucceeded => {
                self.state().is_authenticated = true;
                if let Err(err) = Box::pin(self.load_stories()).await {
                    tracing::debug!(error = %err, "feed reload after login failed");
                }
            }
            Signal::LoggedOut => {
                let mut state = self.state();
                state.is_authenticated = false;
                state.stories.clear();
            }
            Signal::AuthFailed { .. } => {
                let mut state = self.state();
                state.is_authenticated = false;
                state.stories.clear();
                state.page = Page::Login;
            }
        }
    }

    /// Handles every signal queued since the last call. Returns how many were
    /// handled.
    pub async fn pump_signals(&self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.receiver.lock().await.try_recv();
            match next {
                Ok(signal) => {
                    Box::pin(self.handle_signal(&signal)).await;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "signal receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        handled
    }

    fn begin(&self, form: Option<&dyn Notifier>) -> Result<InFlight<'_>, FlowError> {
        InFlight::acquire(&self.in_flight).ok_or_else(|| {
            self.notify_error(&self.locale.get_message("submission-in-progress"), form);
            FlowError::Busy
        })
    }

    fn check(
        &self,
        outcome: Result<(), ValidationErrors>,
        form: Option<&dyn Notifier>,
    ) -> Result<(), FlowError> {
        outcome.map_err(|errors| {
            let messages = errors.messages(|key| self.locale.get_message(key));
            self.notify_error(&messages.join("\n"), form);
            FlowError::Invalid(errors)
        })
    }

    async fn fail(&self, err: &ApiError, form: Option<&dyn Notifier>) -> FlowError {
        let shown = self.presenter.show_error_to_user(err, form);
        self.pump_signals().await;
        FlowError::Api(shown)
    }

    fn notify_error(&self, message: &str, form: Option<&dyn Notifier>) {
        form.unwrap_or(self.presenter.global())
            .present(NoticeKind::Error, message);
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StoryApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryApp")
            .field("state", &*self.state())
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}
