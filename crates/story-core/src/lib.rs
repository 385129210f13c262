//! Story client core (API client, session, locale, notices).

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod locale;
pub mod notify;
pub mod push;
pub mod signals;
pub mod storage;
pub mod stories;
pub mod validation;
