//! Story feed: listing, detail, and creation (member or guest).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{ApiClient, ApiError, ApiResult, RequestOptions};
use crate::validation::{ValidationErrors, validate_story};

/// Feed page loaded by default.
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A published story as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl StoryEntry {
    pub fn location(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

/// Image attached to a new story.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a photo from disk, sniffing its MIME type from the content and
    /// falling back to the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read photo {}", path.display()))?;
        let mime_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .or_else(|| mime_type_for_extension(path))
            .unwrap_or("application/octet-stream");
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo")
            .to_string();

        Ok(Self::new(file_name, mime_type, bytes))
    }
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn mime_type_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A validated story submission.
///
/// Only constructible through [`NewStory::new`], so the description is never
/// blank and the photo is always an image within the size limit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStory {
    description: String,
    photo: Photo,
    location: Option<(f64, f64)>,
}

impl NewStory {
    /// # Errors
    /// Returns every violated form rule.
    pub fn new(description: &str, photo: Photo) -> Result<Self, ValidationErrors> {
        validate_story(description, Some(&photo))?;
        Ok(Self {
            description: description.trim().to_string(),
            photo,
            location: None,
        })
    }

    #[must_use]
    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some((lat, lon));
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    fn to_form(&self) -> ApiResult<Form> {
        let photo = Part::bytes(self.photo.bytes.clone())
            .file_name(self.photo.file_name.clone())
            .mime_str(&self.photo.mime_type)
            .map_err(|err| ApiError::unknown(err.to_string()).with_original(err))?;

        let mut form = Form::new()
            .text("description", self.description.clone())
            .part("photo", photo);
        if let Some((lat, lon)) = self.location {
            form = form.text("lat", lat.to_string()).text("lon", lon.to_string());
        }
        Ok(form)
    }
}

/// Result of a story submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedStory {
    /// Acknowledgement text from the API.
    #[serde(default)]
    pub message: String,
    /// The created entry, when the API returns one.
    #[serde(default)]
    pub story: Option<StoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    list_story: Vec<StoryEntry>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    story: StoryEntry,
}

pub struct StoryClient {
    client: Arc<ApiClient>,
}

impl StoryClient {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetches one page of the feed.
    ///
    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call.
    pub async fn list(
        &self,
        page: u32,
        size: u32,
        include_location: bool,
    ) -> ApiResult<Vec<StoryEntry>> {
        let options = RequestOptions::default()
            .query("page", page)
            .query("size", size)
            .query("location", u8::from(include_location));
        let response: ListResponse = self
            .client
            .request_json(Method::GET, "/stories", options)
            .await?;

        tracing::debug!(page, size, count = response.list_story.len(), "stories fetched");
        Ok(response.list_story)
    }

    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call.
    pub async fn get(&self, id: &str) -> ApiResult<StoryEntry> {
        let response: DetailResponse = self
            .client
            .request_json(Method::GET, &story_path(id)?, RequestOptions::default())
            .await?;
        Ok(response.story)
    }

    /// Publishes a story as the logged-in user.
    ///
    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call.
    pub async fn create(&self, story: &NewStory) -> ApiResult<CreatedStory> {
        self.submit("/stories", story).await
    }

    /// Publishes a story without an account.
    ///
    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call.
    pub async fn create_as_guest(&self, story: &NewStory) -> ApiResult<CreatedStory> {
        self.submit("/stories/guest", story).await
    }

    async fn submit(&self, path: &str, story: &NewStory) -> ApiResult<CreatedStory> {
        let form = story.to_form()?;
        let created: CreatedStory = self
            .client
            .request_json(Method::POST, path, RequestOptions::multipart(form))
            .await?;

        tracing::info!(path, bytes = story.photo.bytes.len(), "story submitted");
        Ok(created)
    }
}

/// `/stories/{id}` with `id` encoded as a single path segment.
fn story_path(id: &str) -> ApiResult<String> {
    let mut url = Url::parse("http://localhost/stories")
        .map_err(|err| ApiError::unknown(err.to_string()).with_original(err))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::unknown("Story URL cannot carry path segments"))?
        .push(id);
    Ok(url.path().to_string())
}
