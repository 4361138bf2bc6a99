use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::{ApiError, App, NotFoundSnafu, StoreSnafu};
use crate::auth::Identity;
use crate::blob::{BlobStore, UploadError};
use crate::error::ValidationError;
use crate::prelude::*;
use crate::rating::Rating;
use crate::video::Video;

/// Multipart field that carries the uploaded file.
pub const FILE_FIELD: &str = "file";

/// A video as clients see it, keyed by the bare record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoView {
    pub id: String,
    pub filename: String,
    pub filepath: String,
    pub user: String,
    pub likes: u64,
    pub ratings: Vec<u8>,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
}

impl From<Video> for VideoView {
    fn from(video: Video) -> Self {
        VideoView {
            id: video.id.key(),
            filename: video.filename,
            filepath: video.storage_path.to_string(),
            user: video.owner,
            likes: video.like_count,
            ratings: video.rating_history,
            average_rating: video.average_rating,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub message: String,
    pub video: VideoView,
}

impl VideoResponse {
    fn new(message: &str, video: Video) -> Json<Self> {
        Json(VideoResponse {
            message: message.to_string(),
            video: video.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoList {
    pub videos: Vec<VideoView>,
}

impl From<Vec<Video>> for VideoList {
    fn from(videos: Vec<Video>) -> Self {
        VideoList {
            videos: videos.into_iter().map(VideoView::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

fn multipart_error(err: MultipartError, blobs: &BlobStore) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadError::TooLarge {
            limit: blobs.max_bytes(),
        }
        .into();
    }

    ApiError::BadRequest {
        message: err.body_text(),
    }
}

/// Stores the `file` field as a blob, then records it as owned by the caller.
#[instrument(skip(app, multipart), fields(owner = %identity.email))]
pub async fn upload(
    State(app): State<App>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| UploadError::NoFile)?;

    let (filename, path) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| multipart_error(err, &app.blobs))?
            .ok_or(UploadError::NoFile)?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let path = app.blobs.store(&filename, field).await?;
        break (filename, path);
    };

    let video = Video::new(filename, path, identity.email);

    match video.create(&app.database).await {
        Ok(video) => Ok(VideoResponse::new("File uploaded successfully", video)),
        Err(source) => {
            if let Err(err) = app.blobs.remove(&video.storage_path).await {
                tracing::warn!(path = %video.storage_path, error = %err, "could not remove the blob of a video that was not saved");
            }

            Err(ApiError::Store {
                message: "Failed to save video in database",
                source,
            })
        }
    }
}

#[instrument(skip_all)]
pub async fn list(State(app): State<App>) -> Result<Json<VideoList>, ApiError> {
    let videos = Video::all(&app.database)
        .await
        .context(StoreSnafu { message: "Failed to fetch videos" })?;

    Ok(Json(videos.into()))
}

/// Case-insensitive substring search over file names.
#[instrument(skip(app))]
pub async fn search(
    State(app): State<App>,
    Query(params): Query<SearchParams>,
) -> Result<Json<VideoList>, ApiError> {
    let query = params
        .query
        .filter(|query| !query.is_empty())
        .ok_or(ValidationError::MissingQuery)?;

    let videos = Video::search(&query, &app.database)
        .await
        .context(StoreSnafu { message: "Error searching videos" })?;

    Ok(Json(videos.into()))
}

#[instrument(skip(app), fields(user = %identity.email))]
pub async fn like(
    State(app): State<App>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let record = Record::<Video>::new(id.clone());

    let video = Video::modify(&record, &app.database, &app.locks, Video::apply_like)
        .await
        .context(StoreSnafu { message: "Error liking video" })?
        .context(NotFoundSnafu { id })?;

    tracing::info!(likes = video.like_count, "liked video `{}`", video.id);
    Ok(VideoResponse::new("Video liked successfully", video))
}

/// The rating is validated before the video is looked up.
#[instrument(skip(app, payload), fields(user = %identity.email))]
pub async fn rate(
    State(app): State<App>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let Json(request) = payload?;
    let rating = Rating::new(request.rating)?;
    let record = Record::<Video>::new(id.clone());

    let video = Video::modify(&record, &app.database, &app.locks, |video| video.apply_rating(rating))
        .await
        .context(StoreSnafu { message: "Error rating video" })?
        .context(NotFoundSnafu { id })?;

    tracing::info!(rating = rating.get(), average = video.average_rating, "rated video `{}`", video.id);
    Ok(VideoResponse::new("Video rated successfully", video))
}
