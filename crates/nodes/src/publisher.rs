//! Posty5 Social Publisher Task and Post nodes.
//!
//! Both resources expose the same operations under different roots
//! (`/api/social-publisher-task`, `/api/social-publisher-post`), so one
//! implementation serves both, parameterised by [`PublisherKind`].
//!
//! Publishing a short video from a binary property is three calls:
//! `POST /generate-upload-urls`, a PUT of the video (and optionally the
//! thumbnail) to the issued URLs, then `POST /short-video/.../by-file` with
//! the public file URLs. URL-sourced videos skip straight to `by-url`.

use api::endpoints::{SOCIAL_PUBLISHER_POST, SOCIAL_PUBLISHER_TASK};
use api::{ApiRequest, Posty5Api, Query, UploadTarget};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::params::{self, non_empty, Body, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

// ---------------------------------------------------------------------------
// Source sniffing
// ---------------------------------------------------------------------------

/// Where the video to publish comes from, as the server classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSourceKind {
    FacebookVideo,
    TiktokVideo,
    YoutubeVideo,
    VideoUrl,
    /// Bytes uploaded through a pre-signed URL.
    VideoUpload,
}

impl VideoSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FacebookVideo => "facebook-video",
            Self::TiktokVideo => "tiktok-video",
            Self::YoutubeVideo => "youtube-video",
            Self::VideoUrl => "video-url",
            Self::VideoUpload => "video-upload",
        }
    }
}

/// Classify a video URL. Checked in order: Facebook, TikTok, YouTube.
pub fn sniff_video_source(url: &str) -> VideoSourceKind {
    if url.contains("facebook.com") || url.contains("fb.watch") {
        VideoSourceKind::FacebookVideo
    } else if url.contains("tiktok.com") {
        VideoSourceKind::TiktokVideo
    } else if url.contains("youtube.com") || url.contains("youtu.be") {
        VideoSourceKind::YoutubeVideo
    } else {
        VideoSourceKind::VideoUrl
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Which of the two publisher resources a node talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherKind {
    Task,
    Post,
}

impl PublisherKind {
    pub fn root(self) -> &'static str {
        match self {
            Self::Task => SOCIAL_PUBLISHER_TASK,
            Self::Post => SOCIAL_PUBLISHER_POST,
        }
    }

    pub fn node_name(self) -> &'static str {
        match self {
            Self::Task => "posty5SocialPublisherTask",
            Self::Post => "posty5SocialPublisherPost",
        }
    }
}

/// Operation names differ per resource (`getTaskStatus` vs `getPostStatus`);
/// both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum PublisherOperation {
    PublishVideo(PublishToWorkspace),
    PublishVideoToAccount(PublishToAccount),
    #[serde(rename = "getTaskStatus", alias = "getPostStatus")]
    GetStatus {
        #[serde(rename = "taskId", alias = "postId")]
        id: String,
    },
    #[serde(rename = "listTasks", alias = "listPosts")]
    List(ListPublished),
    GetDefaultSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishToWorkspace {
    pub workspace_id: String,
    #[serde(flatten)]
    pub video: VideoPublish,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishToAccount {
    pub account_id: String,
    #[serde(flatten)]
    pub video: VideoPublish,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPublished {
    #[serde(default)]
    pub list_workspace_id: Option<String>,
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "params::default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    Binary,
    Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSource {
    #[default]
    None,
    Binary,
    Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    #[default]
    Now,
    Later,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Facebook,
    Instagram,
}

fn default_video_property() -> String {
    "data".to_owned()
}

fn default_thumbnail_property() -> String {
    "thumbnail".to_owned()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPublish {
    pub video_source: VideoSource,
    #[serde(default = "default_video_property")]
    pub video_binary_property: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub thumbnail_source: ThumbnailSource,
    #[serde(default = "default_thumbnail_property")]
    pub thumbnail_binary_property: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub scheduled_publish_time: ScheduleMode,
    pub schedule_date: Option<String>,
    #[serde(default)]
    pub youtube_settings: YoutubeSettings,
    #[serde(default)]
    pub tiktok_settings: TiktokSettings,
    #[serde(default)]
    pub facebook_settings: FacebookSettings,
    #[serde(default)]
    pub instagram_settings: InstagramSettings,
}

/// YouTube tags arrive either as one comma-separated string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Text(String),
}

impl Tags {
    pub fn normalized(&self) -> Vec<String> {
        match self {
            Self::List(tags) => tags.clone(),
            Self::Text(text) => text.split(',').map(|tag| tag.trim().to_owned()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YoutubeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub made_for_kids: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TiktokSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_duet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_stitch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_comment: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FacebookSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InstagramSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_to_feed: Option<bool>,
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Target of a publish: a whole workspace or one connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishScope {
    Workspace(String),
    Account(String),
}

impl PublishScope {
    fn key(&self) -> &'static str {
        match self {
            Self::Workspace(_) => "workspaceId",
            Self::Account(_) => "accountId",
        }
    }

    fn segment(&self) -> &'static str {
        match self {
            Self::Workspace(_) => "workspace",
            Self::Account(_) => "account",
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Workspace(id) | Self::Account(id) => id,
        }
    }
}

/// Offset-less layouts accepted for a schedule date, tried in order.
const NAIVE_SCHEDULE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalise a schedule date to `YYYY-MM-DDTHH:MM:SS.mmmZ`. Accepts RFC 3339,
/// RFC 2822, the naive layouts above and a bare date. Dates without an offset
/// are taken as UTC.
pub fn schedule_timestamp(input: &str) -> Result<String, NodeError> {
    let input = input.trim();
    let with_offset = DateTime::parse_from_rfc3339(input)
        .or_else(|_| DateTime::parse_from_rfc2822(input))
        .map(|dt| dt.with_timezone(&Utc))
        .ok();
    let naive = || {
        NAIVE_SCHEDULE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .map(|naive| naive.and_utc())
    };

    let parsed = with_offset
        .or_else(naive)
        .ok_or_else(|| NodeError::invalid(format!("invalid scheduleDate `{input}`")))?;

    Ok(parsed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn config<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(Value::Object(map)),
        _ => None,
    }
}

impl VideoPublish {
    /// `"now"` or the normalised timestamp.
    pub fn scheduled_time(&self) -> Result<String, NodeError> {
        match self.scheduled_publish_time {
            ScheduleMode::Now => Ok("now".to_owned()),
            ScheduleMode::Later => {
                let date = non_empty(self.schedule_date.as_deref())
                    .ok_or_else(|| NodeError::invalid("missing parameter `scheduleDate`"))?;
                schedule_timestamp(date)
            }
        }
    }

    /// Per-platform configs, each only for a selected platform with settings.
    pub fn platform_configs(&self) -> Vec<(&'static str, Value)> {
        let mut configs = Vec::new();
        let selected = |platform| self.platforms.contains(&platform);

        if selected(Platform::Youtube) {
            let mut youtube = self.youtube_settings.clone();
            youtube.tags = youtube.tags.take().map(|tags| match tags {
                Tags::Text(ref text) if !text.is_empty() => Tags::List(tags.normalized()),
                other => other,
            });
            configs.extend(config(&youtube).map(|c| ("youtubeConfig", c)));
        }
        if selected(Platform::Tiktok) {
            configs.extend(config(&self.tiktok_settings).map(|c| ("tiktokConfig", c)));
        }
        if selected(Platform::Facebook) {
            configs.extend(config(&self.facebook_settings).map(|c| ("facebookPageConfig", c)));
        }
        if selected(Platform::Instagram) {
            configs.extend(config(&self.instagram_settings).map(|c| ("instagramConfig", c)));
        }
        configs
    }

    /// URL of a URL-sourced thumbnail, if any.
    pub fn thumbnail_link(&self) -> Option<&str> {
        match self.thumbnail_source {
            ThumbnailSource::Url => non_empty(self.thumbnail_url.as_deref()),
            _ => None,
        }
    }
}

/// Resolved inputs of the final publish call.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest<'a> {
    pub scope: &'a PublishScope,
    pub video: &'a VideoPublish,
    pub video_url: String,
    pub source: VideoSourceKind,
    pub thumb_url: Option<String>,
}

impl PublishRequest<'_> {
    pub fn build(&self, root: &str) -> Result<ApiRequest, NodeError> {
        let mode = match self.source {
            VideoSourceKind::VideoUpload => "by-file",
            _ => "by-url",
        };
        let path = format!("{root}/short-video/{}/{mode}", self.scope.segment());

        let mut body = Body::new()
            .field(self.scope.key(), self.scope.id())
            .field("videoURL", self.video_url.as_str())
            .field("source", self.source.as_str())
            .field("platforms", serde_json::to_value(&self.video.platforms)?)
            .text("thumbURL", self.thumb_url.as_deref())
            .field("scheduledPublishTime", self.video.scheduled_time()?);
        for (key, value) in self.video.platform_configs() {
            body = body.field(key, value);
        }

        Ok(ApiRequest::post(path, body.build()))
    }
}

impl PublisherOperation {
    /// Plan for every operation except publishing.
    pub fn plan(&self, kind: PublisherKind) -> Option<Plan> {
        let root = kind.root();
        match self {
            Self::GetStatus { id } => Some(ApiRequest::get(format!("{root}/{id}/status")).into()),
            Self::GetDefaultSettings => Some(ApiRequest::get(format!("{root}/default-settings")).into()),
            Self::List(list) => {
                let mut filters = Query::new();
                filters.set_opt("workspaceId", list.list_workspace_id.as_deref());
                Some(Plan::list(root, filters, Paging { return_all: list.return_all, limit: list.limit }))
            }
            Self::PublishVideo(_) | Self::PublishVideoToAccount(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn issued_target(response: &Value, pointer: &str, what: &str) -> Result<UploadTarget, NodeError> {
    response
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(UploadTarget::new)
        .ok_or_else(|| NodeError::MissingUploadUrl(what.to_owned()))
}

async fn publish(
    api: &dyn Posty5Api,
    kind: PublisherKind,
    scope: &PublishScope,
    video: &VideoPublish,
    item: &InputItem,
) -> Result<Value, NodeError> {
    // Parameter errors surface before anything is sent.
    video.scheduled_time()?;

    let mut thumb_url = video.thumbnail_link().map(str::to_owned);

    let (video_url, source) = match video.video_source {
        VideoSource::Url => {
            let url = non_empty(video.video_url.as_deref())
                .ok_or_else(|| NodeError::invalid("missing parameter `videoUrl`"))?;
            (url.to_owned(), sniff_video_source(url))
        }
        VideoSource::Binary => {
            let video_bytes = item.require_binary(&video.video_binary_property)?;
            let thumb_bytes = match video.thumbnail_source {
                ThumbnailSource::Binary => item.binary(&video.thumbnail_binary_property).map(<[u8]>::to_vec),
                _ => None,
            };

            let issued = api
                .send(ApiRequest::post(
                    format!("{}/generate-upload-urls", kind.root()),
                    json!({ "videoFileType": "mp4", "thumbFileType": "jpg" }),
                ))
                .await?;

            let video_target = issued_target(&issued, "/video/uploadFileURL", "video")?;
            debug!(file_url = %video_target.file_url, bytes = video_bytes.len(), "uploading video");
            api.upload(&video_target.upload_url, video_bytes).await?;

            if let Some(bytes) = thumb_bytes {
                let thumb_target = issued_target(&issued, "/thumb/uploadFileURL", "thumbnail")?;
                debug!(file_url = %thumb_target.file_url, bytes = bytes.len(), "uploading thumbnail");
                api.upload(&thumb_target.upload_url, bytes).await?;
                thumb_url = Some(thumb_target.file_url);
            }

            (video_target.file_url, VideoSourceKind::VideoUpload)
        }
    };

    let request = PublishRequest { scope, video, video_url, source, thumb_url }.build(kind.root())?;
    Ok(api.send(request).await?)
}

/// `posty5SocialPublisherTask` / `posty5SocialPublisherPost`
#[derive(Debug, Clone, Copy)]
pub struct PublisherNode {
    kind: PublisherKind,
}

impl PublisherNode {
    pub fn task() -> Self {
        Self { kind: PublisherKind::Task }
    }

    pub fn post() -> Self {
        Self { kind: PublisherKind::Post }
    }

    pub fn kind(&self) -> PublisherKind {
        self.kind
    }
}

#[async_trait]
impl ExecutableNode for PublisherNode {
    fn name(&self) -> &str {
        self.kind.node_name()
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: PublisherOperation = params::parse(&item.params)?;
        let api = ctx.api.as_ref();

        match &operation {
            PublisherOperation::PublishVideo(p) => {
                let scope = PublishScope::Workspace(p.workspace_id.clone());
                publish(api, self.kind, &scope, &p.video, item).await
            }
            PublisherOperation::PublishVideoToAccount(p) => {
                let scope = PublishScope::Account(p.account_id.clone());
                publish(api, self.kind, &scope, &p.video, item).await
            }
            other => match other.plan(self.kind) {
                Some(plan) => plan.run(api).await,
                None => Err(NodeError::Fatal("publish operation without a plan".to_owned())),
            },
        }
    }
}
