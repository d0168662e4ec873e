//! REST resource roots.

pub const SHORT_LINK: &str = "/api/short-link";
pub const QR_CODE: &str = "/api/qr-code";
pub const HTML_HOSTING: &str = "/api/html-hosting";
pub const FORM_SUBMISSION: &str = "/api/html-hosting-form-submission";
pub const SOCIAL_PUBLISHER_WORKSPACE: &str = "/api/social-publisher-workspace";
pub const SOCIAL_PUBLISHER_TASK: &str = "/api/social-publisher-task";
pub const SOCIAL_PUBLISHER_POST: &str = "/api/social-publisher-post";

/// Value injected as `createdFrom` into every POST body.
pub const CREATED_FROM: &str = "n8n";
