//! `nodes` crate: the `ExecutableNode` trait and the Posty5 node implementations.
//!
//! Each resource module owns a `#[serde(tag = "operation")]` parameter union,
//! the pure request builders for it, and the node type that runs one item.
//! The engine crate dispatches execution through the [`ExecutableNode`] trait
//! object.

pub mod error;
pub mod form_submission;
pub mod html_hosting;
pub mod mock;
pub mod params;
pub mod publisher;
pub mod qr_code;
pub mod short_link;
pub mod traits;
pub mod workspace;

pub use error::NodeError;
pub use form_submission::FormSubmissionNode;
pub use html_hosting::HtmlHostingNode;
pub use publisher::{PublisherKind, PublisherNode};
pub use qr_code::QrCodeNode;
pub use short_link::ShortLinkNode;
pub use traits::{ExecutableNode, ExecutionContext, InputItem};
pub use workspace::WorkspaceNode;
