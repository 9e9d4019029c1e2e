//! Annotation cache and writer
//!
//! Remembers the last annotation written for each message and only writes when
//! it changes, so repeated notifications for the same response do not rewrite
//! identical comments.

mod cache;

use crate::config::Settings;
use crate::pipeline::DecodeOutcome;
use serde::{Deserialize, Serialize};

pub use cache::{AnnotationCache, DEFAULT_CACHE_CAPACITY};

/// Highlight applied to annotated messages
pub const HIGHLIGHT_COLOR: &str = "cyan";

/// Separator used when appending to an existing comment
pub const COMMENT_SEPARATOR: &str = " | ";

/// Stable identifier the host assigns to each message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// A host message that can carry an annotation
pub trait Annotatable {
    fn id(&self) -> MessageId;
    fn comment(&self) -> Option<String>;
    fn set_comment(&mut self, comment: &str);
    fn set_highlight(&mut self, color: &str);
}

/// Decides when an annotation must be written and writes it
#[derive(Debug, Default)]
pub struct Annotator {
    cache: AnnotationCache,
}

impl Annotator {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: AnnotationCache::new(capacity),
        }
    }

    /// Record `outcome` for `message_id`; true when the host should write it
    pub fn apply(&self, message_id: MessageId, outcome: &DecodeOutcome) -> bool {
        let changed = self.cache.update_if_changed(message_id, outcome.text());
        if !changed {
            tracing::debug!("annotation for {:?} unchanged, skipping", message_id);
        }
        changed
    }

    /// Apply `outcome` and, when it changed, update the message's comment and highlight
    pub fn annotate(
        &self,
        message: &mut impl Annotatable,
        outcome: &DecodeOutcome,
        settings: &Settings,
    ) -> bool {
        if !self.apply(message.id(), outcome) {
            return false;
        }

        let comment = compose_comment(
            message.comment().as_deref(),
            outcome.text(),
            settings.replace_existing_comment,
        );
        message.set_comment(&comment);
        if settings.highlight_enabled {
            message.set_highlight(HIGHLIGHT_COLOR);
        }
        true
    }

    /// Forget a message the host no longer retains
    pub fn release(&self, message_id: MessageId) -> bool {
        self.cache.forget(message_id)
    }

    pub fn cache(&self) -> &AnnotationCache {
        &self.cache
    }
}

/// New comment text: replace, or append after `" | "` when a comment exists
pub fn compose_comment(existing: Option<&str>, value: &str, replace: bool) -> String {
    match existing {
        Some(current) if !replace && !current.is_empty() => {
            format!("{}{}{}", current, COMMENT_SEPARATOR, value)
        }
        _ => value.to_string(),
    }
}
