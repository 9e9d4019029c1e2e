//! Live decoding of automated-attack responses
//!
//! Ties the pieces together for a host listener: filter the notification,
//! build the haystack, run the pipeline and write the annotation.

use crate::annotation::{Annotatable, Annotator, MessageId};
use crate::config::Settings;
use crate::extractor::Haystack;
use crate::pipeline::{DecodeOutcome, Pipeline};
use std::sync::{Arc, PoisonError, RwLock};

/// Host tool a message originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// The automated-attack (batch fuzzing) tool; the only one decoded
    Intruder,
    Proxy,
    Repeater,
    Scanner,
    Other,
}

/// Whether the notification is for the request or the completed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Request,
    Response,
}

/// A completed response as seen by the host listener
pub trait InterceptedResponse: Annotatable {
    /// Status line and header lines
    fn headers(&self) -> Vec<String>;
    /// Body text
    fn body_text(&self) -> String;
}

/// What happened to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Filtered out: request phase, other tool, or live decoding disabled
    Ignored,
    /// Nothing to decode in this response
    NoMatch,
    /// Same annotation as last time, nothing written
    Unchanged(DecodeOutcome),
    /// Annotation written
    Annotated(DecodeOutcome),
}

/// Host-facing entry point holding settings, pipeline and annotation cache
#[derive(Debug)]
pub struct LiveDecoder {
    settings: RwLock<Arc<Settings>>,
    pipeline: Pipeline,
    annotator: Annotator,
}

impl LiveDecoder {
    pub fn new(settings: Settings) -> Self {
        Self::with_cache_capacity(settings, 0)
    }

    /// Create with a bounded annotation cache (0 selects the default size)
    pub fn with_cache_capacity(settings: Settings, capacity: usize) -> Self {
        let pipeline = Pipeline::new();
        pipeline.reconfigure(&settings);
        Self {
            settings: RwLock::new(Arc::new(settings)),
            pipeline,
            annotator: Annotator::new(capacity),
        }
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Arc<Settings> {
        let guard = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the settings; the extractor is recompiled right away
    pub fn update_settings(&self, settings: Settings) {
        self.pipeline.reconfigure(&settings);
        let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(settings);
        tracing::info!("settings updated");
    }

    /// Handle one host notification
    pub fn handle(
        &self,
        tool: Tool,
        phase: Phase,
        message: &mut impl InterceptedResponse,
    ) -> Disposition {
        if phase == Phase::Request || tool != Tool::Intruder {
            return Disposition::Ignored;
        }

        let settings = self.settings();
        if !settings.live_decode_enabled {
            return Disposition::Ignored;
        }

        let body = if settings.search_body {
            message.body_text()
        } else {
            String::new()
        };
        let haystack = Haystack::from_response(&message.headers(), &body, &settings);

        let Some(outcome) = self.pipeline.run(&haystack, &settings) else {
            return Disposition::NoMatch;
        };

        if self.annotator.annotate(message, &outcome, &settings) {
            tracing::debug!("annotated {:?}: {}", message.id(), outcome);
            Disposition::Annotated(outcome)
        } else {
            Disposition::Unchanged(outcome)
        }
    }

    /// Forget cached state for a message the host has dropped
    pub fn release(&self, message_id: MessageId) -> bool {
        self.annotator.release(message_id)
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }
}
