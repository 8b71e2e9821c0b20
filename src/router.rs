//! Utterance routing
//!
//! A transcript is classified by keyword containment against an ordered rule
//! list; the first rule whose keyword appears wins. Transcripts matching no
//! rule (including the empty string) go to the conversational session.

/// Where a transcript is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Open an application in the browser
    OpenApp,
    /// Volume control (unsupported)
    Volume,
    /// Arithmetic evaluation
    Calculate,
    /// Remote chat model, or the default replies
    Conversation,
}

/// Keyword rules in priority order
const DEFAULT_RULES: [(&str, Route); 3] = [
    ("open", Route::OpenApp),
    ("volume", Route::Volume),
    ("calculate", Route::Calculate),
];

/// Classifies lower-cased transcripts into routes
#[derive(Debug, Clone)]
pub struct UtteranceRouter {
    rules: Vec<(&'static str, Route)>,
}

impl Default for UtteranceRouter {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl UtteranceRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules, highest priority first
    #[must_use]
    pub fn rules(&self) -> &[(&'static str, Route)] {
        &self.rules
    }

    /// Classify a transcript; expects lower-cased input
    #[must_use]
    pub fn classify(&self, transcript: &str) -> Route {
        let route = self
            .rules
            .iter()
            .find(|(keyword, _)| transcript.contains(keyword))
            .map_or(Route::Conversation, |(_, route)| *route);

        tracing::debug!(?route, transcript, "routed transcript");
        route
    }
}
