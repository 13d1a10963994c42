//! Command normalization.
//!
//! Turns raw chat text into a canonical [`Command`], either by literal keyword
//! matching, by delegating to the language-model classifier, or both.

mod classifier;
mod literal;

pub use classifier::{parse_classifier_line, TextClassifier};
pub use literal::{parse_literal, LiteralMatch};

use std::fmt;
use std::str::FromStr;

use minebot_domain::Command;

use crate::infrastructure::ports::LlmError;

/// Where chat text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizerMode {
    /// Fixed phrases only; anything else is ignored.
    Literal,
    /// Every message goes to the classifier.
    Classifier,
    /// Fixed phrases first, classifier for the rest.
    Hybrid,
}

impl NormalizerMode {
    pub fn uses_classifier(&self) -> bool {
        !matches!(self, NormalizerMode::Literal)
    }
}

impl fmt::Display for NormalizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NormalizerMode::Literal => "literal",
            NormalizerMode::Classifier => "classifier",
            NormalizerMode::Hybrid => "hybrid",
        })
    }
}

impl FromStr for NormalizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(NormalizerMode::Literal),
            "classifier" | "nlp" => Ok(NormalizerMode::Classifier),
            "hybrid" => Ok(NormalizerMode::Hybrid),
            other => Err(format!(
                "unknown normalizer mode '{}' (expected literal, classifier or hybrid)",
                other
            )),
        }
    }
}

/// What a chat message normalized to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A command to route. May be [`Command::None`] when the classifier
    /// found nothing recognizable.
    Command(Command),
    /// Not addressed to the bot; no reply.
    Ignored,
    /// A bare `mine`/`give`; carries the verb for the usage reply.
    MissingArgument(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Classifier call failed: {0}")]
    Classifier(#[from] LlmError),
}

/// Maps chat text to commands according to the configured mode.
pub struct CommandNormalizer {
    mode: NormalizerMode,
    classifier: Option<TextClassifier>,
}

impl CommandNormalizer {
    /// Literal-only normalizer; needs no language model.
    pub fn literal() -> Self {
        Self {
            mode: NormalizerMode::Literal,
            classifier: None,
        }
    }

    /// Normalizer that consults `classifier` in the given mode.
    ///
    /// `NormalizerMode::Literal` ignores the classifier.
    pub fn new(mode: NormalizerMode, classifier: TextClassifier) -> Self {
        let classifier = mode.uses_classifier().then_some(classifier);
        Self { mode, classifier }
    }

    pub async fn normalize(&self, text: &str) -> Result<Normalized, NormalizeError> {
        if self.mode != NormalizerMode::Classifier {
            match parse_literal(text) {
                LiteralMatch::Command(command) => return Ok(Normalized::Command(command)),
                LiteralMatch::MissingArgument(verb) => {
                    return Ok(Normalized::MissingArgument(verb));
                }
                LiteralMatch::Miss => {}
            }
        }

        let Some(classifier) = &self.classifier else {
            return Ok(Normalized::Ignored);
        };

        let command = classifier.classify(text).await.map_err(|e| {
            tracing::warn!(error = %e, text = %text, "Classifier call failed");
            NormalizeError::Classifier(e)
        })?;
        Ok(Normalized::Command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{LlmResponse, MockLlmPort};
    use minebot_domain::ItemToken;
    use std::sync::Arc;

    fn classifier_answering(line: &'static str, calls: usize) -> TextClassifier {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .times(calls)
            .returning(move |_| Ok(LlmResponse::text(line)));
        TextClassifier::new(Arc::new(llm))
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Literal".parse::<NormalizerMode>(), Ok(NormalizerMode::Literal));
        assert_eq!("HYBRID".parse::<NormalizerMode>(), Ok(NormalizerMode::Hybrid));
        assert_eq!("classifier".parse::<NormalizerMode>(), Ok(NormalizerMode::Classifier));
        assert!("regex".parse::<NormalizerMode>().is_err());
    }

    #[tokio::test]
    async fn literal_mode_ignores_unmatched_text() {
        let normalizer = CommandNormalizer::literal();

        assert_eq!(
            normalizer.normalize("follow me").await.unwrap(),
            Normalized::Command(Command::Follow)
        );
        assert_eq!(
            normalizer.normalize("please follow me").await.unwrap(),
            Normalized::Ignored
        );
        assert_eq!(
            normalizer.normalize("mine").await.unwrap(),
            Normalized::MissingArgument("mine")
        );
    }

    #[tokio::test]
    async fn literal_mode_never_calls_classifier() {
        let normalizer =
            CommandNormalizer::new(NormalizerMode::Literal, classifier_answering("follow", 0));

        assert_eq!(normalizer.normalize("hello").await.unwrap(), Normalized::Ignored);
    }

    #[tokio::test]
    async fn hybrid_prefers_literal_match() {
        let normalizer =
            CommandNormalizer::new(NormalizerMode::Hybrid, classifier_answering("none", 0));

        assert_eq!(
            normalizer.normalize("stop follow me").await.unwrap(),
            Normalized::Command(Command::StopFollow)
        );
    }

    #[tokio::test]
    async fn hybrid_falls_back_to_classifier() {
        let normalizer = CommandNormalizer::new(
            NormalizerMode::Hybrid,
            classifier_answering("mine iron_ore", 1),
        );

        assert_eq!(
            normalizer.normalize("could you dig some iron ore").await.unwrap(),
            Normalized::Command(Command::Mine(ItemToken::new("iron_ore").unwrap()))
        );
    }

    #[tokio::test]
    async fn classifier_mode_classifies_everything() {
        let normalizer =
            CommandNormalizer::new(NormalizerMode::Classifier, classifier_answering("none", 2));

        assert_eq!(
            normalizer.normalize("follow me").await.unwrap(),
            Normalized::Command(Command::None)
        );
        assert_eq!(
            normalizer.normalize("what's up?").await.unwrap(),
            Normalized::Command(Command::None)
        );
    }

    #[tokio::test]
    async fn classifier_failure_surfaces_as_error() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .times(1)
            .returning(|_| Err(LlmError::InvalidResponse("no choices".into())));
        let normalizer =
            CommandNormalizer::new(NormalizerMode::Hybrid, TextClassifier::new(Arc::new(llm)));

        let result = normalizer.normalize("bring me a diamond").await;

        assert!(matches!(result, Err(NormalizeError::Classifier(_))));
    }
}
