//! Generated card content coming from the completion model and image lookup.
//!
//! The model is asked to answer with a strict JSON array:
//! ```text
//! [ { "question": "...", "answer": "...", "keyword": "..." }, ... ]
//! ```

use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Card content as produced by the generator, before any scheduling state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl RawCard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            keyword: None,
            image: None,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

/// Parse the completion model's reply into raw cards.
///
/// A surrounding Markdown code fence is tolerated; anything else that is not a
/// JSON array of cards is rejected.
pub fn parse_model_output(text: &str) -> Result<Vec<RawCard>> {
    let body = strip_code_fence(text.trim());
    serde_json::from_str::<Vec<RawCard>>(body).map_err(|e| {
        debug!("rejected model output: {}", text);
        Error::MalformedModelOutput(e.to_string())
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Something that can find an illustrative image for a keyword.
pub trait ImageSource {
    /// Reference (URL or path) to an image for `keyword`, if one exists.
    fn find_image(&self, keyword: &str) -> Result<Option<String>>;
}

/// Fill in images for cards that carry a keyword but no image yet.
///
/// A failed lookup leaves the card's image empty. Returns how many cards
/// received an image.
pub fn attach_images(cards: &mut [RawCard], source: &dyn ImageSource) -> usize {
    let mut attached = 0;

    for card in cards.iter_mut().filter(|c| c.image.is_none()) {
        let Some(keyword) = card.keyword.as_deref().map(str::trim) else {
            continue;
        };
        if keyword.is_empty() {
            continue;
        }

        match source.find_image(keyword) {
            Ok(Some(image)) => {
                card.image = Some(image);
                attached += 1;
            }
            Ok(None) => debug!("no image found for keyword '{}'", keyword),
            Err(e) => warn!("image lookup failed for keyword '{}': {}", keyword, e),
        }
    }

    attached
}

/// Image source backed by a local directory of files named after keywords.
pub struct LocalImageDir {
    root: PathBuf,
}

impl LocalImageDir {
    const EXTENSIONS: [&'static str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for LocalImageDir {
    fn find_image(&self, keyword: &str) -> Result<Option<String>> {
        if !self.root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("image directory {:?} does not exist", self.root),
            )));
        }

        let slug = keyword_slug(keyword);
        if slug.is_empty() {
            return Ok(None);
        }

        Ok(Self::EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", slug, ext)))
            .find(|path| path.is_file())
            .map(|path| path.to_string_lossy().into_owned()))
    }
}

/// Lowercase a keyword and join its words with dashes.
fn keyword_slug(keyword: &str) -> String {
    keyword
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    #[test]
    fn test_parse_plain_array() {
        let text = r#"[
            {"question": "What is ATP?", "answer": "Energy currency of the cell"},
            {"question": "Where is DNA stored?", "answer": "Nucleus", "keyword": "cell nucleus"}
        ]"#;
        let cards = parse_model_output(text).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "What is ATP?");
        assert_eq!(cards[0].keyword, None);
        assert_eq!(cards[1].keyword.as_deref(), Some("cell nucleus"));
    }

    #[test]
    fn test_parse_fenced_output() {
        let text = "```json\n[{\"question\": \"Q\", \"answer\": \"A\"}]\n```\n";
        let cards = parse_model_output(text).unwrap();
        assert_eq!(cards, vec![RawCard::new("Q", "A")]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_model_output(r#"{"question": "Q", "answer": "A"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(_)));

        let err = parse_model_output("Sure! Here are your flashcards:").unwrap_err();
        assert!(matches!(err, Error::MalformedModelOutput(_)));
    }

    struct ScriptedImages {
        calls: RefCell<Vec<String>>,
    }

    impl ImageSource for ScriptedImages {
        fn find_image(&self, keyword: &str) -> Result<Option<String>> {
            self.calls.borrow_mut().push(keyword.to_string());
            match keyword {
                "mitochondria" => Ok(Some("https://img.example/mito.png".into())),
                "offline" => Err(Error::Io(std::io::Error::other("connection refused"))),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_attach_images_leaves_failures_empty() {
        let source = ScriptedImages { calls: RefCell::new(Vec::new()) };
        let mut already = RawCard::new("Q4", "A4").with_keyword("mitochondria");
        already.image = Some("kept.png".into());

        let mut cards = vec![
            RawCard::new("Q1", "A1").with_keyword("mitochondria"),
            RawCard::new("Q2", "A2").with_keyword("offline"),
            RawCard::new("Q3", "A3"),
            already,
            RawCard::new("Q5", "A5").with_keyword("unknown"),
        ];

        let attached = attach_images(&mut cards, &source);

        assert_eq!(attached, 1);
        assert_eq!(cards[0].image.as_deref(), Some("https://img.example/mito.png"));
        assert_eq!(cards[1].image, None);
        assert_eq!(cards[2].image, None);
        assert_eq!(cards[3].image.as_deref(), Some("kept.png"));
        assert_eq!(cards[4].image, None);
        assert_eq!(*source.calls.borrow(), vec!["mitochondria", "offline", "unknown"]);
    }

    #[test]
    fn test_local_image_dir_lookup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cell-nucleus.jpg"), b"jpg").unwrap();

        let source = LocalImageDir::new(dir.path());
        let found = source.find_image("Cell Nucleus").unwrap().unwrap();
        assert!(found.ends_with("cell-nucleus.jpg"));
        assert_eq!(source.find_image("ribosome").unwrap(), None);
        assert_eq!(source.find_image("  ").unwrap(), None);
    }

    #[test]
    fn test_local_image_dir_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalImageDir::new(dir.path().join("nope"));
        assert!(source.find_image("anything").is_err());
    }
}
