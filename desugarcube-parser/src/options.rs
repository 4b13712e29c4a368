//! Parse options
//!
//! Knobs that decide which elements carry the story and which attributes make it into the
//! output. The defaults describe a Twine 2 export; `desugarcube-config` deserializes the
//! `[parse]` table straight into [`ParseOptions`].

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Element holding the story attributes and all passages
    pub root_tag: String,
    /// Element holding one passage
    pub passage_tag: String,
    /// Story attributes left out of the output
    pub story_exclude: Vec<String>,
    /// Passage attributes left out of the output (positional/sizing data)
    pub passage_exclude: Vec<String>,
    /// Passage attributes split on commas into a list
    pub list_attributes: Vec<String>,
    /// Downgrade tokenizer errors to warnings instead of failing
    pub lenient_markup: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            root_tag: "tw-storydata".to_string(),
            passage_tag: "tw-passagedata".to_string(),
            story_exclude: Vec::new(),
            passage_exclude: vec!["position".to_string(), "size".to_string()],
            list_attributes: vec!["tags".to_string()],
            lenient_markup: false,
        }
    }
}

impl ParseOptions {
    pub(crate) fn excludes_story_attribute(&self, name: &str) -> bool {
        self.story_exclude.iter().any(|excluded| excluded == name)
    }

    pub(crate) fn excludes_passage_attribute(&self, name: &str) -> bool {
        self.passage_exclude.iter().any(|excluded| excluded == name)
    }

    pub(crate) fn is_list_attribute(&self, name: &str) -> bool {
        self.list_attributes.iter().any(|listed| listed == name)
    }
}
