//! Document assembler
//!
//!     The assembler is the state machine behind story parsing. It knows nothing about HTML
//!     syntax: whatever produces the tag stream calls its transition functions in document
//!     order, and the assembler builds the story as they arrive.
//!
//!     State
//!
//!         `current` is the index of the passage whose body is being read, or `None`.
//!
//!     Transitions
//!
//!         open root tag       story attributes captured, current = None
//!         open passage tag    passage appended, current = its index
//!         open any other tag  current = None
//!         close any tag       current = None (closing the root runs the resolution pass)
//!         text                if current is set, the body is parsed into that passage
//!
//!     Only the text run directly after a passage open tag is its body; markup nested in a
//!     body is not tracked, the body format treats it as opaque text.
//!
//!     Resolution pass
//!
//!         Every link label must match exactly one passage name. A name index is built once
//!         for the whole story; labels that match no passage, or several, are errors.

use crate::error::{ConvertError, ConvertResult};
use crate::micro::{PassageBody, ProseCache};
use crate::model::{AttributeValue, Attributes, Passage, Story};
use crate::options::ParseOptions;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Assembler {
    options: ParseOptions,
    story: Attributes,
    passages: Vec<Passage>,
    current: Option<usize>,
    names: HashSet<String>,
    cache: ProseCache,
    resolved: bool,
}

impl Assembler {
    pub fn new(options: ParseOptions) -> Self {
        Assembler {
            options,
            story: Attributes::new(),
            passages: Vec::new(),
            current: None,
            names: HashSet::new(),
            cache: ProseCache::new(),
            resolved: true,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Passage whose body the next text event belongs to
    pub fn current_passage(&self) -> Option<&Passage> {
        self.current.map(|index| &self.passages[index])
    }

    pub fn open_tag(&mut self, name: &str, attrs: &[(String, String)]) -> ConvertResult<()> {
        self.current = None;

        if name == self.options.root_tag {
            self.story = self.story_attributes(attrs);
        } else if name == self.options.passage_tag {
            let passage = self.new_passage(attrs)?;
            debug!(pid = %passage.pid, name = %passage.name, "passage opened");
            if !self.names.insert(passage.name.clone()) {
                warn!(name = %passage.name, "duplicate passage name; links to it cannot resolve");
            }
            self.passages.push(passage);
            self.current = Some(self.passages.len() - 1);
            self.resolved = false;
        }
        Ok(())
    }

    pub fn close_tag(&mut self, name: &str) -> ConvertResult<()> {
        self.current = None;

        if name == self.options.root_tag {
            self.resolve_links()?;
        }
        Ok(())
    }

    /// Body text of the current passage. A second call for the same passage overwrites the first.
    pub fn text(&mut self, data: &str) -> ConvertResult<()> {
        let Some(index) = self.current else {
            return Ok(());
        };

        let body = PassageBody::parse(data, &mut self.cache)?;
        let passage = &mut self.passages[index];
        passage.expressions = body.expressions;
        passage.text = body.text;
        passage.links = body.links;
        passage.input = body.input;
        Ok(())
    }

    /// Hand over the finished story.
    ///
    /// Runs the resolution pass when the document never closed its root element.
    pub fn finish(mut self) -> ConvertResult<Story> {
        if !self.resolved {
            self.resolve_links()?;
        }
        Ok(Story {
            attributes: self.story,
            passages: self.passages,
        })
    }

    fn story_attributes(&self, attrs: &[(String, String)]) -> Attributes {
        let mut attributes = Attributes::new();
        for (name, value) in attrs {
            if value.is_empty() || self.options.excludes_story_attribute(name) {
                continue;
            }
            attributes.push(name.as_str(), AttributeValue::Text(value.clone()));
        }
        attributes
    }

    fn new_passage(&self, attrs: &[(String, String)]) -> ConvertResult<Passage> {
        let mut pid = None;
        let mut name = None;
        let mut attributes = Attributes::new();

        for (key, value) in attrs {
            if value.is_empty() || self.options.excludes_passage_attribute(key) {
                continue;
            }
            match key.as_str() {
                "pid" => pid = Some(value.clone()),
                "name" => name = Some(value.clone()),
                _ if self.options.is_list_attribute(key) => {
                    let items = split_list(value);
                    if !items.is_empty() {
                        attributes.push(key.as_str(), AttributeValue::List(items));
                    }
                }
                _ => attributes.push(key.as_str(), AttributeValue::Text(value.clone())),
            }
        }

        let pid = pid.ok_or_else(|| self.missing_attribute("pid"))?;
        let name = name.ok_or_else(|| self.missing_attribute("name"))?;
        Ok(Passage::new(pid, name, attributes))
    }

    fn missing_attribute(&self, attribute: &str) -> ConvertError {
        ConvertError::MalformedDocument(format!(
            "<{}> element #{} has an empty or missing `{}` attribute",
            self.options.passage_tag,
            self.passages.len() + 1,
            attribute
        ))
    }

    fn resolve_links(&mut self) -> ConvertResult<()> {
        let index = NameIndex::build(&self.passages);
        let mut count = 0;

        for passage in &mut self.passages {
            for link in &mut passage.links {
                link.pid = Some(index.lookup(&link.link)?.to_string());
                count += 1;
            }
        }

        debug!(
            links = count,
            passages = self.passages.len(),
            "links resolved"
        );
        self.resolved = true;
        Ok(())
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Passage name → pid, remembering names that occur more than once
enum Target {
    Unique(String),
    Ambiguous,
}

struct NameIndex(HashMap<String, Target>);

impl NameIndex {
    fn build(passages: &[Passage]) -> Self {
        let mut map = HashMap::with_capacity(passages.len());
        for passage in passages {
            map.entry(passage.name.clone())
                .and_modify(|target| *target = Target::Ambiguous)
                .or_insert_with(|| Target::Unique(passage.pid.clone()));
        }
        NameIndex(map)
    }

    fn lookup(&self, label: &str) -> ConvertResult<&str> {
        match self.0.get(label) {
            Some(Target::Unique(pid)) => Ok(pid),
            Some(Target::Ambiguous) | None => Err(ConvertError::UnboundLink(label.to_string())),
        }
    }
}
