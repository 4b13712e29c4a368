//! Story data model
//!
//!     The model is what the assembler produces and what the JSON output is made of. Attribute
//!     maps keep the order the attributes had in the source element, which is why they are a
//!     vector of pairs rather than a map, and why `Story` and `Passage` serialize by hand: the
//!     JSON object keys have to come out in a fixed, source-driven order.
//!
//!     Output shape of a passage:
//!
//!         { "pid": .., "name": .., <other attributes>.., "expressions": [..], "text": "..",
//!           "links": [..]?, "input": [..]? }
//!
//!     `links` and `input` are left out when empty, `expressions` and `text` are always there.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value of an element attribute once it has been read into the model
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    /// A comma-delimited attribute (e.g. `tags`) split into its items
    List(Vec<String>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(items) => Some(items),
            AttributeValue::Text(_) => None,
        }
    }
}

/// Ordered attribute list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.0.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `name: value` directive from a passage head. Opaque: never evaluated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Expression {
    pub name: String,
    pub value: String,
}

/// A bracketed `[[name->link]]` reference between passages.
///
/// `pid` stays `None` until the resolution pass has run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Link {
    pub name: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Link {
            name: name.into(),
            link: link.into(),
            pid: None,
        }
    }
}

/// One node of the story graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub pid: String,
    pub name: String,
    /// Remaining attributes of the passage element, `tags` included
    pub attributes: Attributes,
    pub expressions: Vec<Expression>,
    pub text: String,
    pub links: Vec<Link>,
    pub input: Vec<String>,
}

impl Passage {
    pub fn new(pid: impl Into<String>, name: impl Into<String>, attributes: Attributes) -> Self {
        Passage {
            pid: pid.into(),
            name: name.into(),
            attributes,
            expressions: Vec::new(),
            text: String::new(),
            links: Vec::new(),
            input: Vec::new(),
        }
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.attributes.get("tags").and_then(AttributeValue::as_list)
    }
}

/// JSON keys a passage writes from its own fields
const PASSAGE_FIELDS: [&str; 6] = ["pid", "name", "expressions", "text", "links", "input"];

impl Serialize for Passage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("pid", &self.pid)?;
        map.serialize_entry("name", &self.name)?;
        for (key, value) in self.attributes.iter() {
            // keys written from the passage fields win over same-named attributes
            if !PASSAGE_FIELDS.contains(&key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("expressions", &self.expressions)?;
        map.serialize_entry("text", &self.text)?;
        if !self.links.is_empty() {
            map.serialize_entry("links", &self.links)?;
        }
        if !self.input.is_empty() {
            map.serialize_entry("input", &self.input)?;
        }
        map.end()
    }
}

/// Root container: story metadata plus every passage in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Story {
    pub attributes: Attributes,
    pub passages: Vec<Passage>,
}

impl Story {
    /// Look up a story attribute such as `name`, `ifid` or `format`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(AttributeValue::as_text)
    }

    pub fn passage_by_pid(&self, pid: &str) -> Option<&Passage> {
        self.passages.iter().find(|passage| passage.pid == pid)
    }
}

impl Serialize for Story {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.attributes.iter() {
            // `passages` is reserved for the passage list
            if key != "passages" {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("passages", &self.passages)?;
        map.end()
    }
}
