//! Twine/SugarCube story parser
//!
//!     Reads the HTML export of a Twine story (SugarCube format) and produces a normalized
//!     story graph: passages, their prose, head expressions, links between passages and
//!     input prompts.
//!
//! Architecture
//!
//!     Parsing happens in two stages:
//!
//!     - micro: pure functions over one passage body (expressions, prose, links, inputs)
//!     - assembler: a state machine fed by the tag stream; it collects story metadata and
//!       passages, and resolves every link label to a passage pid once the whole document
//!       has been read
//!
//!     The tag stream (tag_stream.rs) is the only part that knows about HTML. It drives the
//!     assembler with the `html5ever` tokenizer.
//!
//!     The file structure :
//!     .
//!     ├── error.rs        # ConvertError
//!     ├── model.rs        # Story, Passage, Link, Expression
//!     ├── options.rs      # ParseOptions
//!     ├── micro.rs        # passage body micro-parser
//!     ├── assembler.rs    # tag-stream state machine and resolution pass
//!     ├── tag_stream.rs   # html5ever tokenizer sink
//!     └── lib.rs
//!
//!     This is a pure lib: reading the export and writing the JSON file belong to the shell
//!     (see desugarcube-cli).

pub mod assembler;
pub mod error;
pub mod micro;
pub mod model;
pub mod options;
pub mod tag_stream;

pub use assembler::Assembler;
pub use error::{ConvertError, ConvertResult};
pub use model::{AttributeValue, Attributes, Expression, Link, Passage, Story};
pub use options::ParseOptions;

/// Parse a story export with the default options
pub fn parse_story(html: &str) -> ConvertResult<Story> {
    parse_story_with(html, &ParseOptions::default())
}

pub fn parse_story_with(html: &str, options: &ParseOptions) -> ConvertResult<Story> {
    tag_stream::parse_document(html, options)
}

/// Serialize a story to JSON text. Non-ASCII characters are written as-is.
pub fn to_json(story: &Story, pretty: bool) -> ConvertResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(story)?
    } else {
        serde_json::to_string(story)?
    };
    Ok(json)
}
