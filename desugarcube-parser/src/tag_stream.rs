//! HTML tag stream
//!
//! Feeds a story document through the `html5ever` tokenizer and forwards the tokens to an
//! [`Assembler`]. No tree is built: tags and text runs go straight into the state machine.
//!
//! Character tokens are buffered until the next tag (or the end of input), so a passage body
//! arrives as a single text event even when it contains character references.

use crate::assembler::Assembler;
use crate::error::{ConvertError, ConvertResult};
use crate::model::Story;
use crate::options::ParseOptions;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::TokenizerResult;
use std::cell::RefCell;
use tracing::warn;

/// Parse a whole story document into a resolved [`Story`]
pub fn parse_document(html: &str, options: &ParseOptions) -> ConvertResult<Story> {
    let sink = StorySink::new(Assembler::new(options.clone()));
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    // the sink never hands back a script, so `feed` only pauses if that changes
    while let TokenizerResult::Script(_) = tokenizer.feed(&input) {}
    tokenizer.end();

    tokenizer.sink.into_story()
}

struct StorySink {
    assembler: RefCell<Assembler>,
    pending: RefCell<String>,
    error: RefCell<Option<ConvertError>>,
}

impl StorySink {
    fn new(assembler: Assembler) -> Self {
        StorySink {
            assembler: RefCell::new(assembler),
            pending: RefCell::new(String::new()),
            error: RefCell::new(None),
        }
    }

    fn into_story(self) -> ConvertResult<Story> {
        if let Some(err) = self.error.into_inner() {
            return Err(err);
        }
        self.assembler.into_inner().finish()
    }

    fn failed(&self) -> bool {
        self.error.borrow().is_some()
    }

    fn record(&self, result: ConvertResult<()>) {
        if let Err(err) = result {
            *self.error.borrow_mut() = Some(err);
        }
    }

    fn flush_text(&self) -> ConvertResult<()> {
        let text = std::mem::take(&mut *self.pending.borrow_mut());
        if text.is_empty() {
            return Ok(());
        }
        self.assembler.borrow_mut().text(&text)
    }

    fn handle_tag(&self, tag: &Tag) -> ConvertResult<TokenSinkResult<()>> {
        self.flush_text()?;

        let name: &str = &tag.name;
        let mut assembler = self.assembler.borrow_mut();
        match tag.kind {
            TagKind::StartTag => {
                let attrs: Vec<(String, String)> = tag
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                assembler.open_tag(name, &attrs)?;
                if tag.self_closing {
                    assembler.close_tag(name)?;
                }
                Ok(raw_text_state(name))
            }
            TagKind::EndTag => {
                assembler.close_tag(name)?;
                Ok(TokenSinkResult::Continue)
            }
        }
    }

    fn parse_error(&self, message: &str, line_number: u64) -> ConvertResult<()> {
        let lenient = self.assembler.borrow().options().lenient_markup;
        if lenient {
            warn!(line = line_number, "tolerated markup error: {}", message);
            Ok(())
        } else {
            Err(ConvertError::MalformedDocument(format!(
                "line {}: {}",
                line_number, message
            )))
        }
    }
}

/// Elements whose content the tokenizer must not read as markup
fn raw_text_state(name: &str) -> TokenSinkResult<()> {
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        _ => TokenSinkResult::Continue,
    }
}

impl TokenSink for StorySink {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        if self.failed() {
            return TokenSinkResult::Continue;
        }

        match token {
            Token::CharacterTokens(text) => {
                self.pending.borrow_mut().push_str(&text);
                TokenSinkResult::Continue
            }
            Token::NullCharacterToken => {
                self.pending.borrow_mut().push('\0');
                TokenSinkResult::Continue
            }
            Token::TagToken(tag) => match self.handle_tag(&tag) {
                Ok(result) => result,
                Err(err) => {
                    self.record(Err(err));
                    TokenSinkResult::Continue
                }
            },
            Token::ParseError(message) => {
                self.record(self.parse_error(&message, line_number));
                TokenSinkResult::Continue
            }
            // comments, doctypes and end of input close the pending text run
            _ => {
                self.record(self.flush_text());
                TokenSinkResult::Continue
            }
        }
    }
}
