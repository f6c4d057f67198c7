//! HTML abstract → JATS paragraphs.
//!
//! The fragment is parsed as XML inside a synthetic root. Every `<p>` that
//! is not itself inside another `<p>` becomes one paragraph holding all of
//! its descendant text. Void elements (`<br>`, `<img>`, ...) may be left
//! unclosed; any other unbalanced tag is an error, as is a fragment with
//! no paragraphs at all. Text is decoded leniently: HTML5 named and numeric
//! character references are resolved and anything else, a bare `&`
//! included, is kept as written.

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AbstractError;

/// Longest reference name considered before a `&` is taken literally.
const MAX_REFERENCE_LEN: usize = 32;

const VOID_ELEMENTS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta",
    b"source", b"track", b"wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Abstract {
    pub paragraphs: Vec<String>,
}

impl Abstract {
    pub fn from_html(html: &str) -> Result<Self, AbstractError> {
        // Some records start with a stray closing tag where the opening one belongs.
        let html = match html.strip_prefix("</p>") {
            Some(rest) => format!("<p>{rest}"),
            None => html.to_string(),
        };
        let wrapped = format!("<root>{html}</root>");

        let mut reader = Reader::from_str(&wrapped);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = false;

        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut paragraphs = Vec::new();
        // Stack depth at which the current paragraph was opened.
        let mut paragraph_at: Option<usize> = None;
        let mut text = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = e.name().as_ref().to_ascii_lowercase();
                    if VOID_ELEMENTS.contains(&name.as_slice()) {
                        continue;
                    }
                    if name == b"p" && paragraph_at.is_none() {
                        paragraph_at = Some(open.len());
                        text.clear();
                    }
                    open.push(name);
                }
                Event::End(e) => {
                    let name = e.name().as_ref().to_ascii_lowercase();
                    if VOID_ELEMENTS.contains(&name.as_slice()) {
                        continue;
                    }
                    match open.pop() {
                        Some(expected) if expected == name => {}
                        _ => return Err(AbstractError::Unclosed),
                    }
                    if paragraph_at == Some(open.len()) {
                        paragraph_at = None;
                        paragraphs.push(text.trim().to_string());
                    }
                }
                Event::Text(e) if paragraph_at.is_some() => {
                    text.push_str(&decode_text(&String::from_utf8_lossy(&e)));
                }
                Event::CData(e) if paragraph_at.is_some() => {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(AbstractError::Unclosed);
        }
        if paragraphs.is_empty() {
            return Err(AbstractError::NoParagraphs);
        }
        Ok(Self { paragraphs })
    }
}

fn decode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let resolved = tail
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_REFERENCE_LEN)
            .and_then(|end| resolve_reference(&tail[..end]).map(|value| (value, end)));
        match resolved {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_reference(name: &str) -> Option<String> {
    match name.strip_prefix('#') {
        Some(number) => {
            let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code).map(String::from)
        }
        None => resolve_html5_entity(name).map(str::to_string),
    }
}
