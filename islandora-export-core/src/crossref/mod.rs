//! Crossref deposit model.
//!
//! [`project`](project::project) maps a traversed node set onto a
//! [`Document`]; [`render::to_xml`] serializes it as a `doi_batch`.
//! Titles and person names are stored HTML-escaped, the way they are
//! written into the deposit.

pub mod contributor;
pub mod jats;
pub mod project;
pub mod render;

pub use contributor::{Contributor, Sequence, Term};
pub use jats::Abstract;
pub use project::project;

#[derive(Debug, Clone, PartialEq)]
pub struct DoiData {
    pub doi: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    pub registrant: String,
    pub depositor_name: String,
    pub depositor_email: String,
    /// Seconds since the epoch at projection time.
    pub timestamp: i64,
    pub batch_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Journal {
    pub title: String,
    pub doi_data: DoiData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub nid: i64,
    pub doi_data: Option<DoiData>,
    pub number: Option<String>,
    pub issue: Option<String>,
    pub year: Option<i32>,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub nid: i64,
    pub title: String,
    pub abstract_: Option<Abstract>,
    pub contributors: Vec<Contributor>,
    pub doi_data: Option<DoiData>,
    pub year: Option<i32>,
    pub license_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub head: Head,
    pub journal: Journal,
    pub volumes: Vec<Volume>,
    /// Articles attached straight to the journal (childless volume candidates).
    pub articles: Vec<Article>,
}

pub fn escape_html(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}
