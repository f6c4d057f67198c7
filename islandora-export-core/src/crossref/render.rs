//! Crossref 5.3.1 `doi_batch` serialization.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{Article, Contributor, Document, DoiData, Volume};
use crate::config::DepositKind;
use crate::error::RenderError;

const SCHEMA_VERSION: &str = "5.3.1";

type XmlWriter = Writer<Vec<u8>>;

pub fn to_xml(doc: &Document, kind: DepositKind) -> Result<String, RenderError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("doi_batch").with_attributes([
        ("xmlns", "http://www.crossref.org/schema/5.3.1"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ("xmlns:jats", "http://www.ncbi.nlm.nih.gov/JATS1"),
        ("xmlns:ai", "http://www.crossref.org/AccessIndicators.xsd"),
        ("version", SCHEMA_VERSION),
        (
            "xsi:schemaLocation",
            "http://www.crossref.org/schema/5.3.1 https://www.crossref.org/schemas/crossref5.3.1.xsd",
        ),
    ])))?;

    write_head(&mut w, doc)?;

    start(&mut w, "body")?;
    for volume in &doc.volumes {
        start(&mut w, "journal")?;
        write_journal_metadata(&mut w, doc)?;
        write_issue(&mut w, volume, kind)?;
        for article in &volume.articles {
            write_article(&mut w, article)?;
        }
        end(&mut w, "journal")?;
    }
    if !doc.articles.is_empty() {
        start(&mut w, "journal")?;
        write_journal_metadata(&mut w, doc)?;
        for article in &doc.articles {
            write_article(&mut w, article)?;
        }
        end(&mut w, "journal")?;
    }
    end(&mut w, "body")?;
    end(&mut w, "doi_batch")?;

    let mut bytes = w.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_head(w: &mut XmlWriter, doc: &Document) -> Result<(), RenderError> {
    let head = &doc.head;
    start(w, "head")?;
    text(w, "doi_batch_id", &head.batch_id)?;
    text(w, "timestamp", &head.timestamp.to_string())?;
    start(w, "depositor")?;
    text(w, "depositor_name", &head.depositor_name)?;
    text(w, "email_address", &head.depositor_email)?;
    end(w, "depositor")?;
    text(w, "registrant", &head.registrant)?;
    end(w, "head")
}

fn write_journal_metadata(w: &mut XmlWriter, doc: &Document) -> Result<(), RenderError> {
    w.write_event(Event::Start(
        BytesStart::new("journal_metadata").with_attributes([("language", "en")]),
    ))?;
    text(w, "full_title", &doc.journal.title)?;
    write_doi_data(w, &doc.journal.doi_data)?;
    end(w, "journal_metadata")
}

fn write_issue(w: &mut XmlWriter, volume: &Volume, kind: DepositKind) -> Result<(), RenderError> {
    start(w, "journal_issue")?;
    if let Some(year) = volume.year {
        write_publication_year(w, year)?;
    }
    if let Some(number) = &volume.number {
        start(w, "journal_volume")?;
        text(w, "volume", number)?;
        end(w, "journal_volume")?;
    }
    if kind == DepositKind::JournalIssue {
        if let Some(issue) = &volume.issue {
            text(w, "issue", issue)?;
        }
    }
    if let Some(doi) = &volume.doi_data {
        write_doi_data(w, doi)?;
    }
    end(w, "journal_issue")
}

fn write_article(w: &mut XmlWriter, article: &Article) -> Result<(), RenderError> {
    w.write_event(Event::Start(
        BytesStart::new("journal_article").with_attributes([("publication_type", "full_text")]),
    ))?;
    start(w, "titles")?;
    escaped(w, "title", &article.title)?;
    end(w, "titles")?;

    if !article.contributors.is_empty() {
        start(w, "contributors")?;
        for contributor in &article.contributors {
            write_contributor(w, contributor)?;
        }
        end(w, "contributors")?;
    }

    if let Some(abstract_) = &article.abstract_ {
        start(w, "jats:abstract")?;
        for paragraph in &abstract_.paragraphs {
            text(w, "jats:p", paragraph)?;
        }
        end(w, "jats:abstract")?;
    }

    if let Some(year) = article.year {
        write_publication_year(w, year)?;
    }

    if let Some(license) = &article.license_ref {
        w.write_event(Event::Start(
            BytesStart::new("ai:program").with_attributes([("name", "AccessIndicators")]),
        ))?;
        text(w, "ai:license_ref", license)?;
        end(w, "ai:program")?;
    }

    if let Some(doi) = &article.doi_data {
        write_doi_data(w, doi)?;
    }
    end(w, "journal_article")
}

fn write_contributor(w: &mut XmlWriter, c: &Contributor) -> Result<(), RenderError> {
    w.write_event(Event::Start(BytesStart::new("person_name").with_attributes([
        ("sequence", c.sequence.as_str()),
        ("contributor_role", c.role.as_str()),
    ])))?;
    if !c.given.is_empty() {
        escaped(w, "given_name", &c.given)?;
    }
    escaped(w, "surname", &c.surname)?;
    if let Some(institution) = &c.institution {
        start(w, "affiliations")?;
        start(w, "institution")?;
        text(w, "institution_name", institution)?;
        end(w, "institution")?;
        end(w, "affiliations")?;
    }
    if let Some(orcid) = &c.orcid {
        text(w, "ORCID", orcid)?;
    }
    end(w, "person_name")
}

fn write_publication_year(w: &mut XmlWriter, year: i32) -> Result<(), RenderError> {
    w.write_event(Event::Start(
        BytesStart::new("publication_date").with_attributes([("media_type", "online")]),
    ))?;
    text(w, "year", &year.to_string())?;
    end(w, "publication_date")
}

fn write_doi_data(w: &mut XmlWriter, doi: &DoiData) -> Result<(), RenderError> {
    start(w, "doi_data")?;
    text(w, "doi", &doi.doi)?;
    text(w, "resource", &doi.resource)?;
    end(w, "doi_data")
}

fn start(w: &mut XmlWriter, name: &str) -> Result<(), RenderError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end(w: &mut XmlWriter, name: &str) -> Result<(), RenderError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text(w: &mut XmlWriter, name: &str, value: &str) -> Result<(), RenderError> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    end(w, name)
}

/// For values that are already entity-escaped.
fn escaped(w: &mut XmlWriter, name: &str, value: &str) -> Result<(), RenderError> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::from_escaped(value)))?;
    end(w, name)
}
