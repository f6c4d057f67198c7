use tracing::{info, warn};

use super::contributor::{build_contributor, is_author, Sequence};
use super::{escape_html, Abstract, Article, Document, DoiData, Head, Journal, Volume};
use crate::config::CrossrefSettings;
use crate::contract::Fetcher;
use crate::entity::Entity;
use crate::error::ProjectionError;
use crate::schema;

/// Map a traversed node set rooted at a journal onto a Crossref document.
///
/// Direct children of the root are volume candidates. A childless candidate
/// with a full title is really an article and is attached to the journal
/// directly; everything else becomes a volume holding its children as
/// articles. Volumes that end up without articles are dropped.
pub async fn project<F: Fetcher + ?Sized>(
    fetcher: &F,
    nodes: &[Entity],
    root_id: i64,
    base_url: &str,
    settings: &CrossrefSettings,
) -> Result<Document, ProjectionError> {
    let base_url = base_url.trim_end_matches('/');
    let root = nodes
        .iter()
        .find(|n| n.nid == root_id)
        .ok_or(ProjectionError::RootNotFound { nid: root_id })?;

    let doi = settings
        .journal_doi
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| {
            root.identifier("doi")
                .map(|i| i.value.clone())
                .filter(|d| !d.is_empty())
        })
        .ok_or(ProjectionError::MissingRequiredMetadata { what: "journal DOI" })?;
    let resource = settings
        .journal_url
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| node_resource(base_url, root_id));
    let title = root.text(schema::TITLE).unwrap_or_default().to_string();
    if title.is_empty() {
        warn!(nid = root_id, "Journal node has no title");
    }
    info!(doi = %doi, url = %resource, title = %title, "Resolved journal metadata");

    let mut volumes = Vec::new();
    let mut direct = Vec::new();

    for candidate in nodes.iter().filter(|n| n.is_member_of(root_id)) {
        let has_children = nodes.iter().any(|n| n.is_member_of(candidate.nid));
        if !has_children && candidate.text(schema::FULL_TITLE).is_some() {
            let article =
                build_article(fetcher, base_url, candidate, candidate.issued_year()).await?;
            info!(nid = candidate.nid, title = %article.title, "Projected childless volume as direct article");
            direct.push(article);
            continue;
        }

        let mut volume = Volume {
            nid: candidate.nid,
            doi_data: doi_data(base_url, candidate),
            number: None,
            issue: None,
            year: candidate.issued_year(),
            articles: Vec::new(),
        };
        if let Some(details) = candidate.field(schema::PART_DETAIL) {
            for detail in details.part_details() {
                match detail.part_type.as_deref() {
                    Some("volume") => volume.number = detail.number.clone(),
                    Some("issue") => volume.issue = detail.number.clone(),
                    _ => {}
                }
            }
        }

        for child in nodes.iter().filter(|n| n.is_member_of(candidate.nid)) {
            let article = build_article(fetcher, base_url, child, volume.year).await?;
            if volume.year.is_none() {
                volume.year = article.year;
            }
            volume.articles.push(article);
        }

        if volume.articles.is_empty() {
            info!(nid = volume.nid, "Dropping volume without articles");
            continue;
        }
        info!(nid = volume.nid, articles = volume.articles.len(), "Projected volume");
        volumes.push(volume);
    }

    Ok(Document {
        head: Head {
            registrant: settings.registrant.clone(),
            depositor_name: settings.depositor_name.clone(),
            depositor_email: settings.depositor_email.clone(),
            timestamp: chrono::Utc::now().timestamp(),
            batch_id: uuid::Uuid::new_v4().to_string(),
        },
        journal: Journal {
            title,
            doi_data: DoiData { doi, resource },
        },
        volumes,
        articles: direct,
    })
}

async fn build_article<F: Fetcher + ?Sized>(
    fetcher: &F,
    base_url: &str,
    node: &Entity,
    fallback_year: Option<i32>,
) -> Result<Article, ProjectionError> {
    let title = node
        .text(schema::FULL_TITLE)
        .or_else(|| node.text(schema::TITLE))
        .unwrap_or_default();

    // Getty AAT URIs are vocabulary terms, not licenses.
    let license_ref = node
        .text(schema::RIGHTS)
        .filter(|r| !r.contains(".getty"))
        .map(str::to_string);

    let abstract_ = match node.text(schema::ABSTRACT) {
        Some(html) => Some(
            Abstract::from_html(html)
                .map_err(|source| ProjectionError::Abstract { nid: node.nid, source })?,
        ),
        None => None,
    };

    let mut contributors = Vec::new();
    let agents = node
        .field(schema::LINKED_AGENT)
        .map(|f| f.typed_relations())
        .unwrap_or(&[]);
    for agent in agents.iter().filter(|a| is_author(a)) {
        let sequence = if contributors.is_empty() {
            Sequence::First
        } else {
            Sequence::Additional
        };
        if let Some(contributor) = build_contributor(fetcher, base_url, agent, sequence).await? {
            contributors.push(contributor);
        }
    }

    Ok(Article {
        nid: node.nid,
        title: escape_html(title),
        abstract_,
        contributors,
        doi_data: doi_data(base_url, node),
        year: node.issued_year().or(fallback_year),
        license_ref,
    })
}

fn doi_data(base_url: &str, node: &Entity) -> Option<DoiData> {
    node.identifier("doi")
        .filter(|i| !i.value.is_empty())
        .map(|i| DoiData {
            doi: i.value.clone(),
            resource: node_resource(base_url, node.nid),
        })
}

fn node_resource(base_url: &str, nid: i64) -> String {
    format!("{}/node/{}", base_url, nid)
}
