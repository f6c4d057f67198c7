mod common;

use common::{routes, BASE};
use islandora_export_core::config::CrossrefSettings;
use islandora_export_core::contract::MockFetcher;
use islandora_export_core::crossref::{project, Sequence};
use islandora_export_core::entity::Entity;
use islandora_export_core::error::ProjectionError;
use islandora_export_core::field::{
    EntityReference, FieldValues, GenericValue, PartDetail, TypedRelation, TypedText,
};

fn offline() -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();
    fetcher
}

fn text(value: &str) -> FieldValues {
    FieldValues::Generic(vec![GenericValue::new(value)])
}

fn node(nid: i64, parent: Option<i64>) -> Entity {
    let mut e = Entity::new(nid).with_field("nid", FieldValues::Integer(vec![nid]));
    if let Some(parent) = parent {
        e = e.with_field(
            "field_member_of",
            FieldValues::EntityReference(vec![EntityReference::to(parent)]),
        );
    }
    e
}

fn journal(nid: i64) -> Entity {
    node(nid, None)
        .with_field("title", text("Lehigh Review"))
        .with_field(
            "field_identifier",
            FieldValues::TypedText(vec![TypedText::with_attr("doi", "10.1/x")]),
        )
}

fn volume_detail(number: &str) -> FieldValues {
    FieldValues::PartDetail(vec![PartDetail {
        part_type: Some("volume".into()),
        number: Some(number.into()),
        ..Default::default()
    }])
}

#[tokio::test]
async fn test_end_to_end_journal_volume_article() {
    let nodes = vec![
        journal(10),
        node(11, Some(10)).with_field("field_part_detail", volume_detail("3")),
        node(12, Some(11))
            .with_field("field_full_title", text("Paper A"))
            .with_field("field_edtf_date_issued", FieldValues::Edtf(vec!["2020-05".into()]))
            .with_field("field_rights", text("CC-BY")),
    ];

    let doc = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .expect("projection should succeed");

    assert_eq!(doc.journal.title, "Lehigh Review");
    assert_eq!(doc.journal.doi_data.doi, "10.1/x");
    assert_eq!(doc.journal.doi_data.resource, format!("{BASE}/node/10"));
    assert!(doc.articles.is_empty());
    assert_eq!(doc.volumes.len(), 1);

    let volume = &doc.volumes[0];
    assert_eq!(volume.number.as_deref(), Some("3"));
    assert_eq!(volume.year, Some(2020));
    assert_eq!(volume.articles.len(), 1);

    let article = &volume.articles[0];
    assert_eq!(article.title, "Paper A");
    assert_eq!(article.year, Some(2020));
    assert_eq!(article.license_ref.as_deref(), Some("CC-BY"));
    assert!(article.doi_data.is_none());

    assert!(!doc.head.batch_id.is_empty());
    assert!(doc.head.timestamp > 0);
}

#[tokio::test]
async fn test_childless_titled_candidate_becomes_direct_article() {
    let nodes = vec![
        journal(10),
        node(20, Some(10))
            .with_field("field_full_title", text("Standalone Essay"))
            .with_field("field_part_detail", volume_detail("9"))
            .with_field("field_edtf_date_issued", FieldValues::Edtf(vec!["2018".into()]))
            .with_field(
                "field_identifier",
                FieldValues::TypedText(vec![TypedText::with_attr("doi", "10.1/essay")]),
            ),
        // Childless and untitled: a volume with no articles, dropped.
        node(21, Some(10)).with_field("field_part_detail", volume_detail("4")),
    ];

    let doc = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();

    assert!(doc.volumes.is_empty());
    assert_eq!(doc.articles.len(), 1);
    let article = &doc.articles[0];
    assert_eq!(article.nid, 20);
    assert_eq!(article.title, "Standalone Essay");
    assert_eq!(article.year, Some(2018));
    let doi = article.doi_data.as_ref().unwrap();
    assert_eq!(doi.doi, "10.1/essay");
    assert_eq!(doi.resource, format!("{BASE}/node/20"));
}

#[tokio::test]
async fn test_article_year_propagates_to_volume_without_one() {
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("First"))
            .with_field("field_edtf_date_issued", FieldValues::Edtf(vec!["2019-01-02".into()])),
        node(13, Some(11)).with_field("field_full_title", text("Second")),
    ];
    let doc = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();
    let volume = &doc.volumes[0];
    assert_eq!(volume.year, Some(2019));
    assert_eq!(volume.articles[1].year, Some(2019));
}

#[tokio::test]
async fn test_title_escaped_and_getty_rights_suppressed() {
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("Bread & <Butter>"))
            .with_field("field_rights", text("http://vocab.getty.edu/page/aat/300")),
    ];
    let doc = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();
    let article = &doc.volumes[0].articles[0];
    assert_eq!(article.title, "Bread &amp; &lt;Butter&gt;");
    assert!(article.license_ref.is_none());
}

#[tokio::test]
async fn test_root_missing_and_doi_missing_are_fatal() {
    let settings = CrossrefSettings::default();
    let err = project(&offline(), &[node(11, Some(10))], 10, BASE, &settings)
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectionError::RootNotFound { nid: 10 }));

    let untitled = vec![node(10, None)];
    let err = project(&offline(), &untitled, 10, BASE, &settings)
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectionError::MissingRequiredMetadata { .. }));

    let configured = CrossrefSettings {
        journal_doi: Some("10.9/configured".into()),
        journal_url: Some("https://journal.test".into()),
        ..Default::default()
    };
    let doc = project(&offline(), &untitled, 10, BASE, &configured)
        .await
        .unwrap();
    assert_eq!(doc.journal.doi_data.doi, "10.9/configured");
    assert_eq!(doc.journal.doi_data.resource, "https://journal.test");
}

#[tokio::test]
async fn test_malformed_abstract_is_surfaced() {
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("Paper"))
            .with_field(
                "field_abstract",
                FieldValues::TypedText(vec![TypedText {
                    value: "<p>unclosed <em>emphasis</p>".into(),
                    ..Default::default()
                }]),
            ),
    ];
    let err = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectionError::Abstract { nid: 12, .. }));
}

fn agent(rel_type: &str, url: Option<&str>) -> TypedRelation {
    TypedRelation {
        target_id: 1,
        rel_type: rel_type.into(),
        url: url.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_contributors_filtered_sequenced_and_enriched() {
    let fetcher = routes(vec![
        (
            format!("{BASE}/taxonomy/term/1?_format=json"),
            serde_json::json!([{
                "tid": [{"value": 1}],
                "name": [{"value": "Zimmer, Jane Q. - Lehigh University"}],
                "field_relationships": [
                    {"target_id": 8, "rel_type": "schema:memberOf", "url": "/taxonomy/term/8"},
                    {"target_id": 9, "rel_type": "schema:worksFor", "url": "/taxonomy/term/9"}
                ],
                "field_identifier": [{"attr0": "orcid", "value": "0000-0001-2345-6789"}]
            }])
            .to_string(),
        ),
        (
            format!("{BASE}/taxonomy/term/9?_format=json"),
            r#"{"tid":[{"value":9}],"name":[{"value":"Lehigh University"}]}"#.to_string(),
        ),
        (
            format!("{BASE}/taxonomy/term/2?_format=json"),
            r#"[{"name":[{"value":"Alan Turing"}]}]"#.to_string(),
        ),
    ]);

    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("Paper"))
            .with_field(
                "field_linked_agent",
                FieldValues::TypedRelation(vec![
                    agent("relators:aut", Some("/taxonomy/term/1")),
                    agent("relators:edt", Some("/taxonomy/term/3")),
                    agent("relators:cre", Some("/taxonomy/term/2")),
                    agent("relators:aut", None),
                ]),
            ),
    ];

    let doc = project(&fetcher, &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();
    let contributors = &doc.volumes[0].articles[0].contributors;
    assert_eq!(contributors.len(), 2);

    let zimmer = &contributors[0];
    assert_eq!(zimmer.surname, "Zimmer");
    assert_eq!(zimmer.given, "Jane Q.");
    assert_eq!(zimmer.institution.as_deref(), Some("Lehigh University"));
    assert_eq!(zimmer.orcid.as_deref(), Some("0000-0001-2345-6789"));
    assert_eq!(zimmer.sequence, Sequence::First);
    assert_eq!(zimmer.role, "author");

    // Later in document order, so additional despite sorting first alphabetically.
    let turing = &contributors[1];
    assert_eq!(turing.surname, "Turing");
    assert_eq!(turing.given, "Alan");
    assert_eq!(turing.institution, None);
    assert_eq!(turing.sequence, Sequence::Additional);
}

#[tokio::test]
async fn test_failed_term_lookup_is_fatal() {
    let fetcher = routes(vec![]);
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11)).with_field(
            "field_linked_agent",
            FieldValues::TypedRelation(vec![agent("relators:aut", Some("/taxonomy/term/404"))]),
        ),
    ];
    let err = project(&fetcher, &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectionError::Fetch(_)));
}

#[tokio::test]
async fn test_first_sequence_goes_to_first_emitted_author() {
    let fetcher = routes(vec![(
        format!("{BASE}/taxonomy/term/2?_format=json"),
        r#"[{"name":[{"value":"Hopper, Grace"}]}]"#.to_string(),
    )]);
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("Paper"))
            .with_field(
                "field_linked_agent",
                FieldValues::TypedRelation(vec![
                    agent("relators:aut", None),
                    agent("relators:aut", Some("/taxonomy/term/2")),
                ]),
            ),
    ];

    let doc = project(&fetcher, &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();
    let contributors = &doc.volumes[0].articles[0].contributors;
    assert_eq!(contributors.len(), 1);
    assert_eq!(contributors[0].surname, "Hopper");
    assert_eq!(contributors[0].sequence, Sequence::First);
}

#[tokio::test]
async fn test_abstract_with_html_entities_does_not_abort_export() {
    let nodes = vec![
        journal(10),
        node(11, Some(10)),
        node(12, Some(11))
            .with_field("field_full_title", text("Paper"))
            .with_field(
                "field_abstract",
                FieldValues::TypedText(vec![TypedText {
                    value: "<p>Caf&eacute; R&D</p>".into(),
                    ..Default::default()
                }]),
            ),
    ];
    let doc = project(&offline(), &nodes, 10, BASE, &CrossrefSettings::default())
        .await
        .unwrap();
    let abstract_ = doc.volumes[0].articles[0].abstract_.as_ref().unwrap();
    assert_eq!(abstract_.paragraphs, vec!["Caf\u{e9} R&D"]);
}
