//! Machine-name → field-kind table for the repository's object bundle.
//!
//! The REST JSON carries no type information, so the kind of each field
//! is looked up here. Anything not listed decodes as [`FieldKind::Generic`].

use crate::field::FieldKind;

pub const NID: &str = "nid";
pub const TITLE: &str = "title";
pub const FULL_TITLE: &str = "field_full_title";
pub const MEMBER_OF: &str = "field_member_of";
pub const IDENTIFIER: &str = "field_identifier";
pub const PART_DETAIL: &str = "field_part_detail";
pub const EDTF_DATE_ISSUED: &str = "field_edtf_date_issued";
pub const RIGHTS: &str = "field_rights";
pub const ABSTRACT: &str = "field_abstract";
pub const LINKED_AGENT: &str = "field_linked_agent";
pub const WEIGHT: &str = "field_weight";

const KINDS: &[(&str, FieldKind)] = &[
    ("nid", FieldKind::Integer),
    ("vid", FieldKind::Integer),
    ("tid", FieldKind::Integer),
    ("status", FieldKind::Boolean),
    ("type", FieldKind::ConfigReference),
    ("uid", FieldKind::EntityReference),
    ("revision_uid", FieldKind::EntityReference),
    ("field_abstract", FieldKind::TypedText),
    ("field_coordinates", FieldKind::GeoLocation),
    ("field_copyright_date", FieldKind::Edtf),
    ("field_date_captured", FieldKind::Edtf),
    ("field_date_modified", FieldKind::Edtf),
    ("field_date_valid", FieldKind::Edtf),
    ("field_edtf_date", FieldKind::Edtf),
    ("field_edtf_date_created", FieldKind::Edtf),
    ("field_edtf_date_issued", FieldKind::Edtf),
    ("field_email", FieldKind::Email),
    ("field_frequency", FieldKind::EntityReference),
    ("field_genre", FieldKind::EntityReference),
    ("field_geographic_subject", FieldKind::EntityReference),
    ("field_identifier", FieldKind::TypedText),
    ("field_language", FieldKind::EntityReference),
    ("field_linked_agent", FieldKind::TypedRelation),
    ("field_member_of", FieldKind::EntityReference),
    ("field_mode_of_issuance", FieldKind::EntityReference),
    ("field_model", FieldKind::EntityReference),
    ("field_note", FieldKind::TypedText),
    ("field_part_detail", FieldKind::PartDetail),
    ("field_physical_form", FieldKind::EntityReference),
    ("field_place_published_country", FieldKind::EntityReference),
    ("field_related_item", FieldKind::RelatedItem),
    ("field_relationships", FieldKind::TypedRelation),
    ("field_representative_image", FieldKind::EntityReference),
    ("field_resource_type", FieldKind::EntityReference),
    ("field_subject", FieldKind::EntityReference),
    ("field_subject_general", FieldKind::EntityReference),
    ("field_subject_hierarchical_geo", FieldKind::HierarchicalGeographic),
    ("field_subjects_name", FieldKind::EntityReference),
    ("field_temporal_subject", FieldKind::EntityReference),
    ("field_viewer_override", FieldKind::EntityReference),
    ("field_weight", FieldKind::Integer),
];

pub fn kind_of(machine_name: &str) -> FieldKind {
    KINDS
        .iter()
        .find(|(name, _)| *name == machine_name)
        .map(|(_, kind)| *kind)
        .unwrap_or(FieldKind::Generic)
}
