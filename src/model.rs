//! Row structs for every entity kind in the normalized schema.
//!
//! All identities are assigned by the import session, never by the store:
//! records get their 0-based stream position, planners and locations get
//! sequential ids from their interners, record types and project descriptions
//! are keyed by their text codes. The store is a pure sink.

use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerRow {
    pub id: i64,
    /// Source-system login-style identifier; the interning key.
    pub planner_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub id: i64,
    /// Opaque polygon payload; the deduplication key. Not parsed or validated.
    pub the_geom: String,
    pub shape_length: Option<Decimal>,
    pub shape_area: Option<Decimal>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordTypeRow {
    /// Cleaned 3-letter acronym (e.g. PRJ, ENV) or the literal "other".
    pub category: String,
    pub name: String,
    pub subtype: String,
    pub kind: String,
    pub group: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptionRow {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    /// 0-based position in the full input stream.
    pub id: i64,
    /// Source-system record identifier. Carried as-is, not unique-enforced.
    pub record_id: String,
    pub planner_id: Option<i64>,
    pub location_id: Option<i64>,
    pub record_type_category: Option<String>,
    pub object_id: Option<i64>,
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub construct_cost: Option<f64>,
    pub related_building_permit: String,
    pub acalink: String,
    pub aalink: String,
    pub date_opened: Option<NaiveDate>,
    pub date_closed: Option<NaiveDate>,
    pub bos_1st_read: Option<NaiveDate>,
    pub bos_2nd_read: Option<NaiveDate>,
    pub com_hearing: Option<NaiveDate>,
    pub mayoral_sign: Option<NaiveDate>,
    pub transmit_date_bos: Option<NaiveDate>,
    pub com_hearing_date_bos: Option<NaiveDate>,
    pub mcd_referral: String,
    pub environmental_review: String,
}

/// Record ↔ project-description association row.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptionRow {
    pub record_id: i64,
    pub description_code: &'static str,
}

/// Directed parent/child edge between two records, stored child → parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeRow {
    pub child_id: i64,
    pub parent_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DwellingTypeRow {
    pub record_id: i64,
    pub kind: &'static str,
    pub exist: Decimal,
    pub proposed: Decimal,
    pub net: Decimal,
    pub area: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandUseRow {
    pub record_id: i64,
    pub kind: &'static str,
    pub exist: Decimal,
    pub proposed: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFeatureRow {
    pub record_id: i64,
    pub kind: &'static str,
    /// Free-text name carried only by the OTHER sub-type.
    pub other_name: String,
    pub exist: Decimal,
    /// Derived as `exist + net`; the export's `_PROP` columns are not read.
    pub proposed: Decimal,
    pub net: Decimal,
}
