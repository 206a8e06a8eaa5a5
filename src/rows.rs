//! Header-indexed access to decoded CSV rows.
//!
//! The export has a fixed, known header but the column order varies between
//! vintages, so every field read goes through a name → position index built
//! once from the header row. The scalar columns listed in [`REQUIRED_COLUMNS`]
//! must be present or the run aborts before any row is processed; wide-group
//! and checkbox columns are optional and read as empty when absent.

use std::collections::HashMap;

use anyhow::Result;

use crate::error::ImportError;

/// Scalar columns every export vintage must carry. Wide columns and the
/// project-description checkboxes are deliberately excluded.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "record_id",
    "record_type_category",
    "record_type",
    "record_type_subtype",
    "record_type_type",
    "record_type_group",
    "module",
    "planner_id",
    "planner_name",
    "planner_email",
    "planner_phone",
    "the_geom",
    "Shape_Length",
    "Shape_Area",
    "address",
    "OBJECTID",
    "templateid",
    "record_name",
    "description",
    "record_status",
    "constructcost",
    "RELATED_BUILDING_PERMIT",
    "acalink",
    "aalink",
    "date_opened",
    "date_closed",
    "BOS_1ST_READ",
    "BOS_2ND_READ",
    "COM_HEARING",
    "MAYORAL_SIGN",
    "TRANSMIT_DATE_BOS",
    "COM_HEARING_DATE_BOS",
    "MCD_REFERRAL",
    "ENVIRONMENTAL_REVIEW_TYPE",
    "parent",
    "children",
];

#[derive(Debug)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect::<HashMap<_, _>>();
        for required in REQUIRED_COLUMNS {
            if !positions.contains_key(*required) {
                return Err(ImportError::MissingColumn(required.to_string()).into());
            }
        }
        Ok(Self { positions })
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

/// Borrowed view over one decoded row, resolving columns by name.
pub struct RowView<'a> {
    index: &'a HeaderIndex,
    fields: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn new(index: &'a HeaderIndex, fields: &'a [String]) -> Self {
        Self { index, fields }
    }

    /// Returns the raw cell text, or `""` when the column is absent from this
    /// export vintage or the row is short.
    pub fn field(&self, column: &str) -> &'a str {
        self.index
            .position(column)
            .and_then(|idx| self.fields.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn trimmed(&self, column: &str) -> &'a str {
        self.field(column).trim()
    }

    /// Splits a comma-separated identifier list, dropping blanks.
    pub fn id_list(&self, column: &str) -> Vec<&'a str> {
        self.field(column)
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let mut headers = full_headers();
        headers.retain(|h| h != "record_id");
        let err = HeaderIndex::from_headers(&headers).unwrap_err();
        assert!(err.to_string().contains("record_id"));
    }

    #[test]
    fn field_reads_by_name_and_defaults_to_empty() {
        let mut headers = full_headers();
        headers.push("RESIDENTIAL_SRO_EXIST".into());
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let mut fields: Vec<String> = headers.iter().map(|_| String::new()).collect();
        let record_pos = index.position("record_id").unwrap();
        fields[record_pos] = "2015-004109PRJ".into();
        *fields.last_mut().unwrap() = "4".into();

        let row = RowView::new(&index, &fields);
        assert_eq!(row.field("record_id"), "2015-004109PRJ");
        assert_eq!(row.field("RESIDENTIAL_SRO_EXIST"), "4");
        assert_eq!(row.field("RESIDENTIAL_SRO_PROP"), "");
    }

    #[test]
    fn id_list_trims_and_drops_blanks() {
        let headers = full_headers();
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let mut fields: Vec<String> = headers.iter().map(|_| String::new()).collect();
        let parent_pos = index.position("parent").unwrap();
        fields[parent_pos] = " 2014-1083PRJ , ,2015-0042ENV,".into();

        let row = RowView::new(&index, &fields);
        assert_eq!(row.id_list("parent"), vec!["2014-1083PRJ", "2015-0042ENV"]);
        assert!(row.id_list("children").is_empty());
    }
}
