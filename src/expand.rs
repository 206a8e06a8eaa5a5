//! Expansion of the repeated-group "wide" column families into child rows.
//!
//! One generic routine walks a declarative [`WideGroup`] table and reads the
//! `{PREFIX}_{CODE}_{SUFFIX}` columns for each sub-type. The representation is
//! sparse: a sub-type whose measurements are all zero or blank produces no row
//! at all.

use rust_decimal::Decimal;

use crate::{
    catalog::{DWELLING_TYPES, LAND_USES, PROJECT_FEATURES, WideGroup},
    dates::decimal_or_zero,
    model::{DwellingTypeRow, LandUseRow, ProjectFeatureRow},
    rows::RowView,
};

/// Measurements read for one sub-type of a group.
struct Measures {
    code: &'static str,
    exist: Decimal,
    proposed: Decimal,
    net: Decimal,
    area: Decimal,
    other_name: String,
}

fn expand_group(row: &RowView<'_>, group: &WideGroup) -> Vec<Measures> {
    let mut out = Vec::new();
    for &(code, _label) in group.kinds {
        let column = |suffix: &str| format!("{}_{}_{}", group.prefix, code, suffix);
        let exist = decimal_or_zero(row.field(&column("EXIST")));
        let net = decimal_or_zero(row.field(&column("NET")));
        let proposed = if group.reads_proposed {
            decimal_or_zero(row.field(&column("PROP")))
        } else {
            // The source PROP columns for this group are unreliable; proposed
            // is reconstructed from the existing amount and the net change.
            exist + net
        };
        let area = if group.has_area {
            decimal_or_zero(row.field(&column("AREA")))
        } else {
            Decimal::ZERO
        };
        let other_name = match group.other_code {
            Some(other) if other == code => row
                .trimmed(&format!("{}_{}", group.prefix, code))
                .to_string(),
            _ => String::new(),
        };

        let truthy = !exist.is_zero()
            || !net.is_zero()
            || (group.reads_proposed && !proposed.is_zero())
            || (group.has_area && !area.is_zero())
            || !other_name.is_empty();
        if truthy {
            out.push(Measures {
                code,
                exist,
                proposed,
                net,
                area,
                other_name,
            });
        }
    }
    out
}

pub fn dwelling_types(row: &RowView<'_>, record_id: i64) -> Vec<DwellingTypeRow> {
    expand_group(row, &DWELLING_TYPES)
        .into_iter()
        .map(|m| DwellingTypeRow {
            record_id,
            kind: m.code,
            exist: m.exist,
            proposed: m.proposed,
            net: m.net,
            area: m.area,
        })
        .collect()
}

pub fn land_uses(row: &RowView<'_>, record_id: i64) -> Vec<LandUseRow> {
    expand_group(row, &LAND_USES)
        .into_iter()
        .map(|m| LandUseRow {
            record_id,
            kind: m.code,
            exist: m.exist,
            proposed: m.proposed,
            net: m.net,
        })
        .collect()
}

pub fn project_features(row: &RowView<'_>, record_id: i64) -> Vec<ProjectFeatureRow> {
    expand_group(row, &PROJECT_FEATURES)
        .into_iter()
        .map(|m| ProjectFeatureRow {
            record_id,
            kind: m.code,
            other_name: m.other_name,
            exist: m.exist,
            proposed: m.proposed,
            net: m.net,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{HeaderIndex, REQUIRED_COLUMNS};

    fn row_setup(extra: &[(&str, &str)]) -> (Vec<String>, Vec<String>) {
        let mut headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut fields: Vec<String> = headers.iter().map(|_| String::new()).collect();
        for (name, value) in extra {
            headers.push(name.to_string());
            fields.push(value.to_string());
        }
        (headers, fields)
    }

    #[test]
    fn all_zero_sub_types_produce_no_rows() {
        let (headers, fields) = row_setup(&[
            ("RESIDENTIAL_BR_1_EXIST", "0"),
            ("RESIDENTIAL_BR_1_PROP", "0"),
            ("RESIDENTIAL_BR_1_NET", ""),
            ("RESIDENTIAL_BR_1_AREA", "0"),
        ]);
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let row = RowView::new(&index, &fields);
        assert!(dwelling_types(&row, 0).is_empty());
        assert!(land_uses(&row, 0).is_empty());
        assert!(project_features(&row, 0).is_empty());
    }

    #[test]
    fn dwelling_row_emitted_when_any_measure_is_nonzero() {
        let (headers, fields) = row_setup(&[
            ("RESIDENTIAL_BR_1_AREA", "650"),
            ("RESIDENTIAL_STUDIO_EXIST", "2"),
            ("RESIDENTIAL_STUDIO_PROP", "4"),
            ("RESIDENTIAL_STUDIO_NET", "2"),
        ]);
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let row = RowView::new(&index, &fields);

        let rows = dwelling_types(&row, 7);
        assert_eq!(rows.len(), 2);
        let br1 = rows.iter().find(|r| r.kind == "BR_1").unwrap();
        assert!(br1.exist.is_zero());
        assert_eq!(br1.area.to_string(), "650");
        let studio = rows.iter().find(|r| r.kind == "STUDIO").unwrap();
        assert_eq!(studio.proposed.to_string(), "4");
        assert_eq!(studio.record_id, 7);
    }

    #[test]
    fn land_use_ignores_area_columns() {
        let (headers, fields) = row_setup(&[
            ("LAND_USE_OFFICE_EXIST", "1200"),
            ("LAND_USE_OFFICE_PROP", "3400"),
            ("LAND_USE_OFFICE_NET", "2200"),
        ]);
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let rows = land_uses(&RowView::new(&index, &fields), 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "OFFICE");
        assert_eq!(rows[0].proposed.to_string(), "3400");
    }

    #[test]
    fn project_feature_proposed_is_derived_not_read() {
        let (headers, fields) = row_setup(&[
            ("PRJ_FEATURE_PARKING_EXIST", "10"),
            ("PRJ_FEATURE_PARKING_NET", "-4"),
            // Present in the export but deliberately ignored.
            ("PRJ_FEATURE_PARKING_PROP", "99"),
        ]);
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let rows = project_features(&RowView::new(&index, &fields), 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].exist.to_string(), "10");
        assert_eq!(rows[0].net.to_string(), "-4");
        assert_eq!(rows[0].proposed.to_string(), "6");
        // net == proposed - exist holds by construction.
        assert_eq!(rows[0].net, rows[0].proposed - rows[0].exist);
    }

    #[test]
    fn other_feature_emits_on_label_alone() {
        let (headers, fields) = row_setup(&[("PRJ_FEATURE_OTHER", "Rooftop antenna farm")]);
        let index = HeaderIndex::from_headers(&headers).unwrap();
        let rows = project_features(&RowView::new(&index, &fields), 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "OTHER");
        assert_eq!(rows[0].other_name, "Rooftop antenna farm");
        assert!(rows[0].exist.is_zero());
    }
}
