//! Closed enumerations from the source system's data dictionary.
//!
//! The wide columns of the export encode each measurement as
//! `{PREFIX}_{CODE}_{SUFFIX}`; the tables below drive a single generic
//! expansion routine in [`crate::expand`] instead of building attribute names
//! on the fly. Codes are the exact column-name fragments used by the export,
//! labels are the display names from the data dictionary.

/// One repeated-group column family of the export.
pub struct WideGroup {
    /// Column-name prefix shared by every measurement in the group.
    pub prefix: &'static str,
    /// `(code, label)` pairs, one per sub-type.
    pub kinds: &'static [(&'static str, &'static str)],
    /// Whether the group carries an `_AREA` measurement.
    pub has_area: bool,
    /// Whether `_PROP` is read from the source. The project-feature group
    /// derives proposed as `exist + net` instead; its `_PROP` columns are
    /// unreliable in the export.
    pub reads_proposed: bool,
    /// Sub-type whose free-text name lives in the suffix-less `{PREFIX}_{CODE}`
    /// column, if the group has one.
    pub other_code: Option<&'static str>,
}

pub const DWELLING_TYPES: WideGroup = WideGroup {
    prefix: "RESIDENTIAL",
    kinds: &[
        ("ADU_1BR", "Accessory Dwelling Unit 1 Bedroom, Units"),
        ("ADU_2BR", "Accessory Dwelling Unit 2 Bedroom, Units"),
        ("ADU_3BR", "Accessory Dwelling Unit 3+ Bedroom, Units"),
        ("ADU_STUDIO", "Accessory Dwelling Unit Studio, Units"),
        ("BR_1", "1 Bedroom, Units"),
        ("BR_2", "2 Bedroom, Units"),
        ("BR_3", "3+ Bedroom, Units"),
        ("GH_BEDS", "Group Housing, Beds"),
        ("GH_ROOMS", "Group Housing, Rooms"),
        ("MICRO", "Micro, Units"),
        ("SRO", "SRO, Units"),
        ("STUDIO", "Studios, Units"),
    ],
    has_area: true,
    reads_proposed: true,
    other_code: None,
};

pub const LAND_USES: WideGroup = WideGroup {
    prefix: "LAND_USE",
    kinds: &[
        ("RC", "Retail/Commercial (sq ft)"),
        ("RESIDENTIAL", "Residential (sq ft)"),
        ("CIE", "CIE (Cultural, Institutional, Educational)"),
        ("PDR", "Industrial-PDR (sq ft)"),
        ("OFFICE", "Office (sq ft)"),
        ("MEDICAL", "Medical (sq ft)"),
        ("VISITOR", "Visitor (sq ft)"),
        ("PARKING_SPACES", "Parking Spaces (sq ft)"),
    ],
    has_area: false,
    reads_proposed: true,
    other_code: None,
};

pub const PROJECT_FEATURES: WideGroup = WideGroup {
    prefix: "PRJ_FEATURE",
    kinds: &[
        ("AFFORDABLE", "Dwelling Units-Affordable, Units"),
        ("HOTEL_ROOMS", "Hotel Rooms"),
        ("MARKET_RATE", "Dwelling Units-Market Rate, Units"),
        ("BUILD", "Building Number"),
        ("STORIES", "Stories Number"),
        ("PARKING", "Parking Spaces"),
        ("LOADING", "Loading Spaces"),
        ("BIKE", "Bicycle Spaces"),
        ("CAR_SHARE", "Car Share Spaces"),
        ("USABLE", "Usable Open Spaces"),
        ("PUBLIC", "Public Open Space"),
        ("ART", "Public Art"),
        ("ROOF", "Better Roof - Total Roof Area"),
        ("SOLAR", "Better Roof - Solar Area"),
        ("LIVING", "Better Roof - Living Roof Area"),
        ("OTHER", "Other Project Feature"),
    ],
    has_area: false,
    reads_proposed: false,
    other_code: Some("OTHER"),
};

/// Project-description checkbox tags. The codes double as the checkbox column
/// names in the export; all rows are created up front, before the row scan.
pub const PROJECT_DESCRIPTIONS: &[(&str, &str)] = &[
    ("ADDITIONS", "Additions"),
    ("ADU", "Accessory Dwelling Unit"),
    ("AFFORDABLE_UNITS", "100% Affordable Housing"),
    ("CHANGE_OF_USE", "Change of Use"),
    ("DEMOLITION", "Demolition"),
    ("FACADE_ALT", "Facade Alterations"),
    ("FINANCIAL", "Financial Services"),
    ("FORMULA_RETAIL", "Formula Retail"),
    ("INCLUSIONARY", "Inclusionary Housing Required"),
    ("LEG_ZONE_CHANGE", "Legislative/Zoning Change"),
    ("LOT_LINE_ADJUST", "Lot Line Adjustment-Subdivision"),
    ("MASSAGE", "Massage Establishment"),
    ("MCD", "Medical Cannabis Dispensary"),
    ("NEW_CONSTRUCTION", "New Construction"),
    ("OTHER_NON_RES", "Non-Residential Use Type - Other"),
    ("OTHER_PRJ_DESC", "Other"),
    ("ROW_IMPROVE", "ROW Improvements"),
    ("SENIOR", "Senior Housing"),
    ("SPECIAL_NEEDS", "Special Needs Housing"),
    ("STATE_DENSITY_BONUS", "State Density Bonus"),
    ("STUDENT", "Student Housing"),
    ("TOBACCO", "Tobacco Paraphernalia Est"),
];

/// Checkbox truthiness for the project-description columns. The export mixes
/// "CHECKED"/"UNCHECKED", yes/no, and 1/0 encodings across vintages.
pub fn is_checked(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return false;
    }
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "unchecked" | "no" | "n" | "false" | "0" | "nan" | "null"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_shapes_match_the_data_dictionary() {
        assert_eq!(DWELLING_TYPES.kinds.len(), 12);
        assert_eq!(LAND_USES.kinds.len(), 8);
        assert_eq!(PROJECT_FEATURES.kinds.len(), 16);
        assert_eq!(PROJECT_DESCRIPTIONS.len(), 22);
        assert!(PROJECT_FEATURES.other_code.is_some());
        assert!(!PROJECT_FEATURES.reads_proposed);
    }

    #[test]
    fn is_checked_accepts_positive_encodings_only() {
        assert!(is_checked("CHECKED"));
        assert!(is_checked("Yes"));
        assert!(is_checked("1"));
        assert!(!is_checked(""));
        assert!(!is_checked("UNCHECKED"));
        assert!(!is_checked("No"));
        assert!(!is_checked("0"));
        assert!(!is_checked("NaN"));
    }
}
