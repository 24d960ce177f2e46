//! Massachusetts county lookup table.
//!
//! Maps the 14 county names (without the " County" suffix) to their
//! five-digit region code: the state FIPS code `25` followed by the
//! three-digit county FIPS code.

/// State FIPS prefix shared by every Massachusetts region code.
pub const STATE_FIPS: &str = "25";

/// County name to region code, alphabetical by name.
pub static COUNTIES: &[(&str, &str)] = &[
    ("Barnstable", "25001"),
    ("Berkshire", "25003"),
    ("Bristol", "25005"),
    ("Dukes", "25007"),
    ("Essex", "25009"),
    ("Franklin", "25011"),
    ("Hampden", "25013"),
    ("Hampshire", "25015"),
    ("Middlesex", "25017"),
    ("Nantucket", "25019"),
    ("Norfolk", "25021"),
    ("Plymouth", "25023"),
    ("Suffolk", "25025"),
    ("Worcester", "25027"),
];

/// Returns the region code for a normalized county name.
#[must_use]
pub fn region_code(county: &str) -> Option<&'static str> {
    COUNTIES
        .iter()
        .find(|(name, _)| *name == county)
        .map(|(_, code)| *code)
}

/// Returns the county name for a region code.
#[must_use]
pub fn county_for_code(code: &str) -> Option<&'static str> {
    COUNTIES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Returns `true` if `county` is one of the 14 known counties.
#[must_use]
pub fn is_known(county: &str) -> bool {
    region_code(county).is_some()
}

/// County names in display order.
pub fn names() -> impl Iterator<Item = &'static str> {
    COUNTIES.iter().map(|(name, _)| *name)
}
