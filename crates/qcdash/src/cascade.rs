//! Type → Package taxonomy for the cascading dropdowns.
//!
//! The table is static lookup data, independent of any loaded dataset. The
//! filter engine never consults it: it only sees the resolved `Assay` and
//! `Desired_Size` values as ordinary filter columns.

use once_cell::sync::Lazy;

use crate::classify::ALL;

/// Column holding the assay type ("Type" in the UI).
pub const TYPE_COLUMN: &str = "Assay";

/// Column holding the ordered package ("Package" in the UI).
pub const PACKAGE_COLUMN: &str = "Desired_Size";

/// Legal packages per assay type, in display order.
pub const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Illumina Whole Exome Sequencing",
        &[
            "200 Mbp", "400 Mbp", "650 Mbp", "1 Gbp", "2 Gbp", "5 Gbp", "10 Gbp", "25 Gbp",
            "50 Gbp", "30×", "60x",
        ],
    ),
    ("Illumina Whole Genome Sequencing", &["50x", "100x", "200x"]),
    ("mRNA Enrichment", &["25M", "50M", "100M", "200M"]),
    ("rRNA Depletion", &["12M", "25M", "50M", "100M", "200M"]),
    ("Pacbio WGS", &["25M"]),
    ("Pacbio AAV", &["25M"]),
    ("Pacbio IsoSeq", &["25M"]),
];

/// Union of every type's packages, first-seen order, no duplicates.
static ALL_PACKAGES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut packages: Vec<&'static str> = Vec::new();
    for (_, list) in TAXONOMY {
        for &package in *list {
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    }
    packages
});

/// Type dropdown options: `All` followed by every type in table order.
pub fn types() -> Vec<&'static str> {
    std::iter::once(ALL)
        .chain(TAXONOMY.iter().map(|(t, _)| *t))
        .collect()
}

/// Packages valid for a type. `All` yields the union over every type.
///
/// Returns `None` for a type that is not in the taxonomy.
pub fn packages_for(assay_type: &str) -> Option<&'static [&'static str]> {
    if assay_type == ALL {
        return Some(ALL_PACKAGES.as_slice());
    }
    TAXONOMY
        .iter()
        .find(|(t, _)| *t == assay_type)
        .map(|(_, packages)| *packages)
}

/// Whether `package` may stay selected once `assay_type` is selected.
///
/// The `All` package is always valid. When this returns false the caller
/// must reset the package selection to `All`.
pub fn is_valid(assay_type: &str, package: &str) -> bool {
    if package == ALL {
        return true;
    }
    packages_for(assay_type).is_some_and(|packages| packages.contains(&package))
}

/// UI label for a column name; other columns keep their own name.
pub fn display_label(column: &str) -> &str {
    match column {
        TYPE_COLUMN => "Type",
        PACKAGE_COLUMN => "Package",
        other => other,
    }
}
