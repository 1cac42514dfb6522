//! PopART `TRAITS` blocks.

use indexmap::IndexMap;
use itertools::Itertools;

/// Unique regions, shorter codes first, then alphabetically.
///
/// ```
/// let regions: Vec<String> = ["A", "EB", "EA", "B", "A"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(hapr::libs::traits::sort_regions(&regions), vec!["A", "B", "EA", "EB"]);
/// ```
pub fn sort_regions(regions: &[String]) -> Vec<String> {
    regions
        .iter()
        .unique()
        .sorted_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        })
        .cloned()
        .collect()
}

/// Comma-separated membership row with a single `1` at the region's column.
///
/// ```
/// let order: Vec<String> = vec!["A".into(), "B".into(), "EA".into()];
/// assert_eq!(hapr::libs::traits::one_hot("B", &order), Some("0,1,0".to_string()));
/// assert_eq!(hapr::libs::traits::one_hot("C", &order), None);
/// ```
pub fn one_hot(region: &str, order: &[String]) -> Option<String> {
    let pos = order.iter().position(|r| r == region)?;
    let row = (0..order.len())
        .map(|i| if i == pos { "1" } else { "0" })
        .join(",");
    Some(row)
}

/// Builds the `TRAITS` block for `taxa`, in their order.
///
/// Taxa without a region, such as outgroups, are left out of the matrix.
pub fn traits_block(taxa: &[String], region_of: &IndexMap<String, String>, order: &[String]) -> String {
    let mut lines = vec![
        "BEGIN TRAITS;".to_string(),
        format!("  Dimensions NTRAITS={};", order.len()),
        "  Format labels=yes missing=? separator=Comma;".to_string(),
        format!("  TraitLabels {};", order.join(" ")),
        "  Matrix".to_string(),
    ];

    for taxon in taxa {
        let Some(region) = region_of.get(taxon) else {
            log::info!("No region for {}, left out of the traits", taxon);
            continue;
        };
        let Some(row) = one_hot(region, order) else {
            continue;
        };
        lines.push(format!("{} {}", taxon, row));
    }

    lines.push("  ;".to_string());
    lines.push("END;".to_string());

    lines.join("\n")
}

/// Appends a block after the trimmed content of a NEXUS file.
///
/// ```
/// let out = hapr::libs::traits::append_block("#NEXUS\nEND;\n\n", "BEGIN TRAITS;\nEND;");
/// assert_eq!(out, "#NEXUS\nEND;\n\nBEGIN TRAITS;\nEND;\n");
/// ```
pub fn append_block(nexus: &str, block: &str) -> String {
    format!("{}\n\n{}\n", nexus.trim_end(), block)
}
