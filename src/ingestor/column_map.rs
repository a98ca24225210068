use std::collections::HashMap;

/// What a single source column maps to.
///
/// `Skip` drops the column from every subsequent row; the surviving
/// targets keep the column order of the header for positional
/// reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnTarget {
    Field(String),
    Skip,
}

/// How a source's header row is projected onto record field names.
///
/// Only two policies exist across the import jobs, so this is a closed
/// variant rather than a caller-supplied callback.
#[derive(Debug, Clone)]
pub enum ColumnPolicy {
    /// Fixed table from trimmed header text to field name; headers with
    /// no entry map to `Skip`.
    Explicit(HashMap<String, String>),
    /// Every trimmed header becomes a field name verbatim, optionally
    /// substituting one sentinel header for a reserved field name.
    PassThrough { rename: Option<(String, String)> },
}

impl ColumnPolicy {
    pub fn explicit<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::Explicit(
            pairs
                .into_iter()
                .map(|(header, field)| (header.into(), field.into()))
                .collect(),
        )
    }

    pub fn pass_through() -> Self {
        Self::PassThrough { rename: None }
    }

    pub fn pass_through_with_rename<S: Into<String>, T: Into<String>>(
        sentinel: S,
        replacement: T,
    ) -> Self {
        Self::PassThrough {
            rename: Some((sentinel.into(), replacement.into())),
        }
    }

    /// Project a header row onto ordered column targets.
    pub fn map_header<'a, I>(&self, header: I) -> Vec<ColumnTarget>
    where
        I: IntoIterator<Item = &'a str>,
    {
        header
            .into_iter()
            .map(|cell| {
                let cell = cell.trim();
                match self {
                    Self::Explicit(table) => match table.get(cell) {
                        Some(field) => ColumnTarget::Field(field.clone()),
                        None => ColumnTarget::Skip,
                    },
                    Self::PassThrough { rename } => match rename {
                        Some((sentinel, replacement)) if cell == sentinel => {
                            ColumnTarget::Field(replacement.clone())
                        }
                        _ => ColumnTarget::Field(cell.to_string()),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_table_maps_known_headers_and_skips_unknown() {
        let policy = ColumnPolicy::explicit([
            ("Departure", "departure"),
            ("Covered distance (m)", "distance"),
        ]);
        let targets = policy.map_header(vec!["Departure", "Weather", "Covered distance (m)"]);
        assert_eq!(
            targets,
            vec![
                ColumnTarget::Field("departure".to_string()),
                ColumnTarget::Skip,
                ColumnTarget::Field("distance".to_string()),
            ]
        );
    }

    #[test]
    fn explicit_table_trims_header_cells_before_lookup() {
        let policy = ColumnPolicy::explicit([("Departure", "departure")]);
        let targets = policy.map_header(vec!["  Departure "]);
        assert_eq!(targets, vec![ColumnTarget::Field("departure".to_string())]);
    }

    #[test]
    fn pass_through_uses_trimmed_headers_verbatim() {
        let policy = ColumnPolicy::pass_through();
        let targets = policy.map_header(vec![" FID", "Nimi ", "x"]);
        assert_eq!(
            targets,
            vec![
                ColumnTarget::Field("FID".to_string()),
                ColumnTarget::Field("Nimi".to_string()),
                ColumnTarget::Field("x".to_string()),
            ]
        );
    }

    #[test]
    fn pass_through_substitutes_only_the_sentinel() {
        let policy = ColumnPolicy::pass_through_with_rename("ID", "station_id");
        let targets = policy.map_header(vec!["FID", "ID", "Nimi"]);
        assert_eq!(
            targets,
            vec![
                ColumnTarget::Field("FID".to_string()),
                ColumnTarget::Field("station_id".to_string()),
                ColumnTarget::Field("Nimi".to_string()),
            ]
        );
    }

    #[test]
    fn mapping_preserves_column_order() {
        let policy = ColumnPolicy::explicit([("A", "a"), ("B", "b"), ("C", "c")]);
        let targets = policy.map_header(vec!["C", "A", "B"]);
        assert_eq!(
            targets,
            vec![
                ColumnTarget::Field("c".to_string()),
                ColumnTarget::Field("a".to_string()),
                ColumnTarget::Field("b".to_string()),
            ]
        );
    }
}
