//! Cell-level comparison of the working table against the original snapshot.
//!
//! Values are compared as exact strings with absent cells read as `""`.

use std::collections::BTreeSet;

use crate::domain::entities::edit::EditedCell;
use crate::domain::entities::record::Record;

/// Every cell of `working` whose value differs from `original` at the same
/// position. Rows present in only one table are skipped.
pub fn diff(working: &[Record], original: &[Record]) -> Vec<EditedCell> {
    let mut edited = Vec::new();
    for (row_idx, (working_row, original_row)) in working.iter().zip(original).enumerate() {
        for (field, new_value) in working_row.fields() {
            let original_value = original_row.value(field);
            if new_value != original_value {
                edited.push(EditedCell {
                    row_idx,
                    field: field.to_string(),
                    original_value: original_value.to_string(),
                    new_value: new_value.to_string(),
                });
            }
        }
    }
    edited
}

pub fn is_cell_modified(
    working: &[Record],
    original: &[Record],
    row_idx: usize,
    field: &str,
) -> bool {
    match (working.get(row_idx), original.get(row_idx)) {
        (Some(working_row), Some(original_row)) => {
            working_row.value(field) != original_row.value(field)
        }
        _ => false,
    }
}

/// Indices of rows holding at least one modified cell.
pub fn modified_rows(working: &[Record], original: &[Record]) -> BTreeSet<usize> {
    working
        .iter()
        .zip(original)
        .enumerate()
        .filter(|(_, (working_row, original_row))| {
            working_row
                .fields()
                .any(|(field, value)| value != original_row.value(field))
        })
        .map(|(row_idx, _)| row_idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Record> {
        vec![
            Record::from_pairs([("id", "1"), ("title", "A"), ("price", "9.99")]),
            Record::from_pairs([("id", "2"), ("title", "B"), ("price", "abc")]),
        ]
    }

    #[test]
    fn identical_tables_have_no_edits() {
        let original = table();
        let working = original.clone();

        assert!(diff(&working, &original).is_empty());
        assert!(modified_rows(&working, &original).is_empty());
    }

    #[test]
    fn single_edit_is_reported_with_both_values() {
        let original = table();
        let mut working = original.clone();
        working[0] = working[0].with_value("price", "12.50");

        let edited = diff(&working, &original);

        assert_eq!(
            edited,
            vec![EditedCell {
                row_idx: 0,
                field: "price".to_string(),
                original_value: "9.99".to_string(),
                new_value: "12.50".to_string(),
            }]
        );
        assert!(is_cell_modified(&working, &original, 0, "price"));
        assert!(!is_cell_modified(&working, &original, 0, "title"));
        assert!(!is_cell_modified(&working, &original, 1, "price"));
    }

    #[test]
    fn absent_original_value_compares_as_empty_string() {
        let original = vec![Record::from_pairs([("a", "x")])];
        let cleared = vec![Record::from_pairs([("a", "x"), ("b", "")])];
        let filled = vec![Record::from_pairs([("a", "x"), ("b", "y")])];

        assert!(diff(&cleared, &original).is_empty());
        assert_eq!(diff(&filled, &original).len(), 1);
        assert_eq!(diff(&filled, &original)[0].original_value, "");
    }

    #[test]
    fn out_of_range_point_query_is_false() {
        let original = table();
        assert!(!is_cell_modified(&original, &original, 10, "id"));
    }

    #[test]
    fn modified_rows_groups_by_row() {
        let original = table();
        let mut working = original.clone();
        working[1] = working[1].with_value("title", "C").with_value("price", "1");

        assert_eq!(diff(&working, &original).len(), 2);
        assert_eq!(modified_rows(&working, &original), BTreeSet::from([1]));
    }
}
