//! Filtered, sorted and paginated projection of the working table.
//!
//! Nothing here mutates the table; every call recomputes the projection from
//! the rows it is given.

use std::cmp::Ordering;

use crate::domain::entities::dataset::{PageQuery, PageResult, SortDirection, SortSpec, ViewRow};
use crate::domain::entities::record::Record;
use crate::PAGE_SIZE;

pub fn view<'a>(working: &'a [Record], query: &PageQuery) -> PageResult<'a> {
    let mut rows = filter_rows(working, &query.global_search);
    if let Some(sort) = &query.sort {
        sort_rows(&mut rows, sort);
    }

    let total_rows = rows.len();
    PageResult {
        rows: paginate(rows, query.page),
        page: query.page,
        total_rows,
        total_pages: total_pages(total_rows),
    }
}

/// Rows where some cell contains `term`, ignoring case. An empty term keeps
/// every row.
pub fn filter_rows<'a>(working: &'a [Record], term: &str) -> Vec<ViewRow<'a>> {
    let needle = term.to_lowercase();
    working
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            needle.is_empty()
                || record
                    .values()
                    .any(|value| value.to_lowercase().contains(&needle))
        })
        .map(|(row_idx, record)| ViewRow { row_idx, record })
        .collect()
}

/// Stable sort on one column; ties keep their incoming order.
pub fn sort_rows(rows: &mut [ViewRow<'_>], sort: &SortSpec) {
    rows.sort_by(|left, right| {
        let ordering = compare_values(
            left.record.value(&sort.field),
            right.record.value(&sort.field),
        );
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Numeric comparison when both values parse as finite numbers, string
/// comparison otherwise. The choice is made per pair, not per column.
pub fn compare_values(left: &str, right: &str) -> Ordering {
    match (parse_number(left), parse_number(right)) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        _ => locale_compare(left, right),
    }
}

pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Case-folded ordering; among strings that fold equal, lowercase sorts first.
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
        .then_with(|| right.cmp(left))
}

/// Slice of the 1-indexed `page`. Pages outside the range come back empty.
pub fn paginate<T>(rows: Vec<T>, page: usize) -> Vec<T> {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(PAGE_SIZE))
    else {
        return Vec::new();
    };
    rows.into_iter().skip(start).take(PAGE_SIZE).collect()
}

pub fn total_pages(total_rows: usize) -> usize {
    total_rows.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|value| Record::from_pairs([("v", *value)]))
            .collect()
    }

    fn sorted_values(rows: &[Record], sort: SortSpec) -> Vec<String> {
        let query = PageQuery {
            sort: Some(sort),
            ..PageQuery::default()
        };
        view(rows, &query)
            .rows
            .iter()
            .map(|row| row.record.value("v").to_string())
            .collect()
    }

    #[test]
    fn numeric_column_sorts_numerically() {
        let rows = column(&["10", "2", "33"]);

        assert_eq!(sorted_values(&rows, SortSpec::ascending("v")), ["2", "10", "33"]);
        assert_eq!(sorted_values(&rows, SortSpec::descending("v")), ["33", "10", "2"]);
    }

    #[test]
    fn text_column_sorts_case_insensitively() {
        let rows = column(&["banana", "Apple", "cherry", "apple"]);

        assert_eq!(
            sorted_values(&rows, SortSpec::ascending("v")),
            ["apple", "Apple", "banana", "cherry"]
        );
    }

    #[test]
    fn mixed_pair_falls_back_to_string_order() {
        assert_eq!(compare_values("10", "9"), Ordering::Greater);
        assert_eq!(compare_values("10", "9x"), Ordering::Less);
        assert_eq!(compare_values("", "1"), Ordering::Less);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let rows: Vec<Record> = [("1", "a"), ("2", "b"), ("1", "c"), ("2", "d"), ("1", "e")]
            .iter()
            .map(|(key, tag)| Record::from_pairs([("k", *key), ("tag", *tag)]))
            .collect();
        let query = PageQuery {
            sort: Some(SortSpec::ascending("k")),
            ..PageQuery::default()
        };

        let tags: Vec<&str> = view(&rows, &query)
            .rows
            .iter()
            .map(|row| row.record.value("tag"))
            .collect();

        assert_eq!(tags, ["a", "c", "e", "b", "d"]);
    }

    #[test]
    fn unknown_sort_field_keeps_filtered_order() {
        let rows = column(&["c", "a", "b"]);

        assert_eq!(sorted_values(&rows, SortSpec::ascending("nope")), ["c", "a", "b"]);
    }

    #[test]
    fn filter_matches_any_cell_ignoring_case() {
        let rows = vec![
            Record::from_pairs([("name", "Alice"), ("city", "Paris")]),
            Record::from_pairs([("name", "Bob"), ("city", "Tokyo")]),
            Record::from_pairs([("name", "Carol"), ("city", "PARMA")]),
        ];

        let kept = filter_rows(&rows, "par");
        let kept_idx: Vec<usize> = kept.iter().map(|row| row.row_idx).collect();

        assert_eq!(kept_idx, [0, 2]);
        for (row_idx, record) in rows.iter().enumerate() {
            let matches = record.values().any(|v| v.to_lowercase().contains("par"));
            assert_eq!(matches, kept_idx.contains(&row_idx));
        }
        assert_eq!(filter_rows(&rows, "").len(), 3);
    }

    #[test]
    fn view_rows_carry_working_table_index() {
        let rows = column(&["same", "other", "same"]);
        let query = PageQuery {
            global_search: "same".to_string(),
            ..PageQuery::default()
        };

        let page = view(&rows, &query);

        let indices: Vec<usize> = page.rows.iter().map(|row| row.row_idx).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn pagination_of_120_rows() {
        let values: Vec<String> = (0..120).map(|n| n.to_string()).collect();
        let rows: Vec<Record> = values
            .iter()
            .map(|value| Record::from_pairs([("v", value.as_str())]))
            .collect();
        let query = PageQuery {
            page: 2,
            ..PageQuery::default()
        };

        let page = view(&rows, &query);

        assert_eq!(page.total_rows, 120);
        assert_eq!(page.total_pages, 3);
        let indices: Vec<usize> = page.rows.iter().map(|row| row.row_idx).collect();
        assert_eq!(indices, (50..=99).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let rows = column(&["a", "b"]);

        for page in [0, 2, usize::MAX] {
            let query = PageQuery {
                page,
                ..PageQuery::default()
            };
            assert!(view(&rows, &query).rows.is_empty(), "page {page}");
        }
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(50), 1);
        assert_eq!(total_pages(51), 2);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);
        assert_eq!(clamp_page(4, 0), 1);
    }
}
