//! Pure filter → search → sort transform over a record collection.

use std::cmp::{Ordering, Reverse};

use chrono::NaiveDate;
use feruca::Collator;

use super::{ListQuery, SortOption};
use crate::models::{parse_date, ListRecord};

/// Run `query` over `records` and return the matching records in display order.
///
/// The input is never modified. Stages run in a fixed order: category filter,
/// then text search, then a stable sort. A record whose date is missing or
/// unparseable sorts as the oldest possible date under every date ordering.
///
/// Blank search text disables the search stage. Otherwise the text is matched
/// as typed, surrounding whitespace included.
pub fn run<R: ListRecord>(records: &[R], query: &ListQuery<R::Category>) -> Vec<R> {
    let searching = !query.search.trim().is_empty();
    let needle = query.search.to_lowercase();

    let mut result: Vec<R> = records
        .iter()
        .filter(|record| matches_category(*record, query.category))
        .filter(|record| !searching || matches_search(*record, &needle))
        .cloned()
        .collect();

    sort_records(&mut result, query.sort);
    result
}

/// `true` when `category` is the "all" filter or equals the record's category.
pub fn matches_category<R: ListRecord>(record: &R, category: Option<R::Category>) -> bool {
    category.map_or(true, |c| record.category() == c)
}

/// Case-insensitive substring match of an already-lowercased `needle` against
/// name, issuer, description and every tag.
pub fn matches_search<R: ListRecord>(record: &R, needle: &str) -> bool {
    record.name().to_lowercase().contains(needle)
        || record.issuer().to_lowercase().contains(needle)
        || record.description().to_lowercase().contains(needle)
        || record
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Stable in-place sort; records with equal keys keep their relative order.
pub fn sort_records<R: ListRecord>(records: &mut [R], sort: SortOption) {
    match sort {
        SortOption::Newest => records.sort_by_cached_key(|r| Reverse(date_key(r.primary_date()))),
        SortOption::Oldest => records.sort_by_cached_key(|r| date_key(r.primary_date())),
        SortOption::NameAsc => {
            let mut collator = Collator::default();
            records.sort_by(|a, b| collator.collate(a.name(), b.name()));
        }
        SortOption::NameDesc => {
            let mut collator = Collator::default();
            records.sort_by(|a, b| collator.collate(b.name(), a.name()));
        }
        SortOption::ExpiringSoon => {
            records.sort_by_cached_key(|r| r.expiration_date().and_then(parse_date))
        }
    }
}

/// `None` orders before every real date.
fn date_key(raw: &str) -> Option<NaiveDate> {
    parse_date(raw)
}

/// Unicode collation with the CLDR root order, the same order a browser's
/// default `localeCompare` gives. Names with identical collation keys fall
/// back to byte order.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Award, Certificate, CertificateCategory, CertificateStatus, RecordCategory,
    };
    use crate::store::{seed_awards, seed_certificates};

    fn query(
        category: Option<CertificateCategory>,
        search: &str,
        sort: SortOption,
    ) -> ListQuery<CertificateCategory> {
        ListQuery {
            search: search.to_string(),
            category,
            sort,
        }
    }

    fn ids<R: ListRecord>(records: &[R]) -> Vec<i64> {
        records.iter().map(|r| r.id()).collect()
    }

    fn cert(id: i64, name: &str, issue_date: &str) -> Certificate {
        Certificate {
            id,
            name: name.to_string(),
            issuer: "Issuer".to_string(),
            issue_date: issue_date.to_string(),
            expiration_date: None,
            serial_number: None,
            category: CertificateCategory::Other,
            tags: Vec::new(),
            status: CertificateStatus::Active,
            description: String::new(),
            thumbnail: None,
            pdf_url: None,
        }
    }

    #[test]
    fn test_category_filter_newest() {
        let records = seed_certificates();
        let result = run(
            &records,
            &query(Some(CertificateCategory::Development), "", SortOption::Newest),
        );
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn test_search_matches_tag_and_name() {
        let records = seed_certificates();
        let result = run(&records, &query(None, "react", SortOption::Newest));
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let records = seed_certificates();
        let result = run(&records, &query(None, "zzz-no-match", SortOption::Newest));
        assert!(result.is_empty());
    }

    #[test]
    fn test_expiring_soon_keeps_expired_first() {
        let records = seed_certificates();
        let result = run(&records, &query(None, "", SortOption::ExpiringSoon));
        assert_eq!(ids(&result), vec![4, 1, 2, 5, 3]);
        assert_eq!(result[0].status, CertificateStatus::Expired);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = seed_certificates();
        let result = run(&records, &query(None, "UDEMY", SortOption::Newest));
        assert_eq!(ids(&result), vec![1]);

        // Whitespace only decides whether to search; it is matched as typed.
        let result = run(&records, &query(None, "  UDEMY ", SortOption::Newest));
        assert!(result.is_empty());
        let result = run(&records, &query(None, "   ", SortOption::Newest));
        assert_eq!(result.len(), records.len());
        let result = run(&records, &query(None, "react ", SortOption::Newest));
        assert_eq!(ids(&result), vec![2]);

        // Substring, not token, match in description.
        let result = run(&records, &query(None, "prototyp", SortOption::Newest));
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn test_search_and_category_combine() {
        let records = seed_certificates();
        let result = run(
            &records,
            &query(Some(CertificateCategory::Data), "javascript", SortOption::Newest),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_name_sorts() {
        let records = seed_certificates();
        let asc = run(&records, &query(None, "", SortOption::NameAsc));
        assert_eq!(ids(&asc), vec![5, 4, 2, 3, 1]);
        let desc = run(&records, &query(None, "", SortOption::NameDesc));
        assert_eq!(ids(&desc), vec![1, 3, 2, 4, 5]);
    }

    #[test]
    fn test_oldest_sort() {
        let records = seed_certificates();
        let result = run(&records, &query(None, "", SortOption::Oldest));
        assert_eq!(ids(&result), vec![4, 1, 2, 5, 3]);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Certificate> = Vec::new();
        for sort in Certificate::SORTS {
            assert!(run(&records, &query(None, "x", *sort)).is_empty());
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let records = seed_certificates();
        let before = records.clone();
        let _ = run(&records, &query(None, "a", SortOption::NameDesc));
        assert_eq!(records, before);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let records = seed_certificates();
        for category in CertificateCategory::ALL {
            let q = query(Some(*category), "e", SortOption::Oldest);
            let once = run(&records, &q);
            let twice = run(&once, &q);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_results_satisfy_filters() {
        let records = seed_certificates();
        for category in CertificateCategory::ALL {
            for needle in ["a", "script", "PM", "data", " data", "web "] {
                let q = query(Some(*category), needle, SortOption::Newest);
                for record in run(&records, &q) {
                    assert_eq!(record.category, *category);
                    assert!(matches_search(&record, &needle.to_lowercase()));
                }
            }
        }
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let records = vec![
            cert(1, "Same", "2023-01-01"),
            cert(2, "same", "2023-01-01"),
            cert(3, "Same", "2023-01-01"),
            cert(4, "Same", "2023-01-01"),
        ];
        for sort in [SortOption::Newest, SortOption::Oldest, SortOption::ExpiringSoon] {
            assert_eq!(ids(&run(&records, &query(None, "", sort))), vec![1, 2, 3, 4]);
        }
        // Lowercase sorts before uppercase when the letters tie.
        assert_eq!(
            ids(&run(&records, &query(None, "", SortOption::NameAsc))),
            vec![2, 1, 3, 4]
        );
        assert_eq!(
            ids(&run(&records, &query(None, "", SortOption::NameDesc))),
            vec![1, 3, 4, 2]
        );
    }

    #[test]
    fn test_unparseable_dates_sort_as_oldest() {
        let records = vec![
            cert(1, "A", "not-a-date"),
            cert(2, "B", "2023-06-01"),
            cert(3, "C", ""),
            cert(4, "D", "2022-06-01"),
        ];
        let newest = run(&records, &query(None, "", SortOption::Newest));
        assert_eq!(ids(&newest), vec![2, 4, 1, 3]);
        let oldest = run(&records, &query(None, "", SortOption::Oldest));
        assert_eq!(ids(&oldest), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_awards_pipeline() {
        let awards = seed_awards();
        let result = run(
            &awards,
            &ListQuery {
                search: "technology".to_string(),
                category: None,
                sort: SortOption::Oldest,
            },
        );
        // Matches tags of 2 and 3 and the issuer of 5.
        assert_eq!(ids(&result), vec![5, 3, 2]);

        // Awards carry no expiration date, so the order is the input order.
        let result: Vec<Award> = run(
            &awards,
            &ListQuery {
                search: String::new(),
                category: None,
                sort: SortOption::ExpiringSoon,
            },
        );
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_locale_compare() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Zebra", "apple"), Ordering::Greater);
        assert_eq!(locale_compare("Same", "Same"), Ordering::Equal);
        assert_eq!(locale_compare("same", "Same"), Ordering::Less);
        assert_eq!(locale_compare("Éclair", "Zebra"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Ernie"), Ordering::Less);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letter() {
        let records = vec![
            cert(1, "Zebra Training", "2023-01-01"),
            cert(2, "Éclair Patisserie", "2023-01-01"),
            cert(3, "Data Basics", "2023-01-01"),
        ];
        let asc = run(&records, &query(None, "", SortOption::NameAsc));
        assert_eq!(ids(&asc), vec![3, 2, 1]);
    }
}
