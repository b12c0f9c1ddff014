use super::*;

use crate::{
    store::{RecordStore, StoreId},
    testing::{dated_record, file_record},
};

fn order(store: &RecordStore) -> Vec<String> {
    store
        .child_entries(None)
        .expect("children")
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn same_date_sorts_by_time_of_day() {
    let date = FileDate::new(2024, 5, 17);
    let early = dated_record("early", 1, date, FileTime::new(10, 0, 0));
    let late = dated_record("late", 2, date, FileTime::new(10, 0, 1));

    assert_eq!(compare_date_time(&early, &late), Ordering::Less);
    assert_eq!(compare_date_time(&late, &early), Ordering::Greater);
    assert_eq!(compare_date_time(&early, &early), Ordering::Equal);
}

#[test]
fn different_dates_ignore_time() {
    let older = dated_record("older", 1, FileDate::new(2023, 12, 31), FileTime::new(23, 59, 59));
    let newer = dated_record("newer", 2, FileDate::new(2024, 1, 1), FileTime::new(0, 0, 0));

    assert_eq!(compare_date_time(&older, &newer), Ordering::Less);

    // Month outweighs day.
    let feb = dated_record("feb", 3, FileDate::new(2024, 2, 1), FileTime::new(1, 0, 0));
    let jan = dated_record("jan", 4, FileDate::new(2024, 1, 31), FileTime::new(1, 0, 0));
    assert_eq!(compare_date_time(&jan, &feb), Ordering::Less);
}

#[test]
fn name_comparison_is_bytewise() {
    let upper = file_record("B", 1);
    let lower = file_record("a", 2);
    assert_eq!(compare_name(&upper, &lower), Ordering::Less);
}

#[test]
fn scan_order_survives_other_sorts() {
    let store = RecordStore::owned(StoreId(1));
    store
        .insert_batch(
            None,
            vec![
                dated_record("m", 1, FileDate::new(2024, 3, 1), FileTime::new(9, 0, 0)),
                dated_record("z", 2, FileDate::new(2020, 1, 1), FileTime::new(9, 0, 0)),
                dated_record("a", 3, FileDate::new(2022, 7, 4), FileTime::new(9, 0, 0)),
            ],
        )
        .expect("insert");
    let original = order(&store);

    store.sort_with(SortKey::Name.comparator());
    assert_eq!(order(&store), vec!["a", "m", "z"]);
    store.sort_with(SortKey::DateTime.comparator());
    assert_eq!(order(&store), vec!["z", "a", "m"]);

    let indices: Vec<u32> = store
        .child_entries(None)
        .expect("children")
        .iter()
        .map(|c| c.scan_index)
        .collect();
    assert_eq!(indices, vec![2, 3, 1], "indices travel with their records");

    store.sort_with(SortKey::ScanOrder.comparator());
    assert_eq!(order(&store), original);
}

#[test]
fn sorting_twice_changes_nothing() {
    let store = RecordStore::owned(StoreId(1));
    let same_date = FileDate::new(2024, 1, 1);
    let same_time = FileTime::new(8, 0, 0);
    store
        .insert_batch(
            None,
            vec![
                dated_record("b", 1, same_date, same_time),
                dated_record("a", 2, same_date, same_time),
                dated_record("c", 3, same_date, same_time),
            ],
        )
        .expect("insert");

    for key in [SortKey::Name, SortKey::DateTime, SortKey::ScanOrder] {
        store.sort_with(key.comparator());
        let once = order(&store);
        store.sort_with(key.comparator());
        assert_eq!(order(&store), once, "sorting by {key} twice");
    }
}

#[test]
fn equal_dates_keep_their_relative_order() {
    let store = RecordStore::owned(StoreId(1));
    let d = FileDate::new(2024, 1, 1);
    let t = FileTime::new(8, 0, 0);
    store
        .insert_batch(
            None,
            vec![dated_record("x", 1, d, t), dated_record("y", 2, d, t)],
        )
        .expect("insert");

    store.sort_with(compare_date_time);
    assert_eq!(order(&store), vec!["x", "y"]);
}

#[test]
fn sort_key_parses_cli_spellings() {
    assert_eq!("name".parse::<SortKey>(), Ok(SortKey::Name));
    assert_eq!("Scan".parse::<SortKey>(), Ok(SortKey::ScanOrder));
    assert_eq!("date".parse::<SortKey>(), Ok(SortKey::DateTime));
    assert!("size".parse::<SortKey>().is_err());
    assert_eq!(SortKey::default(), SortKey::ScanOrder);
    assert_eq!(SortKey::DateTime.to_string(), "date");
}
