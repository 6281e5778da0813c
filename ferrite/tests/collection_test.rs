use ferrite::collection::Document;
use ferrite::common::Value;
use ferrite::doc;
use ferrite::ferrite::Ferrite;
use std::collections::HashSet;
use std::thread;

#[ctor::ctor]
fn init_logger() {
    colog::init();
}

fn ids(results: &[Document]) -> HashSet<String> {
    results
        .iter()
        .map(|doc| doc.id().unwrap().key_string())
        .collect()
}

#[test]
fn test_find_one_by_primary_key_independent_of_collection_size() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");

    for i in 0..500 {
        users
            .insert_one(doc! { "_id": format!("user-{}", i), "rank": i })
            .unwrap();
    }
    users
        .insert_one(doc! { "_id": "target", "rank": -1 })
        .unwrap();

    let found = users.find_one(Some(&doc! { "_id": "target" })).unwrap();
    assert_eq!(found, Some(doc! { "_id": "target", "rank": -1 }));
}

#[test]
fn test_generated_ids_are_distinct_hex_strings() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");

    let mut handles = vec![];
    for _ in 0..8 {
        let users = users.clone();
        handles.push(thread::spawn(move || {
            let mut keys = Vec::new();
            for _ in 0..100 {
                keys.push(users.insert_one(doc! { "x": 1 }).unwrap());
            }
            keys
        }));
    }

    let mut all_keys = Vec::new();
    for handle in handles {
        all_keys.extend(handle.join().unwrap());
    }

    assert_eq!(users.count(), 800);
    let unique: HashSet<&Value> = all_keys.iter().collect();
    assert_eq!(unique.len(), 800);
    for key in &all_keys {
        let id = key.key_string();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_update_round_trip() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users
        .insert_many(vec![
            doc! { "_id": "1", "f": "v", "other": 1 },
            doc! { "_id": "2", "f": "v" },
            doc! { "_id": "3", "f": "x", "other": 3 },
        ])
        .unwrap();

    let updated = users.update(&doc! { "f": "v" }, &doc! { "g": "w" }).unwrap();
    assert_eq!(updated, 2);

    // every matched document now carries g == w
    let with_g = users.find(Some(&doc! { "g": "w" })).unwrap();
    assert_eq!(ids(&with_g), HashSet::from(["1".to_string(), "2".to_string()]));

    // unmatched documents are unchanged in every field
    let three = users.find_one(Some(&doc! { "_id": "3" })).unwrap().unwrap();
    assert_eq!(three, doc! { "_id": "3", "f": "x", "other": 3 });

    // matched documents keep their untouched fields
    let one = users.find_one(Some(&doc! { "_id": "1" })).unwrap().unwrap();
    assert_eq!(one.get("other"), Some(&Value::Int(1)));
}

#[test]
fn test_remove_round_trip() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users
        .insert_many(vec![
            doc! { "_id": "1", "f": "v" },
            doc! { "_id": "2", "f": "v" },
            doc! { "_id": "3", "f": "x" },
        ])
        .unwrap();

    let before = users.count();
    let removed = users.remove(Some(&doc! { "f": "v" })).unwrap();
    assert_eq!(removed, 2);
    assert!(users.find(Some(&doc! { "f": "v" })).unwrap().is_empty());
    assert_eq!(users.count(), before - removed);
}

#[test]
fn test_index_and_no_index_results_are_identical() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    for i in 0..50 {
        users
            .insert_one(doc! {
                "_id": format!("u{}", i),
                "city": if i % 3 == 0 { "Paris" } else { "Lyon" },
            })
            .unwrap();
    }

    let query = doc! { "city": "Paris" };
    let unindexed = ids(&users.find(Some(&query)).unwrap());

    users.create_index(&doc! { "city": "hashed" }).unwrap();
    let indexed = ids(&users.find(Some(&query)).unwrap());

    assert_eq!(unindexed, indexed);
    assert!(!indexed.is_empty());
}

#[test]
fn test_dot_path_query_matches_only_nested_field() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users
        .insert_many(vec![
            doc! { "_id": "1", "a": doc! { "b": 5 } },
            doc! { "_id": "2", "a": doc! { "b": 6 } },
            doc! { "_id": "3", "a": 5 },
            doc! { "_id": "4", "c": 5 },
        ])
        .unwrap();

    let results = users.find(Some(&doc! { "a.b": 5 })).unwrap();
    assert_eq!(ids(&results), HashSet::from(["1".to_string()]));
}

#[test]
fn test_greater_than_scenario() {
    let db = Ferrite::builder().open();
    let numbers = db.collection("numbers");
    numbers
        .insert_many(vec![
            doc! { "_id": "1", "x": 5 },
            doc! { "_id": "2", "x": 10 },
        ])
        .unwrap();

    let results = numbers
        .find(Some(&doc! { "x": doc! { "$gt": 6 } }))
        .unwrap();
    assert_eq!(results, vec![doc! { "_id": "2", "x": 10 }]);
}

#[test]
fn test_indexed_find_then_remove_scenario() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users.insert_one(doc! { "_id": "3", "name": "bob" }).unwrap();
    users.create_index(&doc! { "name": "hashed" }).unwrap();

    let results = users.find(Some(&doc! { "name": "bob" })).unwrap();
    assert_eq!(results, vec![doc! { "_id": "3", "name": "bob" }]);

    users.remove(Some(&doc! { "name": "bob" })).unwrap();
    assert!(users.find(Some(&doc! { "name": "bob" })).unwrap().is_empty());
}

#[test]
fn test_unrecognized_index_kind_is_ignored() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users.insert_one(doc! { "_id": "1", "name": "bob" }).unwrap();

    // the bogus tag is skipped, the hashed one is honored
    users
        .create_index(&doc! { "name": "btree", "city": "hashed" })
        .unwrap();
    let results = users.find(Some(&doc! { "name": "bob" })).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_set_and_get_key_value_sugar() {
    let db = Ferrite::builder().open();
    let cache = db.collection("cache");

    cache.set("https://a", doc! { "body": "hello" }).unwrap();
    cache.set("https://a", doc! { "body": "world" }).unwrap();

    let fetched = cache.get("https://a").unwrap();
    assert_eq!(fetched.get("body"), Some(&Value::from("world")));
    assert_eq!(cache.count(), 1);
    assert!(cache.get("https://b").is_none());
}

#[test]
fn test_find_one_with_predicate_only() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users
        .insert_many(vec![
            doc! { "_id": "1", "age": 10 },
            doc! { "_id": "2", "age": 20 },
        ])
        .unwrap();

    let predicate = |doc: &Document| doc.get("age") == Some(&Value::Int(20));
    let found = users.find_one_with(None, Some(&predicate)).unwrap().unwrap();
    assert_eq!(found.id(), Some(&Value::from("2")));
}

#[test]
fn test_unknown_operator_errors_through_facade() {
    let db = Ferrite::builder().open();
    let users = db.collection("users");
    users.insert_one(doc! { "x": 1 }).unwrap();

    assert!(users
        .find(Some(&doc! { "x": doc! { "$near": 1 } }))
        .is_err());
}
