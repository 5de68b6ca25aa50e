use chat_widget_engine::{
    generate_session_id, generate_session_id_with, load_or_create_session, KeyValueStore,
    MemoryStore, SESSION_KEY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn session_id_has_time_and_base36_suffix() {
    let id = generate_session_id(1_700_000_000_000);
    let suffix = id
        .strip_prefix("session_1700000000000_")
        .expect("time-based prefix");
    assert_eq!(suffix.len(), 9);
    assert!(suffix
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}

#[test]
fn seeded_generation_is_deterministic() {
    let a = generate_session_id_with(5, &mut StdRng::seed_from_u64(42));
    let b = generate_session_id_with(5, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn session_survives_reinitialization_in_same_store() {
    let store = MemoryStore::new();
    let first = load_or_create_session(&store, 1).expect("first");
    let second = load_or_create_session(&store, 2).expect("second");

    assert_eq!(first, second);
    assert_eq!(store.get(SESSION_KEY).unwrap(), Some(first));
}

#[test]
fn cleared_store_yields_new_session() {
    let store = MemoryStore::new();
    let first = load_or_create_session(&store, 1).expect("first");
    store.clear();
    let second = load_or_create_session(&store, 2).expect("second");

    assert_ne!(first, second);
}

#[test]
fn existing_value_is_reused_verbatim() {
    let store = MemoryStore::new();
    store.set(SESSION_KEY, "session_from_earlier").unwrap();
    assert_eq!(
        load_or_create_session(&store, 9).unwrap(),
        "session_from_earlier"
    );
}
