//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_outside, path_exists, read_relative,
};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
            "diesel::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "reqwest::",
            "diesel::",
        ],
    );

    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter::", "crate::infrastructure::", "reqwest::", "diesel::"],
    );

    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn diesel_is_confined_to_sqlite_adapter() {
    let hits = find_lines_containing_outside(
        "src",
        &["diesel::", "use diesel"],
        &["src/adapter/outbound/sqlite/", "src/error.rs"],
    );

    assert!(
        hits.is_empty(),
        "diesel used outside the sqlite adapter: {hits:#?}"
    );
}

#[test]
fn api_key_is_only_read_by_twelve_data_adapter() {
    let hits = find_lines_containing_outside(
        "src",
        &["\"TWELVE_DATA_API_KEY\""],
        &["src/adapter/outbound/twelvedata/"],
    );

    assert!(
        hits.is_empty(),
        "Twelve Data API key referenced outside its adapter: {hits:#?}"
    );
}

#[test]
fn pool_returns_tokens_through_delay_queue() {
    let scheduler = read_relative("src/application/pool/scheduler.rs");
    assert!(
        scheduler.contains("DelayQueue"),
        "token return should be driven by a DelayQueue"
    );

    let lease = read_relative("src/application/pool/lease.rs");
    assert!(
        !lease.contains("sleep(") && !lease.contains("tokio::spawn"),
        "a dropped lease should hand its token to the scheduler, not wait itself"
    );
}

#[test]
fn migrations_are_embedded_from_crate_root() {
    assert!(path_exists("migrations/2024-01-01-000000_create_symbols/up.sql"));
    assert!(path_exists("migrations/2024-01-01-000000_create_symbols/down.sql"));

    let connection = read_relative("src/adapter/outbound/sqlite/database/connection.rs");
    assert!(connection.contains("embed_migrations!(\"migrations\")"));
}
