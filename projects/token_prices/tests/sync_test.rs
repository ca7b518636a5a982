mod common;

use common::*;
use interfaces_uniswap_subgraph::index::token_hour_data_id;
use projects_token_prices::{
    config::TokenTable,
    repository::TokenRepository,
    sync::{hour::hour_index, SyncError},
};

#[tokio::test]
async fn initial_sync_of_every_symbol_resolves_to_its_address() {
    let harness = Harness::new();
    let table = TokenTable::default();

    for symbol in ["WBTC", "GNO", "SHIB"] {
        harness
            .synchronizer
            .sync_initial_at(symbol, now())
            .await
            .unwrap();

        let token = harness
            .query
            .get_token_by_symbol(symbol)
            .await
            .unwrap()
            .expect("token stored");
        assert_eq!(Some(token.token_address.as_str()), table.address_of(symbol));
        assert_eq!(token.symbol, symbol);
    }
}

#[tokio::test]
async fn initial_sync_backfills_a_week_of_hours() {
    let harness = Harness::new();

    let report = harness
        .synchronizer
        .sync_initial_at("WBTC", now())
        .await
        .unwrap();

    let current = hour_index(now().timestamp());
    assert_eq!(report.requested_hours, 168);
    assert_eq!(report.stored.len(), 168);
    assert!(report.failures.is_empty());
    assert!(report.missing.is_empty());
    assert_eq!(harness.repository.price_count(), 168);
    assert!(harness
        .repository
        .price(&token_hour_data_id(WBTC, current))
        .is_some());
    assert!(harness
        .repository
        .price(&token_hour_data_id(WBTC, current - 167))
        .is_some());
    assert!(harness
        .repository
        .price(&token_hour_data_id(WBTC, current - 168))
        .is_none());
}

#[tokio::test]
async fn failed_hours_do_not_abort_the_backfill() {
    let source = ScriptedPriceSource::with_default_tokens();
    let current = hour_index(now().timestamp());
    source.fail_hours([current - 100, current - 50, current - 3]);
    let harness = Harness::with_source(source);

    let report = harness
        .synchronizer
        .sync_initial_at("WBTC", now())
        .await
        .unwrap();

    assert_eq!(harness.source.hour_requests(), 168);
    assert_eq!(report.stored.len(), 165);
    assert_eq!(report.failures.len(), 3);
    let mut failed: Vec<i64> = report.failures.iter().map(|f| f.hour_index).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![current - 100, current - 50, current - 3]);
    assert!(report.failures[0].error.contains("500"));
    assert_eq!(harness.repository.price_count(), 165);
}

#[tokio::test]
async fn hours_without_data_are_reported_missing() {
    let source = ScriptedPriceSource::with_default_tokens();
    let current = hour_index(now().timestamp());
    source.miss_hours([current]);
    let harness = Harness::with_source(source);

    let report = harness
        .synchronizer
        .sync_initial_at("GNO", now())
        .await
        .unwrap();

    assert_eq!(report.missing, vec![current]);
    assert_eq!(report.stored.len(), 167);
}

#[tokio::test]
async fn repeated_sync_does_not_duplicate_points() {
    let harness = Harness::new();

    harness
        .synchronizer
        .sync_initial_at("SHIB", now())
        .await
        .unwrap();
    harness
        .synchronizer
        .sync_initial_at("SHIB", now())
        .await
        .unwrap();
    harness
        .synchronizer
        .sync_recurring_at("SHIB", now())
        .await
        .unwrap();

    assert_eq!(harness.repository.price_count(), 168);
}

#[tokio::test]
async fn recurring_sync_stores_the_current_hour() {
    let harness = Harness::new();

    let report = harness
        .synchronizer
        .sync_recurring_at("WBTC", now())
        .await
        .unwrap();

    let current = hour_index(now().timestamp());
    assert_eq!(report.requested_hours, 1);
    assert_eq!(report.stored, vec![token_hour_data_id(WBTC, current)]);
    let stored = harness
        .repository
        .price(&token_hour_data_id(WBTC, current))
        .unwrap();
    assert_eq!(stored.period_start_unix, current * 3_600);
    assert_eq!(stored.token_address, WBTC);
}

#[tokio::test]
async fn token_upsert_only_refreshes_supply_and_volume() {
    let source = ScriptedPriceSource::with_default_tokens();
    let harness = Harness::with_source(source);

    harness.synchronizer.sync_token("WBTC").await.unwrap();

    let mut renamed = wbtc_metadata();
    renamed.name = "Renamed".to_string();
    renamed.decimals = 18;
    renamed.total_supply = 20_000.0;
    renamed.volume_usd = 1.0;
    harness.source.set_metadata(WBTC, renamed);

    let token = harness.synchronizer.sync_token("WBTC").await.unwrap();

    assert_eq!(token.name, "Wrapped BTC");
    assert_eq!(token.decimals, 8);
    assert_eq!(token.total_supply, 20_000.0);
    assert_eq!(token.volume_usd, 1.0);
}

#[tokio::test]
async fn wbtc_metadata_is_stored_as_fetched() {
    let harness = Harness::new();

    harness.synchronizer.sync_token("WBTC").await.unwrap();

    let token = harness
        .query
        .get_token_by_symbol("WBTC")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.token_address, "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599");
    assert_eq!(token.name, "Wrapped BTC");
    assert_eq!(token.symbol, "WBTC");
    assert_eq!(token.total_supply, 18240.0);
    assert_eq!(token.volume_usd, 120242943725.3597);
    assert_eq!(token.decimals, 8);
}

#[tokio::test]
async fn unsupported_symbol_is_rejected() {
    let harness = Harness::new();

    let err = harness
        .synchronizer
        .sync_initial_at("XYZ", now())
        .await
        .unwrap_err();

    match err {
        SyncError::TokenNotSupported { source } => assert_eq!(source.symbol, "XYZ"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(harness.source.hour_requests(), 0);
}

#[tokio::test]
async fn token_unknown_to_the_subgraph_is_not_supported() {
    let source = ScriptedPriceSource::with_default_tokens();
    source.remove_metadata(GNO);
    let harness = Harness::with_source(source);

    let err = harness.synchronizer.sync_recurring("GNO").await.unwrap_err();

    assert!(matches!(err, SyncError::TokenNotSupported { .. }));
}

#[tokio::test]
async fn metadata_outage_is_source_unavailable() {
    let source = ScriptedPriceSource::with_default_tokens();
    source.fail_metadata(WBTC);
    let harness = Harness::with_source(source);

    let err = harness
        .synchronizer
        .sync_initial_at("WBTC", now())
        .await
        .unwrap_err();

    match err {
        SyncError::SourceUnavailable { address, source } => {
            assert_eq!(address, WBTC);
            assert_eq!(source.status().map(|s| s.as_u16()), Some(500));
            assert_eq!(source.body(), Some("Error"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(harness.repository.get_token(WBTC).await.unwrap().is_none());
}

#[tokio::test]
async fn write_failure_is_returned_after_other_writes_land() {
    let harness = Harness::new();
    let current = hour_index(now().timestamp());
    harness
        .repository
        .fail_price_write(&token_hour_data_id(WBTC, current - 10));

    let err = harness
        .synchronizer
        .sync_initial_at("WBTC", now())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Repository { .. }));
    assert_eq!(harness.repository.price_count(), 167);
}

#[tokio::test]
async fn recurring_fetch_failure_is_source_unavailable() {
    let source = ScriptedPriceSource::with_default_tokens();
    let current = hour_index(now().timestamp());
    source.fail_hours([current]);
    let harness = Harness::with_source(source);

    let err = harness
        .synchronizer
        .sync_recurring_at("WBTC", now())
        .await
        .unwrap_err();

    match err {
        SyncError::SourceUnavailable { address, source } => {
            assert_eq!(address, WBTC);
            assert_eq!(source.status().map(|s| s.as_u16()), Some(500));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(harness.repository.price_count(), 0);
}

#[tokio::test]
async fn report_symbol_is_uppercased() {
    let harness = Harness::new();

    let report = harness
        .synchronizer
        .sync_recurring_at("gno", now())
        .await
        .unwrap();

    assert_eq!(report.symbol, "GNO");
    assert_eq!(report.token_address, GNO);
}
