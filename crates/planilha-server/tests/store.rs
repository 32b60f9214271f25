//! Cell writes, reads, change log and configuration against a real database.

mod common;

use common::{rows, store, store_with, tenant};
use planilha_core::{GridDimensions, TypeTag};
use planilha_server::{AppError, StoreOptions};

/// A written cell reads back with its value and inferred type
#[tokio::test]
async fn test_put_then_get() {
    let t = store().await;
    let barrinha = tenant("BARRINHA");

    let outcome = t.store.put_cell(barrinha, 0, 0, "Escola A").await.unwrap();
    assert_eq!(outcome.previous, None);
    assert_eq!(outcome.kind, TypeTag::Text);

    let cell = t.store.get_cell(barrinha, 0, 0).await.unwrap().unwrap();
    assert_eq!(cell.value, "Escola A");
    assert_eq!(cell.kind, TypeTag::Text);
    assert_eq!((cell.row, cell.col), (0, 0));
}

#[tokio::test]
async fn test_put_classifies_values() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    t.store.put_cell(pontal, 0, 0, "123").await.unwrap();
    t.store.put_cell(pontal, 0, 1, "01/02/2024").await.unwrap();
    t.store.put_cell(pontal, 0, 2, "(16) 3954-1234").await.unwrap();
    t.store.put_cell(pontal, 0, 3, "sim").await.unwrap();

    let kinds: Vec<_> = t
        .store
        .list_cells(pontal, None)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![TypeTag::Number, TypeTag::Date, TypeTag::Phone, TypeTag::Boolean]
    );
}

#[tokio::test]
async fn test_overwrite_keeps_created_at() {
    let t = store().await;
    let dumont = tenant("DUMONT");

    t.store.put_cell(dumont, 3, 2, "antes").await.unwrap();
    let first = t.store.get_cell(dumont, 3, 2).await.unwrap().unwrap();

    let outcome = t.store.put_cell(dumont, 3, 2, "depois").await.unwrap();
    assert_eq!(outcome.previous.as_deref(), Some("antes"));

    let second = t.store.get_cell(dumont, 3, 2).await.unwrap().unwrap();
    assert_eq!(second.value, "depois");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.modified_at >= first.modified_at);
}

#[tokio::test]
async fn test_negative_coordinates_are_rejected() {
    let t = store().await;
    let err = t.store.put_cell(tenant("PONTAL"), -1, 0, "x").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = t.store.get_cell(tenant("PONTAL"), 0, -3).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

/// The reported type is the one persisted with the cell
#[tokio::test]
async fn test_put_reports_stored_type() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    for (col, value) in ["123", "01/02/2024", "(16) 3954-1234", "sim", "  "].iter().enumerate() {
        let outcome = t.store.put_cell(pontal, 4, col as i64, value).await.unwrap();
        let cell = t.store.get_cell(pontal, 4, col as i64).await.unwrap().unwrap();
        assert_eq!(outcome.kind, cell.kind, "value {value:?}");
    }
}

/// Coordinates past the last worksheet row or column never reach the database
#[tokio::test]
async fn test_coordinates_beyond_sheet_limits_are_rejected() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    let err = t
        .store
        .put_cell(pontal, i64::from(u32::MAX), 0, "longe")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = t.store.put_cell(pontal, 0, 16_384, "longe").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(t.store.list_cells(pontal, None).await.unwrap().is_empty());
    assert_eq!(t.store.history_len(pontal).await.unwrap(), 0);

    t.store.put_cell(pontal, 1_048_575, 16_383, "canto").await.unwrap();
    let cell = t.store.get_cell(pontal, 1_048_575, 16_383).await.unwrap().unwrap();
    assert_eq!(cell.value, "canto");

    let err = t.store.set_config(pontal, 1_048_577, 8).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = t.store.set_config(pontal, 20, 16_385).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let dims = t.store.set_config(pontal, 1_048_576, 16_384).await.unwrap();
    assert_eq!(dims, GridDimensions::new(1_048_576, 16_384));
}

#[tokio::test]
async fn test_missing_cell_is_none() {
    let t = store().await;
    assert!(t.store.get_cell(tenant("VIRADOURO"), 9, 9).await.unwrap().is_none());
}

/// Two writes to one key leave two records, newest first
#[tokio::test]
async fn test_history_is_newest_first() {
    let t = store().await;
    let barrinha = tenant("BARRINHA");

    t.store.put_cell(barrinha, 1, 1, "X").await.unwrap();
    t.store.put_cell(barrinha, 1, 1, "Y").await.unwrap();

    let history = t.store.recent_history(barrinha, Some(2)).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        (history[0].previous_value.as_str(), history[0].new_value.as_str()),
        ("X", "Y")
    );
    assert_eq!(
        (history[1].previous_value.as_str(), history[1].new_value.as_str()),
        ("", "X")
    );
    assert!(history[0].id > history[1].id);
    assert_eq!(t.store.history_len(barrinha).await.unwrap(), 2);
}

#[tokio::test]
async fn test_history_limit_defaults_to_options() {
    let t = store_with(StoreOptions {
        history_limit: 3,
        ..StoreOptions::default()
    })
    .await;
    let pontal = tenant("PONTAL");

    for i in 0..5 {
        t.store.put_cell(pontal, 0, i, "v").await.unwrap();
    }

    assert_eq!(t.store.recent_history(pontal, None).await.unwrap().len(), 3);
    assert_eq!(t.store.recent_history(pontal, Some(10)).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_unchanged_writes_are_logged_by_default() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    t.store.put_cell(pontal, 0, 0, "igual").await.unwrap();
    t.store.put_cell(pontal, 0, 0, "igual").await.unwrap();

    assert_eq!(t.store.history_len(pontal).await.unwrap(), 2);
}

#[tokio::test]
async fn test_unchanged_writes_can_be_skipped() {
    let t = store_with(StoreOptions {
        log_unchanged_writes: false,
        ..StoreOptions::default()
    })
    .await;
    let pontal = tenant("PONTAL");

    t.store.put_cell(pontal, 0, 0, "igual").await.unwrap();
    t.store.put_cell(pontal, 0, 0, "igual").await.unwrap();
    t.store.put_cell(pontal, 0, 0, "outro").await.unwrap();

    assert_eq!(t.store.history_len(pontal).await.unwrap(), 2);
}

#[tokio::test]
async fn test_history_is_per_tenant() {
    let t = store().await;
    t.store.put_cell(tenant("PONTAL"), 0, 0, "a").await.unwrap();

    assert!(t
        .store
        .recent_history(tenant("BARRINHA"), None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_list_cells_is_row_major_and_filterable() {
    let t = store().await;
    let sertaozinho = tenant("SERTÃOZINHO");

    t.store.put_cell(sertaozinho, 2, 0, "EMEF Centro").await.unwrap();
    t.store.put_cell(sertaozinho, 0, 1, "EMEI Jardim").await.unwrap();
    t.store.put_cell(sertaozinho, 0, 0, "emef rural").await.unwrap();

    let all = t.store.list_cells(sertaozinho, None).await.unwrap();
    let coords: Vec<_> = all.iter().map(|c| (c.row, c.col)).collect();
    assert_eq!(coords, vec![(0, 0), (0, 1), (2, 0)]);

    let filtered = t.store.list_cells(sertaozinho, Some("EMEF")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].value, "EMEF Centro");
}

#[tokio::test]
async fn test_clear_tenant_empties_only_that_tenant() {
    let t = store().await;
    let pontal = tenant("PONTAL");
    let barrinha = tenant("BARRINHA");

    t.store.import_tabular(pontal, &rows(&[&["a", "b"], &["c", "d"]])).await.unwrap();
    t.store.put_cell(barrinha, 0, 0, "fica").await.unwrap();

    assert_eq!(t.store.clear_tenant(pontal).await.unwrap(), 4);
    assert!(t.store.list_cells(pontal, None).await.unwrap().is_empty());
    assert_eq!(t.store.list_cells(barrinha, None).await.unwrap().len(), 1);

    // History and dimensions survive a clear.
    assert_eq!(t.store.history_len(pontal).await.unwrap(), 4);
    assert_eq!(t.store.get_config(pontal).await.unwrap(), GridDimensions::new(2, 2));
}

#[tokio::test]
async fn test_purge_removes_everything() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    t.store.import_tabular(pontal, &rows(&[&["a", "b", "c"]])).await.unwrap();
    t.store.purge_tenant(pontal).await.unwrap();

    assert!(t.store.list_cells(pontal, None).await.unwrap().is_empty());
    assert_eq!(t.store.history_len(pontal).await.unwrap(), 0);
    assert_eq!(t.store.get_config(pontal).await.unwrap(), GridDimensions::default());
}

#[tokio::test]
async fn test_config_defaults_and_overrides() {
    let t = store().await;
    let viradouro = tenant("VIRADOURO");

    assert_eq!(t.store.get_config(viradouro).await.unwrap(), GridDimensions::new(20, 8));

    let set = t.store.set_config(viradouro, 40, 12).await.unwrap();
    assert_eq!(set, GridDimensions::new(40, 12));
    assert_eq!(t.store.get_config(viradouro).await.unwrap(), set);

    assert!(matches!(
        t.store.set_config(viradouro, -1, 12).await,
        Err(AppError::Validation(_))
    ));
}

/// Cells beyond the configured rectangle stay retrievable
#[tokio::test]
async fn test_cells_outside_configured_bounds() {
    let t = store().await;
    let pontal = tenant("PONTAL");

    t.store.put_cell(pontal, 500, 30, "longe").await.unwrap();
    let cell = t.store.get_cell(pontal, 500, 30).await.unwrap().unwrap();
    assert_eq!(cell.value, "longe");
}

#[tokio::test]
async fn test_tenant_stats() {
    let t = store().await;
    let jardinopolis = tenant("JARDINÓPOLIS");

    let empty = t.store.tenant_stats(jardinopolis).await.unwrap();
    assert_eq!((empty.rows, empty.cells, empty.first_row), (0, 0, None));

    t.store.put_cell(jardinopolis, 2, 0, "a").await.unwrap();
    t.store.put_cell(jardinopolis, 2, 1, "  ").await.unwrap();
    t.store.put_cell(jardinopolis, 7, 0, "b").await.unwrap();

    let stats = t.store.tenant_stats(jardinopolis).await.unwrap();
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.first_row, Some(2));
    assert_eq!(stats.last_row, Some(7));
    assert_eq!(stats.cells, 3);
    assert_eq!(stats.filled_cells, 2);
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.db");
    let url = format!("sqlite://{}", path.display());

    {
        let db = planilha_server::db::Database::connect(&url, 2).await.unwrap();
        db.migrate().await.unwrap();
        let store = planilha_server::GridStore::new(db.clone(), StoreOptions::default());
        store.put_cell(tenant("PONTAL"), 0, 0, "persistido").await.unwrap();
        db.close().await;
        assert!(db.is_closed());
    }

    let db = planilha_server::db::Database::connect(&url, 2).await.unwrap();
    db.migrate().await.unwrap();
    let store = planilha_server::GridStore::new(db, StoreOptions::default());
    let cell = store.get_cell(tenant("PONTAL"), 0, 0).await.unwrap().unwrap();
    assert_eq!(cell.value, "persistido");
}
