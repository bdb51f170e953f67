//! Update policies against the real file tree.

use chrono::NaiveDate;
use serde_json::json;
use std::path::Path;

use marketexport_core::domain::{ExchangeCode, PricePoint, SectionKind, Ticker};
use marketexport_core::store::{
    append_price_point, layout, load_stock_record, replace_section, AppendOutcome, JsonFileStore,
    StoreError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn documented_append_scenario_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let jse = ExchangeCode::new("jse").unwrap();
    let npn = Ticker::new("NPN").unwrap();
    let rel = layout::stock_price(&jse, &npn);
    let full = dir.path().join(&rel);

    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(&full, r#"[{"Date":"2025-10-30","Price":344.36}]"#).unwrap();

    let next = PricePoint::new(d(2025, 10, 31), 347.12);
    assert_eq!(append_price_point(&store, &rel, next).unwrap(), AppendOutcome::Appended);

    let written = std::fs::read(&full).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
    assert_eq!(
        value,
        json!([
            {"Date": "2025-10-30", "Price": 344.36},
            {"Date": "2025-10-31", "Price": 347.12}
        ])
    );

    assert_eq!(append_price_point(&store, &rel, next).unwrap(), AppendOutcome::Duplicate);
    assert_eq!(std::fs::read(&full).unwrap(), written);
}

#[test]
fn replace_creates_directories_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let ngx = ExchangeCode::new("ngx").unwrap();
    let mtn = Ticker::new("MTNN").unwrap();
    let rel = layout::stock_section(&ngx, &mtn, SectionKind::Competitors);

    replace_section(&store, &rel, &json!([{"name": "AIRTELAFRI"}, {"name": "GLO"}])).unwrap();
    replace_section(&store, &rel, &json!([{"name": "9MOBILE"}])).unwrap();

    let record = load_stock_record(&store, &ngx, &mtn).unwrap();
    assert_eq!(record.competitors, vec![json!({"name": "9MOBILE"})]);
    assert!(record.prices.is_empty());

    // No temp file left behind
    let names: Vec<_> = std::fs::read_dir(dir.path().join("stocks/ngx"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["MTNN_competitors.json".to_string()]);
}

#[test]
fn malformed_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let rel = Path::new("exchanges/jse_index_price.json");
    std::fs::create_dir_all(dir.path().join("exchanges")).unwrap();
    std::fs::write(dir.path().join(rel), "[{\"Date\": 5}]").unwrap();

    let err = append_price_point(&store, rel, PricePoint::new(d(2025, 1, 2), 1.0)).unwrap_err();

    match err {
        StoreError::Malformed { ref path, .. } => assert_eq!(path, rel),
        other => panic!("expected Malformed, got {other:?}"),
    }
}
