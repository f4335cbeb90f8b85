use demand_forecast::data::DataLoader;
use demand_forecast::error::ForecastError;
use demand_forecast::features::build_observations;
use demand_forecast::history::{aggregate_daily, SalesRecord};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,product_id,lag_1,lag_7,is_holiday,weather_score,actual_sales").unwrap();
    writeln!(file, "2024-01-01,P1,3,4,0,0.2,5").unwrap();
    writeln!(file, "2024-01-02,P1,5,,1,,6").unwrap();
    writeln!(file, "2024-01-06,P1,6,2,true,0.9,2").unwrap();

    let observations = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(observations.len(), 3);
    assert_eq!(observations[0].day_of_week, 0);
    assert_eq!(observations[1].lag_7, 0.0);
    assert_eq!(observations[1].weather_score, 0.5);
    assert!(observations[1].is_holiday);
    assert!(observations[2].is_weekend);
    assert_eq!(observations[2].actual_sales, Some(2.0));
}

#[test]
fn test_calendar_columns_without_date() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "day_of_week,month,price").unwrap();
    writeln!(file, "6,12,19.99").unwrap();

    let observations = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(observations[0].month, 12);
    assert!(observations[0].is_weekend);
    assert_eq!(observations[0].actual_sales, None);
}

#[test]
fn test_data_loader_error_handling() {
    assert!(matches!(
        DataLoader::from_csv("nonexistent_file.csv"),
        Err(ForecastError::IoError(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "lag_1,actual_sales").unwrap();
    writeln!(file, "3,4").unwrap();
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::ConfigurationError(_))
    ));

    let mut empty = NamedTempFile::new().unwrap();
    writeln!(empty, "date,actual_sales").unwrap();
    assert!(matches!(
        DataLoader::from_csv(empty.path()),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_unparseable_value_is_csv_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,lag_1").unwrap();
    writeln!(file, "2024-01-01,lots").unwrap();

    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::CsvError(_))
    ));
}

#[test]
fn test_history_to_training_set() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows: Vec<SalesRecord> = (0..40)
        .filter(|d| d % 5 != 4)
        .map(|d| SalesRecord {
            product_id: "SKU-1".to_string(),
            quantity: 3.0,
            sale_date: start + chrono::Duration::days(d),
        })
        .collect();

    let series = aggregate_daily(&rows).unwrap();
    let daily = &series["SKU-1"];
    assert_eq!(daily.len(), 39);

    let records = daily.observation_records("SKU-1", 30).unwrap();
    let observations = build_observations(records).unwrap();
    assert_eq!(observations.len(), 9);
    assert_eq!(observations[0].lag_30, 3.0);
    // Day 34 had no sales rows and is zero-filled
    assert_eq!(observations[4].actual_sales, Some(0.0));
    assert_eq!(observations[5].lag_1, 0.0);
    assert!(observations.iter().all(|o| o.actual_sales.is_some()));

    let context = daily.context("SKU-1");
    assert_eq!(context.as_of, Some(daily.end()));
    assert_eq!(context.recent_sales.len(), 7);
}
