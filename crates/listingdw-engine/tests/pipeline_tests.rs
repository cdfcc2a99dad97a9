//! End-to-end pipeline tests over CSV extracts and the in-memory warehouse

use chrono::NaiveDate;
use listingdw_core::{CheckPayload, Config, QualityReport, StarSchema, LISTING_COLUMNS};
use listingdw_engine::{check_names, Pipeline, PipelineError};
use listingdw_warehouse::{LoadError, MemoryWarehouse};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

const REVIEWS_HEADER: &str = "listing_id,date";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// One listings CSV row in `LISTING_COLUMNS` order
fn listing_row(id: &str, host: &str, lon: &str, price: &str) -> String {
    format!(
        "{id},Flat {id},{host},Host {host},Centro,Sol,40.41,{lon},Entire home/apt,\"{price}\",2,10,2024-01-01,2.5,1,120,3,"
    )
}

struct Fixture {
    dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(listings: &[String], reviews: &[&str]) -> Self {
        Self::with_header(&LISTING_COLUMNS.join(","), listings, reviews)
    }

    fn with_header(header: &str, listings: &[String], reviews: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_csv(&dir.path().join("listings.csv"), header, listings);
        let reviews: Vec<String> = reviews.iter().map(|r| r.to_string()).collect();
        write_csv(&dir.path().join("reviews.csv"), REVIEWS_HEADER, &reviews);

        let mut config = Config::from_toml(
            r#"
            [data_paths]
            listings = "listings.csv"
            reviews = "reviews.csv"

            [output]
            data_quality_report = "reports/dq.json"

            [warehouse]
            type = "memory"
            "#,
        )
        .unwrap();
        config.project_root = dir.path().to_path_buf();

        Self { dir, config }
    }

    fn pipeline(&self, warehouse: &MemoryWarehouse) -> Pipeline {
        Pipeline::new(self.config.clone(), Box::new(warehouse.clone()))
    }

    fn saved_report(&self) -> QualityReport {
        QualityReport::from_file(&self.dir.path().join("reports/dq.json")).unwrap()
    }
}

fn write_csv(path: &Path, header: &str, rows: &[String]) {
    let mut contents = format!("{}\n", header);
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(path, contents).unwrap();
}

/// Three listings (the third at longitude 200) and five reviews, one of
/// which belongs to the dropped listing
fn sample() -> Fixture {
    Fixture::new(
        &[
            listing_row("1", "h1", "-3.70", "$45.00"),
            listing_row("2", "h2", "-3.69", "$1,234.50"),
            listing_row("3", "h1", "200", "$80.00"),
        ],
        &["1,2024-01-05", "1,2024-02-10", "2,2024-01-05", "2,2024-03-01", "3,2024-01-05"],
    )
}

fn assert_dense(keys: impl Iterator<Item = i64>) {
    let keys: Vec<i64> = keys.collect();
    let expected: Vec<i64> = (1..=keys.len() as i64).collect();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn end_to_end_run() {
    let fixture = sample();
    let warehouse = MemoryWarehouse::new();

    let summary = fixture.pipeline(&warehouse).run(run_date()).await.unwrap();
    let report = &summary.report;

    assert_eq!(report.listings_row_count_after_validation, 2);
    assert_eq!(report.reviews_row_count_after_validation, 4);
    assert_eq!(
        report.check(check_names::LONGITUDE_IN_RANGE).unwrap().payload,
        CheckPayload::InvalidCount { invalid_count: 1 }
    );
    assert_eq!(
        report.check(check_names::REVIEWS_LISTING_ID_FK).unwrap().payload,
        CheckPayload::OrphanReviews { orphan_reviews: 1 }
    );

    assert_eq!(summary.tables.dim_listing, 2);
    assert_eq!(summary.tables.fact_reviews, 4);
    assert_eq!(summary.tables.dim_date, 3);
    assert_eq!(summary.tables.dim_host, 2);
    assert_eq!(summary.load.backend, "Memory");

    let schema = warehouse.snapshot().await.unwrap();
    assert_eq!(schema.fingerprint(), summary.fingerprint);
    assert_eq!(schema.dim_listing[1].price, 1234.5);
    assert_eq!(warehouse.row_count("fact_reviews").await, Some(4));

    // The report on disk matches the one returned
    assert_eq!(&fixture.saved_report(), report);
}

#[tokio::test]
async fn keys_are_dense_and_facts_resolve() {
    let fixture = sample();
    let warehouse = MemoryWarehouse::new();
    fixture.pipeline(&warehouse).run(run_date()).await.unwrap();
    let schema: StarSchema = warehouse.snapshot().await.unwrap();

    assert_dense(schema.dim_date.iter().map(|d| d.date_sk));
    assert_dense(schema.dim_neighborhood.iter().map(|n| n.neighborhood_sk));
    assert_dense(schema.dim_host.iter().map(|h| h.host_sk));
    assert_dense(schema.dim_listing.iter().map(|l| l.listing_sk));

    let dates: HashSet<i64> = schema.dim_date.iter().map(|d| d.date_sk).collect();
    let hosts: HashSet<i64> = schema.dim_host.iter().map(|h| h.host_sk).collect();
    let listings: HashSet<i64> = schema.dim_listing.iter().map(|l| l.listing_sk).collect();

    for fact in &schema.fact_reviews {
        assert!(dates.contains(&fact.date_sk));
        assert!(hosts.contains(&fact.host_sk));
        assert!(listings.contains(&fact.listing_sk));
        assert_eq!(fact.review_count, 1);
    }

    // Dates are keyed in ascending order
    let sorted = schema.dim_date.windows(2).all(|w| w[0].full_date < w[1].full_date);
    assert!(sorted);
    assert!(schema.dim_host.iter().all(|h| h.valid_from == run_date() && h.is_current));
}

#[tokio::test]
async fn repeated_runs_are_idempotent() {
    let fixture = sample();
    let warehouse = MemoryWarehouse::new();
    let pipeline = fixture.pipeline(&warehouse);

    let first = pipeline.run(run_date()).await.unwrap();
    let first_schema = warehouse.snapshot().await.unwrap();
    let second = pipeline.run(run_date()).await.unwrap();
    let second_schema = warehouse.snapshot().await.unwrap();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first_schema, second_schema);
    assert_eq!(warehouse.load_count().await, 2);
    assert_eq!(warehouse.row_count("fact_reviews").await, Some(4));
}

#[tokio::test]
async fn out_of_range_rows_are_counted_and_dropped() {
    let mut high_lat = listing_row("2", "h1", "-3.70", "$10");
    high_lat = high_lat.replacen("40.41", "91", 1);
    let busy = listing_row("3", "h1", "-3.70", "$10").replacen(",120,", ",400,", 1);

    let fixture = Fixture::new(&[listing_row("1", "h1", "-3.70", "$10"), high_lat, busy], &["1,2024-01-01"]);
    let report = fixture.pipeline(&MemoryWarehouse::new()).validate_only().unwrap();

    assert_eq!(report.check(check_names::LATITUDE_IN_RANGE).unwrap().count(), 1);
    assert_eq!(report.check(check_names::AVAILABILITY_IN_RANGE).unwrap().count(), 1);
    assert_eq!(report.listings_row_count_after_validation, 1);
    assert_eq!(fixture.saved_report(), report);
}

#[tokio::test]
async fn missing_columns_abort_before_load_in_strict_mode() {
    let fixture = Fixture::with_header("id,name,price", &["1,Flat,$10".to_string()], &["1,2024-01-01"]);
    let warehouse = MemoryWarehouse::new();

    let err = fixture.pipeline(&warehouse).run(run_date()).await.unwrap_err();

    match err {
        PipelineError::MissingColumns(columns) => {
            assert_eq!(columns.len(), LISTING_COLUMNS.len() - 3);
            assert!(columns.contains(&"latitude".to_string()));
        }
        other => panic!("unexpected error: {}", other),
    }
    // Report persisted, warehouse untouched
    assert!(!fixture.saved_report().check(check_names::LISTINGS_COLUMNS_PRESENT).unwrap().passed());
    assert_eq!(warehouse.load_count().await, 0);
}

#[tokio::test]
async fn missing_columns_are_empty_values_when_lenient() {
    let mut fixture = Fixture::with_header("id,name,price", &["1,Flat,$10".to_string()], &["1,2024-01-01"]);
    fixture.config.validation.strict_columns = false;
    let warehouse = MemoryWarehouse::new();

    let summary = fixture.pipeline(&warehouse).run(run_date()).await.unwrap();

    // Absent coordinates are invalid, so the listing and its review drop out
    assert_eq!(summary.report.listings_row_count_after_validation, 0);
    assert_eq!(summary.tables.fact_reviews, 0);
    assert_eq!(warehouse.load_count().await, 1);
}

#[tokio::test]
async fn unparseable_price_is_fatal() {
    let fixture = Fixture::new(&[listing_row("1", "h1", "-3.70", "1.2.3")], &["1,2024-01-01"]);
    let warehouse = MemoryWarehouse::new();

    let err = fixture.pipeline(&warehouse).run(run_date()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Transform(_)));
    assert_eq!(warehouse.load_count().await, 0);
}

#[tokio::test]
async fn load_failure_keeps_previous_warehouse_state() {
    let fixture = sample();
    let warehouse = MemoryWarehouse::new();
    fixture.pipeline(&warehouse).run(run_date()).await.unwrap();

    let failing = Pipeline::new(
        fixture.config.clone(),
        Box::new(warehouse.clone().with_failure_on("fact_reviews")),
    );
    let err = failing.run(run_date()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Load(LoadError::QueryError { .. })));
    assert_eq!(warehouse.row_count("fact_reviews").await, Some(4));
}

#[tokio::test]
async fn missing_input_file_is_an_extract_error() {
    let fixture = sample();
    std::fs::remove_file(fixture.dir.path().join("reviews.csv")).unwrap();

    let err = fixture.pipeline(&MemoryWarehouse::new()).run(run_date()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Extract(_)));
}
