use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use stayfinder::booking::{AuditLog, BookingEngine, LedgerStore};
use stayfinder::catalog::{Landmark, ListingCatalog};
use stayfinder::config::BookingConfig;
use stayfinder::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handles for the booking endpoints.
///
/// The engine sits behind a mutex so concurrent requests serialize the
/// whole validate-check-commit sequence; the engine itself carries no
/// locking of its own.
#[derive(Clone)]
pub(crate) struct BookingContext {
    pub(crate) engine: Arc<Mutex<BookingEngine>>,
    pub(crate) catalog: Arc<ListingCatalog>,
    pub(crate) landmarks: Arc<Vec<Landmark>>,
}

pub(crate) fn build_context(config: &BookingConfig) -> Result<BookingContext, AppError> {
    let catalog = ListingCatalog::from_path(&config.catalog_path)?;
    let engine = open_engine(config, &catalog)?;

    Ok(BookingContext {
        engine: Arc::new(Mutex::new(engine)),
        catalog: Arc::new(catalog),
        landmarks: Arc::new(Landmark::cambridge_defaults()),
    })
}

pub(crate) fn open_engine(
    config: &BookingConfig,
    catalog: &ListingCatalog,
) -> Result<BookingEngine, AppError> {
    let engine = BookingEngine::open(
        config.horizon,
        catalog.listing_ids(),
        LedgerStore::new(&config.ledger_path),
        AuditLog::new(&config.audit_log_path),
    )?;
    Ok(engine)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
