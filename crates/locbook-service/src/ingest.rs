//! Per-event ingestion pipeline.
//!
//! One inbound payload goes through decode, bucket, normalize, record,
//! snapshot and the two render writes. Only decoding can fail the event;
//! failed writes are logged and the in-memory history stays authoritative
//! until the next successful write.

use std::fmt;

use chrono::{Local, TimeZone};
use locbook_core::render::{self, GeoJsonSource};
use locbook_store::HistoryStore;
use locbook_types::{Bucket, DecodeError, LocalStamp, LocationEvent, Message, TimestampError};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::state::AppState;

/// What happened to an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not a location message; history untouched.
    Ignored,
    /// The observation was added to history.
    Recorded {
        bucket: Bucket,
        stamp: LocalStamp,
        device: String,
    },
}

/// Errors that drop an inbound event.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The payload is not a valid message.
    #[error("Failed to decode message: {0}")]
    Decode(#[from] DecodeError),

    /// The fix time cannot be expressed as a local date.
    #[error("Unusable message timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}

/// Run one raw payload through the pipeline.
///
/// The history lock is held for the whole mutation, including the file
/// writes, so concurrent events are applied in some serial order.
pub async fn handle(state: &AppState, raw: &[u8]) -> Result<Outcome, IngestError> {
    let event = match Message::decode(raw)? {
        Message::Location(event) => event,
        Message::Other => {
            debug!("Ignoring non-location message");
            return Ok(Outcome::Ignored);
        }
    };

    let mut history = state.history.lock().await;
    record_location(&mut history, &state.config, event)
}

/// Add one location event to `history` and refresh every file derived from it.
pub fn record_location(
    history: &mut HistoryStore,
    config: &Config,
    event: LocationEvent,
) -> Result<Outcome, IngestError> {
    record_location_in(history, config, event, &Local)
}

/// Like [`record_location`], dating the event in `tz` instead of local time.
pub fn record_location_in<Tz>(
    history: &mut HistoryStore,
    config: &Config,
    event: LocationEvent,
    tz: &Tz,
) -> Result<Outcome, IngestError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let bucket = Bucket::new(event.lon, event.lat, config.render.precision);
    let stamp = locbook_types::normalize_in(event.tst, tz)?;

    history.record(bucket, stamp.clone());
    info!(
        "Location from {} at {} on {} {}",
        event.tid, bucket, stamp.date, stamp.time
    );

    persist(history, config);
    write_heatmap(history, config);
    write_live(&bucket, &event.tid, &stamp, config);

    Ok(Outcome::Recorded {
        bucket,
        stamp,
        device: event.tid,
    })
}

fn persist(history: &HistoryStore, config: &Config) {
    if let Err(e) = history.snapshot(&config.storage.history_path) {
        error!("History snapshot not saved, on-disk history is stale: {}", e);
    }
}

fn write_heatmap(history: &HistoryStore, config: &Config) {
    let result = render::render_heatmap(history, config.render.precision, config.render.blur)
        .and_then(|js| locbook_core::write_output(&config.output.heatmap_path, &js));
    if let Err(e) = result {
        warn!("Heatmap not updated: {}", e);
    }
}

fn write_live(bucket: &Bucket, device: &str, stamp: &LocalStamp, config: &Config) {
    let label = render::popup_label(device, stamp);
    let result = render::render_geojson(GeoJsonSource::Live {
        bucket: *bucket,
        label: &label,
    })
    .and_then(|json| locbook_core::write_output(&config.output.live_geojson_path, &json));
    if let Err(e) = result {
        warn!("Live position not updated: {}", e);
    }
}
