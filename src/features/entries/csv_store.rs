//! CSV-file entry store.
//!
//! Spreadsheet-compatible layout: one row per entry, timestamps written in
//! the configured time zone at one-second precision. A row that fails to
//! parse is skipped with a warning so a single malformed record never
//! aborts a run. The write path goes through a temp file and rename, so
//! readers only ever observe the previous complete set or the new one.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use log::warn;
use std::path::{Path, PathBuf};

use super::{EntryStore, ReminderEntry, ReminderPayload};
use crate::core::error::StoreError;

const HEADER: [&str; 7] = [
    "Timestamp",
    "Message Text",
    "Send Date",
    "Send Time",
    "Phone Number",
    "Mail Address",
    "Process Time",
];

const STAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

pub struct CsvEntryStore {
    path: PathBuf,
    zone: Tz,
}

impl CsvEntryStore {
    pub fn new(path: impl AsRef<Path>, zone: Tz) -> Self {
        CsvEntryStore {
            path: path.as_ref().to_path_buf(),
            zone,
        }
    }

    fn parse_stamp(&self, value: &str) -> Option<DateTime<Tz>> {
        let naive = NaiveDateTime::parse_from_str(value, STAMP_FORMAT).ok()?;
        self.zone.from_local_datetime(&naive).earliest()
    }

    fn decode_row(&self, record: &csv::StringRecord) -> Option<ReminderEntry> {
        let cell = |index: usize| record.get(index).unwrap_or("");

        let created_at = match self.parse_stamp(cell(0)) {
            Some(stamp) => stamp,
            None => {
                warn!("could not parse creation time '{}' in {record:?}", cell(0));
                return None;
            }
        };

        let due_raw = format!("{} {}", cell(2), cell(3));
        let due_at = match self.parse_stamp(&due_raw) {
            Some(stamp) => stamp,
            None => {
                warn!("could not parse due time '{due_raw}' in {record:?}");
                return None;
            }
        };

        let processed_at = if cell(6).is_empty() {
            None
        } else {
            match self.parse_stamp(cell(6)) {
                Some(stamp) => Some(stamp),
                None => {
                    warn!("could not parse process time '{}' in {record:?}", cell(6));
                    return None;
                }
            }
        };

        Some(ReminderEntry {
            payload: ReminderPayload {
                message: cell(1).to_string(),
                phone_number: cell(4).to_string(),
                recipient: cell(5).to_string(),
            },
            created_at,
            due_at,
            processed_at,
        })
    }

    fn encode_row(&self, entry: &ReminderEntry) -> [String; 7] {
        [
            entry.created_at.format(STAMP_FORMAT).to_string(),
            entry.payload.message.clone(),
            entry.due_at.format(DATE_FORMAT).to_string(),
            entry.due_at.format(TIME_FORMAT).to_string(),
            entry.payload.phone_number.clone(),
            entry.payload.recipient.clone(),
            entry
                .processed_at
                .map(|stamp| stamp.format(STAMP_FORMAT).to_string())
                .unwrap_or_default(),
        ]
    }
}

#[async_trait]
impl EntryStore for CsvEntryStore {
    async fn get_entries(&self) -> Result<Vec<ReminderEntry>, StoreError> {
        let raw = tokio::fs::read(&self.path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(raw.as_slice());

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(entry) = self.decode_row(&record) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    async fn replace_all(&self, entries: &[ReminderEntry]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for entry in entries {
            writer.write_record(&self.encode_row(entry))?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.error().to_string()))?;

        // full replacement is atomic: write aside, then rename over the target
        let staging = self.path.with_extension("tmp");
        tokio::fs::write(&staging, data).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
