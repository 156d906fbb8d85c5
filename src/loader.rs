use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use crate::network::{ConnectionRecord, GraphBuilder, Stop, TransitGraph};
use crate::utils::{self, TimeParseError};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to read connections: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: {source}")]
    Time {
        row: usize,
        #[source]
        source: TimeParseError,
    },
}

// One row of a connections export. Columns are matched by header name, anything else is ignored.
#[derive(Debug, Deserialize)]
struct ConnectionRow {
    line: String,
    departure_time: String,
    arrival_time: String,
    start_stop: String,
    end_stop: String,
    start_stop_lat: f64,
    start_stop_lon: f64,
    end_stop_lat: f64,
    end_stop_lon: f64,
}

impl ConnectionRow {
    fn into_record(self) -> Result<ConnectionRecord, TimeParseError> {
        Ok(ConnectionRecord {
            line: self.line,
            departure_time: utils::parse_time(&self.departure_time)?,
            arrival_time: utils::parse_time(&self.arrival_time)?,
            origin: Stop::new(&self.start_stop, self.start_stop_lat, self.start_stop_lon),
            destination: Stop::new(&self.end_stop, self.end_stop_lat, self.end_stop_lon),
        })
    }
}

pub fn read_connections<R: Read>(reader: R) -> Result<Vec<ConnectionRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<ConnectionRow>().enumerate() {
        let record = result?
            .into_record()
            .map_err(|source| LoadError::Time { row: row + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

// Each record registers both of its stops before the connection itself.
pub fn graph_from_records(records: &[ConnectionRecord]) -> TransitGraph {
    let mut builder = GraphBuilder::new();
    for record in records {
        builder.add_stop(record.origin.clone());
        builder.add_stop(record.destination.clone());
        builder.add_connection(record);
    }
    builder.build()
}

pub fn load_graph(path: impl AsRef<Path>) -> Result<TransitGraph, LoadError> {
    let path = path.as_ref();
    let records = read_connections(File::open(path)?)?;
    log::info!("Read {} connections from {}.", records.len(), path.display());
    Ok(graph_from_records(&records))
}

// Headerless two column file of (start, end) stop names.
pub fn read_stop_pairs<R: Read>(reader: R) -> Result<Vec<(String, String)>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let pairs = reader
        .deserialize::<(String, String)>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs)
}

pub fn write_stop_pairs<W: Write>(writer: W, pairs: &[(String, String)]) -> Result<(), LoadError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for pair in pairs {
        writer.serialize(pair)?;
    }
    writer.flush()?;
    Ok(())
}
