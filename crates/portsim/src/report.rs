//! Terminal tables and CSV exports for simulation results

use std::path::Path;

use portsim_core::analysis::{DescribeRow, Histogram, PercentileTable};
use tabled::Table;
use tabled::builder::Builder;

use crate::data::StorageError;
use crate::util::format::{format_amount, format_money, format_percentage};
use crate::util::io::atomic_write_bytes;

/// Final-year summary: one row per percentile level
pub fn describe_table(rows: &[DescribeRow]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["percentile", "label", "result", "profit", "profit ratio"]);
    for row in rows {
        builder.push_record([
            row.percentile.to_string(),
            row.label.clone(),
            format_amount(row.result),
            format_amount(row.profit),
            format_percentage(row.profit_ratio),
        ]);
    }
    builder.build()
}

/// Profit ratios by year, one column per percentile label
pub fn percentile_table(table: &PercentileTable) -> Table {
    let mut builder = Builder::default();
    let mut header = vec!["passing year".to_string()];
    header.extend(table.columns.iter().map(|c| c.label.clone()));
    builder.push_record(header);

    for (t, year) in table.passing_year.iter().enumerate() {
        let mut record = vec![year.to_string()];
        record.extend(table.columns.iter().map(|c| format_percentage(c.values[t])));
        builder.push_record(record);
    }
    builder.build()
}

/// Bin ranges with their density
pub fn histogram_table(hist: &Histogram) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["from", "to", "density"]);
    for (height, edge) in hist.heights.iter().zip(hist.edges.windows(2)) {
        builder.push_record([
            format_money(edge[0]),
            format_money(edge[1]),
            format!("{height:.3e}"),
        ]);
    }
    builder.build()
}

fn csv_error(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Serialize(format!("{}: {}", path.display(), e))
}

fn write_csv(path: &Path, records: Vec<Vec<String>>) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in &records {
        writer.write_record(record).map_err(|e| csv_error(path, e))?;
    }
    let bytes = writer.into_inner().map_err(|e| csv_error(path, e))?;
    atomic_write_bytes(path, &bytes)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), rows = records.len().saturating_sub(1), "exported");
    Ok(())
}

/// Write the describe rows as `percentile,label,result,profit,profit_ratio`
pub fn export_describe(path: &Path, rows: &[DescribeRow]) -> Result<(), StorageError> {
    let mut records = vec![
        ["percentile", "label", "result", "profit", "profit_ratio"]
            .map(String::from)
            .to_vec(),
    ];
    records.extend(rows.iter().map(|row| {
        vec![
            row.percentile.to_string(),
            row.label.clone(),
            row.result.to_string(),
            row.profit.to_string(),
            row.profit_ratio.to_string(),
        ]
    }));
    write_csv(path, records)
}

/// Write a history or each-time table with `passing_year` as the first column
pub fn export_percentile_table(path: &Path, table: &PercentileTable) -> Result<(), StorageError> {
    let mut header = vec!["passing_year".to_string()];
    header.extend(table.columns.iter().map(|c| c.label.clone()));

    let mut records = vec![header];
    records.extend(table.passing_year.iter().enumerate().map(|(t, year)| {
        let mut record = vec![year.to_string()];
        record.extend(table.columns.iter().map(|c| c.values[t].to_string()));
        record
    }));
    write_csv(path, records)
}

/// Write histogram bins as `left,right,density`
pub fn export_histogram(path: &Path, hist: &Histogram) -> Result<(), StorageError> {
    let mut records = vec![["left", "right", "density"].map(String::from).to_vec()];
    records.extend(
        hist.heights
            .iter()
            .zip(hist.edges.windows(2))
            .map(|(h, e)| vec![e[0].to_string(), e[1].to_string(), h.to_string()]),
    );
    write_csv(path, records)
}
