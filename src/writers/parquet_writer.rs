use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Float64Builder, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{StationMetadata, StationTemperatureRecord, TemperatureTable};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE, MONTHS_PER_YEAR,
};

/// Writes station-year tables as Parquet: `stationcode`, `year`,
/// `m01`..`m12`, `stationlat`, `stationlon`.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Write the table in record batches of `batch_size` rows.
    pub fn write_table(&self, table: &TemperatureTable, path: &Path) -> Result<()> {
        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in table.rows().chunks(self.batch_size) {
            let batch = Self::rows_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }

    /// Read a table written by [`ParquetWriter::write_table`]. Station
    /// metadata beyond code and coordinates is not stored.
    pub fn read_table(&self, path: &Path) -> Result<TemperatureTable> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;

        let mut stations: HashMap<String, Arc<StationMetadata>> = HashMap::new();
        let mut rows = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;
            let codes = column::<StringArray>(&batch, "stationcode")?;
            let years = column::<Int32Array>(&batch, "year")?;
            let lats = column::<Float64Array>(&batch, "stationlat")?;
            let lons = column::<Float64Array>(&batch, "stationlon")?;
            let months = (1..=MONTHS_PER_YEAR)
                .map(|m| column::<Float64Array>(&batch, &month_column(m)))
                .collect::<Result<Vec<_>>>()?;

            for i in 0..batch.num_rows() {
                let code = codes.value(i);
                let station = stations
                    .entry(code.to_string())
                    .or_insert_with(|| {
                        Arc::new(StationMetadata::new(
                            code,
                            String::new(),
                            String::new(),
                            lats.value(i),
                            lons.value(i),
                        ))
                    })
                    .clone();

                let mut values = [None; MONTHS_PER_YEAR];
                for (slot, array) in values.iter_mut().zip(&months) {
                    *slot = (!array.is_null(i)).then(|| array.value(i));
                }

                rows.push(StationTemperatureRecord::new(station, years.value(i), values));
            }
        }

        Ok(TemperatureTable::new(rows))
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }

    fn create_schema() -> Arc<Schema> {
        let mut fields = vec![
            Field::new("stationcode", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
        ];
        fields.extend(
            (1..=MONTHS_PER_YEAR).map(|m| Field::new(month_column(m), DataType::Float64, true)),
        );
        fields.push(Field::new("stationlat", DataType::Float64, false));
        fields.push(Field::new("stationlon", DataType::Float64, false));

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(rows: &[StationTemperatureRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let codes: Vec<&str> = rows.iter().map(|r| r.station_code()).collect();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(codes)),
            Arc::new(Int32Array::from(years)),
        ];

        for month in 0..MONTHS_PER_YEAR {
            let mut builder = Float64Builder::with_capacity(rows.len());
            for row in rows {
                builder.append_option(row.values[month]);
            }
            columns.push(Arc::new(builder.finish()));
        }

        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.station.latitude).collect::<Vec<_>>(),
        )));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.station.longitude).collect::<Vec<_>>(),
        )));

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn month_column(month: usize) -> String {
    format!("m{:02}", month)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            self.total_rows as f64 / self.row_groups.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn table() -> TemperatureTable {
        let station = Arc::new(StationMetadata::new(
            "36456",
            "OXFORD".to_string(),
            "UK".to_string(),
            51.8,
            -1.3,
        ));
        let mut values = [Some(0.25); MONTHS_PER_YEAR];
        values[4] = None;

        TemperatureTable::new(vec![
            StationTemperatureRecord::new(Arc::clone(&station), 1900, values),
            StationTemperatureRecord::new(station, 1901, [Some(-0.5); MONTHS_PER_YEAR]),
        ])
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new().with_batch_size(1);
        writer.write_table(&table(), temp_file.path())?;

        let read = writer.read_table(temp_file.path())?;
        assert_eq!(read.len(), 2);
        assert_eq!(read.rows()[0].station_code(), "036456");
        assert_eq!(read.rows()[0].values[4], None);
        assert_eq!(read.rows()[0].values[0], Some(0.25));
        assert_eq!(read.rows()[1].year, 1901);
        assert_eq!(read.rows()[1].station.latitude, 51.8);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert!(info.summary().contains("Total rows: 2"));

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_table(&table(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }

    #[test]
    fn test_write_empty_table() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();
        writer.write_table(&TemperatureTable::new(Vec::new()), temp_file.path())?;

        assert!(writer.read_table(temp_file.path())?.is_empty());
        Ok(())
    }
}
