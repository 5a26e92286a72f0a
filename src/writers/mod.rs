pub mod aggregate_writer;
pub mod crutem_writer;
pub mod parquet_writer;
pub mod table_writer;

pub use aggregate_writer::{AggregateReport, AggregateWriter};
pub use crutem_writer::{format_crutem_row, format_crutem_value, CrutemWriter};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use table_writer::TableWriter;
