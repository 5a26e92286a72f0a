use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Default output directory: `output/ebc-{YYMMDD}`.
pub fn generate_default_output_dir() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100;

    PathBuf::from("output").join(format!(
        "ebc-{:02}{:02}{:02}",
        year,
        now.month(),
        now.day()
    ))
}

/// Path of a named output table, e.g. `{dir}/temp_ebc.csv`.
pub fn table_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_dir() {
        let dir = generate_default_output_dir();
        let dir_str = dir.to_string_lossy();

        let parts: Vec<&str> = dir_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "output");
        assert!(parts[1].starts_with("ebc-"));
        assert_eq!(parts[1].len(), "ebc-".len() + 6);
    }

    #[test]
    fn test_table_path() {
        let path = table_path(Path::new("out"), "temp_ebc", "csv");
        assert_eq!(path, PathBuf::from("out/temp_ebc.csv"));
    }
}
