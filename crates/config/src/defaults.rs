use std::path::PathBuf;

pub const DEFAULT_STORE_FILE: &str = "instrument_data.csv";

pub fn default_tracker_name() -> String {
    "Instrument Issue Tracker".to_string()
}

pub fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

pub fn default_atomic_writes() -> bool {
    true
}

pub fn default_instruments() -> Vec<String> {
    [
        "Ultrasonic Flowmeter",
        "Lux Meter",
        "Fluke Power Quality Analyzer",
        "Distance Gun",
        "eGauge",
        "Temperature Data Logger",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y", "%Y/%m/%d"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_file_prefix() -> String {
    "monthly_report".to_string()
}
