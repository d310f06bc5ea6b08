use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clinica";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rows per page in the patient and clinical-history listings.
pub const PAGE_SIZE: u32 = 20;

pub fn default_log_filter() -> &'static str {
    "info"
}

/// Get the application data directory
/// ~/Clinica/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clinica")
}

/// Get the record database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinica.db")
}

/// Root directory for visit attachment folders
pub fn attachments_dir() -> PathBuf {
    app_data_dir().join("attachments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Clinica"));
    }

    #[test]
    fn attachments_dir_under_app_data() {
        let attachments = attachments_dir();
        let app = app_data_dir();
        assert!(attachments.starts_with(app));
        assert!(attachments.ends_with("attachments"));
    }

    #[test]
    fn database_path_under_app_data() {
        assert!(database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
