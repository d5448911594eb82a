//! INI file configuration adapter.

use crate::domain::error::GalgozError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GalgozError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Ini::new();
        config
            .read(content)
            .map_err(|reason| GalgozError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Section names, lowercased.
    pub fn sections(&self) -> Vec<String> {
        self.config.sections()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
strategy = Galgoz Standard
init_rows = 500

[HMA]
type = hma
window = 55
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "strategy"),
            Some("Galgoz Standard".to_string())
        );
        assert_eq!(adapter.get_string("HMA", "window"), Some("55".to_string()));
    }

    #[test]
    fn sections_and_keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[QQE]\nRSI_Window = 10\n").unwrap();
        assert_eq!(adapter.get_string("qqe", "rsi_window"), Some("10".to_string()));
        assert_eq!(adapter.get_string("QQE", "RSI_WINDOW"), Some("10".to_string()));
        assert_eq!(adapter.sections(), vec!["qqe".to_string()]);
    }

    #[test]
    fn values_keep_their_case() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nindicators = HMA, MFI\n").unwrap();
        assert_eq!(
            adapter.get_string("backtest", "indicators"),
            Some("HMA, MFI".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninit_rows = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[backtest]\ndata = data/GBP_JPY_H1.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "data"),
            Some("data/GBP_JPY_H1.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_io_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(GalgozError::Io(_))));
    }
}
