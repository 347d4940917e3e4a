//! Computing Environment
//! Time zone, host and the data directories of the user, read from an INI file in the home
//! directory.

use super::{ConfigError, IniConfig};
use crate::system;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = ".python_environment.cfg";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Environment {
    /// Time zone name, e.g. `Europe/Amsterdam`.
    pub tz: String,
    pub host: String,
    pub home: PathBuf,
    /// Solar-panel base directory.
    pub sp_dir: PathBuf,
    /// Electricity-meter base directory.
    pub el_dir: PathBuf,
    pub knmi_10min_dir: PathBuf,
    pub knmi_hourly_dir: PathBuf,
    pub knmi_daily_dir: PathBuf,
    /// WP weather directory.
    pub wpw_dir: PathBuf,
    /// HWC main directory.
    pub hwc_dir: PathBuf,
}

impl Environment {
    /// Fill the environment from a parsed configuration; missing keys stay empty.
    pub fn from_ini(ini: &IniConfig, host: String, home: PathBuf) -> Self {
        let dir = |section: &str, key: &str| expand_home(&ini.get_or(section, key, ""), &home);
        Self {
            tz: ini.get_or("Localisation", "timezone", ""),
            sp_dir: dir("SolarPanels", "basedir"),
            el_dir: dir("ElectricityMeter", "basedir"),
            knmi_10min_dir: dir("Weather", "knmi_10min_dir"),
            knmi_hourly_dir: dir("Weather", "knmi_hourly_dir"),
            knmi_daily_dir: dir("Weather", "knmi_daily_dir"),
            wpw_dir: dir("Weather", "wpw_dir"),
            hwc_dir: dir("HWC", "hwc_dir"),
            host,
            home,
        }
    }

    pub fn on_host(&self, name: &str) -> bool {
        self.host == name
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Replace `~` with the home directory.
fn expand_home(value: &str, home: &Path) -> PathBuf {
    PathBuf::from(value.replace('~', &home.to_string_lossy()))
}

/// Read the computing environment.
///
/// `cfg_file` defaults to [`DEFAULT_CONFIG_FILE`]; relative paths are taken relative to the
/// home directory. A missing file gives an environment with empty settings.
pub fn environment(cfg_file: Option<&Path>) -> Result<Environment, ConfigError> {
    let home = system::homedir().ok_or(ConfigError::NoHomeDir)?;
    environment_in(cfg_file, &home)
}

/// Read the computing environment for the given home directory.
pub fn environment_in(cfg_file: Option<&Path>, home: &Path) -> Result<Environment, ConfigError> {
    let cfg_file = cfg_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let path = if cfg_file.is_absolute() {
        cfg_file.to_path_buf()
    } else {
        home.join(cfg_file)
    };

    let ini = if path.exists() {
        IniConfig::from_file(&path)?
    } else {
        debug!(file = %path.display(), "Environment file not found; using defaults");
        IniConfig::default()
    };
    Ok(Environment::from_ini(&ini, system::host(), home.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CFG: &str = "\
[Localisation]
timezone = Europe/Amsterdam

[SolarPanels]
basedir = ~/solar/

[Weather]
wpw_dir = /data/wp/  # WP files
";

    #[test]
    fn test_from_ini() {
        let ini = IniConfig::parse(CFG).unwrap();
        let env = Environment::from_ini(&ini, "zotac".into(), PathBuf::from("/home/me"));
        assert_eq!(env.tz, "Europe/Amsterdam");
        assert_eq!(env.sp_dir, PathBuf::from("/home/me/solar/"));
        assert_eq!(env.wpw_dir, PathBuf::from("/data/wp/"));
        assert_eq!(env.el_dir, PathBuf::new());
        assert!(env.on_host("zotac"));
        assert!(!env.on_host("think"));

        let json = env.to_json().unwrap();
        assert!(json.contains("\"tz\": \"Europe/Amsterdam\""));
    }

    #[test]
    fn test_environment_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path();
        fs::write(home.join("env.cfg"), CFG).unwrap();

        // Relative names are looked up in the home directory
        let env = environment_in(Some(Path::new("env.cfg")), home).unwrap();
        assert_eq!(env.tz, "Europe/Amsterdam");
        assert_eq!(env.wpw_dir, PathBuf::from("/data/wp/"));
        assert_eq!(env.sp_dir, home.join("solar/"));
        assert_eq!(env.home, home);

        let env = environment_in(Some(home.join("env.cfg").as_path()), Path::new("/elsewhere")).unwrap();
        assert_eq!(env.tz, "Europe/Amsterdam");
    }

    #[test]
    fn test_environment_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let env = environment_in(Some(Path::new("missing.cfg")), dir.path()).unwrap();
        assert_eq!(env.tz, "");
        assert_eq!(env.wpw_dir, PathBuf::new());
        assert_eq!(env.home, dir.path());
    }

    #[test]
    fn test_environment_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.cfg"), "[Localisation\ntimezone = UTC\n").unwrap();
        assert!(matches!(
            environment_in(Some(Path::new("bad.cfg")), dir.path()),
            Err(ConfigError::Syntax { line: 1, .. })
        ));
    }
}
