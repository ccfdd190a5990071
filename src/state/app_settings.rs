use log::LevelFilter;
use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    /// Base URL of the bracket server.
    pub server: String,
    /// Sent with each submission; `None` submits anonymously.
    pub user_id: Option<String>,
    /// Local initial-teams file used when the server has none.
    pub teams_json: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Warn,
            server: DEFAULT_SERVER.to_string(),
            user_id: None,
            teams_json: None,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            full_screen: var("MMPICKS_FULL_SCREEN").is_some_and(|v| parse_flag(&v)),
            log_level: var("MMPICKS_LOG")
                .and_then(|v| parse_level(&v))
                .unwrap_or(defaults.log_level),
            server: var("MMPICKS_SERVER").unwrap_or(defaults.server),
            user_id: var("MMPICKS_USER_ID"),
            teams_json: var("MMPICKS_TEAMS_JSON").map(PathBuf::from),
        }
    }

    /// `--user` on the command line wins over the environment.
    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        if let Some(user_id) = user_id.filter(|u| !u.trim().is_empty()) {
            self.user_id = Some(user_id);
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.server, DEFAULT_SERVER);
        assert_eq!(s.log_level, LevelFilter::Warn);
        assert_eq!(s.user_id, None);
        assert!(!s.full_screen);
    }

    #[test]
    fn reads_every_variable() {
        let s = settings(&[
            ("MMPICKS_SERVER", "https://picks.example.com"),
            ("MMPICKS_USER_ID", " alice "),
            ("MMPICKS_TEAMS_JSON", "/tmp/teams.json"),
            ("MMPICKS_LOG", "DEBUG"),
            ("MMPICKS_FULL_SCREEN", "yes"),
        ]);
        assert_eq!(s.server, "https://picks.example.com");
        assert_eq!(s.user_id.as_deref(), Some("alice"));
        assert_eq!(s.teams_json, Some(PathBuf::from("/tmp/teams.json")));
        assert_eq!(s.log_level, LevelFilter::Debug);
        assert!(s.full_screen);
    }

    #[test]
    fn bad_values_fall_back() {
        let s = settings(&[
            ("MMPICKS_LOG", "loud"),
            ("MMPICKS_FULL_SCREEN", "nah"),
            ("MMPICKS_USER_ID", "  "),
        ]);
        assert_eq!(s.log_level, LevelFilter::Warn);
        assert!(!s.full_screen);
        assert_eq!(s.user_id, None);
    }

    #[test]
    fn command_line_user_wins() {
        let s = settings(&[("MMPICKS_USER_ID", "env")]).with_user(Some("cli".into()));
        assert_eq!(s.user_id.as_deref(), Some("cli"));
        let s = settings(&[("MMPICKS_USER_ID", "env")]).with_user(None);
        assert_eq!(s.user_id.as_deref(), Some("env"));
    }
}
