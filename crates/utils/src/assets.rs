use std::path::PathBuf;

use directories::ProjectDirs;

const DATABASE_FILE: &str = "taskboard.sqlite";

fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Directory holding the database and log files.
///
/// `TASKBOARD_DATA_DIR` overrides the platform default. When the platform
/// gives us no home directory the current directory is used.
pub fn data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("TASKBOARD_DATA_DIR") {
        return expand_tilde(&path);
    }

    ProjectDirs::from("dev", "taskboard", "taskboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
    // macOS → ~/Library/Application Support/dev.taskboard.taskboard
    // Linux → ~/.local/share/taskboard (respects XDG_DATA_HOME)
}

/// Get the database file path.
///
/// Respects `TASKBOARD_DATABASE_PATH`, with tilde expansion.
///
/// Default: `{data_dir}/taskboard.sqlite`
pub fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("TASKBOARD_DATABASE_PATH") {
        return expand_tilde(&path);
    }
    data_dir().join(DATABASE_FILE)
}

/// Default directory for rotated log files: `{data_dir}/logs`
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn database_path_default_uses_data_dir() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe {
            env::remove_var("TASKBOARD_DATABASE_PATH");
            env::set_var("TASKBOARD_DATA_DIR", "/srv/taskboard");
        }
        let path = database_path();
        unsafe { env::remove_var("TASKBOARD_DATA_DIR") };
        assert_eq!(path, PathBuf::from("/srv/taskboard/taskboard.sqlite"));
    }

    #[test]
    #[serial]
    fn database_path_env_override() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe { env::set_var("TASKBOARD_DATABASE_PATH", "/custom/path/test.db") };
        let path = database_path();
        unsafe { env::remove_var("TASKBOARD_DATABASE_PATH") };
        assert_eq!(path, PathBuf::from("/custom/path/test.db"));
    }

    #[test]
    #[serial]
    fn database_path_tilde_expansion() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe { env::set_var("TASKBOARD_DATABASE_PATH", "~/taskboard/db.sqlite") };
        let path = database_path();
        unsafe { env::remove_var("TASKBOARD_DATABASE_PATH") };
        assert!(!path.to_string_lossy().contains('~'));
    }

    #[test]
    #[serial]
    fn log_dir_is_under_data_dir() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe { env::set_var("TASKBOARD_DATA_DIR", "/srv/taskboard") };
        let path = log_dir();
        unsafe { env::remove_var("TASKBOARD_DATA_DIR") };
        assert_eq!(path, PathBuf::from("/srv/taskboard/logs"));
    }
}
