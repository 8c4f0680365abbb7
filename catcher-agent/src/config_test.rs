#[cfg(test)]
mod tests {
    use crate::{load_config, Args};
    use catcher_core::Platform;
    use std::env;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::NamedTempFile;

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "STREAMCATCHER_LISTEN_ADDR",
        "STREAMCATCHER_LISTEN_PORT",
        "STREAMCATCHER_ADMIN_PORT",
        "STREAMCATCHER_CERT_DIR",
        "STREAMCATCHER_PLATFORM",
        "STREAMCATCHER_PLAYER_HOST",
        "STREAMCATCHER_PLAYER_PORT",
        "STREAMCATCHER_USE_BLOCKING",
    ];

    // Helper function to clear all environment variables that might affect tests
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for var in VARS {
            env::remove_var(var);
        }
        guard
    }

    #[test]
    fn test_load_config_defaults() {
        let _guard = clean_env();

        let config = load_config(&Args::default()).unwrap();

        assert_eq!(config.listen_address, "127.0.0.1");
        assert_eq!(config.listen_port, 8888);
        assert_eq!(config.admin_port, 8889);
        assert_eq!(config.platform, Platform::Chromium);
        assert_eq!(config.player.host, "192.168.0.13");
        assert_eq!(config.player.port, "8080");
        assert!(config.player.use_blocking);
    }

    #[test]
    fn test_load_config_from_cli() {
        let _guard = clean_env();

        let args = Args {
            listen_port: Some(7000),
            admin_port: Some(7001),
            platform: Some(Platform::Firefox),
            player_host: Some("10.0.0.5".to_string()),
            use_blocking: Some(false),
            ..Default::default()
        };

        let config = load_config(&args).unwrap();

        assert_eq!(config.listen_port, 7000);
        assert_eq!(config.admin_port, 7001);
        assert_eq!(config.platform, Platform::Firefox);
        assert_eq!(config.player.host, "10.0.0.5");
        assert_eq!(config.player.port, "8080");
        assert!(!config.player.use_blocking);
    }

    #[test]
    fn test_load_config_from_env() {
        let _guard = clean_env();

        env::set_var("STREAMCATCHER_LISTEN_PORT", "9100");
        env::set_var("STREAMCATCHER_PLATFORM", "firefox");
        env::set_var("STREAMCATCHER_PLAYER_PORT", "9999");
        env::set_var("STREAMCATCHER_USE_BLOCKING", "false");

        let result = load_config(&Args::default());
        for var in VARS {
            env::remove_var(var);
        }
        let config = result.unwrap();

        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.platform, Platform::Firefox);
        assert_eq!(config.player.port, "9999");
        assert!(!config.player.use_blocking);
    }

    #[test]
    fn test_load_config_from_file() {
        let _guard = clean_env();

        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"{
            "listen_port": 18888,
            "cert_dir": "/tmp/streamcatcher-certs",
            "player": { "host": "media-box.local", "use_blocking": false }
        }"#;
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let args = Args {
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };

        let config = load_config(&args).unwrap();

        assert_eq!(config.listen_port, 18888);
        assert_eq!(config.admin_port, 8889);
        assert_eq!(config.cert_dir, "/tmp/streamcatcher-certs");
        assert_eq!(config.player.host, "media-box.local");
        assert_eq!(config.player.port, "8080");
        assert!(!config.player.use_blocking);
    }

    #[test]
    fn test_load_config_precedence() {
        let _guard = clean_env();

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"listen_port": 18000, "admin_port": 18001}"#)
            .unwrap();
        env::set_var("STREAMCATCHER_LISTEN_PORT", "19000");
        env::set_var("STREAMCATCHER_ADMIN_PORT", "19001");

        let args = Args {
            config: Some(temp_file.path().to_path_buf()),
            listen_port: Some(20000),
            ..Default::default()
        };

        let result = load_config(&args);
        for var in VARS {
            env::remove_var(var);
        }
        let config = result.unwrap();

        assert_eq!(config.listen_port, 20000); // CLI beats env and file
        assert_eq!(config.admin_port, 19001); // env beats file
    }

    #[test]
    fn test_load_config_invalid_env_values() {
        let _guard = clean_env();

        env::set_var("STREAMCATCHER_USE_BLOCKING", "sometimes");
        let result = load_config(&Args::default());
        env::remove_var("STREAMCATCHER_USE_BLOCKING");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid STREAMCATCHER_USE_BLOCKING"));

        env::set_var("STREAMCATCHER_PLATFORM", "netscape");
        let result = load_config(&Args::default());
        env::remove_var("STREAMCATCHER_PLATFORM");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_unreadable_file() {
        let _guard = clean_env();

        let args = Args {
            config: Some("/nonexistent/streamcatcher.json".into()),
            ..Default::default()
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_validation_failure() {
        let _guard = clean_env();

        let args = Args {
            listen_port: Some(9000),
            admin_port: Some(9000),
            ..Default::default()
        };

        let result = load_config(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("validation failed"));
    }
}
