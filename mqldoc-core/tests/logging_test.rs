//! Integration tests for global logging setup
//!
//! `init_logging` installs a process-wide subscriber, so these tests live in
//! their own binary.

use mqldoc_core::{init_logging, FilterBuilder, LoggingConfig, ProjectionBuilder};

#[test]
fn test_init_logging_once_per_process() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        json_format: true,
    };

    assert!(init_logging(&config).is_ok());

    // Library events go through the installed subscriber without panicking
    let projection = ProjectionBuilder::new().include(["x", "x"]).doc();
    assert_eq!(projection.len(), 1);
    let bytes = FilterBuilder::new().eq("a", 1).doc().encode().unwrap();
    assert!(!bytes.is_empty());

    let err = init_logging(&LoggingConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Failed to install"));
}
