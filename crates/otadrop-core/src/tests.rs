use crate::{
    AgentConfig, CandidateNaming, DeviceIdentity, EventLog, NameMatch, PipelineOutcome,
    StatusEvent, StatusSink, DEFAULT_PACKAGE_PREFIX,
};
use std::path::PathBuf;

#[test]
fn naming_ignores_entries_without_prefix() {
    let naming = CandidateNaming::new(DEFAULT_PACKAGE_PREFIX, "deviceX");
    assert_eq!(naming.classify("notes.txt"), NameMatch::Ignored);
    assert_eq!(naming.classify("delta-usb-deviceX.zip"), NameMatch::Ignored);
    assert_eq!(
        naming.classify("xdelta-sdcard-deviceX.zip"),
        NameMatch::Ignored
    );
}

#[test]
fn naming_selects_prefix_and_model_match() {
    let naming = CandidateNaming::new(DEFAULT_PACKAGE_PREFIX, "deviceX");
    assert_eq!(
        naming.classify("delta-sdcard-deviceX-9.9.9.zip"),
        NameMatch::Qualifying
    );
}

#[test]
fn naming_reports_other_model_as_skipped() {
    let naming = CandidateNaming::new(DEFAULT_PACKAGE_PREFIX, "deviceX");
    assert_eq!(
        naming.classify("delta-sdcard-deviceY-9.9.9.zip"),
        NameMatch::SkippedModel
    );
}

#[test]
fn naming_with_empty_model_token_applies_no_filter() {
    let naming = CandidateNaming::new(DEFAULT_PACKAGE_PREFIX, "");
    assert_eq!(
        naming.classify("delta-sdcard-deviceY-9.9.9.zip"),
        NameMatch::Qualifying
    );
}

#[test]
fn wrapped_marker_prevents_prefix_version_collision() {
    let identity = DeviceIdentity::new("1", "deviceX");
    assert!(!identity.is_already_applied("delta-sdcard-deviceX-.12.zip"));
    assert!(identity.is_already_applied("delta-sdcard-deviceX-.1.zip"));
}

#[test]
fn version_gate_matches_wrapped_marker_only() {
    let identity = DeviceIdentity::new("9.9.9", "deviceX");
    assert!(identity.is_already_applied("delta-sdcard-deviceX.9.9.9.zip"));
    // A hyphen-delimited version is a different marker under the wrapped
    // containment rule.
    assert!(!identity.is_already_applied("delta-sdcard-deviceX-9.9.9-signed.zip"));

    let older = DeviceIdentity::new("8.8.8", "deviceX");
    assert!(!older.is_already_applied("delta-sdcard-deviceX.9.9.9.zip"));
}

#[test]
fn empty_version_marker_never_matches() {
    let identity = DeviceIdentity::new("", "deviceX");
    assert_eq!(identity.wrapped_version_marker(), None);
    assert!(!identity.is_already_applied("delta-sdcard-deviceX-9.9.9.zip"));
    assert!(!identity.is_already_applied(".."));
}

#[test]
fn config_parses_with_defaults() {
    let raw = r#"
source_dir = "/media/usb/drop"
staging_dir = "/data/staging"
"#;
    let config = AgentConfig::from_toml_str(raw).expect("must parse");
    assert_eq!(config.source_dir, PathBuf::from("/media/usb/drop"));
    assert_eq!(config.staging_dir, PathBuf::from("/data/staging"));
    assert_eq!(config.package_prefix, DEFAULT_PACKAGE_PREFIX);
    assert_eq!(config.device.build_version, None);
    assert_eq!(
        config.platform.trusted_keys_dir,
        PathBuf::from("/etc/otadrop/trusted-keys")
    );
    assert_eq!(
        config.platform.control_dir,
        PathBuf::from("/var/lib/otadrop/recovery")
    );
    assert_eq!(config.platform.trigger_command, None);
}

#[test]
fn config_accepts_full_shape() {
    let raw = r#"
source_dir = "/media/usb/drop"
staging_dir = "/data/staging"
package_prefix = "fw-bundle"

[device]
build_version = "2.4.1"
model = "camX"

[platform]
trusted_keys_dir = "/etc/keys"
control_dir = "/run/recovery"
trigger_command = ["systemctl", "start", "recovery-apply.service"]
"#;
    let config = AgentConfig::from_toml_str(raw).expect("must parse");
    assert_eq!(config.package_prefix, "fw-bundle");
    assert_eq!(config.device.build_version.as_deref(), Some("2.4.1"));
    assert_eq!(config.device.model.as_deref(), Some("camX"));
    assert_eq!(
        config.platform.trigger_command,
        Some(vec![
            "systemctl".to_string(),
            "start".to_string(),
            "recovery-apply.service".to_string()
        ])
    );
}

#[test]
fn config_rejects_blank_prefix() {
    let raw = r#"
source_dir = "/media/usb/drop"
staging_dir = "/data/staging"
package_prefix = "  "
"#;
    let err = AgentConfig::from_toml_str(raw).expect_err("blank prefix must be rejected");
    assert!(err.to_string().contains("package_prefix"));
}

#[test]
fn config_rejects_empty_trigger_command() {
    let raw = r#"
source_dir = "/media/usb/drop"
staging_dir = "/data/staging"

[platform]
trigger_command = []
"#;
    let err = AgentConfig::from_toml_str(raw).expect_err("empty trigger must be rejected");
    assert!(err.to_string().contains("trigger_command"));
}

#[test]
fn config_requires_source_and_staging_dirs() {
    let err = AgentConfig::from_toml_str("staging_dir = \"/data/staging\"")
        .expect_err("missing source_dir must be rejected");
    assert!(err.to_string().contains("failed to parse otadrop config"));
}

#[test]
fn outcome_strings_are_stable() {
    assert_eq!(
        PipelineOutcome::NoCandidateFound.as_str(),
        "no-candidate-found"
    );
    assert_eq!(PipelineOutcome::AlreadyUpgraded.as_str(), "already-upgraded");
    assert_eq!(PipelineOutcome::StagingFailed.as_str(), "staging-failed");
    assert_eq!(
        PipelineOutcome::VerificationFailed.as_str(),
        "verification-failed"
    );
    assert_eq!(PipelineOutcome::InstallFailed.as_str(), "install-failed");
    assert_eq!(PipelineOutcome::InstallInvoked.as_str(), "install-invoked");
}

#[test]
fn only_stage_errors_count_as_failures() {
    assert!(!PipelineOutcome::NoCandidateFound.is_failure());
    assert!(!PipelineOutcome::AlreadyUpgraded.is_failure());
    assert!(!PipelineOutcome::InstallInvoked.is_failure());
    assert!(PipelineOutcome::StagingFailed.is_failure());
    assert!(PipelineOutcome::VerificationFailed.is_failure());
    assert!(PipelineOutcome::InstallFailed.is_failure());
}

#[test]
fn event_log_preserves_order() {
    let mut log = EventLog::new();
    log.record(StatusEvent::ScanStarted {
        source_dir: "/drop".to_string(),
    });
    log.record(StatusEvent::NoCandidate {
        detail: "directory is empty".to_string(),
    });

    let events = log.into_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], StatusEvent::ScanStarted { .. }));
    assert!(matches!(events[1], StatusEvent::NoCandidate { .. }));
}

#[test]
fn event_messages_name_the_files_involved() {
    let selected = StatusEvent::CandidateSelected {
        name: "delta-sdcard-deviceX-9.9.9.zip".to_string(),
        size_bytes: 4096,
    };
    assert!(selected.message().contains("delta-sdcard-deviceX-9.9.9.zip"));
    assert!(selected.message().contains("4096"));

    let rejected = StatusEvent::VerificationRejected {
        reason: "signature does not match any trusted key".to_string(),
    };
    assert!(rejected.message().contains("rejected"));
    assert!(rejected.message().contains("trusted key"));
}
