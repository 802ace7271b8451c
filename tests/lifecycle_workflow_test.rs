//! Integration tests for the full version lifecycle
//!
//! Drives a project from init through finalize against a real temp
//! directory and verifies both the status document and the on-disk
//! version directory layout.

use forged::lifecycle::{LifecycleManager, StageUpdate};
use forged::models::VersionStatus;
use forged::stages::StageRegistry;
use serde_json::json;
use tempfile::TempDir;

fn agent_manager(temp: &TempDir) -> LifecycleManager {
    LifecycleManager::new(
        temp.path().join("forge/agents"),
        StageRegistry::agent_pipeline(),
        "v",
    )
}

#[test]
fn test_full_build_workflow() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("search-agent").unwrap();
    let version = manager
        .initialize_version("search-agent", "Build a web search agent")
        .unwrap();

    // Every canonical stage starts out pending.
    assert_eq!(version.stages.len(), 5);
    assert!(version.stages.iter().all(|s| s.status == "pending"));
    assert_eq!(version.status, VersionStatus::InProgress);

    // Work through two stages with documents.
    manager
        .write_stage_document(
            "search-agent",
            &version.version_id,
            "requirements_analysis",
            &json!({"goal": "search the web", "inputs": ["query"]}),
        )
        .unwrap();
    manager
        .write_stage_document(
            "search-agent",
            &version.version_id,
            "prompt_generation",
            &json!("# System Prompt\n\nYou search the web."),
        )
        .unwrap();

    let mut update = StageUpdate::new("requirements_analysis", "completed");
    update.summary = Some("Requirements locked".to_string());
    manager
        .register_stage("search-agent", &version.version_id, &update)
        .unwrap();

    manager
        .append_change_log(
            "search-agent",
            &version.version_id,
            "Initial requirements",
            "Captured search scope and inputs",
            Some("requirements_analysis"),
        )
        .unwrap();

    manager
        .write_version_file(
            "search-agent",
            &version.version_id,
            "src/agent.py",
            "def run(query): ...\n",
        )
        .unwrap();

    let finalized = manager
        .finalize_version(
            "search-agent",
            &version.version_id,
            "Agent built and validated",
            "completed",
            Some(vec!["src/agent.py".to_string()]),
        )
        .unwrap();
    assert_eq!(finalized.status, VersionStatus::Completed);
    assert_eq!(finalized.artifacts, vec!["src/agent.py"]);
    assert!(finalized.closed_at.is_some());

    // On-disk layout of the version directory.
    let version_dir = temp
        .path()
        .join("forge/agents/search-agent")
        .join(&version.version_id);
    assert!(version_dir.join("requirements_analysis.json").exists());
    assert!(version_dir.join("prompt_generation.md").exists());
    assert!(version_dir.join("change_log.md").exists());
    assert!(version_dir.join("summary.md").exists());
    assert!(version_dir.join("src/agent.py").exists());
    assert!(temp
        .path()
        .join("forge/agents/search-agent/status.yaml")
        .exists());
}

#[test]
fn test_state_survives_restart() {
    let temp = TempDir::new().unwrap();
    let version_id;

    {
        let manager = agent_manager(&temp);
        manager.init_project("scribe").unwrap();
        let version = manager.initialize_version("scribe", "Write docs").unwrap();
        version_id = version.version_id.clone();

        manager
            .append_change_log("scribe", &version_id, "A", "desc1", None)
            .unwrap();
        manager
            .append_change_log("scribe", &version_id, "B", "desc2", None)
            .unwrap();
    }

    // A fresh manager over the same root sees everything, in order.
    let manager = agent_manager(&temp);
    let doc = manager.project_status("scribe").unwrap();
    let version = doc.find_version(&version_id).unwrap();

    let titles: Vec<&str> = version
        .change_log
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert_eq!(doc.current_version.as_deref(), Some(version_id.as_str()));
}

#[test]
fn test_stage_document_round_trip_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("echo-agent").unwrap();
    let version = manager.initialize_version("echo-agent", "Echo").unwrap();

    let prompt = "# Prompt\n\nRepeat the user's words.\n";
    manager
        .write_stage_document(
            "echo-agent",
            &version.version_id,
            "prompt_generation",
            &json!(prompt),
        )
        .unwrap();

    let doc = manager
        .get_stage_document("echo-agent", &version.version_id, "prompt_generation")
        .unwrap();
    assert_eq!(doc.content, prompt);
    assert_eq!(doc.doc_path, "prompt_generation.md");

    // The recorded path resolves to a real file.
    let on_disk = temp
        .path()
        .join("forge/agents/echo-agent")
        .join(&version.version_id)
        .join(&doc.doc_path);
    assert!(on_disk.exists());
}

#[test]
fn test_sandbox_escape_rejected_without_side_effects() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("guard").unwrap();
    let version = manager.initialize_version("guard", "Guard").unwrap();

    let err = manager
        .write_version_file("guard", &version.version_id, "../../escape.txt", "x")
        .unwrap_err();
    assert!(err.to_string().contains("escapes"));

    // Nothing landed next to the project or workspace root.
    assert!(!temp.path().join("escape.txt").exists());
    assert!(!temp.path().join("forge/agents/escape.txt").exists());
    assert!(!temp.path().join("forge/agents/guard/escape.txt").exists());
}

#[test]
fn test_same_second_initializations_get_distinct_ids() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("burst").unwrap();
    let first = manager.initialize_version("burst", "one").unwrap();
    let second = manager.initialize_version("burst", "two").unwrap();
    let third = manager.initialize_version("burst", "three").unwrap();

    assert_ne!(first.version_id, second.version_id);
    assert_ne!(second.version_id, third.version_id);

    let doc = manager.project_status("burst").unwrap();
    assert_eq!(doc.versions.len(), 3);
    assert_eq!(doc.current_version.as_deref(), Some(third.version_id.as_str()));
}

#[test]
fn test_alias_and_canonical_name_share_one_record() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("alias-check").unwrap();
    let version = manager.initialize_version("alias-check", "Check").unwrap();

    manager
        .register_stage(
            "alias-check",
            &version.version_id,
            &StageUpdate::new("requirements_update", "in_progress"),
        )
        .unwrap();
    manager
        .register_stage(
            "alias-check",
            &version.version_id,
            &StageUpdate::new("requirements_analysis", "completed"),
        )
        .unwrap();

    let doc = manager.project_status("alias-check").unwrap();
    let version = doc.find_version(&version.version_id).unwrap();
    let matching: Vec<_> = version
        .stages
        .iter()
        .filter(|s| s.name == "requirements_analysis")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].status, "completed");
}

#[test]
fn test_finalized_version_blocks_mutation_until_reopened() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("sealed").unwrap();
    let version = manager.initialize_version("sealed", "Seal it").unwrap();
    manager
        .finalize_version("sealed", &version.version_id, "Done", "completed", None)
        .unwrap();

    let err = manager
        .append_change_log("sealed", &version.version_id, "Late", "too late", None)
        .unwrap_err();
    assert!(err.to_string().contains("reopen"));

    manager.reopen_version("sealed", &version.version_id).unwrap();
    manager
        .append_change_log("sealed", &version.version_id, "Late", "now allowed", None)
        .unwrap();

    let doc = manager.project_status("sealed").unwrap();
    let version = doc.find_version(&version.version_id).unwrap();
    assert_eq!(version.status, VersionStatus::InProgress);
    assert_eq!(version.change_log.len(), 1);
}

#[test]
fn test_staleness_detects_out_of_band_edits() {
    let temp = TempDir::new().unwrap();
    let manager = agent_manager(&temp);

    manager.init_project("drift").unwrap();
    let version = manager.initialize_version("drift", "Drift").unwrap();
    manager
        .write_stage_document(
            "drift",
            &version.version_id,
            "code_generation",
            &json!({"files": 1}),
        )
        .unwrap();

    let report = manager.stage_staleness("drift", &version.version_id).unwrap();
    assert!(report.fresh_stages.contains(&"code_generation".to_string()));

    // Editing the file behind the store's back flips the stage to stale.
    let doc_path = temp
        .path()
        .join("forge/agents/drift")
        .join(&version.version_id)
        .join("code_generation.json");
    std::fs::write(&doc_path, "{\"files\": 2}\n").unwrap();

    let report = manager.stage_staleness("drift", &version.version_id).unwrap();
    assert!(report.stale_stages.contains(&"code_generation".to_string()));
    assert!(report.has_stale());
}
