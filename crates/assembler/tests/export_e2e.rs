#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Scene {
    dir: TempDir,
    path: PathBuf,
}

impl Scene {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");
        let description = json!({
            "nodes": [
                {
                    "name": "pCube1",
                    "attributes": [
                        {
                            "name": "t",
                            "long_name": "translate",
                            "kind": "compound",
                            "children": [
                                {"name": "tx", "long_name": "translateX", "kind": "unit.distance", "value": 3.5},
                                {"name": "ty", "long_name": "translateY", "kind": "unit.distance", "value": 1.0}
                            ]
                        },
                        {"name": "v", "long_name": "visibility", "kind": "numeric.boolean", "value": true},
                        {"name": "nodeState", "kind": "enum", "value": 2, "hidden": true}
                    ]
                },
                {
                    "name": "pSphere1",
                    "selected": true,
                    "attributes": [
                        {"name": "radius", "kind": "numeric.double", "value": 2.0}
                    ]
                }
            ]
        });
        fs::write(&path, description.to_string()).unwrap();
        Self { dir, path }
    }

    fn missing_config(&self) -> PathBuf {
        self.dir.path().join("assembler.toml")
    }
}

fn assembler_cmd(scene: &Scene) -> Command {
    let mut cmd = Command::new(cargo_bin("assembler"));
    cmd.env_remove("ASSEMBLER_INCLUDE_INDENTATION")
        .env_remove("ASSEMBLER_INDENTATION_SIZE")
        .arg("--config")
        .arg(scene.missing_config());
    cmd
}

#[test]
fn export_defaults_to_selection() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("export")
        .arg(&scene.path)
        .assert()
        .success()
        .stdout("{\"pSphere1\": {\"radius\": 2.0}}\n");
}

#[test]
fn export_single_attribute_nests_under_its_node() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("export")
        .arg(&scene.path)
        .args(["--attr", "pCube1.translateX"])
        .assert()
        .success()
        .stdout("{\"pCube1\": {\"translateX\": 3.5}}\n");
}

#[test]
fn export_with_indentation_expands_nested_values() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("export")
        .arg(&scene.path)
        .args(["--node", "pCube1", "--indent", "--indent-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"pCube1\": {\n"))
        .stdout(predicate::str::contains("\"translate\": {"))
        .stdout(predicate::str::contains("\"tx\": 3.5"))
        .stdout(predicate::str::contains("\"visibility\": true"))
        .stdout(predicate::str::contains("nodeState").not());
}

#[test]
fn export_to_file_reports_path() {
    let scene = Scene::new();
    let out = scene.dir.path().join("out.json");
    assembler_cmd(&scene)
        .arg("export")
        .arg(&scene.path)
        .args(["-n", "pSphere1", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written, "{\"pSphere1\": {\"radius\": 2.0}}");
}

#[test]
fn export_unknown_node_fails() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("export")
        .arg(&scene.path)
        .args(["--node", "persp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("persp"));
}

#[test]
fn inspect_all_lists_nodes_and_hides_hidden_attributes() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("inspect")
        .arg(&scene.path)
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("pCube1"))
        .stdout(predicate::str::contains("pSphere1"))
        .stdout(predicate::str::contains("radius"))
        .stdout(predicate::str::contains("nodeState").not());
}

#[test]
fn inspect_hidden_flag_shows_hidden_attributes() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("inspect")
        .arg(&scene.path)
        .args(["--all", "--hidden"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodeState"))
        .stdout(predicate::str::contains("[hidden]"));
}

#[test]
fn inspect_search_narrows_attributes() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("inspect")
        .arg(&scene.path)
        .args(["--all", "--search", "VISIB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("visibility"))
        .stdout(predicate::str::contains("radius").not());
}

#[test]
fn missing_scene_file_fails() {
    let scene = Scene::new();
    assembler_cmd(&scene)
        .arg("export")
        .arg(scene.dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load scene"));
}
