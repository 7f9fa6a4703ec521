//! Shared fixtures: a template tree and a snapshot directory in a temp dir.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const SHOP: &str = r#"{
  "id": "0b7c8d0e-4f1a-4c55-9a57-3c1f2b9e8d11",
  "name": "shop",
  "region": "eu-west-1",
  "resources": [
    {"name": "web", "type": "service", "configuration": {"image": "nginx:1.27", "replicas": 2}},
    {"name": "db", "type": "database", "configuration": {"engine": "postgres"}}
  ]
}"#;

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        ws.write("snapshots/blueprints/shop.json", SHOP);
        ws.write(
            "snapshots/stacks/shop-prod.yaml",
            "name: shop-prod\nenvironment: production\nblueprints:\n  - shop\n",
        );
        ws
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap()
    }

    /// The binary, isolated from the caller's config and environment.
    pub fn infraplate(&self) -> Command {
        let mut cmd = Command::cargo_bin("infraplate").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.path(".config"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        for var in [
            "INFRAPLATE_API_KEY",
            "INFRAPLATE_API_URL",
            "INFRAPLATE_OUTPUT_DIR",
            "INFRAPLATE_TEMPLATE_DIR",
            "INFRAPLATE_API__KEY",
            "INFRAPLATE_API__URL",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// `generate blueprint <id> -t templates -o out --from-dir snapshots`.
    pub fn generate(&self, identifier: &str) -> Command {
        self.generate_with(identifier, "templates", "out")
    }

    pub fn generate_with(&self, identifier: &str, templates: &str, out: &str) -> Command {
        let mut cmd = self.infraplate();
        cmd.args(["generate", "blueprint", identifier])
            .args(["-t", templates, "-o", out, "--from-dir", "snapshots"]);
        cmd
    }
}

/// Relative paths of every file below `root`, slash-separated and sorted.
pub fn files_under(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(root, root, &mut out);
    out.sort();
    out
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let rel = path.strip_prefix(root).unwrap();
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(parts.join("/"));
        }
    }
}
