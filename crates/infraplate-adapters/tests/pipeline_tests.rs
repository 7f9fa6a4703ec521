//! End-to-end runs over real template trees and snapshot payloads, writing
//! into the in-memory filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use infraplate_adapters::{
    DirectoryTemplates, FileVariablesLoader, MemoryFilesystem, SnapshotDataSource,
    SyntaxValidator,
};
use infraplate_core::application::FileStatus;
use infraplate_core::prelude::*;
use tempfile::TempDir;

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let full = root.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
}

struct Fixture {
    dir: TempDir,
    fs: MemoryFilesystem,
}

impl Fixture {
    fn new(templates: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        write_tree(&dir.path().join("templates"), templates);
        write_tree(
            &dir.path().join("data"),
            &[(
                "blueprints/shop.json",
                r#"{
                    "name": "shop",
                    "resources": [
                        {"name": "web", "type": "service", "configuration": {"image": "nginx:1.27", "replicas": 2}},
                        {"name": "db", "type": "database", "configuration": {"engine": "postgres"}}
                    ]
                }"#,
            )],
        );
        Self {
            dir,
            fs: MemoryFilesystem::new(),
        }
    }

    fn service(&self) -> GenerateService {
        GenerateService::new(
            Box::new(DirectoryTemplates::new()),
            Box::new(SnapshotDataSource::new(self.dir.path().join("data"))),
            Box::new(FileVariablesLoader::new()),
            Box::new(SyntaxValidator::new()),
            Box::new(self.fs.clone()),
        )
    }

    fn request(&self, identifier: &str) -> GenerateRequest {
        GenerateRequest {
            kind: SourceKind::Blueprint,
            identifier: Identifier::parse(identifier).unwrap(),
            template_dir: self.dir.path().join("templates"),
            output_dir: PathBuf::from("/out"),
            variables_file: None,
            options: RenderOptions::default(),
        }
    }
}

#[test]
fn renders_terraform_and_kubernetes_trees() {
    let fixture = Fixture::new(&[
        ("main.tf", "# {{blueprint.name}}\n{{#each resources}}resource \"x\" \"{{name}}\" {}\n{{/each}}"),
        (
            "k8s/deploy.yaml",
            "{{#each resources}}---\nname: {{name}}\nreplicas: {{configuration.replicas|default:\"1\"}}\n{{/each}}",
        ),
        (".git/config.json", "{}"),
    ]);

    let report = fixture
        .service()
        .generate(&fixture.request("shop"), &CancellationToken::new())
        .unwrap();

    assert!(report.is_success(), "{report:#?}");
    assert_eq!(
        fixture.fs.list_files(),
        vec![
            PathBuf::from("/out/k8s/deploy.yaml"),
            PathBuf::from("/out/main.tf")
        ]
    );
    assert_eq!(
        fixture.fs.read_file(Path::new("/out/k8s/deploy.yaml")).unwrap(),
        "---\nname: web\nreplicas: 2\n---\nname: db\nreplicas: 1\n"
    );
}

#[test]
fn custom_variables_override_snapshot_values() {
    let fixture = Fixture::new(&[(
        "main.tf",
        "env = \"{{environment}}\"\nname = \"{{name}}\"\nns = \"{{blueprint.name}}\"\n",
    )]);
    let vars = fixture.dir.path().join("staging.yaml");
    fs::write(&vars, "environment: staging\nname: shop-staging\n").unwrap();

    let mut request = fixture.request("shop");
    request.variables_file = Some(vars);
    let report = fixture
        .service()
        .generate(&request, &CancellationToken::new())
        .unwrap();

    assert!(report.overrides.iter().any(|o| o.path == "name"));
    assert_eq!(
        fixture.fs.read_file(Path::new("/out/main.tf")).unwrap(),
        "env = \"staging\"\nname = \"shop-staging\"\nns = \"shop-staging\"\n"
    );
}

#[test]
fn broken_yaml_output_is_not_written() {
    let fixture = Fixture::new(&[
        ("bad.yaml", "items: {{resources[0].configuration.image}}: x\n"),
        ("good.yaml", "image: \"{{resources[0].configuration.image}}\"\n"),
    ]);

    let report = fixture
        .service()
        .generate(&fixture.request("shop"), &CancellationToken::new())
        .unwrap();

    let statuses: Vec<FileStatus> = report.files.iter().map(|f| f.status).collect();
    assert_eq!(statuses, [FileStatus::Failed, FileStatus::Written]);
    assert_eq!(fixture.fs.list_files(), vec![PathBuf::from("/out/good.yaml")]);
}

#[test]
fn unknown_blueprint_touches_nothing() {
    let fixture = Fixture::new(&[("main.tf", "x")]);
    let err = fixture
        .service()
        .generate(&fixture.request("missing"), &CancellationToken::new())
        .unwrap_err();

    assert!(err.to_string().contains("not found"));
    assert!(!fixture.fs.exists(Path::new("/out")));
}
