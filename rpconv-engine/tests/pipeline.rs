use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use rpconv_config::AppConfig;
use rpconv_engine::{ArchiveOutcome, ConvertConfig, process_archive, run_batch};
use serde_json::{Value, json};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0, 0, 13];

fn config_in(root: &Path) -> ConvertConfig {
    ConvertConfig {
        input_dir: root.join("import"),
        output_dir: root.join("export"),
        scratch_dir: root.join("temp_pack"),
        ..ConvertConfig::from(&AppConfig::default())
    }
}

fn build_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

fn read_entry(archive: &Path, name: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

fn read_json_entry(archive: &Path, name: &str) -> Value {
    serde_json::from_slice(&read_entry(archive, name)).unwrap()
}

fn entry_names(archive: &Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn legacy_model() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "format_version": "1.9.0",
        "textures": {"0": "item/foo"},
        "elements": [
            {
                "from": [0, 0, 0],
                "to": [16, 16, 16],
                "rotation": {"angle": 45, "axis": "x", "origin": [1, 2, 3]}
            }
        ]
    }))
    .unwrap()
}

#[test]
fn converts_models_and_keeps_other_files() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(temp.path());
    let archive = config.input_dir.join("foo_pack.zip");
    build_zip(
        &archive,
        &[
            ("models/item/foo.json", legacy_model()),
            ("textures/bar.png", PNG_BYTES.to_vec()),
        ],
    );

    let summary = run_batch(&config).unwrap();

    let output = config.output_dir.join("foo_pack_converted.zip");
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.converted[0].output, output);
    assert_eq!(summary.models_converted(), 1);
    assert_eq!(entry_names(&output), ["models/item/foo.json", "textures/bar.png"]);
    assert_eq!(read_entry(&output, "textures/bar.png"), PNG_BYTES);

    let model = read_json_entry(&output, "models/item/foo.json");
    assert_eq!(model["format_version"], json!("1.21.11"));
    assert_eq!(model["textures"], json!({"0": "item/foo"}));
    assert_eq!(
        model["elements"][0]["rotation"],
        json!({"origin": [1, 2, 3], "x": 45, "y": 0, "z": 0})
    );
    assert!(!config.scratch_dir.exists());
}

#[test]
fn archive_without_item_models_produces_no_output() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(temp.path());
    let archive = config.input_dir.join("blocks_only.zip");
    build_zip(
        &archive,
        &[
            ("assets/minecraft/models/block/stone.json", legacy_model()),
            ("pack.mcmeta", b"{}".to_vec()),
        ],
    );

    let summary = run_batch(&config).unwrap();

    assert_eq!(summary.skipped, [archive]);
    assert!(summary.converted.is_empty());
    assert_eq!(fs::read_dir(&config.output_dir).unwrap().count(), 0);
}

#[test]
fn failures_stay_local_to_their_file_and_archive() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(temp.path());
    build_zip(
        &config.input_dir.join("a.zip"),
        &[
            ("assets/ns/models/item/broken.json", b"{ \"elements\": [".to_vec()),
            ("assets/ns/models/item/good.json", legacy_model()),
        ],
    );
    fs::write(config.input_dir.join("b.zip"), b"not an archive").unwrap();
    build_zip(
        &config.input_dir.join("c.zip"),
        &[("assets/ns/models/item/other.json", legacy_model())],
    );

    let summary = run_batch(&config).unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.failed, [config.input_dir.join("b.zip")]);
    let outputs: Vec<PathBuf> = summary.converted.iter().map(|r| r.output.clone()).collect();
    assert_eq!(
        outputs,
        [
            config.output_dir.join("a_converted.zip"),
            config.output_dir.join("c_converted.zip"),
        ]
    );
    assert_eq!(summary.converted[0].converted, 1);
    assert_eq!(summary.converted[0].failed, 1);
    assert_eq!(summary.models_converted(), 2);
    assert_eq!(summary.models_failed(), 1);

    let a_output = config.output_dir.join("a_converted.zip");
    assert_eq!(
        read_entry(&a_output, "assets/ns/models/item/broken.json"),
        b"{ \"elements\": ["
    );
    let good = read_json_entry(&a_output, "assets/ns/models/item/good.json");
    assert_eq!(good["format_version"], json!("1.21.11"));
}

#[test]
fn converted_models_are_pretty_printed_with_unicode_intact() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(temp.path());
    fs::create_dir_all(&config.output_dir).unwrap();
    fs::create_dir_all(&config.scratch_dir).unwrap();
    let archive = temp.path().join("unicode.zip");
    build_zip(
        &archive,
        &[(
            "assets/ns/models/item/name.json",
            "{\"credit\":\"Мечи ⚔\",\"elements\":[{\"rotation\":{\"angle\":22.5,\"axis\":\"z\"}}]}"
                .as_bytes()
                .to_vec(),
        )],
    );

    let outcome = process_archive(&archive, &config.scratch_dir, &config).unwrap();
    let ArchiveOutcome::Converted(report) = outcome else {
        panic!("expected a converted archive");
    };

    let text = String::from_utf8(read_entry(&report.output, "assets/ns/models/item/name.json")).unwrap();
    let expected = r#"{
  "credit": "Мечи ⚔",
  "elements": [
    {
      "rotation": {
        "origin": [
          0,
          0,
          0
        ],
        "x": 0,
        "y": 0,
        "z": 22.5
      }
    }
  ]
}"#;
    assert_eq!(text, expected);
    assert_eq!(fs::read_dir(&config.scratch_dir).unwrap().count(), 0);
}

#[test]
fn read_only_model_entries_are_still_converted() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(temp.path());
    fs::create_dir_all(&config.output_dir).unwrap();
    fs::create_dir_all(&config.scratch_dir).unwrap();
    let archive = temp.path().join("readonly.zip");
    let mut writer = ZipWriter::new(File::create(&archive).unwrap());
    writer
        .start_file(
            "models/item/foo.json",
            SimpleFileOptions::default().unix_permissions(0o444),
        )
        .unwrap();
    writer.write_all(&legacy_model()).unwrap();
    writer.finish().unwrap();

    let ArchiveOutcome::Converted(report) =
        process_archive(&archive, &config.scratch_dir, &config).unwrap()
    else {
        panic!("expected a converted archive");
    };

    assert_eq!(report.converted, 1);
    assert_eq!(report.failed, 0);
    let model = read_json_entry(&report.output, "models/item/foo.json");
    assert_eq!(
        model["elements"][0]["rotation"],
        json!({"origin": [1, 2, 3], "x": 45, "y": 0, "z": 0})
    );
}
