use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::IoError;

const MODELS_SEGMENT: &str = "models";
const ITEM_SEGMENT: &str = "item";
const MODEL_SUFFIX: &str = ".json";

/// 递归查找 `root` 下的物品模型文件。
///
/// 文件名需以 `.json` 结尾，且相对 `root` 的目录部分同时包含 `models` 与 `item` 两级（顺序不限）。
pub fn find_item_models(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| IoError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_json = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(MODEL_SUFFIX));
        if is_json && in_item_models_dir(root, entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

fn in_item_models_dir(root: &Path, file: &Path) -> bool {
    let Some(dir) = file.strip_prefix(root).ok().and_then(Path::parent) else {
        return false;
    };
    let has_segment = |segment: &str| {
        dir.components()
            .any(|component| component == Component::Normal(OsStr::new(segment)))
    };
    has_segment(MODELS_SEGMENT) && has_segment(ITEM_SEGMENT)
}

/// 以 UTF-8 读取并解析模型文档。
pub fn read_model(path: &Path) -> Result<Value, IoError> {
    let text = fs::read_to_string(path).map_err(|source| IoError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IoError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// 以两空格缩进写回模型文档，非 ASCII 字符原样保留。
pub fn write_model(path: &Path, model: &Value) -> Result<(), IoError> {
    let text = serde_json::to_string_pretty(model).map_err(|source| IoError::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| IoError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}
