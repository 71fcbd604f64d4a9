use std::path::{Path, PathBuf};

use rpconv_core::model::convert_model_in_place;
use rpconv_io::{extract_archive, find_item_models, read_model, write_archive, write_model};
use tempfile::Builder;
use tracing::{debug, info, warn};

use crate::batch::ConvertConfig;
use crate::errors::EngineError;

/// 单个压缩包的转换结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// 未找到物品模型，未生成输出压缩包。
    NoModels,
    Converted(ConversionReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub archive: PathBuf,
    pub output: PathBuf,
    pub converted: usize,
    pub failed: usize,
    pub entries: usize,
}

/// 解包 -> 转换物品模型 -> 重新打包。
///
/// 临时目录在 `scratch_root` 下独立创建，函数返回（包括出错）时随 `TempDir` 析构一并删除。
/// 单个模型文件失败只记录日志并跳过；解包或打包失败作为错误返回给调用方。
pub fn process_archive(
    archive: &Path,
    scratch_root: &Path,
    config: &ConvertConfig,
) -> Result<ArchiveOutcome, EngineError> {
    info!(archive = %archive.display(), "处理压缩包");

    let scratch = Builder::new()
        .prefix("pack-")
        .tempdir_in(scratch_root)
        .map_err(|source| EngineError::Scratch {
            path: scratch_root.to_path_buf(),
            source,
        })?;
    let workdir = scratch.path();

    let entries = extract_archive(archive, workdir)?;
    debug!(archive = %archive.display(), entries, workdir = %workdir.display(), "解包完成");

    let models = find_item_models(workdir)?;
    if models.is_empty() {
        warn!(archive = %archive.display(), "压缩包中未找到物品模型，跳过");
        return Ok(ArchiveOutcome::NoModels);
    }

    let mut converted = 0;
    let mut failed = 0;
    for model_path in &models {
        let relative = model_path.strip_prefix(workdir).unwrap_or(model_path);
        match convert_model_file(model_path, &config.target_version) {
            Ok(()) => {
                converted += 1;
                info!(model = %relative.display(), "已转换模型");
            }
            Err(err) => {
                failed += 1;
                warn!(model = %relative.display(), error = %err, "模型转换失败，已跳过");
            }
        }
    }

    let output = config.output_path_for(archive);
    let entries = write_archive(workdir, &output)?;
    info!(
        output = %output.display(),
        entries,
        converted,
        failed,
        "已生成转换后的压缩包"
    );

    Ok(ArchiveOutcome::Converted(ConversionReport {
        archive: archive.to_path_buf(),
        output,
        converted,
        failed,
        entries,
    }))
}

fn convert_model_file(path: &Path, target_version: &str) -> Result<(), EngineError> {
    let mut model = read_model(path)?;
    let changes = convert_model_in_place(&mut model, target_version);
    debug!(
        path = %path.display(),
        version_updated = changes.version_updated,
        rotations = changes.rotations_migrated,
        "模型变更"
    );
    write_model(path, &model)?;
    Ok(())
}
