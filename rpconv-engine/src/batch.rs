use std::fs;
use std::path::{Path, PathBuf};

use rpconv_config::AppConfig;
use rpconv_io::reset_dir;
use tracing::{error, info, warn};

use crate::errors::EngineError;
use crate::pipeline::{ArchiveOutcome, ConversionReport, process_archive};

/// 一次批量转换所需的全部参数，由调用方显式传入。
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub target_version: String,
    pub archive_extension: String,
    pub output_suffix: String,
}

impl ConvertConfig {
    /// `<output_dir>/<stem><suffix>.<extension>`
    pub fn output_path_for(&self, archive: &Path) -> PathBuf {
        let stem = archive
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!(
            "{stem}{}.{}",
            self.output_suffix, self.archive_extension
        ))
    }
}

impl From<&AppConfig> for ConvertConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_dir: config.paths.input_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            scratch_dir: config.paths.scratch_dir.clone(),
            target_version: config.conversion.target_version.clone(),
            archive_extension: config.conversion.archive_extension.clone(),
            output_suffix: config.conversion.output_suffix.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub discovered: usize,
    pub converted: Vec<ConversionReport>,
    /// 不含物品模型、未生成输出的压缩包。
    pub skipped: Vec<PathBuf>,
    /// 解包或打包失败的压缩包。
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn models_converted(&self) -> usize {
        self.converted.iter().map(|report| report.converted).sum()
    }

    pub fn models_failed(&self) -> usize {
        self.converted.iter().map(|report| report.failed).sum()
    }
}

/// 本次运行的临时根目录，离开作用域时整体删除。
struct ScratchRoot {
    path: PathBuf,
}

impl ScratchRoot {
    fn prepare(path: &Path) -> Result<Self, EngineError> {
        reset_dir(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ScratchRoot {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %err, "清理临时目录失败");
        }
    }
}

/// 依次转换输入目录中的全部压缩包。
///
/// 只有目录准备或列举失败会返回错误；单个压缩包失败记录后继续处理下一个。
pub fn run_batch(config: &ConvertConfig) -> Result<BatchSummary, EngineError> {
    for dir in [&config.input_dir, &config.output_dir] {
        fs::create_dir_all(dir).map_err(|source| EngineError::PrepareDir {
            path: dir.clone(),
            source,
        })?;
    }
    let scratch = ScratchRoot::prepare(&config.scratch_dir)?;

    let archives = discover_archives(&config.input_dir, &config.archive_extension)?;
    let mut summary = BatchSummary {
        discovered: archives.len(),
        ..BatchSummary::default()
    };
    if archives.is_empty() {
        warn!(
            input = %config.input_dir.display(),
            extension = %config.archive_extension,
            "输入目录中没有找到压缩包，请将资源包放入该目录后重试"
        );
        return Ok(summary);
    }
    info!(count = archives.len(), "找到待转换的压缩包");

    for archive in archives {
        match process_archive(&archive, &scratch.path, config) {
            Ok(ArchiveOutcome::Converted(report)) => summary.converted.push(report),
            Ok(ArchiveOutcome::NoModels) => summary.skipped.push(archive),
            Err(err) => {
                error!(archive = %archive.display(), error = %err, "压缩包处理失败");
                summary.failed.push(archive);
            }
        }
    }

    drop(scratch);
    Ok(summary)
}

/// 列出目录下扩展名匹配的普通文件，按文件名排序。
pub fn discover_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, EngineError> {
    let read_dir = fs::read_dir(dir).map_err(|source| EngineError::Discover {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut archives = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| EngineError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext == extension);
        if matches && path.is_file() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(root: &Path) -> ConvertConfig {
        ConvertConfig {
            input_dir: root.join("import"),
            output_dir: root.join("export"),
            scratch_dir: root.join("temp_pack"),
            ..ConvertConfig::from(&AppConfig::default())
        }
    }

    #[test]
    fn output_name_uses_stem_and_suffix() {
        let config = config_in(Path::new("/work"));
        assert_eq!(
            config.output_path_for(Path::new("/work/import/My Pack.v2.zip")),
            PathBuf::from("/work/export/My Pack.v2_converted.zip")
        );
    }

    #[test]
    fn discovery_filters_by_extension_and_sorts() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        for name in ["b.zip", "a.zip", "notes.txt", "c.ZIP"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        fs::create_dir(dir.join("folder.zip")).unwrap();

        let found = discover_archives(dir, "zip").unwrap();
        assert_eq!(found, [dir.join("a.zip"), dir.join("b.zip")]);
    }

    #[test]
    fn empty_input_dir_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(config.scratch_dir.join("stale")).unwrap();

        let summary = run_batch(&config).unwrap();

        assert_eq!(summary.discovered, 0);
        assert!(summary.converted.is_empty());
        assert!(config.input_dir.is_dir());
        assert!(config.output_dir.is_dir());
        assert!(!config.scratch_dir.exists());
    }
}
