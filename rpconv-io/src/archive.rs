use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Component, Path};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::IoError;

/// 将整个压缩包逐条解压到 `dest`，返回条目数量。
///
/// 条目中记录的 Unix 权限不会被还原，解压出的文件总是可写。
/// 任一条目路径指向 `dest` 之外时整体失败。
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize, IoError> {
    let file = File::open(archive).map_err(|source| IoError::ReadError {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|source| IoError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| IoError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(IoError::UnsafeEntry {
                archive: archive.to_path_buf(),
                entry: entry.name().to_string(),
            });
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            create_dir(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }
        let mut output = File::create(&target).map_err(|source| IoError::WriteError {
            path: target.clone(),
            source,
        })?;
        io::copy(&mut entry, &mut output).map_err(|source| IoError::WriteError {
            path: target.clone(),
            source,
        })?;
    }
    Ok(zip.len())
}

fn create_dir(dir: &Path) -> Result<(), IoError> {
    fs::create_dir_all(dir).map_err(|source| IoError::WriteError {
        path: dir.to_path_buf(),
        source,
    })
}

/// 把 `source_dir` 下的所有普通文件按相对路径写入新的 Deflate 压缩包，返回写入的文件数。
///
/// 只写文件条目，不生成目录条目；遍历按文件名排序以保证输出稳定。
pub fn write_archive(source_dir: &Path, output: &Path) -> Result<usize, IoError> {
    let file = File::create(output).map_err(|source| IoError::WriteError {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| IoError::Walk {
            path: source_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = entry_name(path.strip_prefix(source_dir).unwrap_or(path));
        writer
            .start_file(name, options)
            .map_err(|source| IoError::Archive {
                path: output.to_path_buf(),
                source,
            })?;
        let mut input = File::open(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        io::copy(&mut input, &mut writer).map_err(|source| IoError::WriteError {
            path: output.to_path_buf(),
            source,
        })?;
        written += 1;
    }

    writer.finish().map_err(|source| IoError::Archive {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(written)
}

/// zip 条目名统一使用 `/` 分隔。
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 删除目录（若存在）后重新创建。
pub fn reset_dir(dir: &Path) -> Result<(), IoError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|source| IoError::WriteError {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    create_dir(dir)
}
