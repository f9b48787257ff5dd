// ==========================================
// 传感器日志导入系统 - 文件系统访问
// ==========================================
// 职责: 枚举设备目录与日志文件, 执行归档/隔离移动
// 约定: 每个设备目录直接存放日志文件, 另含 archive / problem
//       两个保留子目录; 枚举时绝不递归进入子目录
// 红线: 归档/隔离是同文件系统 rename, 绝不是复制
// ==========================================

use crate::domain::Directory;
use crate::importer::error::{ImportError, ImportResult};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

// ==========================================
// FileSystemAccess
// ==========================================
pub struct FileSystemAccess;

impl FileSystemAccess {
    /// 枚举基准目录下名称完整匹配给定模式的子目录
    ///
    /// # 参数
    /// - base: 数据根目录
    /// - pattern: 目录名模式（完整匹配, 不是子串匹配）
    pub fn list_directories(&self, base: &Path, pattern: &Regex) -> ImportResult<Vec<Directory>> {
        debug!(base = %base.display(), "开始枚举设备目录");

        let mut directories = Vec::new();
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if pattern.is_match(&name) {
                trace!(directory = %name, "收集设备目录");
                directories.push(Directory {
                    name,
                    abs_path: entry.path(),
                });
            }
        }

        // 目录顺序与平台无关, 便于测试与日志比对
        directories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(directories)
    }

    /// 枚举目录下名称完整匹配给定模式的普通文件
    ///
    /// archive / problem 等子目录天然被排除（只收集普通文件）
    pub fn list_files(&self, directory: &Directory, pattern: &Regex) -> ImportResult<Vec<String>> {
        debug!(directory = %directory.name, "开始收集日志文件");

        let mut files = Vec::new();
        for entry in fs::read_dir(&directory.abs_path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if pattern.is_match(&name) {
                trace!(file = %name, "收集日志文件");
                files.push(name);
            }
        }

        files.sort();
        Ok(files)
    }

    /// 将文件移入其所在目录下的保留子目录（archive 或 problem）
    ///
    /// 同文件系统 rename: 原子, 且对同一源路径重试是幂等的
    /// （第一次移动后源路径即不存在, 重试会报 FileMoveError）
    pub fn move_to_subfolder(
        &self,
        directory: &Directory,
        file_name: &str,
        subfolder: &str,
    ) -> ImportResult<()> {
        let from = directory.abs_path.join(file_name);
        let target_dir = directory.abs_path.join(subfolder);
        let to = target_dir.join(file_name);

        fs::create_dir_all(&target_dir)?;
        fs::rename(&from, &to).map_err(|e| ImportError::FileMoveError {
            from: from.display().to_string(),
            to: to.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(file = %file_name, subfolder = %subfolder, "文件移动完成");
        Ok(())
    }

    /// 将保留子目录中的文件全部移回父目录（reset 操作）
    ///
    /// # 返回
    /// - Ok(usize): 移回的文件数; 子目录不存在视为 0
    pub fn restore_from_subfolder(
        &self,
        directory: &Directory,
        subfolder: &str,
    ) -> ImportResult<usize> {
        let source_dir = directory.abs_path.join(subfolder);
        if !source_dir.is_dir() {
            return Ok(0);
        }

        let mut moved = 0;
        for entry in fs::read_dir(&source_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let from = entry.path();
            let to = directory.abs_path.join(entry.file_name());
            fs::rename(&from, &to).map_err(|e| ImportError::FileMoveError {
                from: from.display().to_string(),
                to: to.display().to_string(),
                message: e.to_string(),
            })?;
            moved += 1;
        }

        debug!(directory = %directory.name, subfolder = %subfolder, moved, "文件已移回父目录");
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::full_match_regex;

    fn make_dir(root: &Path, name: &str) -> Directory {
        let abs_path = root.join(name);
        fs::create_dir_all(&abs_path).unwrap();
        Directory {
            name: name.to_string(),
            abs_path,
        }
    }

    #[test]
    fn test_list_directories_full_match_only() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("123456789012345")).unwrap();
        fs::create_dir(temp.path().join("123456789012345-backup")).unwrap();
        fs::create_dir(temp.path().join("notes")).unwrap();
        fs::write(temp.path().join("123456789099999"), b"a file, not a dir").unwrap();

        let pattern = full_match_regex("[0-9]{15}").unwrap();
        let dirs = FileSystemAccess
            .list_directories(temp.path(), &pattern)
            .unwrap();

        // 完整匹配: 带后缀的目录名与普通文件都不入选
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].name, "123456789012345");
    }

    #[test]
    fn test_list_files_skips_subfolders() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_dir(temp.path(), "123456789012345");
        fs::write(dir.abs_path.join("log1.csv"), b"x").unwrap();
        fs::write(dir.abs_path.join("log2.csv"), b"x").unwrap();
        fs::write(dir.abs_path.join("readme.txt"), b"x").unwrap();
        fs::create_dir(dir.abs_path.join("archive")).unwrap();
        fs::write(dir.abs_path.join("archive").join("old.csv"), b"x").unwrap();

        let pattern = full_match_regex(r".+\.csv").unwrap();
        let files = FileSystemAccess.list_files(&dir, &pattern).unwrap();

        assert_eq!(files, vec!["log1.csv".to_string(), "log2.csv".to_string()]);
    }

    #[test]
    fn test_move_to_subfolder_removes_source_path() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_dir(temp.path(), "123456789012345");
        let source = dir.abs_path.join("log1.csv");
        fs::write(&source, b"x").unwrap();

        FileSystemAccess
            .move_to_subfolder(&dir, "log1.csv", "archive")
            .unwrap();

        // 移动后源路径不再存在; 按同一源路径重试必然失败
        assert!(!source.exists());
        assert!(dir.abs_path.join("archive").join("log1.csv").exists());
        let err = FileSystemAccess
            .move_to_subfolder(&dir, "log1.csv", "archive")
            .unwrap_err();
        assert!(matches!(err, ImportError::FileMoveError { .. }));
    }

    #[test]
    fn test_restore_from_subfolder_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_dir(temp.path(), "123456789012345");
        fs::write(dir.abs_path.join("log1.csv"), b"x").unwrap();
        FileSystemAccess
            .move_to_subfolder(&dir, "log1.csv", "problem")
            .unwrap();

        let moved = FileSystemAccess
            .restore_from_subfolder(&dir, "problem")
            .unwrap();

        assert_eq!(moved, 1);
        assert!(dir.abs_path.join("log1.csv").exists());
        assert!(!dir.abs_path.join("problem").join("log1.csv").exists());

        // 子目录缺失视为无事可做
        assert_eq!(
            FileSystemAccess
                .restore_from_subfolder(&dir, "archive")
                .unwrap(),
            0
        );
    }
}
