//! Security Module
//!
//! アップロードされたアーカイブ（XLSX/ODS）をcalamineに渡す前の検査を提供します。
//! ZIP bomb攻撃、パストラバーサル攻撃への対策です。

use std::io::Cursor;

use zip::ZipArchive;

use crate::error::QuizSheetError;

/// セキュリティ設定
///
/// アーカイブ展開時の制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// アーカイブ内の単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_entry_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_entry_size: 104_857_600, // 100MB
        }
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、アーカイブ内のファイルパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

/// ZIPアーカイブの事前検査
///
/// エントリ数、各エントリのパスと展開後サイズ、展開後サイズの累計を検査します。
/// 中身は展開しません（セントラルディレクトリのみ参照）。
pub(crate) fn inspect_archive(data: &[u8], config: &SecurityConfig) -> Result<(), QuizSheetError> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| QuizSheetError::Zip(format!("{}", e)))?;

    if archive.len() > config.max_file_count {
        return Err(QuizSheetError::SecurityViolation(format!(
            "ZIP archive contains too many files: {} (max: {})",
            archive.len(),
            config.max_file_count
        )));
    }

    let mut total_decompressed_size = 0u64;
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| QuizSheetError::Zip(format!("{}", e)))?;

        let file_name = file.name();
        validate_zip_path(file_name)
            .map_err(|e| QuizSheetError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

        let file_size = file.size();
        if file_size > config.max_entry_size {
            return Err(QuizSheetError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                file_name, file_size, config.max_entry_size
            )));
        }

        total_decompressed_size = total_decompressed_size.checked_add(file_size).ok_or_else(|| {
            QuizSheetError::SecurityViolation(
                "Total decompressed size calculation overflow".to_string(),
            )
        })?;

        if total_decompressed_size > config.max_decompressed_size {
            return Err(QuizSheetError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total_decompressed_size, config.max_decompressed_size
            )));
        }
    }

    Ok(())
}
