use crate::shared::config::AppConfig;
use crate::shared::errors::{AppError, AppResult};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Component, Path, PathBuf};

/// 内容判定のために読み込む先頭バイト数
pub const SNIFF_LEN: u64 = 512;

/// 形式を判定できなかった場合のContent-Type
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// 領収書として受け付ける画像形式
pub const ACCEPTED_RECEIPT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// 先頭バイトからContent-Typeを判定する
pub fn sniff_content_type(header: &[u8]) -> &'static str {
    image::guess_format(header)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

/// 領収書ファイルの検査
///
/// 領収書ディレクトリは起動時の設定から注入する。
#[derive(Debug, Clone)]
pub struct ReceiptInspector {
    receipts_dir: PathBuf,
}

impl ReceiptInspector {
    pub fn new(receipts_dir: impl Into<PathBuf>) -> Self {
        Self {
            receipts_dir: receipts_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.receipts_dir.clone())
    }

    pub fn receipts_dir(&self) -> &Path {
        &self.receipts_dir
    }

    /// 相対パスを領収書ディレクトリ配下の絶対パスに解決する
    ///
    /// 絶対パスや `..` を含むパスは拒否する。
    pub fn resolve(&self, relative_path: &str) -> AppResult<PathBuf> {
        if relative_path.is_empty() {
            return Err(reject("領収書のパスが空です".to_string()));
        }

        let path = Path::new(relative_path);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(reject(format!(
                "領収書のパスは領収書ディレクトリからの相対パスで指定してください: {relative_path}"
            )));
        }

        Ok(self.receipts_dir.join(path))
    }

    /// 領収書ファイルが存在し、読み込み可能で、画像として認識できることを確認する
    ///
    /// # 戻り値
    /// 判定されたContent-Type、または失敗時はValidationエラー
    pub fn check_receipt(&self, relative_path: &str) -> AppResult<&'static str> {
        let full_path = self.resolve(relative_path)?;

        let file = File::open(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => reject(format!("領収書ファイルが存在しません: {relative_path}")),
            _ => reject(format!(
                "領収書ファイルを開けません: {relative_path}: {e}"
            )),
        })?;

        let mut header = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN)
            .read_to_end(&mut header)
            .map_err(|e| reject(format!("領収書ファイルを読み込めません: {relative_path}: {e}")))?;

        let content_type = sniff_content_type(&header);
        if !ACCEPTED_RECEIPT_TYPES.contains(&content_type) {
            return Err(reject(format!(
                "領収書の形式が不正です: {relative_path}: {content_type}"
            )));
        }

        log::debug!("領収書を確認しました: {relative_path} ({content_type})");
        Ok(content_type)
    }
}

fn reject(message: String) -> AppError {
    log::warn!("{message}");
    AppError::validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    fn inspector_with(files: &[(&str, &[u8])]) -> (TempDir, ReceiptInspector) {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            let path = temp_dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let inspector = ReceiptInspector::new(temp_dir.path());
        (temp_dir, inspector)
    }

    #[test]
    fn test_sniff_content_type() {
        assert_eq!(sniff_content_type(PNG_HEADER), "image/png");
        assert_eq!(sniff_content_type(JPEG_HEADER), "image/jpeg");
        assert_eq!(sniff_content_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(sniff_content_type(b"%PDF-1.7"), UNKNOWN_CONTENT_TYPE);
        assert_eq!(sniff_content_type(&[]), UNKNOWN_CONTENT_TYPE);
    }

    #[test]
    fn test_accepts_images() {
        let (_dir, inspector) = inspector_with(&[
            ("2024/lunch.png", PNG_HEADER),
            ("taxi.jpg", JPEG_HEADER),
        ]);
        assert_eq!(inspector.check_receipt("2024/lunch.png").unwrap(), "image/png");
        assert_eq!(inspector.check_receipt("taxi.jpg").unwrap(), "image/jpeg");
    }

    #[test]
    fn test_rejects_missing_and_non_image_files() {
        let (_dir, inspector) = inspector_with(&[("notes.txt", &b"just some text"[..])]);

        let missing = inspector.check_receipt("nope.png").unwrap_err();
        assert!(matches!(missing, AppError::Validation(_)));

        let text = inspector.check_receipt("notes.txt").unwrap_err();
        assert!(text.user_message().contains("notes.txt"));
    }

    #[test]
    fn test_rejects_paths_outside_receipts_dir() {
        let (_dir, inspector) = inspector_with(&[]);
        assert!(inspector.resolve("../secret.png").is_err());
        assert!(inspector.resolve("a/../../secret.png").is_err());
        assert!(inspector.resolve("/etc/passwd").is_err());
        assert!(inspector.resolve("").is_err());
        assert_eq!(
            inspector.resolve("./2024/a.png").unwrap(),
            inspector.receipts_dir().join("./2024/a.png")
        );
    }

    #[test]
    fn test_directory_is_not_a_receipt() {
        let (dir, inspector) = inspector_with(&[]);
        fs::create_dir(dir.path().join("folder")).unwrap();
        assert!(inspector.check_receipt("folder").is_err());
    }
}
