use crate::error::{AppError, AppResult, FileError};
use crate::models::settings::ProviderSettings;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载 provider 设置
///
/// 文件不存在时返回默认设置（没有任何 API key），由调用方在真正发请求前报错。
pub async fn load_settings(settings_path: &Path) -> AppResult<ProviderSettings> {
    if !fs::try_exists(settings_path).await.unwrap_or(false) {
        tracing::warn!(
            "⚠️ 设置文件不存在: {}，使用默认设置",
            settings_path.display()
        );
        return Ok(ProviderSettings::default());
    }

    let content = fs::read_to_string(settings_path)
        .await
        .map_err(|e| AppError::file_read_failed(settings_path.display().to_string(), e))?;

    let settings: ProviderSettings = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
        path: settings_path.display().to_string(),
        source: e,
    })?;

    tracing::debug!(
        "已加载设置: {} 个 API key",
        settings.api_keys.len()
    );

    Ok(settings)
}

/// 扫描文件夹中的所有 PDF 文件，按文件名排序
pub async fn list_pdf_files(folder_path: &str) -> AppResult<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !fs::try_exists(&folder).await.unwrap_or(false) {
        return Err(FileError::NotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut pdfs = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?
    {
        let path = entry.path();
        if is_pdf(&path) {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// 是否为 PDF 文件（按扩展名，忽略大小写）
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    #[tokio::test]
    async fn test_load_settings_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragrace.toml");
        std::fs::write(
            &path,
            r#"
[api_keys]
reducto = "sk-test"

[reducto]
mode = "complex"
"#,
        )
        .unwrap();

        let settings = load_settings(&path).await.unwrap();
        assert_eq!(settings.api_key(Provider::Reducto).unwrap(), "sk-test");
        assert_eq!(settings.reducto.mode, "complex");
        assert!(!settings.reducto.summarize_figures);
        assert_eq!(settings.landingai.model, "dpt-2");
    }

    #[tokio::test]
    async fn test_missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("missing.toml")).await.unwrap();
        assert!(settings.api_keys.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "api_keys = [").unwrap();
        let err = load_settings(&path).await.unwrap_err();
        assert!(matches!(err, AppError::File(FileError::TomlParseFailed { .. })));
    }

    #[tokio::test]
    async fn test_list_pdf_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pdfs = list_pdf_files(dir.path().to_str().unwrap()).await.unwrap();
        let names: Vec<_> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }
}
