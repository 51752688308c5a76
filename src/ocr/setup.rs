use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::engine::TesseractEngine;
use crate::log;
use crate::paths::get_tessdata_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

/// Splits a `chi_sim+eng` style language list.
pub fn language_list(languages: &str) -> Vec<&str> {
    languages
        .split('+')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Locates tesseract and its language data, downloading missing
/// `.traineddata` files into the local data directory.
pub fn ensure_tesseract(executable: Option<&Path>, languages: &str) -> Result<TesseractEngine> {
    let executable = find_tesseract_executable(executable)?;

    let tessdata = match find_tessdata_dir(languages) {
        Ok(dir) => dir,
        Err(_) => {
            log("Language data not found locally, downloading...");
            let dir = get_tessdata_dir();
            download_missing_tessdata(&dir, languages)?;
            dir
        }
    };

    log(&format!(
        "Tesseract ready: {} (data: {}, languages: {})",
        executable.display(),
        tessdata.display(),
        languages
    ));

    Ok(TesseractEngine {
        executable,
        tessdata,
        languages: languages.to_string(),
    })
}

/// Finds the Tesseract executable: explicit path first, then PATH, then
/// common install locations.
pub fn find_tesseract_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Configured tesseract not found: {}",
            path.display()
        ));
    }

    // Check PATH
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// True if `dir` holds data for every requested language.
fn has_languages(dir: &Path, languages: &str) -> bool {
    let langs = language_list(languages);
    !langs.is_empty()
        && langs
            .iter()
            .all(|lang| dir.join(format!("{}.traineddata", lang)).exists())
}

/// Finds a tessdata directory holding every requested language.
pub fn find_tessdata_dir(languages: &str) -> Result<PathBuf> {
    let mut candidates = vec![get_tessdata_dir()];

    // TESSDATA_PREFIX may point at the data dir or its parent
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(&prefix));
        candidates.push(PathBuf::from(&prefix).join("tessdata"));
    }

    candidates.extend(COMMON_TESSDATA_DIRS.iter().map(PathBuf::from));

    candidates
        .into_iter()
        .find(|dir| has_languages(dir, languages))
        .ok_or_else(|| {
            anyhow!(
                "tessdata directory not found. Please ensure {} data is available.",
                languages
            )
        })
}

/// Downloads every missing `<lang>.traineddata` into `dir`.
fn download_missing_tessdata(dir: &Path, languages: &str) -> Result<()> {
    fs::create_dir_all(dir).context("Failed to create tessdata directory")?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    for lang in language_list(languages) {
        let path = dir.join(format!("{}.traineddata", lang));
        if path.exists() {
            continue;
        }

        let url = format!("{}/{}.traineddata", TESSDATA_REPO, lang);
        log(&format!("Downloading {}.traineddata...", lang));

        let response = client
            .get(&url)
            .header("User-Agent", "dlt-checker")
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Failed to download {}.traineddata: HTTP {}",
                lang,
                response.status()
            ));
        }

        let bytes = response.bytes()?;
        let mut file = fs::File::create(&path)?;
        file.write_all(&bytes)?;

        log(&format!(
            "Downloaded {}.traineddata ({} bytes)",
            lang,
            bytes.len()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_language_list() {
        assert_eq!(language_list("chi_sim+eng"), vec!["chi_sim", "eng"]);
        assert_eq!(language_list(" eng "), vec!["eng"]);
        assert!(language_list("").is_empty());
        assert!(language_list("+").is_empty());
    }

    #[test]
    fn test_has_languages() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("eng.traineddata"), b"x").unwrap();

        assert!(has_languages(dir.path(), "eng"));
        assert!(!has_languages(dir.path(), "chi_sim+eng"));
        assert!(!has_languages(dir.path(), ""));

        fs::write(dir.path().join("chi_sim.traineddata"), b"x").unwrap();
        assert!(has_languages(dir.path(), "chi_sim+eng"));
    }

    #[test]
    fn test_explicit_executable_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("tesseract");
        assert!(find_tesseract_executable(Some(&missing)).is_err());

        fs::write(&missing, b"").unwrap();
        assert_eq!(find_tesseract_executable(Some(&missing)).unwrap(), missing);
    }
}
