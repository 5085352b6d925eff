use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::indentation::{detect_indentation, Indentation};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 表示文件目前使用的行尾樣式。 / Represents the current line ending style for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// 回傳序列化文字時使用的行尾字串。 / Returns the literal string representation used when serialising text.
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// 狀態列顯示用的標籤。 / Label shown in the status bar.
    pub fn label(self) -> &'static str {
        match self {
            LineEnding::Lf => "LF",
            LineEnding::CrLf => "CRLF",
        }
    }
}

/// 文件載入或儲存時可能發生的錯誤。 / Errors that can occur while loading or saving a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not valid UTF-8 text")]
    InvalidEncoding(PathBuf),
}

impl DocumentError {
    /// 底層 I/O 錯誤種類（若有）。 / Underlying I/O error kind, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            DocumentError::Io { source, .. } => Some(source.kind()),
            DocumentError::InvalidEncoding(_) => None,
        }
    }
}

/// 綁定單一檔案的 UTF-8 文字緩衝區。 / UTF-8 text buffer bound to a single file on disk.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    contents: String,
    line_ending: LineEnding,
    indentation: Indentation,
    has_bom: bool,
    is_dirty: bool,
}

impl Document {
    /// 從磁碟載入文件並將行尾內部正規化為 `\n`。 / Loads a document from disk, normalising newlines to `\n` internally.
    pub fn open(
        path: impl AsRef<Path>,
        default_indentation: Indentation,
    ) -> Result<Self, DocumentError> {
        let path = path.as_ref().to_path_buf();
        let mut bytes = Vec::new();
        File::open(&path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(|source| DocumentError::Io {
                path: path.clone(),
                source,
            })?;

        let has_bom = bytes.starts_with(UTF8_BOM);
        if has_bom {
            bytes.drain(..UTF8_BOM.len());
        }
        let text = String::from_utf8(bytes)
            .map_err(|_| DocumentError::InvalidEncoding(path.clone()))?;
        let line_ending = detect_line_ending(&text);
        let indentation = detect_indentation(&text, default_indentation);
        tracing::debug!(
            path = %path.display(),
            line_ending = line_ending.label(),
            %indentation,
            "document loaded"
        );

        Ok(Self {
            path,
            contents: normalize_newlines(&text),
            line_ending,
            indentation,
            has_bom,
            is_dirty: false,
        })
    }

    /// 將整個緩衝區寫回檔案，無條件覆寫。 / Writes the whole buffer back to its file, unconditionally overwriting it.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let encoded = self.serialise_contents();

        // 先寫入暫存檔再重新命名，避免出現部分寫入的情況。 / Temporary file plus rename so readers never see a partial write.
        let tmp_path = temp_path_for(&self.path);
        let write = || -> io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(&encoded)?;
            tmp_file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };
        write().map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            DocumentError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        self.is_dirty = false;
        tracing::info!(path = %self.path.display(), bytes = encoded.len(), "document saved");
        Ok(())
    }

    /// 取得目前文件內容（行尾已正規化為 `\n`）。 / Returns the current contents, normalised to `\n` line endings.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// 以新文字取代記憶體內容；回傳此次是否由未修改轉為已修改。 / Replaces the buffer and returns `true` only when this call turned a clean document dirty.
    pub fn set_contents(&mut self, text: impl Into<String>) -> bool {
        self.contents = normalize_newlines(&text.into());
        let became_dirty = !self.is_dirty;
        self.is_dirty = true;
        became_dirty
    }

    /// 取得目前行尾設定。 / Returns the current line ending preference.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// 取得推測的縮排樣式。 / Returns the detected indentation.
    pub fn indentation(&self) -> Indentation {
        self.indentation
    }

    /// 指出儲存時是否包含 UTF-8 BOM。 / Whether the document carries a UTF-8 BOM when saved.
    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    /// 判斷文件是否仍有未儲存變更。 / Returns whether the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// 取得文件所屬的檔案路徑。 / Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn serialise_contents(&self) -> Vec<u8> {
        let text = self.contents.replace('\n', self.line_ending.as_str());
        if self.has_bom {
            let mut prefixed = Vec::with_capacity(UTF8_BOM.len() + text.len());
            prefixed.extend_from_slice(UTF8_BOM);
            prefixed.extend_from_slice(text.as_bytes());
            prefixed
        } else {
            text.into_bytes()
        }
    }
}

/// 只要文字中出現 `\r\n` 即視為 CRLF。 / Any `\r\n` in the text selects CRLF, otherwise LF.
fn detect_line_ending(text: &str) -> LineEnding {
    if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Sibling path used while saving: the full file name plus a fixed suffix.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".rpide-tmp");
    path.with_file_name(name)
}
