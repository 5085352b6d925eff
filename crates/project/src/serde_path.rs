//! Serde adapter storing paths as plain strings in JSON records.
//!
//! UTF-8 paths are written verbatim so records stay readable; anything else is
//! written as `b64:` followed by the base64 of the raw OS bytes.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serializer};

const B64_PREFIX: &str = "b64:";

pub fn serialize<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode(path))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    decode(&text).map_err(serde::de::Error::custom)
}

pub(crate) fn encode(path: &Path) -> String {
    match path.to_str() {
        Some(text) => text.to_string(),
        None => format!("{B64_PREFIX}{}", BASE64.encode(os_bytes(path))),
    }
}

pub(crate) fn decode(text: &str) -> Result<PathBuf, String> {
    match text.strip_prefix(B64_PREFIX) {
        Some(rest) => {
            let bytes = BASE64
                .decode(rest.as_bytes())
                .map_err(|err| format!("invalid base64 path payload: {err}"))?;
            from_os_bytes(bytes)
        }
        None => Ok(PathBuf::from(text)),
    }
}

#[cfg(unix)]
fn os_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn from_os_bytes(bytes: Vec<u8>) -> Result<PathBuf, String> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(windows)]
fn os_bytes(path: &Path) -> Vec<u8> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

#[cfg(windows)]
fn from_os_bytes(bytes: Vec<u8>) -> Result<PathBuf, String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    if bytes.len() % 2 != 0 {
        return Err("encoded Windows path has odd byte length".to_string());
    }
    let wide: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(PathBuf::from(OsString::from_wide(&wide)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_paths_stay_readable() {
        let path = Path::new("/packs/demo");
        assert_eq!(encode(path), "/packs/demo");
        assert_eq!(decode("/packs/demo").unwrap(), path);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_use_base64() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/packs/\xFFdemo"));
        let encoded = encode(path);
        assert!(encoded.starts_with(B64_PREFIX));
        assert_eq!(decode(&encoded).unwrap(), path);
    }

    #[test]
    fn garbage_base64_is_rejected() {
        assert!(decode("b64:!!!").is_err());
    }
}
