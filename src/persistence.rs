// File: src/persistence.rs
use crate::core::vocabulary::{Vocabulary, VocabularyRecord};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const IDS_EXTENSION: &str = "ids";
pub const NETWORK_EXTENSION: &str = "net";
/// Temp files start out owner-only; saved artifacts are world-readable.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// `words.txt` -> `words.ids`
pub fn ids_path(corpus: &Path) -> PathBuf {
    corpus.with_extension(IDS_EXTENSION)
}

/// `words.txt` -> `words.net`
pub fn network_path(corpus: &Path) -> PathBuf {
    corpus.with_extension(NETWORK_EXTENSION)
}

/// Writes through a temp file in the target directory and renames it into
/// place, so a crash never leaves a half-written artifact behind.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file.as_file().set_permissions(fs::Permissions::from_mode(ARTIFACT_MODE))?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn save_bincode<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    write_atomic(path, |writer| Ok(bincode::serialize_into(writer, value)?))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

pub fn load_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Pretty-printed, key-ordered JSON record of the three id mappings.
pub fn save_vocabulary(vocab: &Vocabulary, path: &Path) -> Result<()> {
    let record = vocab.to_record();
    write_atomic(path, |writer| {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        record.serialize(&mut ser)?;
        writeln!(writer)?;
        Ok(())
    })?;
    tracing::debug!("Wrote id mapping to {}", path.display());
    Ok(())
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    let reader = BufReader::new(File::open(path)?);
    let record: VocabularyRecord = serde_json::from_reader(reader)?;
    Vocabulary::from_record(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_paths() {
        let corpus = Path::new("data/words.txt");
        assert_eq!(ids_path(corpus), PathBuf::from("data/words.ids"));
        assert_eq!(network_path(corpus), PathBuf::from("data/words.net"));
        assert_eq!(ids_path(Path::new("dict")), PathBuf::from("dict.ids"));
    }

    #[test]
    fn test_vocabulary_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.ids");
        let vocab = Vocabulary::from_corpus("cat act tac dog").unwrap();
        save_vocabulary(&vocab, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["word_to_id"]["dog"], 2);
        assert_eq!(json["id_to_word"]["2"], "dog");
        assert_eq!(json["char_to_id"][" "], 0);
        assert!(text.contains("\n    \"word_to_id\""));

        assert_eq!(load_vocabulary(&path).unwrap(), vocab);
    }

    #[cfg(unix)]
    #[test]
    fn test_artifacts_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let ids = dir.path().join("words.ids");
        let net = dir.path().join("words.net");
        save_vocabulary(&Vocabulary::from_corpus("cat dog").unwrap(), &ids).unwrap();
        save_bincode(&vec![1.0f32, 2.0], &net).unwrap();

        for path in [ids, net] {
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, ARTIFACT_MODE, "{}", path.display());
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_vocabulary(&dir.path().join("nope.ids")).unwrap_err();
        assert!(matches!(err, crate::error::SpellerError::Io(_)));
    }
}
