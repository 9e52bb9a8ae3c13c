use std::collections::HashSet;
use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("nothing to archive")]
    Empty,
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Packs named byte blobs into a deflated zip. Duplicate names get a
/// numeric suffix before the extension.
pub fn zip_files<'a, I>(entries: I) -> Result<Vec<u8>, ArchiveError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();
    let mut count = 0usize;

    for (name, bytes) in entries {
        let unique = unique_name(name, &mut used);
        writer.start_file(unique, options)?;
        writer.write_all(bytes)?;
        count += 1;
    }

    if count == 0 {
        return Err(ArchiveError::Empty);
    }

    Ok(writer.finish()?.into_inner())
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };
    let mut index = 1;
    loop {
        let candidate = match extension {
            Some(extension) => format!("{stem} ({index}).{extension}"),
            None => format!("{stem} ({index})"),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn archives_every_entry_with_unique_names() {
        let bytes = zip_files([
            ("a.png", b"one".as_slice()),
            ("a.png", b"two".as_slice()),
            ("b", b"three".as_slice()),
        ])
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"a (1).png".to_string()));

        let mut content = String::new();
        archive
            .by_name("a (1).png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "two");
    }

    #[test]
    fn empty_input_is_rejected() {
        let entries: Vec<(&str, &[u8])> = Vec::new();
        assert!(matches!(zip_files(entries), Err(ArchiveError::Empty)));
    }
}
