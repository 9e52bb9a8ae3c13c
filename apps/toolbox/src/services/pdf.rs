//! Merge, split and compress PDF documents with `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;
use tracing::debug;

use super::archive::{self, ArchiveError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("`{name}` is not a readable PDF: {source}")]
    Load {
        name: String,
        #[source]
        source: lopdf::Error,
    },
    #[error("`{0}` has no pages")]
    NoPages(String),
    #[error("select at least {0} PDF file(s)")]
    NotEnoughFiles(usize),
    #[error("document structure is broken: {0}")]
    Structure(&'static str),
    #[error("failed to write PDF: {0}")]
    Save(#[from] std::io::Error),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// An uploaded file in the merge/split list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
}

impl PdfFile {
    pub fn inspect(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PdfError> {
        let name = name.into();
        let pages = page_count(&name, &bytes)?;
        Ok(Self { name, bytes, pages })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionReport {
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressionReport {
    /// Negative when the output grew.
    pub fn saved_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }
}

fn load(name: &str, bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(bytes).map_err(|source| PdfError::Load {
        name: name.to_string(),
        source,
    })
}

fn save(document: &mut Document) -> Result<Vec<u8>, PdfError> {
    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

fn type_is(object: &Object, expected: &[u8]) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == expected)
}

pub fn page_count(name: &str, bytes: &[u8]) -> Result<usize, PdfError> {
    Ok(load(name, bytes)?.get_pages().len())
}

/// Copies inherited attributes onto each page so pages survive being
/// re-parented under a new page tree.
fn flatten_inherited(document: &mut Document) {
    let mut updates: Vec<(ObjectId, Vec<(Vec<u8>, Object)>)> = Vec::new();
    for page_id in document.get_pages().into_values() {
        let Ok(page) = document.get_dictionary(page_id) else {
            continue;
        };
        let missing: Vec<&[u8]> = INHERITABLE
            .into_iter()
            .filter(|key| !page.has(key))
            .collect();
        let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut hops = 0;
        while let Some(parent_id) = parent {
            let Ok(node) = document.get_dictionary(parent_id) else {
                break;
            };
            for key in &missing {
                let already = found.iter().any(|(name, _)| name.as_slice() == *key);
                if let (false, Ok(value)) = (already, node.get(key)) {
                    found.push((key.to_vec(), value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            hops += 1;
            if hops > 64 {
                break;
            }
        }
        if !found.is_empty() {
            updates.push((page_id, found));
        }
    }
    for (page_id, values) in updates {
        if let Ok(page) = document.get_dictionary_mut(page_id) {
            for (key, value) in values {
                page.set(key, value);
            }
        }
    }
}

/// Appends every page of each input, in order, into one document.
pub fn merge(files: &[PdfFile]) -> Result<Vec<u8>, PdfError> {
    if files.len() < 2 {
        return Err(PdfError::NotEnoughFiles(2));
    }

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for file in files {
        let mut document = load(&file.name, &file.bytes)?;
        flatten_inherited(&mut document);
        document.renumber_objects_with(max_id);
        max_id = document.max_id + 1;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfError::NoPages(file.name.clone()));
        }
        for page_id in page_ids {
            if let Ok(page) = document.get_object(page_id) {
                pages.push((page_id, page.clone()));
            }
        }
        objects.extend(document.objects);
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut pages_root: Option<(ObjectId, Dictionary)> = None;

    for (id, object) in objects {
        if type_is(&object, b"Catalog") {
            if catalog.is_none() {
                catalog = object.as_dict().ok().map(|dict| (id, dict.clone()));
            }
        } else if type_is(&object, b"Pages") {
            if pages_root.is_none() {
                pages_root = object.as_dict().ok().map(|dict| (id, dict.clone()));
            }
        } else if !(type_is(&object, b"Page")
            || type_is(&object, b"Outlines")
            || type_is(&object, b"Outline"))
        {
            merged.objects.insert(id, object);
        }
    }

    let (catalog_id, mut catalog) = catalog.ok_or(PdfError::Structure("missing catalog"))?;
    let (pages_id, mut pages_dict) = pages_root.ok_or(PdfError::Structure("missing page tree"))?;

    for (page_id, page) in &pages {
        if let Ok(dict) = page.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            merged.objects.insert(*page_id, Object::Dictionary(dict));
        }
    }

    pages_dict.remove(b"Parent");
    pages_dict.set("Count", pages.len() as i64);
    pages_dict.set(
        "Kids",
        pages
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    catalog.set("Pages", pages_id);
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", catalog_id);

    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.adjust_zero_pages();
    merged.compress();

    debug!(files = files.len(), pages = pages.len(), "merged pdf documents");
    save(&mut merged)
}

/// One single-page document per page, named `<stem>-page-<n>.pdf`.
pub fn split(file: &PdfFile) -> Result<Vec<(String, Vec<u8>)>, PdfError> {
    let document = load(&file.name, &file.bytes)?;
    let numbers: Vec<u32> = document.get_pages().into_keys().collect();
    if numbers.is_empty() {
        return Err(PdfError::NoPages(file.name.clone()));
    }
    let stem = file
        .name
        .strip_suffix(".pdf")
        .or_else(|| file.name.strip_suffix(".PDF"))
        .unwrap_or(&file.name);

    numbers
        .iter()
        .map(|keep| {
            let mut single = document.clone();
            let others: Vec<u32> = numbers.iter().copied().filter(|n| n != keep).collect();
            single.delete_pages(&others);
            single.prune_objects();
            single.compress();
            Ok((format!("{stem}-page-{keep}.pdf"), save(&mut single)?))
        })
        .collect()
}

pub fn split_to_zip(file: &PdfFile) -> Result<Vec<u8>, PdfError> {
    let parts = split(file)?;
    Ok(archive::zip_files(
        parts
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
    )?)
}

/// Prunes unreferenced objects, drops empty streams and deflates the rest.
pub fn compress(file: &PdfFile) -> Result<(Vec<u8>, CompressionReport), PdfError> {
    let mut document = load(&file.name, &file.bytes)?;
    document.prune_objects();
    document.delete_zero_length_streams();
    document.compress();
    let bytes = save(&mut document)?;
    let report = CompressionReport {
        original_size: file.bytes.len(),
        compressed_size: bytes.len(),
    };
    Ok((bytes, report))
}

/// Moves `items[index]` by `delta` places; returns whether anything moved.
pub fn move_entry<T>(items: &mut [T], index: usize, delta: isize) -> bool {
    let Some(target) = index.checked_add_signed(delta) else {
        return false;
    };
    if index >= items.len() || target >= items.len() || target == index {
        return false;
    }
    if target < index {
        items[target..=index].rotate_right(1);
    } else {
        items[index..=target].rotate_left(1);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn sample(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let kids: Vec<Object> = (0..pages)
            .map(|index| {
                let text = format!("BT /F1 24 Tf 72 720 Td (Page {index}) Tj ET");
                let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();
        doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn file(name: &str, pages: usize) -> PdfFile {
        PdfFile::inspect(name, sample(pages)).unwrap()
    }

    #[test]
    fn inspect_counts_pages() {
        assert_eq!(file("a.pdf", 3).pages, 3);
        assert!(matches!(
            PdfFile::inspect("bad.pdf", b"%PDF-garbage".to_vec()),
            Err(PdfError::Load { .. })
        ));
    }

    #[test]
    fn merge_keeps_all_pages_in_order() {
        let merged = merge(&[file("a.pdf", 2), file("b.pdf", 3)]).unwrap();
        let document = Document::load_mem(&merged).unwrap();
        let pages = document.get_pages();
        assert_eq!(pages.len(), 5);

        for page_id in pages.values() {
            let page = document.get_dictionary(*page_id).unwrap();
            assert!(page.has(b"MediaBox"), "inherited MediaBox was lost");
        }
    }

    #[test]
    fn merge_needs_two_files() {
        assert!(matches!(
            merge(&[file("a.pdf", 1)]),
            Err(PdfError::NotEnoughFiles(2))
        ));
    }

    #[test]
    fn split_yields_one_document_per_page() {
        let parts = split(&file("report.pdf", 3)).unwrap();
        let names: Vec<&str> = parts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            ["report-page-1.pdf", "report-page-2.pdf", "report-page-3.pdf"]
        );
        for (_, bytes) in &parts {
            assert_eq!(Document::load_mem(bytes).unwrap().get_pages().len(), 1);
        }
        assert!(split_to_zip(&file("report.pdf", 2)).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn compress_reports_sizes() {
        let input = file("big.pdf", 4);
        let (bytes, report) = compress(&input).unwrap();
        assert_eq!(report.original_size, input.bytes.len());
        assert_eq!(report.compressed_size, bytes.len());
        assert_eq!(page_count("out.pdf", &bytes).unwrap(), 4);
    }

    #[test]
    fn move_entry_reorders() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_entry(&mut items, 3, -2));
        assert_eq!(items, ['a', 'd', 'b', 'c']);
        assert!(move_entry(&mut items, 0, 1));
        assert_eq!(items, ['d', 'a', 'b', 'c']);
        assert!(!move_entry(&mut items, 0, -1));
        assert!(!move_entry(&mut items, 3, 1));
    }
}
