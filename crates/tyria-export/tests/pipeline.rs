//! End-to-end extraction tests: build an archive, scan it, extract it.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use tyria_common::CancelFlag;
use tyria_dat::{Compression, DatBuilder, FileType};
use tyria_export::{
    ExportError, Exporter, ExporterRegistry, ExtractError, ExtractOptions, Extractor,
    FailurePolicy,
};
use tyria_index::{Index, Scanner};

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn dll_bytes() -> Vec<u8> {
    let mut data = vec![0u8; 0x100];
    data[..2].copy_from_slice(b"MZ");
    data[0x3c..0x40].copy_from_slice(&0x80u32.to_le_bytes());
    data[0x80..0x84].copy_from_slice(b"PE\0\0");
    data[0x80 + 22..0x80 + 24].copy_from_slice(&0x2102u16.to_le_bytes());
    data
}

fn packed_ogg() -> Vec<u8> {
    let mut data = b"PF\x05\x00\x01\x00\x0c\x00ASND".to_vec();
    data.extend_from_slice(&[0u8; 80]);
    data.extend_from_slice(b"OggS\x00\x02vorbis");
    data
}

const ATEX: &[u8] = b"ATEX\x00\x01\x00\x00proprietary texture";
const MODEL: &[u8] = b"PF\x05\x00\x01\x00\x0c\x00MODL geometry";

fn fixture() -> DatBuilder {
    let mut builder = DatBuilder::new();
    builder
        .add_file(10, ATEX, Compression::Zstd)
        .add_file(11, &png_bytes(), Compression::Store)
        .add_file(12, b"\xEF\xBB\xBFreadme", Compression::Deflate)
        .add_file(13, &dll_bytes(), Compression::Zstd)
        .add_file(14, MODEL, Compression::Store)
        .add_file(15, &packed_ogg(), Compression::Store)
        .add_file(16, b"\x00\x13\x37\x00 opaque", Compression::Store);
    for id in 100..140 {
        builder.add_file(id, format!("text file {}\n", id).as_bytes(), Compression::Zstd);
    }
    builder
}

fn write_archive(builder: &DatBuilder, dir: &Path) -> PathBuf {
    let path = dir.join("test.dat");
    builder.write_to(&path).unwrap();
    path
}

fn scan(path: &Path) -> Index {
    let mut scanner = Scanner::new(path);
    scanner.run(&CancelFlag::new()).unwrap();
    scanner.into_index()
}

/// Relative path -> contents of every file below `root`.
fn tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap();
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (key, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

fn options(workers: usize, policy: FailurePolicy) -> ExtractOptions {
    ExtractOptions { workers, policy }
}

#[test]
fn test_every_entry_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&fixture(), dir.path());
    let index = scan(&archive);
    let out = dir.path().join("out");

    let registry = ExporterRegistry::with_defaults();
    let extractor = Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(4, FailurePolicy::FailFast));
    let progress = extractor.progress();
    let report = extractor.run(index.root()).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.total, index.entry_count());
    assert_eq!(progress.completed(), report.total);

    let files = tree(&out);
    assert_eq!(files.len(), index.entry_count());
    for (_, entry) in index.entries() {
        let name = entry.name();
        let matches = files
            .keys()
            .filter(|k| Path::new(k.as_str()).file_stem().unwrap() == name)
            .count();
        assert_eq!(matches, 1, "entry {}", name);
    }
}

#[test]
fn test_conversion_and_raw_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&fixture(), dir.path());
    let index = scan(&archive);
    let out = dir.path().join("out");

    let registry = ExporterRegistry::with_defaults();
    Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(2, FailurePolicy::FailFast))
        .run(index.root())
        .unwrap();
    let files = tree(&out);

    // no exporter can decode ATEX: raw, byte-identical
    assert_eq!(files["Textures/Generic Textures/10.raw"], ATEX);
    assert!(files["Textures/PNG/11.png"].starts_with(b"\x89PNG"));
    assert_eq!(files["Text/12.txt"], b"readme");
    assert_eq!(files["Binaries/13.dll"], dll_bytes());
    assert_eq!(files["Models/14.raw"], MODEL);
    assert_eq!(files["Sounds/15.ogg"], b"OggS\x00\x02vorbis");
    assert_eq!(files["Unknown/16.raw"], b"\x00\x13\x37\x00 opaque");
    assert_eq!(files["Text/100.txt"], b"text file 100\n");
}

#[test]
fn test_worker_count_does_not_change_output() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&fixture(), dir.path());
    let index = scan(&archive);
    let registry = ExporterRegistry::with_defaults();

    let trees: Vec<_> = [1, 2, 8]
        .into_iter()
        .map(|workers| {
            let out = dir.path().join(format!("out-{}", workers));
            let report = Extractor::new(&index, &archive, &out, &registry)
                .with_options(options(workers, FailurePolicy::FailFast))
                .run(index.root())
                .unwrap();
            assert!(report.is_complete());
            tree(&out)
        })
        .collect();

    assert_eq!(trees[0], trees[1]);
    assert_eq!(trees[0], trees[2]);
}

#[test]
fn test_category_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&fixture(), dir.path());
    let index = scan(&archive);
    let out = dir.path().join("out");
    let textures = index.find_category(&["Textures"]).unwrap();

    let registry = ExporterRegistry::with_defaults();
    let report = Extractor::new(&index, &archive, &out, &registry)
        .run(textures)
        .unwrap();

    assert_eq!(report.total, 2);
    let files = tree(&out);
    assert_eq!(files.len(), 2);
    assert!(files.keys().all(|k| k.starts_with("Textures/")));
}

fn index_with_corrupt_entry(dir: &Path) -> (PathBuf, Index) {
    let mut builder = DatBuilder::new();
    builder
        .add_file(1, b"first", Compression::Store)
        .add_corrupt(2, b"broken")
        .add_file(3, b"third", Compression::Store);
    let archive = write_archive(&builder, dir);

    let mut index = Index::new();
    for id in 1..=3 {
        index
            .add_entry(id, &id.to_string(), FileType::Text, &["Text"])
            .unwrap();
    }
    (archive, index)
}

#[test]
fn test_fail_fast_stops_on_corrupt_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, index) = index_with_corrupt_entry(dir.path());
    let out = dir.path().join("out");

    let registry = ExporterRegistry::with_defaults();
    let err = Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(1, FailurePolicy::FailFast))
        .run(index.root())
        .unwrap_err();

    match err {
        ExtractError::Entry(failure) => assert_eq!(failure.base_id, 2),
        other => panic!("unexpected error: {}", other),
    }
    // single worker: entry 3 is never claimed
    let files = tree(&out);
    assert!(files.contains_key("Text/1.txt"));
    assert!(!files.contains_key("Text/3.txt"));
}

#[test]
fn test_skip_and_report_completes() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, index) = index_with_corrupt_entry(dir.path());
    let out = dir.path().join("out");

    let registry = ExporterRegistry::with_defaults();
    let report = Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(3, FailurePolicy::SkipAndReport))
        .run(index.root())
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.written(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].base_id, 2);
    assert!(!report.is_complete());

    let files = tree(&out);
    assert_eq!(files["Text/1.txt"], b"first");
    assert_eq!(files["Text/3.txt"], b"third");
}

#[test]
fn test_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (_, index) = index_with_corrupt_entry(dir.path());

    let registry = ExporterRegistry::with_defaults();
    let err = Extractor::new(&index, dir.path().join("gone.dat"), dir.path().join("out"), &registry)
        .run(index.root())
        .unwrap_err();
    assert!(matches!(err, ExtractError::ArchiveOpen { .. }));
}

#[test]
fn test_directory_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, index) = index_with_corrupt_entry(dir.path());
    let out = dir.path().join("occupied");
    std::fs::write(&out, b"a file, not a directory").unwrap();

    let registry = ExporterRegistry::with_defaults();
    let err = Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(2, FailurePolicy::SkipAndReport))
        .run(index.root())
        .unwrap_err();
    assert!(matches!(err, ExtractError::CreateDirectory { .. }));
}

#[test]
fn test_cancelled_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&fixture(), dir.path());
    let index = scan(&archive);
    let out = dir.path().join("out");

    let cancel = CancelFlag::new();
    cancel.cancel();
    let registry = ExporterRegistry::with_defaults();
    let report = Extractor::new(&index, &archive, &out, &registry)
        .with_cancel(cancel)
        .run(index.root())
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.written(), 0);
    assert!(!out.exists());
}

struct Failing;

impl Exporter for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn export(&self, _: &[u8], _: FileType) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Decode("always fails".into()))
    }
}

#[test]
fn test_exporter_failure_falls_back_to_raw() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = DatBuilder::new();
    builder.add_file(5, b"plain text\n", Compression::Store);
    let archive = write_archive(&builder, dir.path());
    let index = scan(&archive);
    let out = dir.path().join("out");

    let mut registry = ExporterRegistry::with_defaults();
    registry.register(FileType::Text, std::sync::Arc::new(Failing));
    let report = Extractor::new(&index, &archive, &out, &registry)
        .run(index.root())
        .unwrap();

    assert_eq!(report.raw, 1);
    assert_eq!(report.converted, 0);
    assert_eq!(tree(&out)["Text/5.raw"], b"plain text\n");
}

#[test]
fn test_names_cannot_escape_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = DatBuilder::new();
    builder
        .add_file(1, b"first", Compression::Store)
        .add_file(2, b"second", Compression::Store)
        .add_file(3, b"third", Compression::Store);
    let archive = write_archive(&builder, dir.path());

    let mut index = Index::new();
    index.add_entry(1, "1", FileType::Text, &["Text"]).unwrap();
    index.add_entry(2, "../escaped", FileType::Text, &["Text"]).unwrap();
    index.add_entry(3, "3", FileType::Text, &["..", "Text"]).unwrap();
    let out = dir.path().join("out");

    let registry = ExporterRegistry::with_defaults();
    let report = Extractor::new(&index, &archive, &out, &registry)
        .with_options(options(2, FailurePolicy::SkipAndReport))
        .run(index.root())
        .unwrap();

    assert_eq!(report.written(), 1);
    let mut failed: Vec<_> = report.failed.iter().map(|f| f.base_id).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![2, 3]);

    assert_eq!(tree(&out).keys().collect::<Vec<_>>(), vec!["Text/1.txt"]);
    assert!(!dir.path().join("escaped.txt").exists());
    assert!(!dir.path().join("Text").exists());
}
