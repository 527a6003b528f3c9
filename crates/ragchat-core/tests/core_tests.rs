use std::fs;
use std::io::Write;
use tempfile::TempDir;

use ragchat_core::data_processor::{extractor_for, save_chunks, Chunker, DataProcessor, SourceFormat};
use ragchat_core::history::ConversationHistory;
use ragchat_core::types::Locator;

#[test]
fn short_page_becomes_single_chunk() {
    let chunker = Chunker::new(100, 20).unwrap();
    let chunks = chunker.chunk("Short text", "a.txt", 1);
    assert_eq!(chunks.len(), 1, "one small page becomes one chunk");
    assert_eq!(chunks[0].content, "Short text");
    assert_eq!(chunks[0].locator, Locator::page(1));
    assert_eq!(chunks[0].source, "a.txt");
}

#[test]
fn blank_page_yields_no_chunks() {
    let chunker = Chunker::new(100, 20).unwrap();
    assert!(chunker.chunk("", "a.txt", 1).is_empty());
    assert!(chunker.chunk("   \n\t  ", "a.txt", 2).is_empty());
}

#[test]
fn overlap_not_smaller_than_size_is_rejected() {
    assert!(Chunker::new(100, 100).is_err());
    assert!(Chunker::new(100, 150).is_err());
    assert!(Chunker::new(0, 0).is_err());
    assert!(Chunker::new(100, 99).is_ok());
}

#[test]
fn long_page_windows_carry_spans() {
    let chunker = Chunker::new(10, 4).unwrap();
    let text = "abcdefghijklmnopqrstuvwxyz"; // 26 chars
    let chunks = chunker.chunk(text, "notes.txt", 3);
    // ceil((26 - 4) / (10 - 4)) = 4
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0].content, "abcdefghij");
    assert_eq!(chunks[1].content, "ghijklmnop");
    assert_eq!(chunks[3].content, "stuvwxyz");
    assert_eq!(chunks[1].locator, Locator::span(3, 6, 16));
    assert_eq!(chunks[3].locator, Locator::span(3, 18, 26));
    let ids: std::collections::HashSet<_> = chunks.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids.len(), chunks.len(), "chunk ids are unique within a page");
}

#[test]
fn multibyte_text_is_split_on_char_boundaries() {
    let chunker = Chunker::new(4, 1).unwrap();
    let chunks = chunker.chunk("żółwiąęść", "pl.txt", 1);
    assert!(chunks.len() > 1);
    for c in &chunks { assert!(c.content.chars().count() <= 4); }
}

#[test]
fn locator_display_round_trips() {
    for loc in [Locator::page(7), Locator::span(2, 800, 1700)] {
        let parsed: Locator = loc.to_string().parse().unwrap();
        assert_eq!(parsed, loc);
    }
    assert_eq!(Locator::span(2, 800, 1700).to_string(), "2:800-1700");
    assert!("x:1-2".parse::<Locator>().is_err());
}

#[test]
fn text_extractor_splits_pages_on_form_feed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lecture.txt");
    fs::write(&path, "page one\u{0c}page two\u{0c}   ").unwrap();
    let extractor = extractor_for(&path).expect("txt is supported");
    let pages = extractor.extract(&path).unwrap();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].text, "page two");
    assert_eq!(pages[1].page, 2);
    assert_eq!(pages[0].source, "lecture.txt");
}

#[test]
fn markdown_extractor_splits_on_top_level_headings() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.md");
    fs::write(&path, "# Intro\nhello\n## Detail\nmore\n# Second\nworld\n").unwrap();
    assert_eq!(SourceFormat::from_path(&path), Some(SourceFormat::Markdown));
    let pages = extractor_for(&path).unwrap().extract(&path).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].text.contains("## Detail"));
    assert!(pages[1].text.starts_with("# Second"));
}

#[test]
fn process_directory_skips_unsupported_and_keeps_going() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Continuous integration merges code often").unwrap();
    fs::write(dir.join("b.pdf"), b"%PDF-1.4 binary").unwrap();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("nested/c.md"), "# Microservices\nsmall services").unwrap();

    let processor = DataProcessor::new(Chunker::new(1000, 200).unwrap());
    let sources = processor.process_directory(dir);

    assert_eq!(sources.len(), 2, "pdf is skipped, the rest are processed");
    let all: Vec<_> = sources.iter().flat_map(|s| s.chunks.iter()).collect();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|c| c.source == "c.md"));
}

#[test]
fn process_file_rejects_unknown_format() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("slides.pptx");
    fs::write(&path, b"zip").unwrap();
    let processor = DataProcessor::new(Chunker::new(1000, 200).unwrap());
    assert!(processor.process_file(&path).is_err());
}

#[test]
fn save_chunks_writes_headers() {
    let tmp = TempDir::new().unwrap();
    let chunker = Chunker::new(1000, 200).unwrap();
    let chunks = chunker.chunk("DevOps is a culture", "devops.txt", 4);
    let out = save_chunks(&chunks, &tmp.path().join("processed"), "devops.txt").unwrap();
    let written = fs::read_to_string(out).unwrap();
    assert!(written.starts_with("--- Chunk from devops.txt (Page/Slide 4) ---\nDevOps is a culture"));
}

#[test]
fn history_is_bounded_fifo() {
    let mut history = ConversationHistory::new(3);
    for i in 0..5 { history.push(format!("q{i}"), format!("a{i}")); }
    assert_eq!(history.len(), 3);
    let questions: Vec<_> = history.iter().map(|t| t.question.as_str()).collect();
    assert_eq!(questions, vec!["q2", "q3", "q4"]);
}

#[test]
fn history_pages_oldest_first_and_clears() {
    let mut history = ConversationHistory::new(10);
    assert_eq!(history.page_count(5), 0);
    for i in 0..7 { history.push(format!("q{i}"), format!("a{i}")); }
    assert_eq!(history.page_count(5), 2);
    let second: Vec<_> = history.page(2, 5).iter().map(|t| t.question.as_str()).collect();
    assert_eq!(second, vec!["q5", "q6"]);
    assert!(history.page(3, 5).is_empty());
    assert_eq!(history.capacity(), 10);

    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.capacity(), 10);
}
