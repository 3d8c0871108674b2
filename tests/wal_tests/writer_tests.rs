//! Tests for WAL Writer
//!
//! These tests verify:
//! - LSN generation and sequencing
//! - Flush semantics (last saved LSN)
//! - Block rollover when a page fills up
//! - Reopening an existing log
//! - Concurrent appends

use std::sync::Arc;

use pagelog::storage::{Block, BlockStorage, FileManager, Page, PAGE_SIZE_8K};
use pagelog::{PageLogError, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_storage(page_size: usize) -> (TempDir, Arc<FileManager>) {
    let temp_dir = TempDir::new().unwrap();
    let fm = FileManager::new(temp_dir.path().join("waldir"), page_size).unwrap();
    (temp_dir, Arc::new(fm))
}

fn record(i: usize) -> String {
    format!("record_{}", i)
}

fn append_records(writer: &WalWriter, start: usize, end: usize) {
    for i in start..=end {
        writer.append(record(i).as_bytes()).unwrap();
    }
}

// =============================================================================
// LSN Tests
// =============================================================================

#[test]
fn test_latest_lsn_after_ten_appends() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    append_records(&writer, 1, 10);

    assert_eq!(writer.latest_lsn(), 10);
}

#[test]
fn test_append_returns_next_lsn() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    append_records(&writer, 1, 10);
    let lsn = writer.append(record(11).as_bytes()).unwrap();

    assert_eq!(lsn, 11);
}

#[test]
fn test_lsn_after_flush() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    append_records(&writer, 1, 11);
    writer.flush(11).unwrap();

    assert_eq!(writer.append(b"record").unwrap(), 12);
}

#[test]
fn test_lsn_sequential_across_rollovers() {
    let (_temp, fm) = setup_storage(64);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    let lsns: Vec<u64> = (1..=200)
        .map(|i| writer.append(record(i).as_bytes()).unwrap())
        .collect();

    for (i, lsn) in lsns.iter().enumerate() {
        assert_eq!(*lsn, (i + 1) as u64);
    }
    assert!(writer.current_block().block_num() > 10);
}

// =============================================================================
// Flush Tests
// =============================================================================

#[test]
fn test_flush_advances_last_saved_lsn() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    append_records(&writer, 1, 3);
    assert_eq!(writer.last_saved_lsn(), 0);

    // Whole page is written, so everything appended so far is saved
    writer.flush(2).unwrap();
    assert_eq!(writer.last_saved_lsn(), 3);
    assert!(writer.last_saved_lsn() >= 2);
}

#[test]
fn test_flush_of_saved_lsn_is_skipped() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    append_records(&writer, 1, 3);
    writer.flush(3).unwrap();
    append_records(&writer, 4, 5);

    // 1 < last saved (3): nothing to do
    writer.flush(1).unwrap();
    assert_eq!(writer.last_saved_lsn(), 3);

    // 3 >= last saved: full flush
    writer.flush(3).unwrap();
    assert_eq!(writer.last_saved_lsn(), 5);
}

#[test]
fn test_flush_writes_page_to_disk() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();

    append_records(&writer, 1, 2);
    writer.flush(2).unwrap();

    let mut page = Page::new(PAGE_SIZE_8K);
    fm.read(&Block::new("walfile", 0), &mut page).unwrap();

    // Header points at the newest record; the oldest ends at the page end
    let boundary = page.get_int(0).unwrap() as usize;
    assert_eq!(boundary, PAGE_SIZE_8K - 2 * (4 + record(1).len()));
    assert_eq!(page.get_bytes(boundary).unwrap(), record(2).as_bytes());
    assert_eq!(
        page.get_bytes(PAGE_SIZE_8K - 4 - record(1).len()).unwrap(),
        record(1).as_bytes()
    );
}

#[test]
fn test_unflushed_records_stay_in_memory() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();

    append_records(&writer, 1, 5);

    let mut page = Page::new(PAGE_SIZE_8K);
    fm.read(&Block::new("walfile", 0), &mut page).unwrap();
    assert_eq!(page.get_int(0).unwrap() as usize, PAGE_SIZE_8K);
}

// =============================================================================
// Rollover Tests
// =============================================================================

#[test]
fn test_new_log_starts_with_one_block() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();

    assert_eq!(writer.current_block(), Block::new("walfile", 0));
    assert_eq!(fm.file_size_in_blocks("walfile").unwrap(), 1);
}

#[test]
fn test_appends_new_block_when_page_is_full() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    assert_eq!(writer.current_block().block_num(), 0);

    append_records(&writer, 1, 1152);
    writer.flush(1024).unwrap();

    assert_eq!(writer.current_block().block_num(), 1);
}

#[test]
fn test_header_margin_forces_rollover() {
    let (_temp, fm) = setup_storage(64);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    // 4 + 52 bytes: boundary moves to 8
    writer.append(&[1u8; 52]).unwrap();
    // 4 + 0 bytes still fits: boundary 4, header untouched
    writer.append(b"").unwrap();
    assert_eq!(writer.current_block().block_num(), 0);

    // Nothing fits above the header now
    writer.append(b"").unwrap();
    assert_eq!(writer.current_block().block_num(), 1);
}

#[test]
fn test_largest_record_fills_empty_page() {
    let (_temp, fm) = setup_storage(64);
    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();

    writer.append(&[0xAB; 56]).unwrap();
    writer.flush(1).unwrap();

    let mut page = Page::new(64);
    fm.read(&Block::new("walfile", 0), &mut page).unwrap();
    assert_eq!(page.get_int(0).unwrap(), 4);
    assert_eq!(page.get_bytes(4).unwrap(), &[0xAB; 56][..]);
}

#[test]
fn test_record_too_large() {
    let (_temp, fm) = setup_storage(64);
    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();
    writer.append(b"small").unwrap();

    let result = writer.append(&[0u8; 57]);

    assert!(matches!(
        result,
        Err(PageLogError::RecordTooLarge { len: 57, max: 56 })
    ));
    // No rollover, no LSN consumed
    assert_eq!(writer.latest_lsn(), 1);
    assert_eq!(writer.current_block().block_num(), 0);
    assert_eq!(fm.file_size_in_blocks("walfile").unwrap(), 1);
}

// =============================================================================
// Reopen Tests
// =============================================================================

#[test]
fn test_reopen_continues_last_block() {
    let (_temp, fm) = setup_storage(PAGE_SIZE_8K);

    {
        let writer = WalWriter::open(fm.clone(), "walfile").unwrap();
        append_records(&writer, 1, 3);
        writer.flush(3).unwrap();
    }

    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();
    assert_eq!(writer.current_block().block_num(), 0);
    // LSNs are not persisted
    assert_eq!(writer.latest_lsn(), 0);
    assert_eq!(writer.append(record(4).as_bytes()).unwrap(), 1);

    let records: Vec<Vec<u8>> = writer
        .iterator()
        .unwrap()
        .map(|r| r.unwrap().to_vec())
        .collect();
    let expected: Vec<Vec<u8>> = (1..=4).rev().map(|i| record(i).into_bytes()).collect();
    assert_eq!(records, expected);
}

#[test]
fn test_reopen_after_rollover() {
    let (_temp, fm) = setup_storage(64);

    let last_block = {
        let writer = WalWriter::open(fm.clone(), "walfile").unwrap();
        append_records(&writer, 1, 20);
        writer.flush(20).unwrap();
        writer.current_block()
    };

    let writer = WalWriter::open(fm.clone(), "walfile").unwrap();
    assert_eq!(writer.current_block(), last_block);
}

#[test]
fn test_reopen_rejects_corrupt_header() {
    let (_temp, fm) = setup_storage(64);

    // Header 2 cannot be a record boundary
    let mut page = Page::new(64);
    page.set_int(0, 2).unwrap();
    fm.write(&Block::new("walfile", 0), &page).unwrap();

    let result = WalWriter::open(fm, "walfile");
    assert!(matches!(result, Err(PageLogError::Corruption(_))));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_appends() {
    let (_temp, fm) = setup_storage(256);
    let writer = WalWriter::open(fm, "walfile").unwrap();

    let threads = 8;
    let per_thread = 200;

    crossbeam::scope(|s| {
        for t in 0..threads {
            let writer = &writer;
            s.spawn(move |_| {
                for i in 0..per_thread {
                    writer.append(format!("{}-{}", t, i).as_bytes()).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(writer.latest_lsn(), (threads * per_thread) as u64);

    let records: Vec<String> = writer
        .iterator()
        .unwrap()
        .map(|r| String::from_utf8(r.unwrap().to_vec()).unwrap())
        .collect();
    assert_eq!(records.len(), threads * per_thread);

    // Newest first: each thread's own records appear in descending order
    let mut next_expected = vec![per_thread as i64 - 1; threads];
    for rec in &records {
        let (t, i) = rec.split_once('-').unwrap();
        let t: usize = t.parse().unwrap();
        let i: i64 = i.parse().unwrap();
        assert_eq!(i, next_expected[t]);
        next_expected[t] -= 1;
    }
    assert!(next_expected.iter().all(|n| *n == -1));
}
