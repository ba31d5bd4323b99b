use std::fs;
use std::path::Path;

use encoding_rs::SHIFT_JIS;
use tempfile::TempDir;

use convert::aggregate::compare_records;
use convert::{
    convert_dir, filter_by_year, read_jsonl, select_text_files, sort_combined, write_combined,
    write_jsonl, RegisterKey,
};
use fanrec_common::{decode_record, ConvertConfig, FanRecord, ReleaseInfo, ReleaseTerm, YearBounds};

fn sjis(text: &str) -> Vec<u8> {
    SHIFT_JIS.encode(text).0.into_owned()
}

fn line_for(register: &str, name: &str) -> Vec<u8> {
    let mut line = format!("{register:<4}").into_bytes();
    let mut name = sjis(name);
    name.resize(16, b' ');
    line.extend(name);
    line.extend(vec![b' '; 38]);
    line.extend(b"0650".repeat(25));
    line.extend_from_slice(b"A1A1B1A1A10012034");
    line.extend(sjis("大阪府"));
    line
}

fn record(register: &str, name: &str, year: Option<i32>, month: Option<u32>) -> FanRecord {
    let release = ReleaseInfo { year, month, term: month.map(ReleaseTerm::from_month) };
    decode_record(&line_for(register, name), "test", release)
}

#[test]
fn test_jsonl_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out.jsonl");

    let mut with_gaps = record("12", "佐藤", None, None);
    with_gaps.metrics_primary[3] = None;
    let records = vec![record("4321", "山田\u{3000}太郎", Some(2023), Some(10)), with_gaps];

    assert_eq!(write_jsonl(&records, &path).unwrap(), 2);
    let back = read_jsonl(&path).unwrap();
    assert_eq!(back, records);
}

#[test]
fn test_jsonl_lines_carry_text_and_keep_japanese() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.jsonl");
    let rec = record("4321", "山田", Some(2024), Some(3));
    write_jsonl([&rec], &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"name_kanji\":\"山田\""));
    assert!(content.contains("\"release_term\":\"前期\""));
    assert!(content.contains(&format!("\"text\":\"{}\"", rec.text())));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_secondary_block_in_fixture() {
    let rec = record("1", "x", None, None);
    assert_eq!(rec.grade_info, "A1A1B1A1A1");
    assert_eq!(rec.metrics_secondary_raw, vec!["0012"]);
    assert_eq!(rec.metrics_secondary_suffix, "034");
    assert_eq!(rec.birthplace, "大阪府");
}

#[test]
fn test_filter_by_year_keeps_unknown_years() {
    let records = vec![
        record("1", "a", Some(2019), Some(1)),
        record("2", "b", Some(2020), Some(1)),
        record("3", "c", Some(2021), Some(1)),
        record("4", "d", None, None),
    ];
    let kept = filter_by_year(records, &YearBounds::new(Some(2020), Some(2020)));
    let numbers: Vec<_> = kept.iter().map(|r| r.register_number.as_str()).collect();
    assert_eq!(numbers, vec!["2", "4"]);
}

#[test]
fn test_sort_orders_by_release_then_register() {
    let mut records = vec![
        record("30", "a", Some(2024), Some(3)),
        record("4", "b", Some(2023), Some(10)),
        record("100", "c", Some(2023), Some(10)),
        record("9", "d", None, None),
        record("5", "e", Some(2023), Some(4)),
    ];
    sort_combined(&mut records);
    let numbers: Vec<_> = records.iter().map(|r| r.register_number.as_str()).collect();
    assert_eq!(numbers, vec!["9", "5", "4", "100", "30"]);
}

#[test]
fn test_sort_is_stable_for_equal_keys() {
    let mut records = vec![
        record("7", "first", Some(2023), Some(10)),
        record("1", "other", Some(2023), Some(10)),
        record("7", "second", Some(2023), Some(10)),
    ];
    sort_combined(&mut records);
    let names: Vec<_> = records.iter().map(|r| r.name_kanji.as_str()).collect();
    assert_eq!(names, vec!["other", "first", "second"]);
    assert_eq!(compare_records(&records[1], &records[2]), std::cmp::Ordering::Equal);
}

#[test]
fn test_register_key_orders_numbers_before_text() {
    assert!(RegisterKey::of("0999") < RegisterKey::of("1000"));
    assert!(RegisterKey::of("9999") < RegisterKey::of("12a4"));
    assert_eq!(RegisterKey::of(""), RegisterKey::Text(""));
    assert_eq!(RegisterKey::of("0042"), RegisterKey::Number(42));
}

#[test]
fn test_write_combined_skips_empty_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("all.jsonl");
    let records = vec![record("1", "a", Some(2019), Some(1))];

    let written = write_combined(records, &YearBounds::new(Some(2020), None), &path).unwrap();
    assert_eq!(written, 0);
    assert!(!path.exists());
}

#[test]
fn test_select_text_files_filters_and_falls_back() {
    let dir = TempDir::new().unwrap();
    let extracted = vec![
        dir.path().join("b.TXT"),
        dir.path().join("a.txt"),
        dir.path().join("README"),
        dir.path().join("image.png"),
        dir.path().join("fan2310."),
        dir.path().join("a.txt"),
    ];
    let selected = select_text_files(&extracted, dir.path()).unwrap();
    assert_eq!(
        selected,
        vec![
            dir.path().join("README"),
            dir.path().join("a.txt"),
            dir.path().join("b.TXT"),
            dir.path().join("fan2310."),
        ]
    );

    fs::create_dir_all(dir.path().join("old")).unwrap();
    fs::write(dir.path().join("old").join("fan2310.txt"), b"").unwrap();
    fs::write(dir.path().join("old").join("notes.md"), b"").unwrap();
    let fallback = select_text_files(&[], dir.path()).unwrap();
    assert_eq!(fallback, vec![dir.path().join("old").join("fan2310.txt")]);
}

fn write_lines(path: &Path, lines: &[Vec<u8>]) {
    let mut content = Vec::new();
    for line in lines {
        content.extend_from_slice(line);
        content.extend_from_slice(b"\r\n");
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_convert_dir_from_interim_files() {
    let tmp = TempDir::new().unwrap();
    let interim = tmp.path().join("interim");
    fs::create_dir_all(interim.join("fan1910")).unwrap();
    fs::create_dir_all(interim.join("fan2004")).unwrap();
    fs::create_dir_all(interim.join("misc")).unwrap();

    write_lines(&interim.join("fan1910").join("fan1910.txt"), &[line_for("2", "a")]);
    write_lines(
        &interim.join("fan2004").join("fan2004.txt"),
        &[line_for("20", "b"), line_for("3", "c")],
    );
    write_lines(&interim.join("misc").join("extra.txt"), &[line_for("1", "d")]);
    fs::write(interim.join("misc").join("empty.txt"), b"\r\n\r\n").unwrap();

    let config = ConvertConfig {
        raw_dir: tmp.path().join("raw"),
        interim_dir: interim,
        processed_dir: tmp.path().join("processed"),
        combined_output: Some(tmp.path().join("combined").join("all.jsonl")),
        year_bounds: YearBounds::new(Some(2020), None),
    };

    let report = convert_dir(&config).unwrap();
    assert_eq!(report.archives, 0);
    assert_eq!(report.extracted_files, 0);
    assert_eq!(report.text_files, 4);
    assert_eq!(report.files_written, 3);
    assert_eq!(report.records, 4);
    assert_eq!(report.combined_records, 3);

    let per_file = read_jsonl(&config.processed_dir.join("fan2004.jsonl")).unwrap();
    assert_eq!(per_file.len(), 2);
    assert_eq!(per_file[0].release_year, Some(2020));
    assert_eq!(per_file[0].release_month, Some(4));
    assert!(!config.processed_dir.join("empty.jsonl").exists());

    let combined = read_jsonl(config.combined_output.as_ref().unwrap()).unwrap();
    let numbers: Vec<_> = combined.iter().map(|r| r.register_number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "3", "20"]);
}

/// Level-0 LZH archive with stored members, see the extract crate tests.
fn lzh_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    fn crc16(data: &[u8]) -> u16 {
        let mut crc = 0u16;
        for &byte in data {
            crc ^= byte as u16;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xA001 } else { crc >> 1 };
            }
        }
        crc
    }

    let mut archive = Vec::new();
    for (name, data) in members {
        let mut header = b"-lh0-".to_vec();
        header.extend_from_slice(&(data.len() as u32).to_le_bytes());
        header.extend_from_slice(&(data.len() as u32).to_le_bytes());
        header.extend_from_slice(&0x5741_0000u32.to_le_bytes());
        header.extend_from_slice(&[0x20, 0, name.len() as u8]);
        header.extend_from_slice(name.as_bytes());
        header.extend_from_slice(&crc16(data).to_le_bytes());
        archive.push(header.len() as u8);
        archive.push(header.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)));
        archive.extend_from_slice(&header);
        archive.extend_from_slice(data);
    }
    archive.push(0);
    archive
}

#[test]
fn test_convert_dir_from_archives() {
    let tmp = TempDir::new().unwrap();
    let raw = tmp.path().join("raw");
    fs::create_dir_all(&raw).unwrap();

    let mut body = line_for("4321", "山田\u{3000}太郎");
    body.extend_from_slice(b"\r\n");
    body.extend(line_for("12", "佐藤"));
    body.extend_from_slice(b"\n");
    let archive = lzh_archive(&[("fan2310.txt", &body), ("readme.doc", b"skip")]);
    fs::write(raw.join("fan2310.lzh"), archive).unwrap();

    let config = ConvertConfig {
        raw_dir: raw,
        interim_dir: tmp.path().join("interim"),
        processed_dir: tmp.path().join("processed"),
        combined_output: None,
        year_bounds: YearBounds::default(),
    };

    let report = convert_dir(&config).unwrap();
    assert_eq!(report.archives, 1);
    assert_eq!(report.extracted_files, 2);
    assert_eq!(report.text_files, 1);
    assert_eq!(report.records, 2);
    assert_eq!(report.combined_records, 0);
    assert!(config.interim_dir.join("fan2310").join("fan2310.txt").is_file());

    let records = read_jsonl(&config.processed_dir.join("fan2310.jsonl")).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name_kanji, "山田 太郎");
    assert_eq!(records[0].release_term, Some(ReleaseTerm::SecondHalf));
    assert_eq!(records[1].register_number, "12");
}
