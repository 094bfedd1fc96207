use reading::{parse_batch, Field, TimeRange};
use sensorgraph_core::{CancelToken, FetchError, ReadingSource};
use sensorgraph_fetch::FileSource;
use std::fs;

fn range() -> TimeRange {
    TimeRange::new(0, 1).unwrap()
}

#[test]
fn each_file_is_one_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("a.jsonl");
    let second = dir.path().join("b.jsonl");
    fs::write(&first, "{\"time\": 1, \"temperature\": 3}\n\n{\"time\": 2}\n").unwrap();
    fs::write(&second, "{\"time\": 3, \"light\": 1}\r\n").unwrap();

    let source = FileSource::new(vec![second.clone(), first.clone()]);
    let batches = source.fetch(&range(), &CancelToken::new()).expect("fetch");
    assert_eq!(batches.len(), 2);
    assert_eq!(parse_batch(&batches[0])[0].light, Some(1.0));
    assert_eq!(parse_batch(&batches[1]).len(), 2);
}

#[test]
fn directories_expand_in_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("2.jsonl"), "{\"time\": 20}").unwrap();
    fs::write(dir.path().join("1.jsonl"), "{\"time\": 10}").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();

    let source = FileSource::new(vec![dir.path().to_path_buf()]).with_fields(vec![Field::Light]);
    let batches = source.fetch(&range(), &CancelToken::new()).expect("fetch");
    let times: Vec<i64> = batches
        .iter()
        .flat_map(|batch| parse_batch(batch))
        .map(|reading| reading.time)
        .collect();
    assert_eq!(times, vec![10, 20]);
    assert_eq!(source.fields(), &[Field::Light]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = FileSource::new(vec![dir.path().join("absent.jsonl")]);
    assert!(matches!(
        source.fetch(&range(), &CancelToken::new()),
        Err(FetchError::Io(_))
    ));
}

#[test]
fn invalid_utf8_only_drops_its_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("corrupt.jsonl");
    let mut bytes = b"{\"time\": 1, \"temperature\": 20}\n".to_vec();
    bytes.extend_from_slice(b"{\"time\": 2, \"x\": \"\xff\xfe\"}\n");
    bytes.extend_from_slice(b"{\"time\": 3}\n");
    fs::write(&path, bytes).unwrap();

    let source = FileSource::new(vec![path]);
    let batches = source.fetch(&range(), &CancelToken::new()).expect("fetch");
    let times: Vec<i64> = parse_batch(&batches[0])
        .iter()
        .map(|reading| reading.time)
        .collect();
    assert_eq!(times, vec![1, 3]);
}
