//! Basic ShardedWriter integration tests

use shardio::sharded::{LocalExecutor, ParallelExecutor, ShardAssigner, ShardedWriter};
use shardio::{Error, LocalStorage, MemoryStorage, ReaderOptions, RecordReader, ShardOptions, Storage};
use tempfile::TempDir;

fn records(n: usize) -> Vec<Vec<u8>> {
  (0..n).map(|i| format!("value_{}", i).into_bytes()).collect()
}

fn setup(shard_count: usize) -> (ShardedWriter<LocalStorage>, TempDir, String) {
  let dir = TempDir::new().unwrap();
  let prefix = dir.path().join("out").join("records").to_str().unwrap().to_string();
  let writer = ShardedWriter::new(LocalStorage::default(), ShardOptions::new(prefix.clone(), shard_count)).unwrap();
  (writer, dir, prefix)
}

#[test]
fn test_write_and_read_back() {
  let (writer, _dir, prefix) = setup(4);

  let report = writer.write(records(100)).unwrap();
  assert!(report.is_success());
  assert_eq!(report.total_records(), 100);

  let reader = RecordReader::for_shards(LocalStorage::default(), &prefix, 4, ReaderOptions::default()).unwrap();
  let mut read: Vec<Vec<u8>> = reader.map(|r| r.unwrap()).collect();
  read.sort();
  let mut expected = records(100);
  expected.sort();
  assert_eq!(read, expected);
}

#[test]
fn test_file_naming() {
  let (writer, _dir, prefix) = setup(5);
  writer.write(records(200)).unwrap().into_result().unwrap();

  assert_eq!(writer.shard_path(0), format!("{}-00001-of-00005", prefix));
  for shard in 0..5 {
    let path = writer.shard_path(shard);
    assert!(std::path::Path::new(&path).exists(), "missing {}", path);
  }
  assert!(!std::path::Path::new(&format!("{}-00006-of-00005", prefix)).exists());
}

#[test]
fn test_records_land_in_their_shard() {
  let storage = MemoryStorage::new();
  let writer = ShardedWriter::new(storage.clone(), ShardOptions::new("mem://data", 7)).unwrap();
  writer.write(records(500)).unwrap().into_result().unwrap();

  for shard in 0..7 {
    let path = writer.shard_path(shard);
    if !storage.exists(&path).unwrap() {
      continue;
    }
    let reader = RecordReader::with_storage(storage.clone(), [path], ReaderOptions::default());
    for record in reader {
      assert_eq!(writer.router().shard_of(&record.unwrap()), shard);
    }
  }
}

#[test]
fn test_arrival_order_within_shard() {
  let storage = MemoryStorage::new();
  let writer = ShardedWriter::with_executor(storage.clone(), LocalExecutor, ShardOptions::new("mem://ord", 3)).unwrap();
  let input = records(300);
  writer.write(input.clone()).unwrap();

  for shard in 0..3 {
    let expected: Vec<Vec<u8>> = input
      .iter()
      .filter(|r| writer.router().shard_of(r) == shard)
      .cloned()
      .collect();
    let reader = RecordReader::with_storage(storage.clone(), [writer.shard_path(shard)], ReaderOptions::default());
    let actual: Vec<Vec<u8>> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(actual, expected, "shard {} out of order", shard);
  }
}

#[test]
fn test_sparse_output() {
  let storage = MemoryStorage::new();
  let writer = ShardedWriter::new(storage.clone(), ShardOptions::new("mem://sparse", 64)).unwrap();

  let report = writer.write(vec![b"only one".to_vec()]).unwrap();
  assert_eq!(report.outcomes().len(), 1);
  assert_eq!(storage.paths(), vec![report.outcomes()[0].path.clone()]);

  let reader = RecordReader::for_shards(storage, "mem://sparse", 64, ReaderOptions::default()).unwrap();
  assert_eq!(reader.remaining_files(), 1);
}

#[test]
fn test_single_shard_gets_everything() {
  let storage = MemoryStorage::new();
  let writer = ShardedWriter::new(storage.clone(), ShardOptions::new("mem://one", 1)).unwrap();
  writer.write(records(50)).unwrap();

  assert_eq!(storage.paths(), vec!["mem://one-00001-of-00001"]);
  let reader = RecordReader::with_storage(storage, ["mem://one-00001-of-00001"], ReaderOptions::default());
  assert_eq!(reader.count(), 50);
}

#[test]
fn test_zero_shards_rejected() {
  let result = ShardedWriter::new(MemoryStorage::new(), ShardOptions::new("mem://x", 0));
  assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_unsupported_scheme_rejected() {
  let result = ShardedWriter::new(LocalStorage::default(), ShardOptions::new("gs://bucket/out", 4));
  assert!(matches!(result, Err(Error::UnsupportedScheme(_))));

  let result = ShardedWriter::new(MemoryStorage::new(), ShardOptions::new("/tmp/out", 4));
  assert!(matches!(result, Err(Error::UnsupportedScheme(_))));
}

#[test]
fn test_executors_produce_identical_files() {
  let input = records(1000);

  let sequential = MemoryStorage::new();
  ShardedWriter::with_executor(sequential.clone(), LocalExecutor, ShardOptions::new("mem://x", 6))
    .unwrap()
    .write(input.clone())
    .unwrap();

  let parallel = MemoryStorage::new();
  ShardedWriter::with_executor(
    parallel.clone(),
    ParallelExecutor::with_threads(4).unwrap(),
    ShardOptions::new("mem://x", 6),
  )
  .unwrap()
  .write(input)
  .unwrap();

  assert_eq!(sequential.paths(), parallel.paths());
  for path in sequential.paths() {
    assert_eq!(sequential.get(&path), parallel.get(&path), "{} differs", path);
  }
}

#[test]
fn test_write_sharded_convenience() {
  let dir = TempDir::new().unwrap();
  let prefix = dir.path().join("conv").to_str().unwrap().to_string();

  let report = shardio::sharded::write_sharded(&prefix, 2, records(10)).unwrap();
  assert_eq!(report.total_records(), 10);

  let reader = RecordReader::for_shards(LocalStorage::default(), &prefix, 2, ReaderOptions::default()).unwrap();
  assert_eq!(reader.count(), 10);
}
