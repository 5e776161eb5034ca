/// Generates the file name of one shard of a sharded output.
/// Format: `{prefix}-00001-of-00005` (1-based shard number, 5 digits)
pub fn shard_filename(prefix: &str, shard: usize, shard_count: usize) -> String {
  format!("{}-{:05}-of-{:05}", prefix, shard + 1, shard_count)
}

/// Every shard path of a sharded output, in name order.
pub fn shard_paths(prefix: &str, shard_count: usize) -> Vec<String> {
  (0..shard_count).map(|shard| shard_filename(prefix, shard, shard_count)).collect()
}

/// Parses a shard file name back into `(prefix, shard, shard_count)`.
/// The returned shard index is 0-based.
pub fn parse_shard_filename(name: &str) -> Option<(&str, usize, usize)> {
  let (head, count) = name.rsplit_once("-of-")?;
  let (prefix, number) = head.rsplit_once('-')?;
  if number.len() < 5 || count.len() < 5 {
    return None;
  }
  let number = number.parse::<usize>().ok()?;
  let count = count.parse::<usize>().ok()?;
  if number == 0 || number > count {
    return None;
  }
  Some((prefix, number - 1, count))
}

/// Splits `scheme://rest` into its scheme and remainder.
/// Paths without a scheme return `None` and the path unchanged.
pub fn split_scheme(path: &str) -> (Option<&str>, &str) {
  match path.split_once("://") {
    Some((scheme, rest))
      if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
    {
      (Some(scheme), rest)
    }
    _ => (None, path),
  }
}
