//! Pure text transformations behind [`super::Injections`].

/// Byte span of a named block: from the start of its opening marker line to
/// the end of its closing marker line, trailing newline included.
fn find_region(text: &str, name: &str) -> Option<(usize, usize)> {
  let marker = format!("#{}", name);
  let mut start = None;
  let mut offset = 0;

  for line in text.split_inclusive('\n') {
    let end = offset + line.len();
    if line.trim_end() == marker {
      match start {
        None => start = Some(offset),
        Some(s) => return Some((s, end)),
      }
    }
    offset = end;
  }

  None
}

fn render_block(name: &str, content: &str) -> String {
  format!("#{name}\n{}\n#{name}\n", content.trim_matches('\n'))
}

/// Whether `text` contains a complete block named `name`.
pub fn contains_block(text: &str, name: &str) -> bool {
  find_region(text, name).is_some()
}

/// Replace (or add) the block `name` in `original` with `content`.
///
/// An existing block is replaced in place. A new block is appended, or, with
/// an override marker present, inserted right above the override region so
/// the region stays below it. Text outside the block is left as it was.
pub fn inject_content(original: &str, content: &str, name: &str, override_marker: Option<&str>) -> String {
  let block = render_block(name, content);
  let region = override_marker.and_then(|m| find_region(original, m));

  if let Some((start, end)) = find_region(original, name)
    && region.is_none_or(|(override_start, _)| end <= override_start)
  {
    let mut body = original.to_string();
    body.replace_range(start..end, &block);
    return body;
  }

  // A block sitting below the override region is moved above it.
  let body = clear_content(original, name);
  match override_marker.and_then(|m| find_region(&body, m)) {
    Some((override_start, _)) => {
      let mut result = String::with_capacity(body.len() + block.len() + 1);
      result.push_str(&body[..override_start]);
      result.push_str(&block);
      result.push('\n');
      result.push_str(&body[override_start..]);
      result
    }
    None => {
      let mut result = body;
      // A single separator keeps clear_content an exact inverse.
      if !result.is_empty() {
        result.push('\n');
      }
      result.push_str(&block);
      result
    }
  }
}

/// Remove the block `name` from `original`, along with the one separator
/// newline [`inject_content`] put next to it.
///
/// The separator is a blank line above the block, a blank line below it, or
/// the line break ending the text in front of a trailing block. A block
/// packed between two user lines is removed without joining them.
pub fn clear_content(original: &str, name: &str) -> String {
  let Some((start, end)) = find_region(original, name) else {
    return original.to_string();
  };

  let mut before = &original[..start];
  let mut after = &original[end..];
  if before.ends_with("\n\n") || (after.is_empty() && before.ends_with('\n')) {
    before = &before[..before.len() - 1];
  } else if let Some(rest) = after.strip_prefix('\n') {
    after = rest;
  }

  let mut result = String::with_capacity(before.len() + after.len());
  result.push_str(before);
  result.push_str(after);
  result
}
