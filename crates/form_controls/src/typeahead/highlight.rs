/// A label split around the first case-insensitive occurrence of the
/// query, for rendering the middle part in bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightedLabel<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

impl HighlightedLabel<'_> {
    pub fn has_match(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Splits `label` around the first case-insensitive match of the trimmed
/// `query`. Case folding is Unicode lowercase, so "évo" matches "Évora".
/// No match (or an empty query) leaves the whole label in `before`.
pub fn highlight<'a>(label: &'a str, query: &str) -> HighlightedLabel<'a> {
    let needle: Vec<char> = query.trim().chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return HighlightedLabel {
            before: label,
            matched: "",
            after: "",
        };
    }

    let found = label
        .char_indices()
        .find_map(|(i, _)| folded_prefix_len(&label[i..], &needle).map(|len| (i, i + len)));

    match found {
        Some((start, end)) => HighlightedLabel {
            before: &label[..start],
            matched: &label[start..end],
            after: &label[end..],
        },
        None => HighlightedLabel {
            before: label,
            matched: "",
            after: "",
        },
    }
}

/// Byte length of the shortest prefix of `text` whose lowercase form is
/// exactly `needle`. The match must end on a whole char.
fn folded_prefix_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut pending = needle;
    for (offset, ch) in text.char_indices() {
        for folded in ch.to_lowercase() {
            match pending.split_first() {
                Some((first, rest)) if *first == folded => pending = rest,
                _ => return None,
            }
        }
        if pending.is_empty() {
            return Some(offset + ch.len_utf8());
        }
    }
    None
}
