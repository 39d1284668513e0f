//! Document chunking

/// Split text into overlapping word-window chunks.
///
/// Windows advance by `chunk_size - overlap` words, so consecutive chunks
/// share `overlap` words of context.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();

    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("one two three", 500, 50);
        assert_eq!(chunks, vec!["one two three".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("   ", 500, 50).is_empty());
    }

    #[test]
    fn test_chunks_overlap() {
        let words: Vec<String> = (0..25).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");

        let chunks = chunk_text(&text, 10, 3);

        assert!(chunks.len() > 1);
        // Each new chunk starts 7 words after the previous one
        assert!(chunks[0].ends_with("w9"));
        assert!(chunks[1].starts_with("w7"));
    }

    #[test]
    fn test_all_words_covered() {
        let words: Vec<String> = (0..100).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");

        let chunks = chunk_text(&text, 30, 5);
        let last = chunks.last().unwrap();
        assert!(last.ends_with("w99"));
    }
}
