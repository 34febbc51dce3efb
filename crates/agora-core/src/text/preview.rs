/// First `max_chars` characters of `content`, with `...` appended when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}
