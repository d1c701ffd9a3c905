/// Split `text` into chunks of at most `limit` chars, breaking at line
/// boundaries where possible.
///
/// A single line longer than `limit` is hard-split. Text that already fits is
/// returned as one chunk unchanged.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let sep = usize::from(!chunk.is_empty());

        if chunk_len + sep + line_len <= limit {
            if sep == 1 {
                chunk.push('\n');
            }
            chunk.push_str(line);
            chunk_len += sep + line_len;
            continue;
        }

        if !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
            chunk_len = 0;
        }

        if line_len <= limit {
            chunk.push_str(line);
            chunk_len = line_len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut pieces = chars.chunks(limit).peekable();
        while let Some(piece) = pieces.next() {
            let piece: String = piece.iter().collect();
            if pieces.peek().is_some() {
                out.push(piece);
            } else {
                chunk_len = piece.chars().count();
                chunk = piece;
            }
        }
    }

    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}
