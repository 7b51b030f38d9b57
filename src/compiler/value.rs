//! Expansion of a declaration's right-hand side into memory cell values.

/// Scans `text` character by character and flattens it into the value
/// sequence that will be written verbatim into consecutive memory cells.
/// A `"` toggles string mode; inside a string every character (spaces
/// included) becomes its character code. Outside, characters collect into a
/// buffer that must parse as a signed decimal integer when a space ends it.
/// A buffered token left at end of input is flushed the same way.
///
/// On failure the offending token is returned so the caller can report it
/// with line context.
pub fn parse_value(text: &str) -> Result<Vec<i32>, String> {
    let mut result = Vec::new();
    let mut in_string = false;
    let mut buf = String::new();

    for c in text.chars() {
        if c == '"' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            result.push(c as i32);
        } else if c == ' ' {
            flush(&mut buf, &mut result)?;
        } else {
            buf.push(c);
        }
    }

    flush(&mut buf, &mut result)?;
    Ok(result)
}

fn flush(buf: &mut String, result: &mut Vec<i32>) -> Result<(), String> {
    if buf.trim().is_empty() {
        buf.clear();
        return Ok(());
    }
    match buf.parse::<i32>() {
        Ok(v) => {
            result.push(v);
            buf.clear();
            Ok(())
        }
        Err(_) => Err(std::mem::take(buf)),
    }
}
