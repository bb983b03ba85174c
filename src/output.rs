//! Output formatting for search results and tree statistics

use crate::corpus::Corpus;
use crate::report::TreeSummary;
use crate::tree::types::PatternInfo;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print occurrences as `path:line:column:text` with the match highlighted
pub fn print_occurrences(
    corpus: &Corpus,
    occurrences: &[PatternInfo],
    pattern: &str,
    color: bool,
) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_occurrences(&mut stdout, corpus, occurrences, pattern)
}

/// Write occurrences to any color-capable sink, ordered by file and line
pub fn write_occurrences<W: WriteColor>(
    out: &mut W,
    corpus: &Corpus,
    occurrences: &[PatternInfo],
    pattern: &str,
) -> io::Result<()> {
    let pattern_len = pattern.chars().count();

    let mut sorted: Vec<&PatternInfo> = occurrences.iter().collect();
    sorted.sort_by_key(|info| (info.pattern_nr, info.start_pos));

    for info in sorted {
        let Some(text) = corpus.text(info.pattern_nr) else {
            continue;
        };
        print_match_line(
            out,
            &corpus.source_of(text).display().to_string(),
            text.line_number,
            &text.body,
            info.start_pos,
            info.start_pos + pattern_len,
        )?;
    }

    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}", occurrences.len())?;
    out.reset()?;
    writeln!(
        out,
        " occurrence{}",
        if occurrences.len() == 1 { "" } else { "s" }
    )?;
    Ok(())
}

/// Print a match line with highlighted match
///
/// `match_start` and `match_end` count characters, not bytes.
fn print_match_line<W: WriteColor>(
    out: &mut W,
    path: &str,
    line_num: usize,
    content: &str,
    match_start: usize,
    match_end: usize,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    write!(out, "{}", path)?;
    out.reset()?;
    write!(out, ":")?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", line_num)?;
    out.reset()?;
    write!(out, ":{}:", match_start + 1)?;

    let safe_start = byte_offset(content, match_start);
    let safe_end = byte_offset(content, match_end);

    if safe_start > 0 {
        write!(out, "{}", &content[..safe_start])?;
    }

    if safe_end > safe_start {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}", &content[safe_start..safe_end])?;
        out.reset()?;
    }

    if safe_end < content.len() {
        write!(out, "{}", &content[safe_end..])?;
    }

    writeln!(out)?;
    Ok(())
}

/// Byte offset of the `chars`-th character, clamped to the string end
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// Print tree statistics
pub fn print_summary(summary: &TreeSummary) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let rows = [
        ("Mode", format!("{:?}", summary.mode).to_lowercase()),
        ("Units", summary.units.to_string()),
        ("Texts", summary.texts.to_string()),
        ("Characters", summary.chars.to_string()),
        ("Nodes", summary.nodes.to_string()),
        ("Leaves", summary.leaves.to_string()),
        ("Occurrences", summary.occurrences.to_string()),
    ];
    for (name, value) in rows {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(stdout, "{:<12}", name)?;
        stdout.reset()?;
        writeln!(stdout, "{}", value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::types::{TreeConfig, TreeMode};
    use std::path::PathBuf;
    use termcolor::NoColor;

    #[test]
    fn test_byte_offset_multibyte() {
        assert_eq!(byte_offset("héllo", 2), 3);
        assert_eq!(byte_offset("abc", 10), 3);
    }

    #[test]
    fn test_write_occurrences_plain() {
        let corpus = Corpus::from_sources(
            vec![(PathBuf::from("f.txt"), "banana\nhéna\n".to_string())],
            TreeMode::Generalized,
        )
        .unwrap();
        let tree = corpus.build_tree(&TreeConfig::default(), None, false).unwrap();
        let found = tree.locate("na").unwrap();

        let mut out = NoColor::new(Vec::new());
        write_occurrences(&mut out, &corpus, &found, "na").unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        assert_eq!(
            text,
            "f.txt:1:3:banana\nf.txt:1:5:banana\nf.txt:2:3:héna\n3 occurrences\n"
        );
    }
}
