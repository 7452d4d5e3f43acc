//! Caption parsing: free-form movie text → structured metadata fields.
//!
//! Captions arrive in several informal label conventions ("Título:" /
//! "Titulo:", "Lançamento:" / "Ano:", ...), sometimes with decorative emoji
//! used instead of line breaks. Parsing is data-driven: a table of field →
//! ordered label aliases consumed by one line-scan routine. `parse` never
//! fails; fields that cannot be extracted come back as `None`.

use crate::constants::DEFAULT_TITLE;
use crate::models::ParsedMetadata;

/// Decorative symbols that some conversations use as informal line breaks.
/// Normalized to `\n` before any field scan.
const DELIMITERS: &[char] = &['🎬', '🎥', '📽', '📀', '🍿', '▪', '•'];

/// Label aliases per field, in priority order. The first alias that yields a
/// match wins; later aliases are only consulted when earlier ones found
/// nothing in the whole caption.
const TITLE_ALIASES: &[&str] = &["título", "titulo"];
const DIRECTOR_ALIASES: &[&str] = &["diretor", "direção", "direcao"];
const AUDIO_ALIASES: &[&str] = &["áudio", "audio", "idioma"];
const YEAR_ALIASES: &[&str] = &["lançamento", "lancamento", "ano"];
const GENRES_ALIASES: &[&str] = &["gêneros", "generos", "gênero", "genero"];

/// The synopsis is not line-scoped: its value runs from this label to the
/// end of the caption.
const SYNOPSIS_LABEL: &str = "sinopse:";

/// Parse a caption into structured metadata. Absent fields become `None`;
/// the title falls back to a placeholder so it is always non-empty.
pub fn parse(text: &str) -> ParsedMetadata {
    let normalized = normalize(text);
    let lines: Vec<&str> = normalized.lines().collect();

    ParsedMetadata {
        title: scan_field(&lines, TITLE_ALIASES).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        director: scan_field(&lines, DIRECTOR_ALIASES),
        audio: scan_field(&lines, AUDIO_ALIASES),
        year: scan_field(&lines, YEAR_ALIASES),
        genres: scan_field(&lines, GENRES_ALIASES),
        synopsis: tail_after(&normalized, SYNOPSIS_LABEL)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    }
}

/// Whether the text carries a title label at all. Captions without one are
/// treated upstream as unrelated chat messages, not as malformed metadata.
pub fn has_title_label(text: &str) -> bool {
    TITLE_ALIASES
        .iter()
        .any(|alias| find_ignore_case(text, alias).is_some())
}

/// Replace decorative delimiters with newlines and drop variation selectors
/// left behind by emoji sequences.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\u{FE0F}')
        .map(|c| if DELIMITERS.contains(&c) { '\n' } else { c })
        .collect()
}

/// Generic line scan: first alias that matches any line wins.
fn scan_field(lines: &[&str], aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| lines.iter().find_map(|line| line_value(line, alias)))
}

/// Value for one alias on one line: the alias must appear (case-insensitive)
/// and the line must contain a colon; the value is everything after the
/// first colon, trimmed. A label without a colon is not a match.
fn line_value(line: &str, alias: &str) -> Option<String> {
    find_ignore_case(line, alias)?;
    let (_, rest) = line.split_once(':')?;
    let value = trim_value(rest);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Everything after the first case-insensitive occurrence of `label`.
fn tail_after<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let start = find_ignore_case(text, label)?;
    let end = text[start..]
        .char_indices()
        .nth(label.chars().count())
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len());
    Some(&text[end..])
}

/// Case-insensitive substring search that is accent-aware (e.g. "TÍTULO"
/// matches the alias "título"). Returns the byte offset of the match.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Some(0);
    }
    for (idx, _) in haystack.char_indices() {
        let mut rest = haystack[idx..].chars().flat_map(char::to_lowercase);
        if needle.iter().all(|&n| rest.next() == Some(n)) {
            return Some(idx);
        }
    }
    None
}

/// Trim surrounding whitespace and the decoration some captions wrap values in.
fn trim_value(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '"' | '|' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_caption() {
        let caption = "Título: Dune\nAno: 2021\nGêneros: Ficção\nSinopse: Um herdeiro...";
        let parsed = parse(caption);

        assert_eq!(parsed.title, "Dune");
        assert_eq!(parsed.year.as_deref(), Some("2021"));
        assert_eq!(parsed.genres.as_deref(), Some("Ficção"));
        assert_eq!(parsed.synopsis.as_deref(), Some("Um herdeiro..."));
        assert_eq!(parsed.director, None);
        assert_eq!(parsed.audio, None);
    }

    #[test]
    fn title_falls_back_to_placeholder() {
        let parsed = parse("Ano: 1999");
        assert_eq!(parsed.title, DEFAULT_TITLE);

        // Label present but empty value also falls back.
        let parsed = parse("Título:   ");
        assert_eq!(parsed.title, DEFAULT_TITLE);
    }

    #[test]
    fn label_without_colon_is_not_matched() {
        let parsed = parse("Título Dune\nAno 2021");
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.year, None);
    }

    #[test]
    fn alias_priority_is_fixed() {
        // "Lançamento" outranks "Ano" even when "Ano" appears first.
        let parsed = parse("Ano: 1984\nLançamento: 2021");
        assert_eq!(parsed.year.as_deref(), Some("2021"));

        let parsed = parse("Ano: 1984");
        assert_eq!(parsed.year.as_deref(), Some("1984"));
    }

    #[test]
    fn matching_is_case_and_accent_insensitive() {
        let parsed = parse("TÍTULO: Central do Brasil\ntitulo ignorado");
        assert_eq!(parsed.title, "Central do Brasil");

        let parsed = parse("titulo: Cidade de Deus\nDIREÇÃO: Fernando Meirelles");
        assert_eq!(parsed.title, "Cidade de Deus");
        assert_eq!(parsed.director.as_deref(), Some("Fernando Meirelles"));
    }

    #[test]
    fn emoji_delimiters_normalize_to_newlines() {
        let parsed = parse("🎬Título: Bacurau🎥Ano: 2019▪️Gêneros: Suspense");
        assert_eq!(parsed.title, "Bacurau");
        assert_eq!(parsed.year.as_deref(), Some("2019"));
        assert_eq!(parsed.genres.as_deref(), Some("Suspense"));
    }

    #[test]
    fn synopsis_runs_to_end_of_input() {
        let caption = "Título: Dune\nSinopse: Primeira linha.\nSegunda linha.\n";
        let parsed = parse(caption);
        assert_eq!(
            parsed.synopsis.as_deref(),
            Some("Primeira linha.\nSegunda linha.")
        );
    }

    #[test]
    fn decorated_values_are_trimmed() {
        let parsed = parse("Título: *Dune*\nÁudio: - Dublado -");
        assert_eq!(parsed.title, "Dune");
        assert_eq!(parsed.audio.as_deref(), Some("Dublado"));
    }

    #[test]
    fn empty_input_yields_placeholder_only() {
        let parsed = parse("");
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.director, None);
        assert_eq!(parsed.audio, None);
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.genres, None);
        assert_eq!(parsed.synopsis, None);
    }

    #[test]
    fn title_label_gate() {
        assert!(has_title_label("Título: Dune"));
        assert!(has_title_label("enviei o TITULO errado"));
        assert!(!has_title_label("mensagem qualquer de chat"));
    }
}
