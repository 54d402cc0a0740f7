/// Key used to match source phrases across contexts and catalogs:
/// lowercase, single-spaced, without quotes, brackets or ellipses.
pub fn normalize(text: &str) -> String {
    let mut s = text.trim().to_lowercase();

    for ch in ['“', '”', '’', '‘', '„', '…', '"', '\'', '(', ')', '&'] {
        s = s.replace(ch, "");
    }

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn folds_case_whitespace_and_quotes() {
        assert_eq!(normalize("  Play   on \"Spotify\"… "), "play on spotify");
        assert_eq!(normalize("&Open settings"), "open settings");
        assert_eq!(normalize("Rock & Roll"), "rock roll");
    }
}
