/// Build the lyric-writing instruction sent to either model.
pub fn lyrics_prompt(genre: &str, theme: &str) -> String {
    format!(
        "Write {genre} song lyrics based on this theme: {theme}\n\n\
         Format with clear verse/chorus structure. Make it authentic to the {genre} genre.\n\
         Keep it to about 3-4 verses with choruses. Make it singable and emotionally resonant."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_genre_and_theme() {
        let prompt = lyrics_prompt("Gospel", "a river at dawn");
        assert!(prompt.starts_with("Write Gospel song lyrics based on this theme: a river at dawn"));
        assert!(prompt.contains("authentic to the Gospel genre"));
        assert!(prompt.contains("3-4 verses"));
    }
}
