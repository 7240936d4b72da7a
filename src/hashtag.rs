//! Title-to-hashtag normalization.

/// Turn a film title into a single hashtag token: split on whitespace,
/// keep only ASCII letters and digits within each word, drop words that
/// end up empty, uppercase the first surviving character of each word
/// (everything after it keeps its original case), and join with a `#`
/// prefix.
pub fn build_hashtag(title: &str) -> String {
    let mut tag = String::with_capacity(title.len() + 1);
    tag.push('#');
    for word in title.split_whitespace() {
        let cleaned: String = word.chars().filter(char::is_ascii_alphanumeric).collect();
        let mut chars = cleaned.chars();
        if let Some(first) = chars.next() {
            tag.push(first.to_ascii_uppercase());
            tag.extend(chars);
        }
    }
    tag
}
