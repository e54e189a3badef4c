/// Canonical form used to compare file names, material names and namespaces.
///
/// Drops every character that is not an ASCII letter or digit, then lowercases what remains:
/// `"Base_Color-01.png"` becomes `"basecolor01png"`.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_and_lowercases() {
        assert_eq!(normalize("Base_Color-01.png"), "basecolor01png");
        assert_eq!(normalize("Base-Color_01!"), "basecolor01");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("__--.."), "");
        // non-ASCII letters are not alphanumeric for our purposes
        assert_eq!(normalize("Béton_ß2"), "bton2");
    }

    #[test]
    fn idempotent_and_case_insensitive() {
        for s in ["KB3D_IRF_BldgLG_A", "rock01 normal.TIF", "  x  ", "MiXeD-CaSe_42"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
            assert_eq!(normalize(&s.to_uppercase()), once);
            assert_eq!(normalize(&s.to_lowercase()), once);
        }
    }
}
