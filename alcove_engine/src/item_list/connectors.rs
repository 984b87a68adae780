//! List connector grammar: splitting authored phrases and re-joining members.

use std::sync::LazyLock;

use regex::Regex;

/// The standalone word "and", with any surrounding whitespace.
static AND_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s+)and(?:\s+|$)").expect("connector regex is valid"));

/// Split untagged list text into member phrases.
///
/// Commas and the lowercase word "and" separate phrases; fragments that are
/// nothing but connectors are dropped.
pub(crate) fn split_plain(text: &str) -> Vec<&str> {
    text.split(',')
        .flat_map(|piece| AND_WORD.split(piece))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

/// Join members as English prose: `A`, `A and B`, `A, B, and C`.
pub(crate) fn join_members<S: AsRef<str>>(members: &[S]) -> String {
    match members {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_the_word_and() {
        assert_eq!(
            split_plain("BASKETBALLS, SOCCER BALLS, and BASEBALLS"),
            vec!["BASKETBALLS", "SOCCER BALLS", "BASEBALLS"]
        );
        assert_eq!(split_plain(" and a PIANO"), vec!["a PIANO"]);
        assert_eq!(split_plain(", a wooden ruler, and "), vec!["a wooden ruler"]);
        assert_eq!(split_plain(", "), Vec::<&str>::new());
    }

    #[test]
    fn and_inside_words_is_not_a_connector() {
        assert_eq!(split_plain("a bag of SAND and a BANDANA"), vec!["a bag of SAND", "a BANDANA"]);
        assert_eq!(split_plain("an ANDIRON"), vec!["an ANDIRON"]);
    }

    #[test]
    fn joins_with_serial_comma() {
        assert_eq!(join_members::<&str>(&[]), "");
        assert_eq!(join_members(&["a SAW"]), "a SAW");
        assert_eq!(join_members(&["a SAW", "a pair of HEDGE TRIMMERS"]), "a SAW and a pair of HEDGE TRIMMERS");
        assert_eq!(
            join_members(&["2 POOL STICKS", "a TRIANGLE", "BALLS"]),
            "2 POOL STICKS, a TRIANGLE, and BALLS"
        );
    }
}
