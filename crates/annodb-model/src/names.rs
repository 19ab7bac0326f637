//! Lexical validators for names and string payloads.
//!
//! Formal argument names look like `<name>`; predicate and column names,
//! nominals and quote strings each have their own character classes.

/// Characters that may never appear inside a name or nominal.
const RESERVED: [char; 6] = ['(', ')', '<', '>', ',', '"'];

fn is_graphical(ch: char) -> bool {
    ch.is_ascii_graphic()
}

fn is_name_char(ch: char) -> bool {
    is_graphical(ch) && !RESERVED.contains(&ch)
}

fn has_space_at_ends(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

/// `<name>` with at least one non-reserved graphical character inside.
pub fn is_valid_farg_name(name: &str) -> bool {
    let Some(inner) = name
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
    else {
        return false;
    };
    !inner.is_empty() && inner.chars().all(is_name_char)
}

/// Non-empty, no leading or trailing blank, spaces allowed inside.
pub fn is_valid_nominal(value: &str) -> bool {
    !value.is_empty()
        && !has_space_at_ends(value)
        && value.chars().all(|ch| ch == ' ' || is_name_char(ch))
}

/// Predicate names: non-empty, graphical, no reserved characters, no spaces.
pub fn is_valid_pred_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char)
}

/// Spreadsheet variable (column / matrix) names follow the nominal rules.
pub fn is_valid_svar_name(name: &str) -> bool {
    is_valid_nominal(name)
}

/// Printable ASCII without the double quote.
pub fn is_valid_quote_string(value: &str) -> bool {
    value
        .chars()
        .all(|ch| (' '..='~').contains(&ch) && ch != '"')
}

/// Free text: anything but a backspace, restricted to ASCII and Latin-1 letters.
pub fn is_valid_text_string(value: &str) -> bool {
    value.chars().all(|ch| {
        ch != '\u{8}' && (ch.is_ascii() || (('\u{c0}'..='\u{ff}').contains(&ch) && ch.is_alphabetic()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farg_names() {
        assert!(is_valid_farg_name("<val>"));
        assert!(is_valid_farg_name("<a_b-c>"));
        assert!(!is_valid_farg_name("<>"));
        assert!(!is_valid_farg_name("val"));
        assert!(!is_valid_farg_name("<va l>"));
        assert!(!is_valid_farg_name("<a<b>"));
        assert!(!is_valid_farg_name("<a,b>"));
    }

    #[test]
    fn nominals() {
        assert!(is_valid_nominal("a_nominal"));
        assert!(is_valid_nominal("two words"));
        assert!(!is_valid_nominal(""));
        assert!(!is_valid_nominal(" leading"));
        assert!(!is_valid_nominal("trailing "));
        assert!(!is_valid_nominal("paren("));
    }

    #[test]
    fn quote_strings() {
        assert!(is_valid_quote_string(""));
        assert!(is_valid_quote_string("q-string (with parens, and commas)"));
        assert!(!is_valid_quote_string("a \"bad\" string"));
        assert!(!is_valid_quote_string("tab\there"));
    }

    #[test]
    fn pred_and_column_names() {
        assert!(is_valid_pred_name("pve0"));
        assert!(!is_valid_pred_name("two words"));
        assert!(is_valid_svar_name("two words"));
        assert!(!is_valid_svar_name(""));
    }

    #[test]
    fn text_strings() {
        assert!(is_valid_text_string("free text, \"quotes\" and (parens)\n"));
        assert!(is_valid_text_string("caf\u{e9}"));
        assert!(!is_valid_text_string("back\u{8}space"));
    }
}
